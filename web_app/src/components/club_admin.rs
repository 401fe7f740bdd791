//! Join requests and members of a club.

use bookclub_client::{
    format,
    model::{ClubId, JoinRequest, Member, Role, ReviewAction},
};
use leptos::*;

use super::{
    club_detail::InviteCode,
    common::ScreenHeader,
    logged, use_ui,
};

#[component]
pub fn RequestsScreen(club_id: ClubId) -> impl IntoView {
    let ui = use_ui();
    ui.spawn(async move { logged(ui.get().requests.open(club_id).await) });

    let invite_code = move || {
        ui.track()
            .requests
            .invite_code()
            .map(|code| view! { <InviteCode code=code/> })
    };
    let requests = move || {
        let requests = ui.track().requests.requests();
        if requests.is_empty() {
            return view! { <div class="empty-state">"Нових заявок немає"</div> }.into_view();
        }
        requests
            .into_iter()
            .map(|request| view! { <RequestCard club_id=club_id request=request/> })
            .collect_view()
    };

    view! {
        <ScreenHeader title="📨 Заявки на вступ"/>
        {invite_code}
        <div class="requests-list">{requests}</div>
    }
}

#[component]
fn RequestCard(club_id: ClubId, request: JoinRequest) -> impl IntoView {
    let ui = use_ui();
    let request_id = request.id;
    let review = move |action: ReviewAction| {
        ui.spawn(async move {
            logged(
                ui.get()
                    .requests
                    .review(club_id, request_id, action)
                    .await,
            );
        });
    };
    let name = request
        .user_name
        .clone()
        .or_else(|| request.username.clone())
        .unwrap_or_else(|| "Користувач".to_owned());
    let now = chrono::Utc::now();

    view! {
        <div class="request-card">
            <div class="initials">{request.initials()}</div>
            <div class="request-info">
                <div class="request-name">{name}</div>
                {request.username.clone().map(|username| view! { <div class="meta">"@" {username}</div> })}
                {request.message.clone().map(|message| view! { <p class="request-message">{message}</p> })}
                <div class="meta">{format::relative_time(request.created_at, now)}</div>
            </div>
            <div class="request-actions">
                <button type="button" on:click=move |_| review(ReviewAction::Approve)>"✅"</button>
                <button type="button" class="danger" on:click=move |_| review(ReviewAction::Reject)>"❌"</button>
            </div>
        </div>
    }
}

#[component]
pub fn MembersScreen(club_id: ClubId) -> impl IntoView {
    let ui = use_ui();
    let members = create_rw_signal(Vec::<Member>::new());
    let reload = move || {
        ui.spawn(async move {
            if let Ok(list) = ui.get().members.members(club_id).await {
                members.set(list);
            }
        });
    };
    reload();

    let actor_role = move || ui.track().clubs.role().unwrap_or(Role::Member);

    view! {
        <ScreenHeader title="👥 Учасники"/>
        <div class="members-list">
            <For
                each=move || members.get()
                key=|member| (member.user_id.clone(), member.role)
                children=move |member| view! {
                    <MemberCard club_id=club_id member=member actor_role=actor_role() on_change=reload/>
                }
            />
        </div>
    }
}

#[component]
fn MemberCard(
    club_id: ClubId,
    member: Member,
    actor_role: Role,
    on_change: impl Fn() + Copy + 'static,
) -> impl IntoView {
    let ui = use_ui();
    let actions = ui.get().members.actions(actor_role, &member);
    let stats = format!(
        "📚 {} · 📖 {} · ⭐ {}",
        member.books_created, member.books_borrowed, member.reviews_count
    );
    let name = member.display_name().to_owned();
    let role = format::role_label(member.role);
    let member = store_value(member);

    let change_role = move |_| {
        ui.spawn(async move {
            let member = member.get_value();
            let changed = ui.get().members.change_role(club_id, actor_role, &member).await;
            if changed.is_ok() {
                on_change();
            }
        });
    };
    let remove = move |_| {
        ui.spawn(async move {
            let member = member.get_value();
            if ui.get().members.remove(club_id, actor_role, &member).await.is_ok() {
                on_change();
            }
        });
    };

    view! {
        <div class="member-card">
            <div class="member-info">
                <div class="member-name">{name}</div>
                <div class="meta">{role}</div>
                <div class="meta">{stats}</div>
            </div>
            <div class="member-actions">
                {actions.change_role_to.map(|target| {
                    let label = match target {
                        Role::Admin => "⬆️ Адмін",
                        _ => "⬇️ Учасник",
                    };
                    view! { <button type="button" on:click=change_role>{label}</button> }
                })}
                {actions.can_remove.then(|| view! {
                    <button type="button" class="danger" on:click=remove>"🚫"</button>
                })}
            </div>
        </div>
    }
}
