//! Clubs list with the join and create forms.

use bookclub_client::{
    controller::clubs::OpenClub,
    format,
    host::Haptic,
    model::{Club, ClubId, Role},
    mutation::{ClubDraft, Target},
    transport::Attachment,
    view::View,
};
use leptos::*;
use web_sys::{Event, HtmlInputElement, SubmitEvent};

use super::{
    Ui,
    common::{Avatar, chosen_file, read_attachment},
    use_ui,
};

/// Which part of the clubs screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    List,
    Join,
    Create,
}

/// Open a club unless the membership is still pending.
fn open_club(ui: Ui, club_id: ClubId) {
    ui.spawn(async move {
        match ui.get().clubs.open(club_id).await {
            Ok(OpenClub::Opened { .. }) => ui.navigate(View::ClubDetail { club_id }),
            Ok(OpenClub::Pending | OpenClub::Superseded) => {}
            Err(err) => tracing::debug!(%err, club_id, "Club not opened"),
        }
    });
}

#[component]
pub fn ClubsScreen() -> impl IntoView {
    let ui = use_ui();
    let (panel, set_panel) = create_signal(Panel::List);

    let clubs = move || {
        let clubs = ui.track().clubs.clubs();
        if clubs.is_empty() {
            return view! {
                <div class="empty-state">
                    <p>"У вас ще немає клубів"</p>
                    <p>"Створіть свій клуб або приєднайтеся за кодом запрошення"</p>
                </div>
            }
            .into_view();
        }
        clubs
            .into_iter()
            .map(|club| view! { <ClubCard club=club/> })
            .collect_view()
    };

    view! {
        <header class="screen-header">
            <h2>"📚 Мої клуби"</h2>
            <div class="header-actions">
                <button type="button" on:click=move |_| ui.navigate(View::Profile)>"👤"</button>
            </div>
        </header>
        <div class="toolbar">
            <button type="button" on:click=move |_| set_panel.set(Panel::Create)>"➕ Створити клуб"</button>
            <button type="button" on:click=move |_| set_panel.set(Panel::Join)>"🔑 Приєднатися"</button>
        </div>
        {move || match panel.get() {
            Panel::List => view! { <div class="clubs-list">{clubs}</div> }.into_view(),
            Panel::Join => view! { <JoinForm on_done=move || set_panel.set(Panel::List)/> }.into_view(),
            Panel::Create => view! {
                <ClubForm
                    target=Target::Create
                    initial=ClubDraft::default()
                    on_done=move || set_panel.set(Panel::List)
                />
            }
            .into_view(),
        }}
    }
}

#[component]
fn ClubCard(club: Club) -> impl IntoView {
    let ui = use_ui();
    let club_id = club.id;
    let pending = club.role() == Role::Pending;
    let counts = [
        club.members_count.map(format::members_count),
        club.books_count.map(format::books_count),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" · ");

    view! {
        <div class="club-card" class:pending=pending on:click=move |_| open_club(ui, club_id)>
            <Avatar url=club.avatar().map(ToOwned::to_owned)/>
            <div class="club-card-info">
                <div class="club-card-name">{club.name.clone()}</div>
                <div class="club-card-meta">{format::role_label(club.role())}</div>
                <div class="club-card-meta">{counts}</div>
            </div>
        </div>
    }
}

#[component]
fn JoinForm(on_done: impl Fn() + Copy + 'static) -> impl IntoView {
    let ui = use_ui();
    let (code, set_code) = create_signal(String::new());
    let (message, set_message) = create_signal(String::new());

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        ui.spawn(async move {
            let joined = ui
                .get()
                .clubs
                .join(&code.get_untracked(), &message.get_untracked())
                .await;
            if joined.is_ok() {
                on_done();
            }
        });
    };

    view! {
        <form class="join-form" on:submit=on_submit>
            <label for="invite-code">"Код запрошення"</label>
            <input type="text" id="invite-code" placeholder="ABCD1234" autocapitalize="characters"
                prop:value=code on:input=move |event| set_code.set(event_target_value(&event))/>
            <label for="join-message">"Повідомлення адміністратору"</label>
            <textarea id="join-message" prop:value=message
                on:input=move |event| set_message.set(event_target_value(&event))/>
            <div class="form-actions">
                <button type="button" on:click=move |_| on_done()>"Скасувати"</button>
                <input type="submit" value="Надіслати запит"/>
            </div>
        </form>
    }
}

/// Create or edit form of a club.
#[component]
pub fn ClubForm(
    target: Target<ClubId>,
    initial: ClubDraft,
    on_done: impl Fn() + Copy + 'static,
) -> impl IntoView {
    let ui = use_ui();
    let draft = create_rw_signal(initial);
    let avatar = create_rw_signal(None::<Attachment>);

    let on_avatar = move |event: Event| {
        let input = event_target::<HtmlInputElement>(&event);
        let Some(file) = chosen_file(&input) else {
            return;
        };
        spawn_local(async move {
            match read_attachment(file).await {
                Some(Ok(attachment)) => avatar.set(Some(attachment)),
                Some(Err(err)) => {
                    ui.get().context.say_with(Haptic::WARNING, &err.to_string());
                }
                None => {}
            }
        });
    };

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        ui.spawn(async move {
            let app = ui.get();
            let saved = app
                .clubs
                .save(target, &draft.get_untracked(), avatar.get_untracked())
                .await;
            if let Ok(committed) = saved {
                on_done();
                if target == Target::Create {
                    open_club(ui, committed.id);
                }
            }
        });
    };

    let title = match target {
        Target::Create => "Новий клуб",
        Target::Update(_) => "Редагування клубу",
    };

    view! {
        <form class="club-form" on:submit=on_submit>
            <h3>{title}</h3>
            <label for="club-name">"Назва"</label>
            <input type="text" id="club-name" prop:value=move || draft.with(|draft| draft.name.clone())
                on:input=move |event| draft.update(|draft| draft.name = event_target_value(&event))/>
            <label for="club-description">"Опис"</label>
            <textarea id="club-description"
                prop:value=move || draft.with(|draft| draft.description.clone())
                on:input=move |event| draft.update(|draft| draft.description = event_target_value(&event))/>
            <label class="checkbox">
                <input type="checkbox" prop:checked=move || draft.with(|draft| draft.is_public)
                    on:change=move |event| draft.update(|draft| draft.is_public = event_target_checked(&event))/>
                "Публічний клуб"
            </label>
            <label class="checkbox">
                <input type="checkbox" prop:checked=move || draft.with(|draft| draft.requires_approval)
                    on:change=move |event| {
                        draft.update(|draft| draft.requires_approval = event_target_checked(&event));
                    }/>
                "Заявки потребують схвалення"
            </label>
            <label for="club-avatar">"Аватар"</label>
            <input type="file" id="club-avatar" accept="image/*" on:change=on_avatar/>
            <Show when=move || avatar.with(Option::is_some)>
                <p class="hint">"Аватар буде завантажено після збереження"</p>
            </Show>
            <div class="form-actions">
                <button type="button" on:click=move |_| on_done()>"Скасувати"</button>
                <input type="submit" value="Зберегти"
                    disabled=move || ui.track().clubs.is_busy()/>
            </div>
        </form>
    }
}
