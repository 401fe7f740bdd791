//! Activity feed of a club.

use bookclub_client::{
    format,
    model::{ActivityEvent, ClubId, EventType},
    view::View,
};
use leptos::*;

use super::{common::ScreenHeader, logged, use_ui};

const FILTERS: [Option<EventType>; 5] = [
    None,
    Some(EventType::AddBook),
    Some(EventType::BorrowBook),
    Some(EventType::ReturnBook),
    Some(EventType::ReviewBook),
];

#[component]
pub fn ActivityScreen(club_id: ClubId) -> impl IntoView {
    let ui = use_ui();
    ui.spawn(async move { logged(ui.get().activity.open(club_id).await) });

    let filters = FILTERS
        .into_iter()
        .map(|filter| {
            let on_click = move |_| {
                ui.spawn(async move { logged(ui.get().activity.set_filter(filter).await) });
            };
            view! {
                <button type="button" class="filter"
                    class:active=move || ui.track().activity.filter() == filter
                    on:click=on_click>
                    {format::event_filter_label(filter)}
                </button>
            }
        })
        .collect_view();

    let events = move || {
        let activity = ui.track();
        let events = activity.activity.events();
        if events.is_empty() && !activity.activity.is_loading() {
            return view! { <div class="empty-state">"Поки що нічого не сталося"</div> }.into_view();
        }
        let now = chrono::Utc::now();
        events
            .into_iter()
            .map(|event| view! { <EventCard club_id=club_id event=event now=now/> })
            .collect_view()
    };

    let on_more = move |_| {
        ui.spawn(async move { logged(ui.get().activity.load_more().await) });
    };

    view! {
        <ScreenHeader title="📰 Активність клубу"/>
        <div class="activity-filters">{filters}</div>
        <div class="activity-list">{events}</div>
        <Show when=move || ui.track().activity.is_loading()>
            <div class="loading">"Завантаження..."</div>
        </Show>
        <Show when=move || { let app = ui.track(); app.activity.has_more() && !app.activity.is_loading() }>
            <button type="button" class="load-more" on:click=on_more>"Показати більше"</button>
        </Show>
    }
}

#[component]
fn EventCard(club_id: ClubId, event: ActivityEvent, now: chrono::DateTime<chrono::Utc>) -> impl IntoView {
    let ui = use_ui();
    let book_id = event.book.book_id;
    let open_book = move |_| {
        ui.navigate(View::ClubDetail { club_id });
        ui.spawn(async move { logged(ui.get().books.open_detail(book_id).await) });
    };

    let review = (event.event_type == EventType::ReviewBook).then(|| {
        let stars = event
            .rating
            .map(|rating| "⭐".repeat(usize::from(rating.stars())));
        let text = event
            .review_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| format!("«{}»", format::preview(text, 50)));
        view! {
            <div class="event-review">
                {stars.map(|stars| view! { <span class="event-stars">{stars}</span> })}
                {text.map(|text| view! { <span class="event-text">{text}</span> })}
            </div>
        }
    });

    view! {
        <div class="event-card" on:click=open_book>
            <span class="event-icon">{format::event_icon(event.event_type)}</span>
            <div class="event-body">
                <div>
                    <strong>{event.actor.display_name.clone()}</strong>
                    " " {format::event_verb(event.event_type)} " "
                    <em>"«" {event.book.title.clone()} "»"</em>
                </div>
                {review}
                <div class="meta">{format::relative_time(event.event_time, now)}</div>
            </div>
        </div>
    }
}
