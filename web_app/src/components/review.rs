//! Review form of a book.

use bookclub_client::{controller::Outcome, model::Rating};
use leptos::*;
use web_sys::SubmitEvent;

use super::{common::ScreenHeader, use_ui};

#[component]
pub fn ReviewScreen() -> impl IntoView {
    let ui = use_ui();

    let title = move || {
        if ui.track().reviews.exists() {
            "⭐ Редагувати відгук"
        } else {
            "⭐ Відгук на книгу"
        }
    };
    let stars = move || {
        let chosen = ui.track().reviews.rating();
        (Rating::MIN.stars()..=Rating::MAX.stars())
            .filter_map(|stars| Rating::new(stars).ok())
            .map(|rating| {
                let active = chosen.is_some_and(|chosen| chosen >= rating);
                view! {
                    <button type="button" class="star" class:active=active on:click=move |_| {
                        ui.get().reviews.set_rating(rating);
                        ui.refresh();
                    }>
                        {if active { "★" } else { "☆" }}
                    </button>
                }
            })
            .collect_view()
    };

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        ui.spawn(async move {
            if ui.get().reviews.save().await.is_ok() {
                ui.back();
            }
        });
    };
    let on_delete = move |_| {
        ui.spawn(async move {
            if let Ok(Outcome::Done) = ui.get().reviews.delete().await {
                ui.back();
            }
        });
    };
    let on_cancel = move |_| {
        ui.get().reviews.close();
        ui.back();
    };

    view! {
        <ScreenHeader title="⭐ Відгук"/>
        <form class="review-form" on:submit=on_submit>
            <h3>{title}</h3>
            <div class="rating">{stars}</div>
            <label for="review-comment">"Коментар"</label>
            <textarea id="review-comment"
                prop:value=move || ui.track().reviews.comment()
                on:input=move |event| ui.get().reviews.set_comment(event_target_value(&event))/>
            <div class="form-actions">
                <button type="button" on:click=on_cancel>"Скасувати"</button>
                <Show when=move || ui.track().reviews.exists()>
                    <button type="button" class="danger" on:click=on_delete>"🗑 Видалити"</button>
                </Show>
                <input type="submit" value="Зберегти"/>
            </div>
        </form>
    }
}
