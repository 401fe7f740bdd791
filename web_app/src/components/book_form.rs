//! Create and edit form of a book.

use bookclub_client::{
    controller::{
        Outcome,
        book_form::{Cover as FormCover, CoverSource},
    },
    view::{BookFormMode, View},
};
use leptos::*;
use wasm_bindgen::JsCast as _;
use web_sys::{ClipboardEvent, Event, File, HtmlInputElement, SubmitEvent};

use super::{
    Ui,
    common::{Cover, ScreenHeader, chosen_file, read_attachment},
    logged, use_ui,
};

/// Stage `file` as the cover, showing its local preview.
fn stage(ui: Ui, file: File, source: CoverSource, set_preview: WriteSignal<Option<String>>) {
    let preview = web_sys::Url::create_object_url_with_blob(&file).ok();
    ui.spawn(async move {
        let Some(read) = read_attachment(file).await else {
            return;
        };
        if ui.get().book_form.stage_cover(read, source) {
            set_preview.set(preview);
        }
    });
}

#[component]
pub fn BookFormScreen() -> impl IntoView {
    let ui = use_ui();
    let (preview, set_preview) = create_signal(None::<String>);

    let paste = window_event_listener(ev::paste, move |event: Event| {
        let event: ClipboardEvent = event.unchecked_into();
        let Some(items) = event.clipboard_data().map(|data| data.items()) else {
            return;
        };
        let image = (0..items.length())
            .filter_map(|index| items.get(index))
            .filter(|item| item.type_().starts_with("image/"))
            .find_map(|item| item.get_as_file().ok().flatten());
        if let Some(file) = image {
            event.prevent_default();
            stage(ui, file, CoverSource::Pasted, set_preview);
        }
    });
    on_cleanup(move || paste.remove());

    let editing = matches!(
        ui.get().shell.active(),
        View::BookForm {
            mode: BookFormMode::Edit { .. }
        }
    );
    let title = if editing {
        "📚 Редагування книги"
    } else {
        "📚 Додавання книги"
    };
    let cover_url = move || {
        let cover = ui.track().book_form.cover();
        match cover.value() {
            FormCover::Staged(_) => preview.get(),
            other => other.url().map(ToOwned::to_owned),
        }
    };

    let on_file = move |event: Event| {
        let input = event_target::<HtmlInputElement>(&event);
        if let Some(file) = chosen_file(&input) {
            stage(ui, file, CoverSource::Picked, set_preview);
        }
    };
    let on_lookup = move |_| {
        ui.spawn(async move { logged(ui.get().book_form.lookup().await) });
    };
    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        ui.spawn(async move {
            if ui.get().book_form.save().await.is_ok() {
                ui.back();
            }
        });
    };
    let on_delete = move |_| {
        ui.spawn(async move {
            if let Ok(Outcome::Done) = ui.get().book_form.delete().await {
                ui.back();
            }
        });
    };
    let on_cancel = move |_| {
        ui.get().book_form.close();
        ui.back();
    };

    view! {
        <ScreenHeader title=title/>
        <form class="book-form" on:submit=on_submit>
            <div class="cover-picker">
                {move || view! { <Cover url=cover_url()/> }}
                <input type="file" accept="image/*" on:change=on_file/>
                <p class="hint">"Можна вставити зображення з буферу обміну (Ctrl+V)"</p>
            </div>
            <label for="book-title">"Назва *"</label>
            <input type="text" id="book-title"
                prop:value=move || ui.track().book_form.title()
                on:input=move |event| ui.get().book_form.set_title(event_target_value(&event))/>
            <label for="book-author">"Автор"</label>
            <input type="text" id="book-author"
                prop:value=move || ui.track().book_form.author()
                on:input=move |event| ui.get().book_form.set_author(event_target_value(&event))/>
            <button type="button" on:click=on_lookup>"🔍 Знайти опис і обкладинку"</button>
            <label for="book-description">"Опис"</label>
            <textarea id="book-description"
                prop:value=move || ui.track().book_form.description().value().clone()
                on:input=move |event| ui.get().book_form.set_description(event_target_value(&event))/>
            <div class="form-actions">
                <button type="button" on:click=on_cancel>"Скасувати"</button>
                {editing.then(|| view! {
                    <button type="button" class="danger" on:click=on_delete>"🗑 Видалити"</button>
                })}
                <input type="submit" value="Зберегти" disabled=move || ui.track().book_form.is_busy()/>
            </div>
        </form>
    }
}
