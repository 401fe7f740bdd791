//! Common sub-components.

use bookclub_client::{
    format,
    transport::{Attachment, AttachmentError},
};
use leptos::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

/// Header of a screen with a back button.
#[component]
pub fn ScreenHeader(
    #[prop(into)] title: String,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    let ui = super::use_ui();
    view! {
        <header class="screen-header">
            <button type="button" class="back-button" on:click=move |_| ui.back()>"←"</button>
            <h2>{title}</h2>
            <div class="header-actions">{children.map(|children| children())}</div>
        </header>
    }
}

/// Book cover falling back to the default picture.
#[component]
pub fn Cover(#[prop(into)] url: Option<String>) -> impl IntoView {
    let src = url.unwrap_or_else(|| format::DEFAULT_COVER.to_owned());
    view! { <img class="book-cover" src=src alt="Обкладинка"/> }
}

/// Club avatar falling back to the default picture.
#[component]
pub fn Avatar(#[prop(into)] url: Option<String>) -> impl IntoView {
    let src = url.unwrap_or_else(|| format::DEFAULT_AVATAR.to_owned());
    view! { <img class="club-avatar" src=src alt="Аватар"/> }
}

/// Average rating as stars.
#[component]
pub fn Stars(rating: f64) -> impl IntoView {
    let (filled, half) = format::star_counts(rating);
    let empty = 5_u8.saturating_sub(filled).saturating_sub(u8::from(half));
    view! {
        <span class="stars" title=format!("{rating:.1}")>
            <span class="star-full">{"★".repeat(usize::from(filled))}</span>
            {half.then(|| view! { <span class="star-half">"★"</span> })}
            <span class="star-empty">{"☆".repeat(usize::from(empty))}</span>
        </span>
    }
}

/// First file chosen in `input`.
pub fn chosen_file(input: &HtmlInputElement) -> Option<File> {
    input.files().and_then(|files| files.get(0))
}

/// Read `file` into an attachment, applying the staging checks.
///
/// `None` if the browser failed to read the file.
pub async fn read_attachment(file: File) -> Option<Result<Attachment, AttachmentError>> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .inspect_err(|err| tracing::warn!(?err, "Failed to read file"))
        .ok()?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Some(Attachment::image(file.name(), file.type_(), bytes))
}
