//! Book Club Mini App opened from Telegram.
//!
//! The browser side only: Telegram bindings, `fetch()`, timers and Leptos views. All behavior
//! lives in [`bookclub_client`].

#![allow(clippy::empty_structs_with_brackets, clippy::same_name_method)] // Triggered by leptos
#![allow(clippy::missing_docs_in_private_items)]

mod components;
mod fetch;
mod host;
mod tg_api;
mod timer;

fn main() {
    tracing_wasm::set_as_global_default();
    leptos::mount_to_body(components::App)
}
