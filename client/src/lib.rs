//! Core of the Book Club Mini App.
//!
//! Everything here is independent from the browser: the Telegram host, HTTP `fetch` and timers are
//! reached through the [`Host`](host::Host), [`Fetch`](transport::Fetch) and
//! [`Timer`](debounce::Timer) traits, which the web app implements with `wasm-bindgen` and the
//! tests implement with mocks.
//!
//! The code is written for a single-threaded event loop: futures are not `Send` and shared state
//! lives in [`Rc`](std::rc::Rc) + [`Cell`](std::cell::Cell)/[`RefCell`](std::cell::RefCell).
//! `RefCell` borrows are never held across `.await`.

pub use bookclub_data_model as model;

pub mod api;
pub mod config;
pub mod context;
pub mod controller;
pub mod debounce;
pub mod format;
pub mod host;
pub mod mutation;
pub mod provenance;
pub mod race;
pub mod transport;
pub mod view;

#[cfg(test)]
pub mod test_utils;

pub use context::Context;
