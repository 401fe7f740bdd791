//! Module with Web App components.

mod activity;
mod app;
mod book_form;
mod club_admin;
mod club_detail;
mod clubs;
mod common;
mod profile;
mod review;

pub use app::{App, Ui, logged, use_ui};
