//! Profile of the current user.

use leptos::*;

use super::{common::ScreenHeader, logged, use_ui};

#[component]
pub fn ProfileScreen() -> impl IntoView {
    let ui = use_ui();
    ui.spawn(async move { logged(ui.get().profile.open().await) });

    let card = move || {
        let app = ui.track();
        let Some(profile) = app.profile.profile() else {
            return view! { <div class="loading">"Завантаження..."</div> }.into_view();
        };
        let stats = app.profile.stats();
        let username = (!profile.username.is_empty()).then(|| format!("@{}", profile.username));
        view! {
            <div class="profile-card">
                <div class="initials large">{profile.initials()}</div>
                <h3>{profile.full_name()}</h3>
                {username.map(|username| view! { <div class="meta">{username}</div> })}
                {profile.is_premium.then(|| view! { <div class="badge">"⭐ Premium"</div> })}
            </div>
            <div class="profile-stats">
                <div class="stat">
                    <div class="stat-value">{stats.books_added}</div>
                    <div class="stat-label">"Додано книг"</div>
                </div>
                <div class="stat">
                    <div class="stat-value">{stats.books_read}</div>
                    <div class="stat-label">"Прочитано"</div>
                </div>
                <div class="stat">
                    <div class="stat-value">{stats.currently_reading}</div>
                    <div class="stat-label">"Читаю зараз"</div>
                </div>
            </div>
        }
        .into_view()
    };

    view! {
        <ScreenHeader title="👤 Мій профіль"/>
        {card}
    }
}
