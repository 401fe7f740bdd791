//! Presentation helpers shared by views.

use chrono::{DateTime, Utc};

use crate::model::{EventType, Role, Timestamp};

/// Cover shown for books without one.
pub const DEFAULT_COVER: &str = "images/book_default_cover.png";
/// Avatar shown for clubs without one.
pub const DEFAULT_AVATAR: &str = "images/club_default_avatar.png";

/// Pick the Ukrainian plural form for `count`: "1 книга", "2 книги", "5 книг".
#[must_use]
pub const fn plural<'a>(count: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let last = count % 10;
    let last_two = count % 100;
    if last == 1 && last_two != 11 {
        one
    } else if matches!(last, 2..=4) && !matches!(last_two, 12..=14) {
        few
    } else {
        many
    }
}

/// `"3 книги"`.
#[must_use]
pub fn books_count(count: u32) -> String {
    format!("{count} {}", plural(count.into(), "книга", "книги", "книг"))
}

/// `"5 учасників"`.
#[must_use]
pub fn members_count(count: u32) -> String {
    format!(
        "{count} {}",
        plural(count.into(), "учасник", "учасники", "учасників")
    )
}

/// Time relative to `now`: "щойно", "5 хв тому", "вчора" and `dd.mm` after a week.
#[must_use]
pub fn relative_time(time: Timestamp, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time.0);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "щойно".to_owned()
    } else if minutes < 60 {
        format!("{minutes} хв тому")
    } else if hours < 24 {
        format!("{hours} год тому")
    } else if days == 1 {
        "вчора".to_owned()
    } else if days < 7 {
        format!("{days} дн тому")
    } else {
        time.0.format("%d.%m").to_string()
    }
}

/// Stars of an average rating: full stars and whether a half star follows.
///
/// Fractions from 0.25 to 0.75 give a half star, larger ones round up.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rating is clamped to 0..=5"
)]
pub fn star_counts(rating: f64) -> (u8, bool) {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor();
    let fraction = rating - full;
    if fraction >= 0.75 {
        (full as u8 + 1, false)
    } else {
        (full as u8, fraction >= 0.25)
    }
}

/// `★★★☆☆` for a whole-star rating.
#[must_use]
pub fn stars(filled: u8) -> String {
    let filled = usize::from(filled.min(5));
    "★".repeat(filled) + &"☆".repeat(5 - filled)
}

/// Human-readable role.
#[must_use]
pub const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Owner => "Власник",
        Role::Admin => "Адміністратор",
        Role::Member => "Учасник",
        Role::Pending => "Очікує схвалення",
    }
}

/// Icon of an activity event.
#[must_use]
pub const fn event_icon(event_type: EventType) -> &'static str {
    match event_type {
        EventType::AddBook => "➕",
        EventType::BorrowBook => "📚",
        EventType::ReturnBook => "🔙",
        EventType::ReviewBook => "⭐",
    }
}

/// Verb of an activity event, placed between the actor and the book title.
#[must_use]
pub const fn event_verb(event_type: EventType) -> &'static str {
    match event_type {
        EventType::AddBook => "додав книгу",
        EventType::BorrowBook => "взяв",
        EventType::ReturnBook => "повернув",
        EventType::ReviewBook => "залишив відгук на",
    }
}

/// Label of an activity filter.
#[must_use]
pub const fn event_filter_label(event_type: Option<EventType>) -> &'static str {
    match event_type {
        None => "Усі",
        Some(EventType::AddBook) => "Додані",
        Some(EventType::BorrowBook) => "Взяті",
        Some(EventType::ReturnBook) => "Повернені",
        Some(EventType::ReviewBook) => "Відгуки",
    }
}

/// First `max_chars` characters of `text`, with an ellipsis if something was cut.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        head + "…"
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]

    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn plural_forms() {
        assert_eq!(books_count(1), "1 книга");
        assert_eq!(books_count(3), "3 книги");
        assert_eq!(books_count(5), "5 книг");
        assert_eq!(books_count(11), "11 книг");
        assert_eq!(books_count(12), "12 книг");
        assert_eq!(books_count(21), "21 книга");
        assert_eq!(books_count(104), "104 книги");
        assert_eq!(members_count(0), "0 учасників");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let ago = |seconds: i64| Timestamp(now - chrono::Duration::seconds(seconds));

        assert_eq!(relative_time(ago(30), now), "щойно");
        assert_eq!(relative_time(ago(5 * 60), now), "5 хв тому");
        assert_eq!(relative_time(ago(3 * 3600), now), "3 год тому");
        assert_eq!(relative_time(ago(30 * 3600), now), "вчора");
        assert_eq!(relative_time(ago(4 * 86400), now), "4 дн тому");
        assert_eq!(relative_time(ago(10 * 86400), now), "10.05");
    }

    #[test]
    fn star_rounding() {
        assert_eq!(star_counts(4.0), (4, false));
        assert_eq!(star_counts(3.3), (3, true));
        assert_eq!(star_counts(3.8), (4, false));
        assert_eq!(star_counts(9.0), (5, false));
        assert_eq!(stars(3), "★★★☆☆");
    }

    #[test]
    fn previews() {
        assert_eq!(preview("Коротко", 50), "Коротко");
        assert_eq!(preview("Дуже довгий відгук", 4), "Дуже…");
    }
}
