//! Club activity feed.

use serde::{Deserialize, Serialize};

use crate::{BookId, Rating, Timestamp, UserId};

crate::case_insensitive_enum! {
    /// Kind of an activity event.
    pub enum EventType {
        AddBook => "ADD_BOOK",
        BorrowBook => "BORROW_BOOK",
        ReturnBook => "RETURN_BOOK",
        ReviewBook => "REVIEW_BOOK",
    }
}

/// Who did something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityActor {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub display_name: String,
}

/// Book the event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBook {
    pub book_id: BookId,
    pub title: String,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Single event of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_type: EventType,
    pub actor: ActivityActor,
    pub book: ActivityBook,
    pub event_time: Timestamp,
    /// Present for [`EventType::ReviewBook`].
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub review_text: Option<String>,
}

/// Page of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPage {
    pub events: Vec<ActivityEvent>,
    #[serde(default)]
    pub has_more: bool,
}
