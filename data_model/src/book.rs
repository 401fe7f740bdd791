//! Books, loans and reviews.

use serde::{Deserialize, Serialize};

use crate::{ClubId, Timestamp, UserId};

/// Book identifier.
pub type BookId = u64;

crate::case_insensitive_enum! {
    /// Lending status of a book.
    pub enum BookStatus {
        Available => "AVAILABLE",
        Reading => "READING",
        Deleted => "DELETED",
    }
}

crate::case_insensitive_enum! {
    /// Status of a single loan.
    pub enum LoanStatus {
        Reading => "READING",
        Returned => "RETURNED",
        Waiting => "WAITING",
    }
}

/// Book as listed in a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub owner_id: UserId,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_username: Option<String>,
    pub status: BookStatus,
    #[serde(default)]
    pub current_reader_id: Option<UserId>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub readers_count: Option<u32>,
    #[serde(default)]
    pub holder_id: Option<UserId>,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub holder_username: Option<String>,
    /// Present in detail responses of newer backends, used to reload the right list after edit.
    #[serde(default)]
    pub club_id: Option<ClubId>,
}

impl Book {
    /// Whether the book can be borrowed right now.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    /// Whether `user_id` added this book.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Whether `user_id` is currently reading this book.
    #[must_use]
    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.current_reader_id.as_deref() == Some(user_id)
    }

    /// Non-empty cover url, if any.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.cover_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Book with its loan history and reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Single loan of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u64,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    pub username: String,
    pub status: LoanStatus,
    pub borrowed_at: Timestamp,
    #[serde(default)]
    pub returned_at: Option<Timestamp>,
}

/// Rating given in a review.
///
/// Whole stars from 1 to 5, which is what the backend validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

/// Rating is outside of `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Rating must be from 1 to 5, got {0}")]
pub struct RatingOutOfRange(pub u8);

impl Rating {
    /// Minimal rating.
    pub const MIN: Self = Self(1);
    /// Maximal rating.
    pub const MAX: Self = Self(5);

    /// Construct a rating, checking the range.
    ///
    /// # Errors
    ///
    /// Fails if `stars` is not in `1..=5`.
    pub const fn new(stars: u8) -> Result<Self, RatingOutOfRange> {
        if stars >= Self::MIN.0 && stars <= Self::MAX.0 {
            Ok(Self(stars))
        } else {
            Err(RatingOutOfRange(stars))
        }
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Review of a book. One per user and book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub book_id: BookId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Review {
    /// Name to show next to the review.
    #[must_use]
    pub fn author(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Анонім")
    }
}

/// Body of a review upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub rating: Rating,
    pub comment: Option<String>,
}

/// Body to create a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub club_id: ClubId,
    /// Idempotency token generated per submit action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_request_id: Option<String>,
}

/// Partial update of a book. `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

/// Body of a borrow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub club_id: ClubId,
}

/// Body asking the backend to download a cover from an external url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverFromUrl {
    pub url: String,
}

/// Response of a cover upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverUploaded {
    #[serde(default)]
    pub cover_url: Option<String>,
}
