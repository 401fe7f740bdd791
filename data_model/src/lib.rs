//! Crate with Book Club common data structures which are transferred between the Mini App and
//! the REST API.
//!
//! Every endpoint response has its own type here, so malformed bodies are rejected right at the
//! transport boundary instead of leaking half-filled values into rendering.

pub mod activity;
pub mod book;
pub mod club;
pub mod metadata;
pub mod time;
pub mod user;

pub use activity::{ActivityActor, ActivityBook, ActivityEvent, ActivityPage, EventType};
pub use book::{
    Book, BookDetail, BookId, BookPatch, BookStatus, BorrowBook, CoverFromUrl, CoverUploaded, Loan,
    LoanStatus, NewBook, Rating, RatingOutOfRange, Review, ReviewDraft,
};
pub use club::{
    Club, ClubDetail, ClubId, ClubPatch, JoinClub, JoinRequest, JoinRequestAction, Member,
    MemberRoleChange, NewClub, RequestId, RequestStatus, ReviewAction, Role,
};
pub use metadata::{CandidateImage, MetadataCandidate, MetadataSearch};
pub use time::Timestamp;
pub use user::{Health, UserId, UserProfile, UserStats};

/// Declare a wire enum which is serialized in `SCREAMING_CASE` but accepted in any case.
///
/// The backend is not consistent about the casing of status-like values, so parsing must not
/// depend on it.
macro_rules! case_insensitive_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_meta])* $variant ),+
        }

        impl $name {
            /// Wire representation of the value.
            #[must_use]
            pub const fn as_wire(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::UnknownVariant {
                    ty: stringify!($name),
                    value: s.to_owned(),
                })
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <::std::string::String as ::serde::Deserialize<'de>>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use case_insensitive_enum;

/// Value of a wire enum is not known to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown `{ty}` value: `{value}`")]
pub struct UnknownVariant {
    /// Name of the enum.
    pub ty: &'static str,
    /// Received value.
    pub value: String,
}
