//! Navigation state.

use std::{collections::HashMap, mem::Discriminant};

use crate::model::{BookId, ClubId};

/// Whether the book form adds a new book or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormMode {
    Create { club_id: ClubId },
    Edit { book_id: BookId },
}

/// Screen of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ClubsList,
    ClubDetail { club_id: ClubId },
    ClubRequests { club_id: ClubId },
    ClubMembers { club_id: ClubId },
    BookForm { mode: BookFormMode },
    BookReview { book_id: BookId },
    Activity { club_id: ClubId },
    Profile,
}

impl View {
    /// Where `back` leads if the view was entered directly.
    #[must_use]
    pub const fn default_parent(self) -> Option<Self> {
        match self {
            Self::ClubsList => None,
            Self::ClubDetail { .. } | Self::Profile | Self::BookReview { .. } => Some(Self::ClubsList),
            Self::ClubRequests { club_id }
            | Self::ClubMembers { club_id }
            | Self::Activity { club_id }
            | Self::BookForm {
                mode: BookFormMode::Create { club_id },
            } => Some(Self::ClubDetail { club_id }),
            Self::BookForm {
                mode: BookFormMode::Edit { .. },
            } => Some(Self::ClubsList),
        }
    }

    /// Club the view belongs to.
    #[must_use]
    pub const fn club_id(self) -> Option<ClubId> {
        match self {
            Self::ClubDetail { club_id }
            | Self::ClubRequests { club_id }
            | Self::ClubMembers { club_id }
            | Self::Activity { club_id }
            | Self::BookForm {
                mode: BookFormMode::Create { club_id },
            } => Some(club_id),
            Self::ClubsList
            | Self::Profile
            | Self::BookReview { .. }
            | Self::BookForm {
                mode: BookFormMode::Edit { .. },
            } => None,
        }
    }
}

/// Result of [`Navigator::back()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    /// Show this view.
    To(View),
    /// Already at the root, the app should close.
    Close,
}

/// Active view plus the view each screen was opened from.
///
/// There is no history stack: every kind of view remembers a single parent.
#[derive(Debug, Clone)]
pub struct Navigator {
    active: View,
    parents: HashMap<Discriminant<View>, View>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            active: View::ClubsList,
            parents: HashMap::new(),
        }
    }
}

impl Navigator {
    #[must_use]
    pub const fn active(&self) -> View {
        self.active
    }

    /// Show `view`, remembering the current one as its parent.
    pub fn open(&mut self, view: View) {
        if view == self.active {
            return;
        }
        if view == View::ClubsList {
            self.parents.clear();
        } else {
            self.parents
                .insert(std::mem::discriminant(&view), self.active);
        }
        self.active = view;
    }

    /// Return to the parent of the active view.
    pub fn back(&mut self) -> Back {
        let key = std::mem::discriminant(&self.active);
        let parent = self
            .parents
            .remove(&key)
            .or_else(|| self.active.default_parent());

        match parent {
            Some(parent) => {
                self.active = parent;
                Back::To(parent)
            }
            None => Back::Close,
        }
    }

    /// Whether the native back button should be visible.
    #[must_use]
    pub fn has_back(&self) -> bool {
        self.active != View::ClubsList
    }
}

/// State of a detail panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Detail<T> {
    #[default]
    Closed,
    Loading { id: u64 },
    Ready { id: u64, data: T },
    /// Fetch failed, the panel stays so the user can retry.
    Failed { id: u64 },
}

impl<T> Detail<T> {
    /// Id of the open item.
    #[must_use]
    pub const fn id(&self) -> Option<u64> {
        match self {
            Self::Closed => None,
            Self::Loading { id } | Self::Ready { id, .. } | Self::Failed { id } => Some(*id),
        }
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready { data, .. } => Some(data),
            Self::Closed | Self::Loading { .. } | Self::Failed { .. } => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready { data, .. } => Some(data),
            Self::Closed | Self::Loading { .. } | Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Start loading `id`, dropping any previous data.
    pub fn start(&mut self, id: u64) {
        *self = Self::Loading { id };
    }

    /// Store the fetch result if `id` is still being loaded.
    ///
    /// Returns `false` if the panel was closed or switched meanwhile.
    pub fn resolve<E>(&mut self, id: u64, result: Result<T, E>) -> bool {
        if !matches!(self, Self::Loading { id: loading } if *loading == id) {
            return false;
        }
        *self = match result {
            Ok(data) => Self::Ready { id, data },
            Err(_) => Self::Failed { id },
        };
        true
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_returns_to_remembered_parent() {
        let mut navigator = Navigator::default();
        navigator.open(View::Profile);
        navigator.open(View::BookReview { book_id: 4 });

        assert!(navigator.has_back());
        assert_eq!(navigator.back(), Back::To(View::Profile));
        assert_eq!(navigator.back(), Back::To(View::ClubsList));
        assert_eq!(navigator.back(), Back::Close);
        assert!(!navigator.has_back());
    }

    #[test]
    fn back_falls_back_to_default_parent() {
        let mut navigator = Navigator::default();
        navigator.open(View::ClubMembers { club_id: 2 });
        navigator.open(View::ClubsList);
        navigator.open(View::Activity { club_id: 2 });

        assert_eq!(navigator.back(), Back::To(View::ClubsList));

        let mut navigator = Navigator::default();
        navigator.open(View::BookForm {
            mode: BookFormMode::Create { club_id: 7 },
        });
        navigator.parents.clear();
        assert_eq!(navigator.back(), Back::To(View::ClubDetail { club_id: 7 }));
    }

    #[test]
    fn detail_lifecycle() {
        let mut detail = Detail::<&str>::default();
        detail.start(1);
        assert!(detail.is_loading());
        assert!(detail.resolve::<()>(1, Ok("book")));
        assert_eq!(detail.data(), Some(&"book"));

        detail.start(2);
        assert_eq!(detail.data(), None);
        assert!(!detail.resolve::<()>(1, Ok("stale")));
        assert!(detail.resolve(2, Err(())));
        assert_eq!(detail, Detail::Failed { id: 2 });

        detail.close();
        assert_eq!(detail.id(), None);
        assert!(!detail.resolve::<()>(2, Ok("late")));
    }
}
