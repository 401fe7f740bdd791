//! Where the value of a form field came from, deciding whether a suggestion may replace it.

use std::cell::RefCell;

use tracing::debug;

use crate::host::Host;

/// Origin of a field value. Kept on the client only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provenance {
    /// Empty or loaded from the server.
    #[default]
    Default,
    /// Typed or chosen by the user.
    User,
    /// Filled from the external metadata search.
    Google,
}

/// Field value with its [`Provenance`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracked<T> {
    value: T,
    provenance: Provenance,
}

impl<T> Tracked<T> {
    /// Value with [`Provenance::Default`].
    pub const fn new(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Default,
        }
    }

    pub const fn value(&self) -> &T {
        &self.value
    }

    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Take the value out.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Store a value entered by the user.
    pub fn edit(&mut self, value: T) {
        self.value = value;
        self.provenance = Provenance::User;
    }

    /// Whether replacing the value with a suggestion needs the user consent.
    pub const fn needs_confirmation(&self) -> bool {
        matches!(self.provenance, Provenance::User)
    }

    fn apply_suggestion(&mut self, value: T) {
        self.value = value;
        self.provenance = Provenance::Google;
    }
}

/// Result of [`offer()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Field wasn't touched by the user and was replaced without asking.
    Silent,
    /// User agreed to replace their value.
    Confirmed,
    /// User kept their value.
    Declined,
}

impl Overwrite {
    /// Whether the field now holds the suggestion.
    #[must_use]
    pub const fn applied(self) -> bool {
        !matches!(self, Self::Declined)
    }
}

/// Offer `suggestion` for `field`.
///
/// Fields edited by the user change only if they accept the `prompt` in the host dialog. The
/// field is not borrowed while the dialog is open.
pub async fn offer<T>(
    field: &RefCell<Tracked<T>>,
    suggestion: T,
    host: &dyn Host,
    prompt: &str,
) -> Overwrite {
    let needs_confirmation = field.borrow().needs_confirmation();

    let outcome = if !needs_confirmation {
        Overwrite::Silent
    } else if host.confirm(prompt).await {
        Overwrite::Confirmed
    } else {
        Overwrite::Declined
    };

    debug!(?outcome, "Suggestion offered");
    if outcome.applied() {
        field.borrow_mut().apply_suggestion(suggestion);
    }
    outcome
}
