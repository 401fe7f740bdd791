//! View controllers.
//!
//! Each controller owns the state of one screen, calls the API and tells the user about the
//! outcome. Rendering is left to the platform layer which reads the state back after every call.
//! Controllers are single-threaded and never hold a `RefCell` borrow across an `.await`.

use std::cell::Cell;

use tracing::{error, warn};

use crate::{
    context::Context,
    host::Haptic,
    mutation::{Committed, MutationError},
    transport,
};

pub mod activity;
pub mod book_form;
pub mod books;
pub mod clubs;
pub mod members;
pub mod profile;
pub mod requests;
pub mod reviews;
pub mod shell;

pub use activity::ActivityController;
pub use book_form::BookFormController;
pub use books::BooksController;
pub use clubs::ClubsController;
pub use members::MembersController;
pub use profile::ProfileController;
pub use requests::RequestsController;
pub use reviews::ReviewsController;
pub use shell::Shell;

/// Controller result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failed controller action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, displaydoc::Display)]
pub enum Error {
    /// {0}
    Validation(&'static str),
    /// Дія недоступна
    NotAllowed,
    /// Зачекайте, попередня дія ще виконується
    Busy,
    /// {0}
    Api(#[from] transport::Error),
}

impl From<MutationError> for Error {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Validation(message) => Self::Validation(message),
            MutationError::Record(err) => Self::Api(err),
        }
    }
}

/// Outcome of an action which asks for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The user declined the confirmation.
    Cancelled,
}

/// Flag rejecting overlapping mutations of one controller.
#[derive(Debug, Default)]
pub struct Busy(Cell<bool>);

/// Resets [`Busy`] on drop.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a Busy);

impl Busy {
    /// Mark as busy.
    ///
    /// # Errors
    ///
    /// Fails if already busy.
    pub fn start(&self) -> Result<BusyGuard<'_>> {
        if self.0.replace(true) {
            warn!("Action ignored, another one is in progress");
            return Err(Error::Busy);
        }
        Ok(BusyGuard(self))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.get()
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.0.set(false);
    }
}

/// Messages for the outcomes of a two-phase save.
pub(crate) struct SaveMessages<'a> {
    pub success: &'a str,
    pub partial: &'a str,
}

/// Tell the user how a two-phase save went.
///
/// API failures were already alerted by the transport, so only the haptic is added for them.
pub(crate) fn report_save<Id>(
    context: &Context,
    result: &std::result::Result<Committed<Id>, MutationError>,
    messages: &SaveMessages<'_>,
) {
    match result {
        Ok(committed) if committed.is_partial() => {
            context.say_with(Haptic::WARNING, messages.partial);
        }
        Ok(_) => context.say_with(Haptic::SUCCESS, messages.success),
        Err(MutationError::Validation(message)) => context.say_with(Haptic::ERROR, message),
        Err(MutationError::Record(err)) => {
            error!(%err, "Save failed");
            context.host.haptic(Haptic::ERROR);
        }
    }
}

/// Error haptic for a failed API action. The message was already shown by the transport.
pub(crate) fn report_failure(context: &Context, err: &Error) {
    error!(%err, "Action failed");
    match err {
        Error::Validation(message) => context.say_with(Haptic::ERROR, message),
        Error::NotAllowed => context.say_with(Haptic::WARNING, &err.to_string()),
        Error::Busy => {}
        Error::Api(_) => context.host.haptic(Haptic::ERROR),
    }
}

/// Convert an API result, reporting a failure to the user.
pub(crate) fn reported<T>(context: &Context, result: transport::Result<T>) -> Result<T> {
    result.map_err(|err| {
        let err = Error::from(err);
        report_failure(context, &err);
        err
    })
}
