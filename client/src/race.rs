//! Race guard for reloads which may complete out of order.

use std::{cell::Cell, future::Future};

use tracing::debug;

/// Proof of issue order handed out by [`LatestOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Per-operation counter keeping only the result of the most recently started call.
///
/// Older calls are not cancelled, their results are just dropped when they arrive.
#[derive(Debug, Default)]
pub struct LatestOnly {
    current: Cell<u64>,
}

impl LatestOnly {
    /// Construct new [`LatestOnly`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Cell::new(0),
        }
    }

    /// Start a new call, making every previously issued ticket stale.
    pub fn issue(&self) -> Ticket {
        let next = self.current.get().wrapping_add(1);
        self.current.set(next);
        Ticket(next)
    }

    /// Whether no call was started after the one holding `ticket`.
    #[must_use]
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.current.get() == ticket.0
    }

    /// Make all outstanding calls stale.
    pub fn invalidate(&self) {
        self.issue();
    }

    /// Await `future` and return its output only if it's still the latest call.
    ///
    /// The ticket is taken when `run()` is called, not when the returned future is first polled.
    pub fn run<F: Future>(&self, future: F) -> impl Future<Output = Option<F::Output>> {
        let ticket = self.issue();
        async move {
            let output = future.await;
            if self.is_latest(ticket) {
                Some(output)
            } else {
                debug!(?ticket, "Discarding stale result");
                None
            }
        }
    }
}
