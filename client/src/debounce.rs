//! Debouncing of bursty triggers like keystrokes in a search box.

use std::{future::Future, rc::Rc, time::Duration};

use futures::future::LocalBoxFuture;

use crate::race::LatestOnly;

/// Platform timer.
pub trait Timer {
    /// Resolve after `duration`.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Collapses a burst of triggers into a single one fired a quiet period after the last trigger.
pub struct Debouncer {
    quiet_period: Duration,
    timer: Rc<dyn Timer>,
    guard: LatestOnly,
}

impl Debouncer {
    /// Construct new [`Debouncer`].
    pub fn new(quiet_period: Duration, timer: Rc<dyn Timer>) -> Self {
        Self {
            quiet_period,
            timer,
            guard: LatestOnly::new(),
        }
    }

    /// Register a trigger.
    ///
    /// Resolves to `true` after the quiet period if no other trigger arrived meanwhile,
    /// otherwise to `false`. The trigger is registered at call time.
    pub fn settle(&self) -> impl Future<Output = bool> {
        let wait = self.guard.run(self.timer.sleep(self.quiet_period));
        async move { wait.await.is_some() }
    }
}
