//! Profile of the current user.

use std::{cell::RefCell, rc::Rc};

use tracing::warn;

use super::{Result, reported};
use crate::{
    context::Context,
    host,
    model::{UserProfile, UserStats},
};

/// Controller of the profile screen.
pub struct ProfileController {
    context: Rc<Context>,
    profile: RefCell<Option<UserProfile>>,
    stats: RefCell<UserStats>,
}

impl ProfileController {
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            profile: RefCell::default(),
            stats: RefCell::default(),
        }
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.borrow().clone()
    }

    pub fn stats(&self) -> UserStats {
        *self.stats.borrow()
    }

    /// Load the profile together with the stats in the current chat.
    ///
    /// Missing stats show as zeros.
    ///
    /// # Errors
    ///
    /// Fails if the profile can't be fetched.
    pub async fn open(&self) -> Result<()> {
        let chat_key = host::chat_key(self.context.host.as_ref());
        let user = self.context.api.user();
        let (profile, stats) = futures::join!(user.profile(), user.stats(&chat_key));

        let stats = stats.unwrap_or_else(|err| {
            warn!(%err, %chat_key, "Failed to load stats");
            UserStats::default()
        });
        *self.stats.borrow_mut() = stats;

        let profile = reported(&self.context, profile)?;
        *self.profile.borrow_mut() = Some(profile);
        Ok(())
    }
}
