//! Module with [`Context`] structure to share dependencies between controllers.

use std::rc::Rc;

use crate::{
    api::Api,
    config::Config,
    debounce::Timer,
    host::{Haptic, Host},
    model::UserId,
};

/// Dependencies of the controllers.
pub struct Context {
    pub config: Config,
    pub api: Api,
    pub host: Rc<dyn Host>,
    pub timer: Rc<dyn Timer>,
}

impl Context {
    /// Construct new [`Context`].
    pub fn new(config: Config, api: Api, host: Rc<dyn Host>, timer: Rc<dyn Timer>) -> Self {
        Self {
            config,
            api,
            host,
            timer,
        }
    }

    /// Id of the current user as the backend spells it.
    pub fn user_id(&self) -> Option<UserId> {
        self.host.session_user().map(|user| user.user_id())
    }

    /// Show `message` to the user.
    pub fn say(&self, message: &str) {
        self.host.alert(message);
    }

    /// Show `message` and vibrate.
    pub fn say_with(&self, haptic: Haptic, message: &str) {
        self.host.haptic(haptic);
        self.host.alert(message);
    }

    /// Ask the user a yes/no question.
    pub async fn ask(&self, question: &str) -> bool {
        self.host.confirm(question).await
    }
}
