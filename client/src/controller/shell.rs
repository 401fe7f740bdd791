//! App bootstrap and navigation.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::{error, info, warn};

use super::ClubsController;
use crate::{
    context::Context,
    host::{Launch, ThemeParams},
    view::{Back, Navigator, View},
};

/// Root of the app: launch gating, lifecycle and the active view.
pub struct Shell {
    context: Rc<Context>,
    launch: Launch,
    clubs: Rc<ClubsController>,
    navigator: RefCell<Navigator>,
    loading: Cell<bool>,
}

impl Shell {
    pub fn new(context: Rc<Context>, launch: Launch, clubs: Rc<ClubsController>) -> Self {
        Self {
            context,
            launch,
            clubs,
            navigator: RefCell::default(),
            loading: Cell::new(false),
        }
    }

    pub const fn launch(&self) -> Launch {
        self.launch
    }

    /// Global loading flag, set during the initial load.
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn active(&self) -> View {
        self.navigator.borrow().active()
    }

    pub fn theme(&self) -> ThemeParams {
        self.context.host.theme()
    }

    /// Start the app.
    ///
    /// Standalone launches touch neither the host nor the network. Otherwise the host is told
    /// the app is ready, the backend is probed and the clubs are loaded concurrently.
    ///
    /// Returns whether the app runs.
    pub async fn start(&self) -> bool {
        if !self.launch.runs_app() {
            info!("Opened outside of Telegram, showing the landing page");
            return false;
        }
        info!(launch = ?self.launch, "Starting");
        self.context.host.ready();
        self.context.host.expand();
        self.sync_back_button();

        self.loading.set(true);
        let probe = async {
            match self.context.api.user().health().await {
                Ok(health) if health.is_ok() => info!("Backend is healthy"),
                Ok(health) => warn!(status = %health.status, "Backend is degraded"),
                Err(err) => warn!(%err, "Health probe failed"),
            }
        };
        let (_, clubs) = futures::join!(probe, self.clubs.load());
        self.loading.set(false);

        if let Err(err) = clubs {
            error!(%err, "Initial load failed");
        }
        true
    }

    /// Show `view`.
    pub fn navigate(&self, view: View) {
        self.navigator.borrow_mut().open(view);
        self.sync_back_button();
    }

    /// Go to the parent view, closing the app from the root.
    pub fn back(&self) -> Back {
        let back = self.navigator.borrow_mut().back();
        match back {
            Back::To(_) => self.sync_back_button(),
            Back::Close => self.context.host.close(),
        }
        back
    }

    fn sync_back_button(&self) {
        let visible = self.navigator.borrow().has_back();
        self.context.host.show_back_button(visible);
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]

    use tokio::test;

    use super::*;
    use crate::{
        api::Api,
        config::Config,
        host::{DevHost, Host, MockHost},
        test_utils::{FakeFetch, TokioTimer, club_json, context, mock_host},
        transport::{Fetch, Method, Transport},
    };

    fn shell(context: Context, launch: Launch) -> Shell {
        let context = Rc::new(context);
        let clubs = Rc::new(ClubsController::new(Rc::clone(&context)));
        Shell::new(context, launch, clubs)
    }

    #[test]
    async fn standalone_makes_no_calls() {
        let fetch = FakeFetch::new();
        // No expectations: any host call panics.
        let shell = shell(context(&fetch, MockHost::new()), Launch::Standalone);

        assert!(!shell.start().await);
        assert!(fetch.requests().is_empty());
    }

    #[test]
    async fn development_uses_fixed_identity() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/health", 200, r#"{"status": "ok"}"#);
        fetch.on(Method::Get, "/api/clubs/my", 200, &format!("[{}]", club_json(1, "Клуб", "owner")));
        let host: Rc<dyn Host> = Rc::new(DevHost);
        let config = Config::production();
        let transport = Transport::new(
            config.clone(),
            Rc::clone(&fetch) as Rc<dyn Fetch>,
            Rc::clone(&host),
        );
        let context = Context::new(config, Api::new(transport), host, Rc::new(TokioTimer));
        assert_eq!(context.user_id().unwrap(), "1");
        let shell = shell(context, Launch::Development);

        assert!(shell.start().await);
        assert!(!shell.is_loading());
        assert_eq!(fetch.requests().len(), 2);
        assert_eq!(shell.clubs.clubs().len(), 1);
    }

    #[test]
    async fn failed_health_probe_is_only_logged() {
        let fetch = FakeFetch::new();
        fetch.fail(Method::Get, "/api/health", "offline");
        fetch.on(Method::Get, "/api/clubs/my", 200, "[]");
        let mut host = mock_host();
        host.expect_ready().times(1).return_const(());
        host.expect_expand().times(1).return_const(());
        host.expect_show_back_button().return_const(());
        // No `expect_alert()`: alerting panics.
        let shell = shell(context(&fetch, host), Launch::Telegram);

        assert!(shell.start().await);
    }

    #[test]
    async fn back_from_root_closes() {
        let fetch = FakeFetch::new();
        let mut host = mock_host();
        host.expect_show_back_button().return_const(());
        host.expect_close().times(1).return_const(());
        let shell = shell(context(&fetch, host), Launch::Telegram);

        shell.navigate(View::ClubDetail { club_id: 1 });
        assert_eq!(shell.back(), Back::To(View::ClubsList));
        assert_eq!(shell.back(), Back::Close);
    }
}
