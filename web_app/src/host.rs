//! [`Host`] backed by the Telegram Web App object.

use std::collections::BTreeMap;

use bookclub_client::host::{Chat, Haptic, Host, InitDataUnsafe, SessionUser, ThemeParams};
use futures::{FutureExt as _, channel::oneshot, future::LocalBoxFuture};
use wasm_bindgen::prelude::*;

use crate::tg_api::{self, WebApp};

/// Host running inside Telegram.
///
/// Capabilities missing in older clients degrade to no-ops or to the browser dialogs.
pub struct TelegramHost {
    web_app: WebApp,
    init_data_unsafe: InitDataUnsafe,
}

impl TelegramHost {
    pub fn new(web_app: WebApp) -> Self {
        let init_data_unsafe = parse_js(&web_app.init_data_unsafe()).unwrap_or_default();
        Self {
            web_app,
            init_data_unsafe,
        }
    }

    /// Re-apply the theme whenever the host changes it.
    pub fn on_theme_changed(&self, handler: impl Fn(ThemeParams) + 'static) {
        let web_app: JsValue = self.web_app.clone().into();
        let callback = Closure::<dyn Fn()>::new(move || {
            let web_app = web_app.clone().unchecked_into::<WebApp>();
            handler(theme_of(&web_app));
        });
        self.web_app
            .on_event("themeChanged", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    /// Route presses of the native back button to `handler`.
    pub fn on_back(&self, handler: impl Fn() + 'static) {
        if !tg_api::has(&self.web_app, "BackButton") {
            return;
        }
        let callback = Closure::<dyn Fn()>::new(handler);
        self.web_app
            .back_button()
            .on_click(callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

impl Host for TelegramHost {
    fn init_data(&self) -> String {
        self.web_app.init_data().unwrap_or_default()
    }

    fn session_user(&self) -> Option<SessionUser> {
        self.init_data_unsafe.user.clone()
    }

    fn chat(&self) -> Option<Chat> {
        self.init_data_unsafe.chat.clone()
    }

    fn version(&self) -> Option<String> {
        self.web_app.version()
    }

    fn has_alert(&self) -> bool {
        tg_api::has(&self.web_app, "showAlert")
    }

    fn haptic(&self, haptic: Haptic) {
        if !tg_api::has(&self.web_app, "HapticFeedback") {
            return;
        }
        let feedback = self.web_app.haptic_feedback();
        match haptic {
            Haptic::Impact(_) => feedback.impact_occurred(haptic.js_argument()),
            Haptic::Notification(_) => feedback.notification_occurred(haptic.js_argument()),
        }
    }

    fn alert(&self, message: &str) {
        if let Err(err) = self.web_app.show_alert(message) {
            tracing::warn!(?err, message, "Telegram alert failed");
        }
    }

    fn confirm(&self, message: &str) -> LocalBoxFuture<'static, bool> {
        if !tg_api::has(&self.web_app, "showConfirm") {
            return futures::future::ready(browser_confirm(message)).boxed_local();
        }

        let (sender, receiver) = oneshot::channel();
        let mut sender = Some(sender);
        let callback = Closure::<dyn FnMut(bool)>::new(move |confirmed: bool| {
            if let Some(sender) = sender.take() {
                let _ignored = sender.send(confirmed);
            }
        });

        if let Err(err) = self.web_app.show_confirm(message, &callback) {
            tracing::warn!(?err, "Telegram confirm failed, using the browser dialog");
            return futures::future::ready(browser_confirm(message)).boxed_local();
        }
        async move {
            let confirmed = receiver.await.unwrap_or(false);
            drop(callback);
            confirmed
        }
        .boxed_local()
    }

    fn theme(&self) -> ThemeParams {
        theme_of(&self.web_app)
    }

    fn ready(&self) {
        self.web_app.ready();
    }

    fn expand(&self) {
        self.web_app.expand();
    }

    fn show_back_button(&self, visible: bool) {
        if !tg_api::has(&self.web_app, "BackButton") {
            return;
        }
        let button = self.web_app.back_button();
        if visible {
            button.show();
        } else {
            button.hide();
        }
    }

    fn close(&self) {
        self.web_app.close();
    }
}

fn theme_of(web_app: &WebApp) -> ThemeParams {
    ThemeParams(parse_js::<BTreeMap<String, String>>(&web_app.theme_params()).unwrap_or_default())
}

/// Decode a plain JS object through its JSON form.
fn parse_js<T: for<'de> serde::Deserialize<'de>>(value: &JsValue) -> Option<T> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let json = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&json)
        .inspect_err(|err| tracing::warn!(%err, "Failed to decode host object"))
        .ok()
}

fn browser_confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
