//! Module with [`Host`] trait abstracting the Telegram Web App runtime.
//!
//! The browser implementation lives in the web app crate. Everything here is platform-independent
//! so that controllers can be tested with a mocked host.

#![allow(clippy::indexing_slicing)] // From `automock` macro expansion

use std::collections::BTreeMap;

use futures::future::{self, LocalBoxFuture};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Minimal SDK version with working `showAlert` and `showConfirm`.
const MIN_ALERT_VERSION: (u32, u32) = (6, 1);

/// Key used for stats when neither chat nor user is known.
const DEFAULT_CHAT_KEY: &str = "default_chat";

/// Style of an impact haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
    Soft,
    Rigid,
}

/// Kind of a notification haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// Haptic feedback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    /// `HapticFeedback.impactOccurred`.
    Impact(ImpactStyle),
    /// `HapticFeedback.notificationOccurred`.
    Notification(NotificationKind),
}

impl Haptic {
    /// Light tap used on every mutation attempt.
    pub const TAP: Self = Self::Impact(ImpactStyle::Light);
    /// Successful outcome.
    pub const SUCCESS: Self = Self::Notification(NotificationKind::Success);
    /// Partial or refused outcome.
    pub const WARNING: Self = Self::Notification(NotificationKind::Warning);
    /// Failed outcome.
    pub const ERROR: Self = Self::Notification(NotificationKind::Error);

    /// Argument of the corresponding JS method.
    #[must_use]
    pub const fn js_argument(self) -> &'static str {
        match self {
            Self::Impact(ImpactStyle::Light) => "light",
            Self::Impact(ImpactStyle::Medium) => "medium",
            Self::Impact(ImpactStyle::Heavy) => "heavy",
            Self::Impact(ImpactStyle::Soft) => "soft",
            Self::Impact(ImpactStyle::Rigid) => "rigid",
            Self::Notification(NotificationKind::Success) => "success",
            Self::Notification(NotificationKind::Warning) => "warning",
            Self::Notification(NotificationKind::Error) => "error",
        }
    }
}

/// User decoded from `initDataUnsafe.user`.
///
/// Not verified on the client, so only good for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SessionUser {
    /// Identity used when the app runs in development mode.
    #[must_use]
    pub fn development() -> Self {
        Self {
            id: 1,
            username: Some("dev_user".to_owned()),
            first_name: "Developer".to_owned(),
            last_name: None,
        }
    }

    /// User id as the backend spells it.
    #[must_use]
    pub fn user_id(&self) -> String {
        self.id.to_string()
    }
}

/// Chat the app was opened from, decoded from `initDataUnsafe.chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Decoded `initDataUnsafe`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitDataUnsafe {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub chat_type: Option<String>,
}

/// Colours of the host theme keyed by `themeParams` names like `bg_color`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeParams(pub BTreeMap<String, String>);

impl ThemeParams {
    /// CSS custom properties to set on the document root.
    ///
    /// `secondary_bg_color` becomes `--tg-theme-secondary-bg-color`.
    pub fn css_variables(&self) -> impl Iterator<Item = (String, &str)> {
        self.0.iter().map(|(key, value)| {
            (
                format!("--tg-theme-{}", key.replace('_', "-")),
                value.as_str(),
            )
        })
    }
}

/// Telegram Web App runtime.
///
/// Every method must degrade to a no-op if the capability is missing.
#[cfg_attr(test, automock)]
pub trait Host {
    /// Raw signed `initData`. Empty outside of Telegram.
    fn init_data(&self) -> String;

    /// Display identity of the current user.
    fn session_user(&self) -> Option<SessionUser>;

    /// Chat the app was opened from.
    fn chat(&self) -> Option<Chat>;

    /// SDK version, like `7.2`.
    fn version(&self) -> Option<String>;

    /// Whether `showAlert` exists at all. See [`alert_supported()`].
    fn has_alert(&self) -> bool;

    /// Vibrate.
    fn haptic(&self, haptic: Haptic);

    /// Show a modal alert.
    fn alert(&self, message: &str);

    /// Show a confirmation dialog resolving to the user answer.
    fn confirm(&self, message: &str) -> LocalBoxFuture<'static, bool>;

    /// Current theme.
    fn theme(&self) -> ThemeParams;

    /// Tell the host the app is ready to be shown.
    fn ready(&self);

    /// Expand to the full height.
    fn expand(&self);

    /// Show or hide the native back button.
    fn show_back_button(&self, visible: bool);

    /// Close the app.
    fn close(&self);
}

/// Whether alerts can be shown: the capability exists and the SDK is at least 6.1.
pub fn alert_supported(host: &dyn Host) -> bool {
    host.has_alert()
        && host
            .version()
            .as_deref()
            .and_then(parse_version)
            .is_some_and(|version| version >= MIN_ALERT_VERSION)
}

/// Parse `major.minor` version. Missing minor is zero.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Ok(0), str::parse).ok()?;
    Some((major, minor))
}

/// Key of the per-chat stats: chat id, then `user_<id>`, then a fixed default.
pub fn chat_key(host: &dyn Host) -> String {
    if let Some(chat) = host.chat() {
        return chat.id.to_string();
    }
    host.session_user().map_or_else(
        || DEFAULT_CHAT_KEY.to_owned(),
        |user| format!("user_{}", user.id),
    )
}

/// How the app has been launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Inside Telegram with a signed session.
    Telegram,
    /// Outside Telegram with the development identity.
    Development,
    /// Opened in a plain browser. Only the landing page is shown, no API calls are made.
    Standalone,
}

impl Launch {
    /// Decide launch mode from the host presence, its `initData` and the development flag.
    #[must_use]
    pub fn resolve(host_present: bool, init_data: &str, development: bool) -> Self {
        if host_present && !init_data.is_empty() {
            Self::Telegram
        } else if development {
            Self::Development
        } else {
            Self::Standalone
        }
    }

    /// Whether the main app should be rendered.
    #[must_use]
    pub const fn runs_app(self) -> bool {
        !matches!(self, Self::Standalone)
    }
}

/// Host used in development mode outside of Telegram.
///
/// Has a fixed identity, answers every confirmation positively and logs what it would show.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevHost;

impl Host for DevHost {
    fn init_data(&self) -> String {
        String::new()
    }

    fn session_user(&self) -> Option<SessionUser> {
        Some(SessionUser::development())
    }

    fn chat(&self) -> Option<Chat> {
        None
    }

    fn version(&self) -> Option<String> {
        None
    }

    fn has_alert(&self) -> bool {
        false
    }

    fn haptic(&self, haptic: Haptic) {
        info!(?haptic, "Haptic feedback");
    }

    fn alert(&self, message: &str) {
        warn!(message, "Alert");
    }

    fn confirm(&self, message: &str) -> LocalBoxFuture<'static, bool> {
        info!(message, "Confirmation auto-accepted");
        Box::pin(future::ready(true))
    }

    fn theme(&self) -> ThemeParams {
        ThemeParams::default()
    }

    fn ready(&self) {}

    fn expand(&self) {}

    fn show_back_button(&self, _visible: bool) {}

    fn close(&self) {
        info!("Close requested");
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]

    use super::*;

    fn host_with_version(has_alert: bool, version: Option<&'static str>) -> MockHost {
        let mut host = MockHost::new();
        host.expect_has_alert().return_const(has_alert);
        host.expect_version()
            .returning(move || version.map(ToOwned::to_owned));
        host
    }

    #[test]
    fn alert_requires_capability_and_version() {
        assert!(alert_supported(&host_with_version(true, Some("6.1"))));
        assert!(alert_supported(&host_with_version(true, Some("7.10"))));
        assert!(!alert_supported(&host_with_version(true, Some("6.0"))));
        assert!(!alert_supported(&host_with_version(true, None)));
        assert!(!alert_supported(&host_with_version(false, Some("8.0"))));
    }

    #[test]
    fn version_parsing() {
        assert_eq!(parse_version("6"), Some((6, 0)));
        assert_eq!(parse_version("6.10"), Some((6, 10)));
        assert_eq!(parse_version("six"), None);
    }

    #[test]
    fn launch_modes() {
        assert_eq!(Launch::resolve(true, "query_id=1", false), Launch::Telegram);
        assert_eq!(Launch::resolve(true, "", true), Launch::Development);
        assert_eq!(Launch::resolve(false, "", true), Launch::Development);
        assert_eq!(Launch::resolve(true, "", false), Launch::Standalone);
        assert_eq!(Launch::resolve(false, "", false), Launch::Standalone);
        assert!(!Launch::Standalone.runs_app());
    }

    #[test]
    fn chat_key_prefers_chat() {
        let mut host = MockHost::new();
        host.expect_chat().returning(|| {
            Some(Chat {
                id: -100,
                kind: Some("group".to_owned()),
                title: None,
            })
        });
        assert_eq!(chat_key(&host), "-100");

        let mut host = MockHost::new();
        host.expect_chat().returning(|| None);
        host.expect_session_user()
            .returning(|| Some(SessionUser::development()));
        assert_eq!(chat_key(&host), "user_1");

        let mut host = MockHost::new();
        host.expect_chat().returning(|| None);
        host.expect_session_user().returning(|| None);
        assert_eq!(chat_key(&host), "default_chat");
    }

    #[test]
    fn theme_variables_are_kebab_case() {
        let theme: ThemeParams =
            serde_json::from_str(r##"{"bg_color": "#fff", "secondary_bg_color": "#eee"}"##)
                .unwrap();
        let variables: Vec<_> = theme.css_variables().collect();
        assert_eq!(
            variables,
            vec![
                ("--tg-theme-bg-color".to_owned(), "#fff"),
                ("--tg-theme-secondary-bg-color".to_owned(), "#eee"),
            ]
        );
    }

    #[test]
    fn init_data_unsafe_decoding() {
        let decoded: InitDataUnsafe = serde_json::from_str(
            r#"{"user": {"id": 5, "first_name": "Олена", "username": "olena"}, "chat_type": "private"}"#,
        )
        .unwrap();
        assert_eq!(decoded.user.unwrap().id, 5);
        assert_eq!(decoded.chat_type.as_deref(), Some("private"));
    }
}
