//! User-related structures.

use serde::{Deserialize, Serialize};

/// Telegram user identifier as the backend stores it (stringified number).
pub type UserId = String;

/// Profile of the current user, derived by the backend from the verified init data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl UserProfile {
    /// Full name, without trailing whitespace when the last name is empty.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Upper-cased first letter of the first name.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// Reading statistics of the user in a chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub books_added: u32,
    #[serde(default)]
    pub books_read: u32,
    #[serde(default)]
    pub currently_reading: u32,
}

/// Response of the health check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// `ok` or `degraded`.
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub bot_token_configured: bool,
}

impl Health {
    /// Whether the backend reports itself fully operational.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
