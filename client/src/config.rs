//! Runtime configuration of the app.

use std::time::Duration;

use url::Url;

/// Backend used when the app is opened from a local development server.
const LOCAL_API_BASE_URL: &str = "http://localhost:8000";
/// Production backend.
const PRODUCTION_API_BASE_URL: &str = "https://bookclub.uca.co.ua";
/// Deep link to the bot shown on the standalone landing page.
const BOT_LINK: &str = "https://t.me/uca_bookclub_bot";
/// Hostnames treated as a local development environment.
const LOCAL_HOSTNAMES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Error while building [`Config`].
#[derive(Debug, Clone, thiserror::Error, displaydoc::Display)]
pub enum Error {
    /// Invalid API base url `{url}`: {reason}
    InvalidBaseUrl {
        /// Rejected value.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// App configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Origin of the REST API, endpoints are appended to it.
    pub api_base_url: Url,
    /// Development mode: the app runs without a Telegram session using a fixed identity.
    pub development: bool,
    /// Quiet period of the free-text search.
    pub search_debounce: Duration,
    /// Page size of the activity feed.
    pub activity_page_size: u32,
    /// Link back to the bot.
    pub bot_link: Url,
}

impl Config {
    /// Build configuration from the page location.
    ///
    /// `query` is the raw query string with or without the leading `?`. A compile-time
    /// `BOOKCLUB_API_BASE_URL` overrides the detected base url.
    ///
    /// # Errors
    ///
    /// Fails if the base url is not a valid url.
    pub fn detect(hostname: &str, query: &str) -> Result<Self, Error> {
        Self::detect_with_override(hostname, query, option_env!("BOOKCLUB_API_BASE_URL"))
    }

    /// [`detect()`](Self::detect) with an explicit base url override.
    ///
    /// # Errors
    ///
    /// Fails if the base url is not a valid url.
    pub fn detect_with_override(
        hostname: &str,
        query: &str,
        base_url_override: Option<&str>,
    ) -> Result<Self, Error> {
        let local = LOCAL_HOSTNAMES.contains(&hostname);

        let base_url = base_url_override.unwrap_or(if local {
            LOCAL_API_BASE_URL
        } else {
            PRODUCTION_API_BASE_URL
        });

        Ok(Self {
            api_base_url: parse_url(base_url)?,
            development: local || dev_flag(query),
            ..Self::production()
        })
    }

    /// Production configuration.
    #[must_use]
    #[expect(clippy::expect_used, reason = "constants are valid urls")]
    pub fn production() -> Self {
        Self {
            api_base_url: Url::parse(PRODUCTION_API_BASE_URL).expect("valid constant url"),
            development: false,
            search_debounce: Duration::from_millis(300),
            activity_page_size: 50,
            bot_link: Url::parse(BOT_LINK).expect("valid constant url"),
        }
    }

    /// Full url of an API endpoint like `/api/clubs/my`.
    ///
    /// # Errors
    ///
    /// Fails if the result is not a valid url.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, url::ParseError> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{endpoint}"))
    }
}

/// Parse `url` into [`Url`] mapping the error.
fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|err| Error::InvalidBaseUrl {
        url: url.to_owned(),
        reason: err.to_string(),
    })
}

/// Whether the query string carries `dev=1` or `dev=true`.
fn dev_flag(query: &str) -> bool {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .any(|(key, value)| key == "dev" && (value == "1" || value.eq_ignore_ascii_case("true")))
}
