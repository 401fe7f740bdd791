//! Current user and service health endpoints.

use crate::{
    model::{Health, UserProfile, UserStats},
    transport::{RequestOptions, Result, Transport},
};

/// User endpoints.
pub struct User<'a> {
    transport: &'a Transport,
}

impl<'a> User<'a> {
    pub(super) const fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.transport
            .request_body("/api/user/profile", RequestOptions::get())
            .await
    }

    /// Stats of the current user in the chat identified by `chat_key`.
    pub async fn stats(&self, chat_key: &str) -> Result<UserStats> {
        self.transport
            .request(&format!("/api/user/stats/{chat_key}"), RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }

    /// Silent health probe.
    pub async fn health(&self) -> Result<Health> {
        self.transport
            .request_body("/api/health", RequestOptions::get().silent())
            .await
    }
}
