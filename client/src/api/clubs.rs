//! Clubs endpoints.

use crate::{
    model::{
        ActivityPage, Club, ClubDetail, ClubId, ClubPatch, CoverUploaded, EventType, JoinClub,
        JoinRequest, JoinRequestAction, Member, MemberRoleChange, NewClub, RequestId,
        RequestStatus, ReviewAction, Role,
    },
    transport::{Method, RequestOptions, Result, Transport, Upload},
};

/// Page of the activity feed to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityQuery {
    /// `None` means all event types.
    pub event_type: Option<EventType>,
    pub limit: u32,
    pub offset: u32,
}

/// Clubs endpoints.
pub struct Clubs<'a> {
    transport: &'a Transport,
}

impl<'a> Clubs<'a> {
    pub(super) const fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Create a club. The creator becomes its owner.
    pub async fn create(&self, club: &NewClub) -> Result<ClubDetail> {
        self.transport
            .request_body("/api/clubs", RequestOptions::json(Method::Post, club)?)
            .await
    }

    /// Clubs the current user belongs to or asked to join.
    pub async fn my(&self) -> Result<Vec<Club>> {
        self.transport
            .request("/api/clubs/my", RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn detail(&self, club_id: ClubId) -> Result<ClubDetail> {
        self.transport
            .request_body(&format!("/api/clubs/{club_id}"), RequestOptions::get())
            .await
    }

    pub async fn update(&self, club_id: ClubId, patch: &ClubPatch) -> Result<Club> {
        self.transport
            .request_body(
                &format!("/api/clubs/{club_id}"),
                RequestOptions::json(Method::Patch, patch)?,
            )
            .await
    }

    pub async fn delete(&self, club_id: ClubId) -> Result<()> {
        self.transport
            .execute(&format!("/api/clubs/{club_id}"), RequestOptions::delete())
            .await
    }

    /// Upload a club avatar. Never alerts.
    pub async fn upload_avatar(&self, club_id: ClubId, upload: Upload) -> Result<CoverUploaded> {
        self.transport
            .upload(&format!("/api/clubs/{club_id}/avatar"), upload)
            .await
            .map(Option::unwrap_or_default)
    }

    /// Ask to join a club by its invite code.
    pub async fn join(&self, request: &JoinClub) -> Result<JoinRequest> {
        self.transport
            .request_body("/api/clubs/join", RequestOptions::json(Method::Post, request)?)
            .await
    }

    pub async fn requests(&self, club_id: ClubId, status: RequestStatus) -> Result<Vec<JoinRequest>> {
        let endpoint = super::with_query(
            &format!("/api/clubs/{club_id}/requests"),
            [("status", status.as_wire())],
        );
        self.transport
            .request(&endpoint, RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }

    /// Number of pending join requests. Silent, since it only feeds a badge.
    pub async fn pending_count(&self, club_id: ClubId) -> Result<usize> {
        let endpoint = super::with_query(
            &format!("/api/clubs/{club_id}/requests"),
            [("status", RequestStatus::Pending.as_wire())],
        );
        self.transport
            .request::<Vec<JoinRequest>>(&endpoint, RequestOptions::get().silent())
            .await
            .map(|requests| requests.map_or(0, |requests| requests.len()))
    }

    /// Approve or reject a join request.
    pub async fn review_request(
        &self,
        club_id: ClubId,
        request_id: RequestId,
        action: ReviewAction,
    ) -> Result<()> {
        self.transport
            .execute(
                &format!("/api/clubs/{club_id}/requests/{request_id}"),
                RequestOptions::json(Method::Post, &JoinRequestAction { action })?,
            )
            .await
    }

    pub async fn members(&self, club_id: ClubId) -> Result<Vec<Member>> {
        self.transport
            .request(&format!("/api/clubs/{club_id}/members"), RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn remove_member(&self, club_id: ClubId, user_id: &str) -> Result<()> {
        self.transport
            .execute(
                &format!("/api/clubs/{club_id}/members/{user_id}"),
                RequestOptions::delete(),
            )
            .await
    }

    pub async fn change_role(&self, club_id: ClubId, user_id: &str, role: Role) -> Result<()> {
        self.transport
            .execute(
                &format!("/api/clubs/{club_id}/members/{user_id}/role"),
                RequestOptions::json(Method::Patch, &MemberRoleChange { role })?,
            )
            .await
    }

    pub async fn activity(&self, club_id: ClubId, query: ActivityQuery) -> Result<ActivityPage> {
        let limit = query.limit.to_string();
        let offset = query.offset.to_string();
        let mut pairs = Vec::with_capacity(3);
        if let Some(event_type) = query.event_type {
            pairs.push(("event_type", event_type.as_wire()));
        }
        pairs.push(("limit", limit.as_str()));
        pairs.push(("offset", offset.as_str()));

        let endpoint = super::with_query(&format!("/api/clubs/{club_id}/activity"), pairs);
        self.transport
            .request(&endpoint, RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }
}
