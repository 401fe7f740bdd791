//! Clubs, memberships and join requests.

use serde::{Deserialize, Serialize};

use crate::{Timestamp, UserId};

/// Club identifier.
pub type ClubId = u64;

/// Join request identifier.
pub type RequestId = u64;

crate::case_insensitive_enum! {
    /// Role of a user in a club.
    pub enum Role {
        Owner => "OWNER",
        Admin => "ADMIN",
        Member => "MEMBER",
        /// Join request is not reviewed yet.
        Pending => "PENDING",
    }
}

impl Role {
    /// Whether the role allows managing members and requests.
    #[must_use]
    pub const fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

crate::case_insensitive_enum! {
    /// Status of a join request.
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

crate::case_insensitive_enum! {
    /// Decision on a join request.
    pub enum ReviewAction {
        Approve => "approve",
        Reject => "reject",
    }
}

/// Club as listed for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    pub owner_id: UserId,
    pub invite_code: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default = "default_requires_approval")]
    pub requires_approval: bool,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub members_count: Option<u32>,
    #[serde(default)]
    pub books_count: Option<u32>,
    /// Role of the caller in this club.
    #[serde(default)]
    pub user_role: Option<Role>,
}

/// Clubs require approval unless said otherwise.
const fn default_requires_approval() -> bool {
    true
}

impl Club {
    /// Role of the caller, falling back to [`Role::Member`] for older backends which do not
    /// report it.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user_role.unwrap_or(Role::Member)
    }

    /// Non-empty avatar url, if any.
    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.cover_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Club with its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// Club member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub role: Role,
    pub joined_at: Timestamp,
    #[serde(default)]
    pub books_created: u32,
    #[serde(default)]
    pub books_borrowed: u32,
    #[serde(default)]
    pub reviews_count: u32,
}

impl Member {
    /// Name to show in the members list.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Користувач")
    }
}

/// Request of a user to join a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: RequestId,
    pub club_id: ClubId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: Timestamp,
    #[serde(default)]
    pub reviewed_at: Option<Timestamp>,
    #[serde(default)]
    pub reviewed_by: Option<UserId>,
}

impl JoinRequest {
    /// Upper-cased first letter of the user name or `?`.
    #[must_use]
    pub fn initials(&self) -> String {
        self.user_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect())
    }
}

/// Body to create a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClub {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_public: bool,
    pub requires_approval: bool,
}

/// Partial update of a club.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
}

/// Body of a join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinClub {
    pub invite_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a join request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequestAction {
    pub action: ReviewAction,
}

/// Body of a member role change. Only [`Role::Admin`] and [`Role::Member`] are accepted by the
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRoleChange {
    pub role: Role,
}
