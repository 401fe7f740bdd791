//! Club members and their roles.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::debug;

use super::{Busy, Error, Outcome, Result, report_failure, reported};
use crate::{
    context::Context,
    host::Haptic,
    model::{ClubId, Member, Role},
};

/// What the current user may do with a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberActions {
    /// Role to switch the member to, if allowed.
    pub change_role_to: Option<Role>,
    pub can_remove: bool,
}

impl MemberActions {
    /// Permissions of someone with `actor_role` over `member`.
    ///
    /// Owners promote members to admins, demote admins and remove anyone but themselves.
    /// Admins only remove plain members.
    #[must_use]
    pub fn of(actor_role: Role, actor_id: Option<&str>, member: &Member) -> Self {
        if actor_id == Some(member.user_id.as_str()) || member.role == Role::Owner {
            return Self::default();
        }
        match actor_role {
            Role::Owner => Self {
                change_role_to: match member.role {
                    Role::Member => Some(Role::Admin),
                    Role::Admin => Some(Role::Member),
                    Role::Owner | Role::Pending => None,
                },
                can_remove: true,
            },
            Role::Admin => Self {
                change_role_to: None,
                can_remove: member.role == Role::Member,
            },
            Role::Member | Role::Pending => Self::default(),
        }
    }
}

/// Controller of the members screen.
///
/// Members are cached per club until any mutation of that club.
pub struct MembersController {
    context: Rc<Context>,
    cache: RefCell<HashMap<ClubId, Vec<Member>>>,
    busy: Busy,
}

impl MembersController {
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            cache: RefCell::default(),
            busy: Busy::default(),
        }
    }

    /// Members of `club_id`, from cache if present.
    ///
    /// # Errors
    ///
    /// Fails if the members can't be fetched.
    pub async fn members(&self, club_id: ClubId) -> Result<Vec<Member>> {
        if let Some(members) = self.cache.borrow().get(&club_id) {
            debug!(club_id, "Members served from cache");
            return Ok(members.clone());
        }

        let members = reported(&self.context, self.context.api.clubs().members(club_id).await)?;
        self.cache.borrow_mut().insert(club_id, members.clone());
        Ok(members)
    }

    /// Drop cached members of `club_id`.
    pub fn invalidate(&self, club_id: ClubId) {
        self.cache.borrow_mut().remove(&club_id);
    }

    /// Actions available to the current user with `actor_role` over `member`.
    pub fn actions(&self, actor_role: Role, member: &Member) -> MemberActions {
        MemberActions::of(actor_role, self.context.user_id().as_deref(), member)
    }

    /// Promote a member to admin or demote an admin, after confirmation.
    ///
    /// # Errors
    ///
    /// Fails if the change is not allowed or refused by the server.
    pub async fn change_role(&self, club_id: ClubId, actor_role: Role, member: &Member) -> Result<Outcome> {
        let Some(new_role) = self.actions(actor_role, member).change_role_to else {
            report_failure(&self.context, &Error::NotAllowed);
            return Err(Error::NotAllowed);
        };

        let role_text = if new_role == Role::Admin {
            "адміністратором"
        } else {
            "учасником"
        };
        if !self
            .context
            .ask(&format!("Призначити цього користувача {role_text}?"))
            .await
        {
            return Ok(Outcome::Cancelled);
        }

        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::TAP);
        let result = self
            .context
            .api
            .clubs()
            .change_role(club_id, &member.user_id, new_role)
            .await;
        self.invalidate(club_id);
        reported(&self.context, result)?;

        self.context.say_with(Haptic::SUCCESS, "Роль успішно змінено");
        Ok(Outcome::Done)
    }

    /// Remove a member from the club, after confirmation.
    ///
    /// # Errors
    ///
    /// Fails if the removal is not allowed or refused by the server.
    pub async fn remove(&self, club_id: ClubId, actor_role: Role, member: &Member) -> Result<Outcome> {
        if !self.actions(actor_role, member).can_remove {
            report_failure(&self.context, &Error::NotAllowed);
            return Err(Error::NotAllowed);
        }

        let question = format!("Видалити {} з клубу?", member.display_name());
        if !self.context.ask(&question).await {
            return Ok(Outcome::Cancelled);
        }

        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::TAP);
        let result = self
            .context
            .api
            .clubs()
            .remove_member(club_id, &member.user_id)
            .await;
        self.invalidate(club_id);
        reported(&self.context, result)?;

        self.context.say_with(Haptic::SUCCESS, "Учасника видалено");
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]
    #![allow(clippy::indexing_slicing)]

    use futures::FutureExt as _;
    use tokio::test;

    use super::*;
    use crate::{
        test_utils::{FakeFetch, context, mock_host},
        transport::{Body, Method},
    };

    fn member(user_id: &str, role: &str) -> Member {
        serde_json::from_str(&format!(
            r#"{{"id": 1, "user_id": "{user_id}", "user_name": "Олена", "role": "{role}",
                "joined_at": "2024-01-01T00:00:00"}}"#
        ))
        .unwrap()
    }

    const MEMBERS_JSON: &str = r#"[{"id": 1, "user_id": "7", "role": "MEMBER", "joined_at": "2024-01-01T00:00:00"}]"#;

    #[test]
    async fn permissions() {
        let owner = Role::Owner;
        assert_eq!(
            MemberActions::of(owner, Some("1"), &member("7", "MEMBER")),
            MemberActions {
                change_role_to: Some(Role::Admin),
                can_remove: true
            }
        );
        assert_eq!(
            MemberActions::of(owner, Some("1"), &member("7", "ADMIN")).change_role_to,
            Some(Role::Member)
        );
        assert_eq!(
            MemberActions::of(owner, Some("1"), &member("1", "OWNER")),
            MemberActions::default()
        );

        assert_eq!(
            MemberActions::of(Role::Admin, Some("2"), &member("7", "MEMBER")),
            MemberActions {
                change_role_to: None,
                can_remove: true
            }
        );
        assert!(!MemberActions::of(Role::Admin, Some("2"), &member("8", "ADMIN")).can_remove);
        assert_eq!(
            MemberActions::of(Role::Member, Some("2"), &member("7", "MEMBER")),
            MemberActions::default()
        );
    }

    #[test]
    async fn members_are_cached_until_mutation() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/3/members", 200, MEMBERS_JSON);
        fetch.on(Method::Patch, "/api/clubs/3/members/7/role", 200, "{}");
        fetch.on(Method::Get, "/api/clubs/3/members", 200, MEMBERS_JSON);
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_confirm()
            .withf(|question| question == "Призначити цього користувача адміністратором?")
            .times(1)
            .returning(|_| async { true }.boxed_local());
        host.expect_alert()
            .withf(|message| message == "Роль успішно змінено")
            .times(1)
            .return_const(());
        let members = MembersController::new(Rc::new(context(&fetch, host)));

        let list = members.members(3).await.unwrap();
        members.members(3).await.unwrap();
        assert_eq!(fetch.requests_to(Method::Get, "/api/clubs/3/members").len(), 1);

        let outcome = members
            .change_role(3, Role::Owner, &list[0])
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(
            fetch.requests_to(Method::Patch, "/api/clubs/3/members/7/role")[0].body,
            Body::Json(r#"{"role":"ADMIN"}"#.to_owned())
        );

        members.members(3).await.unwrap();
        assert_eq!(fetch.requests_to(Method::Get, "/api/clubs/3/members").len(), 2);
    }

    #[test]
    async fn declined_removal_sends_nothing() {
        let fetch = FakeFetch::new();
        let mut host = mock_host();
        host.expect_confirm()
            .withf(|question| question == "Видалити Олена з клубу?")
            .times(1)
            .returning(|_| async { false }.boxed_local());
        let members = MembersController::new(Rc::new(context(&fetch, host)));

        let outcome = members
            .remove(3, Role::Owner, &member("7", "MEMBER"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(fetch.requests().is_empty());
    }
}
