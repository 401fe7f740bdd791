//! Clubs list, club detail and club settings.

use std::{cell::RefCell, rc::Rc};

use tracing::{debug, info};

use super::{Busy, Error, Outcome, Result, SaveMessages, report_failure, report_save, reported};
use crate::{
    context::Context,
    host::Haptic,
    model::{Club, ClubDetail, ClubId, JoinClub, JoinRequest, Role},
    mutation::{self, ClubDraft, Committed, Target},
    race::LatestOnly,
    transport::Attachment,
    view::Detail,
};

const PENDING_MESSAGE: &str =
    "⏳ Ваша заявка на розгляді. Очікуйте підтвердження від адміністратора клубу.";

/// Result of [`ClubsController::open()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenClub {
    Opened {
        /// Whether the user may edit the club and review its requests.
        can_manage: bool,
    },
    /// Membership is not approved yet, nothing was opened.
    Pending,
    /// Another club was opened or the detail was closed while this one loaded.
    Superseded,
}

/// Controller of the clubs list and the club detail screen.
pub struct ClubsController {
    context: Rc<Context>,
    clubs: RefCell<Vec<Club>>,
    reload_guard: LatestOnly,
    detail: RefCell<Detail<ClubDetail>>,
    busy: Busy,
}

impl ClubsController {
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            clubs: RefCell::default(),
            reload_guard: LatestOnly::new(),
            detail: RefCell::default(),
            busy: Busy::default(),
        }
    }

    /// Clubs of the current user.
    pub fn clubs(&self) -> Vec<Club> {
        self.clubs.borrow().clone()
    }

    /// Club detail panel.
    pub fn detail(&self) -> Detail<ClubDetail> {
        self.detail.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Role of the user in the open club.
    pub fn role(&self) -> Option<Role> {
        self.detail.borrow().data().map(|detail| detail.club.role())
    }

    /// Reload the clubs list. A reload overtaken by a newer one changes nothing.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn load(&self) -> Result<()> {
        let Some(result) = self.reload_guard.run(self.context.api.clubs().my()).await else {
            return Ok(());
        };
        let clubs = reported(&self.context, result)?;
        debug!(count = clubs.len(), "Clubs loaded");
        *self.clubs.borrow_mut() = clubs;
        Ok(())
    }

    /// Open the detail of `club_id`, always fetching it anew.
    ///
    /// Clubs awaiting approval are not opened.
    ///
    /// # Errors
    ///
    /// Fails if the detail can't be fetched. The panel then stays in the failed state.
    pub async fn open(&self, club_id: ClubId) -> Result<OpenClub> {
        let pending = self
            .clubs
            .borrow()
            .iter()
            .any(|club| club.id == club_id && club.role() == Role::Pending);
        if pending {
            self.context.say_with(Haptic::WARNING, PENDING_MESSAGE);
            return Ok(OpenClub::Pending);
        }

        self.context.host.haptic(Haptic::TAP);
        self.detail.borrow_mut().start(club_id);
        let result = self.context.api.clubs().detail(club_id).await;

        let can_manage = result
            .as_ref()
            .map(|detail| detail.club.role().can_manage())
            .unwrap_or_default();
        let error = result.as_ref().err().cloned();
        if !self.detail.borrow_mut().resolve(club_id, result) {
            debug!(club_id, "Club detail switched while loading, ignoring it");
            return Ok(OpenClub::Superseded);
        }

        match error {
            Some(err) => Err(err.into()),
            None => Ok(OpenClub::Opened { can_manage }),
        }
    }

    pub fn close(&self) {
        self.detail.borrow_mut().close();
    }

    /// Tell the user whether the invite code was copied by the platform.
    pub fn report_copy(&self, invite_code: &str, copied: bool) {
        if copied {
            self.context
                .say_with(Haptic::SUCCESS, &format!("📋 Код скопійовано: {invite_code}"));
        } else {
            self.context
                .say(&format!("Не вдалося скопіювати.\nКод: {invite_code}"));
        }
    }

    /// Ask to join a club with `invite_code`.
    ///
    /// # Errors
    ///
    /// Fails on empty code or if the request is refused.
    pub async fn join(&self, invite_code: &str, message: &str) -> Result<JoinRequest> {
        let invite_code = invite_code.trim().to_uppercase();
        if invite_code.is_empty() {
            let err = Error::Validation("Введіть код запрошення");
            report_failure(&self.context, &err);
            return Err(err);
        }
        let _busy = self.busy.start()?;

        self.context.host.haptic(Haptic::TAP);
        let message = message.trim();
        let request = JoinClub {
            invite_code,
            message: (!message.is_empty()).then(|| message.to_owned()),
        };
        let request = reported(&self.context, self.context.api.clubs().join(&request).await)?;

        info!(club_id = request.club_id, "Join request sent");
        self.context.say_with(
            Haptic::SUCCESS,
            "✅ Запит надіслано! Очікуйте схвалення від адміністратора",
        );
        self.load().await?;
        Ok(request)
    }

    /// Create or update a club with an optional avatar.
    ///
    /// The clubs list is reloaded whenever the record was saved, even if the avatar was not.
    ///
    /// # Errors
    ///
    /// Fails if nothing was saved.
    pub async fn save(
        &self,
        target: Target<ClubId>,
        draft: &ClubDraft,
        avatar: Option<Attachment>,
    ) -> Result<Committed<ClubId>> {
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::TAP);

        let result = mutation::submit(&self.context.api.clubs(), target, draft, avatar).await;
        let success = match target {
            Target::Create => "Клуб успішно створено!",
            Target::Update(_) => "Клуб успішно оновлено!",
        };
        report_save(
            &self.context,
            &result,
            &SaveMessages {
                success,
                partial: "Клуб збережено, але аватар не вдалося завантажити",
            },
        );
        let committed = result?;

        self.load().await?;
        if self.detail.borrow().id() == Some(committed.id) {
            self.refresh_detail(committed.id).await;
        }
        Ok(committed)
    }

    /// Delete a club after two confirmations. Owner only.
    ///
    /// # Errors
    ///
    /// Fails if the user is not the owner or the club can't be deleted.
    pub async fn delete(&self, club_id: ClubId) -> Result<Outcome> {
        let (role, name) = {
            let detail = self.detail.borrow();
            let club = detail.data().map(|detail| &detail.club);
            (
                club.map(Club::role),
                club.map(|club| club.name.clone()).unwrap_or_default(),
            )
        };
        if role != Some(Role::Owner) {
            report_failure(&self.context, &Error::NotAllowed);
            return Err(Error::NotAllowed);
        }

        let first = format!("Ви впевнені, що хочете видалити клуб \"{name}\"?\n\nЦя дія незворотня!");
        if !self.context.ask(&first).await
            || !self
                .context
                .ask("Останнє попередження! Видалити клуб назавжди?")
                .await
        {
            return Ok(Outcome::Cancelled);
        }

        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::Impact(crate::host::ImpactStyle::Heavy));
        reported(&self.context, self.context.api.clubs().delete(club_id).await)?;

        self.context.say_with(Haptic::SUCCESS, "Клуб видалено");
        self.close();
        self.load().await?;
        Ok(Outcome::Done)
    }

    /// Number of pending join requests of a club. Zero if unknown.
    pub async fn pending_requests(&self, club_id: ClubId) -> usize {
        self.context
            .api
            .clubs()
            .pending_count(club_id)
            .await
            .unwrap_or_default()
    }

    /// Re-fetch the open detail without changing the panel on failure.
    pub async fn refresh_detail(&self, club_id: ClubId) {
        self.detail.borrow_mut().start(club_id);
        let result = self.context.api.clubs().detail(club_id).await;
        self.detail.borrow_mut().resolve(club_id, result);
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
        test_utils::{FakeFetch, club_json, context, mock_host},
        transport::{Body, HttpResponse, Method},
    };

    fn controller(fetch: &Rc<FakeFetch>, host: crate::host::MockHost) -> ClubsController {
        ClubsController::new(Rc::new(context(fetch, host)))
    }

    #[test]
    async fn pending_club_is_not_opened() {
        let fetch = FakeFetch::new();
        fetch.on(
            Method::Get,
            "/api/clubs/my",
            200,
            &format!("[{}]", club_json(5, "Читаємо", "PENDING")),
        );
        let mut host = mock_host();
        host.expect_alert()
            .withf(|message| message == PENDING_MESSAGE)
            .times(1)
            .return_const(());
        host.expect_haptic()
            .withf(|haptic| *haptic == Haptic::WARNING)
            .times(1)
            .return_const(());
        let clubs = controller(&fetch, host);

        clubs.load().await.unwrap();
        assert_eq!(clubs.open(5).await.unwrap(), OpenClub::Pending);
        assert_eq!(fetch.requests().len(), 1);
        assert_eq!(clubs.detail(), Detail::Closed);
    }

    #[test]
    async fn open_decides_management_from_role() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/5", 200, &club_json(5, "Читаємо", "admin"));
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        let clubs = controller(&fetch, host);

        assert_eq!(
            clubs.open(5).await.unwrap(),
            OpenClub::Opened { can_manage: true }
        );
        assert_eq!(clubs.role(), Some(Role::Admin));
    }

    #[test]
    async fn open_overtaken_by_another_club_is_superseded() {
        let fetch = FakeFetch::new();
        let slow = fetch.on_later(Method::Get, "/api/clubs/5");
        fetch.on(Method::Get, "/api/clubs/6", 200, &club_json(6, "Друзі", "member"));
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        let clubs = controller(&fetch, host);

        let first = clubs.open(5);
        let second = async {
            let opened = clubs.open(6).await.unwrap();
            slow.send(HttpResponse {
                status: 200,
                body: club_json(5, "Читаємо", "owner"),
            })
            .unwrap();
            opened
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), OpenClub::Superseded);
        assert_eq!(second, OpenClub::Opened { can_manage: false });
        assert_eq!(clubs.detail().id(), Some(6));
        assert_eq!(clubs.role(), Some(Role::Member));
    }

    #[test]
    async fn failed_load_signals_error() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/my", 500, r#"{"detail": "db down"}"#);
        let mut host = mock_host();
        host.expect_alert()
            .withf(|message| message == "Помилка: db down")
            .times(1)
            .return_const(());
        host.expect_haptic()
            .withf(|haptic| *haptic == Haptic::ERROR)
            .times(1)
            .return_const(());
        let clubs = controller(&fetch, host);

        assert!(matches!(clubs.load().await, Err(Error::Api(_))));
        assert!(clubs.clubs().is_empty());
    }

    #[test]
    async fn failed_open_stays_on_failed_detail() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/5", 404, r#"{"detail": "Клуб не знайдено"}"#);
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert().times(1).return_const(());
        let clubs = controller(&fetch, host);

        let err = clubs.open(5).await.unwrap_err();
        assert_eq!(err.to_string(), "Клуб не знайдено");
        assert_eq!(clubs.detail(), Detail::Failed { id: 5 });
    }

    #[test]
    async fn join_normalizes_code_and_reloads() {
        let fetch = FakeFetch::new();
        fetch.on(
            Method::Post,
            "/api/clubs/join",
            201,
            r#"{"id": 1, "club_id": 5, "user_id": "1", "status": "pending", "created_at": "2024-01-01T00:00:00"}"#,
        );
        fetch.on(Method::Get, "/api/clubs/my", 200, "[]");
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert().times(1).return_const(());
        let clubs = controller(&fetch, host);

        clubs.join("  abcd1234 ", "").await.unwrap();

        let requests = fetch.requests();
        assert_eq!(
            requests[0].body,
            Body::Json(r#"{"invite_code":"ABCD1234"}"#.to_owned())
        );
        assert_eq!(requests[1].url.path(), "/api/clubs/my");
    }

    #[test]
    async fn empty_invite_code_is_rejected_locally() {
        let fetch = FakeFetch::new();
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert()
            .withf(|message| message == "Введіть код запрошення")
            .times(1)
            .return_const(());
        let clubs = controller(&fetch, host);

        assert!(matches!(
            clubs.join("   ", "").await,
            Err(Error::Validation(_))
        ));
        assert!(fetch.requests().is_empty());
    }

    #[test]
    async fn partial_save_warns_and_still_reloads() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Post, "/api/clubs", 201, &club_json(9, "Нові", "OWNER"));
        fetch.on(Method::Post, "/api/clubs/9/avatar", 413, r#"{"detail": "too big"}"#);
        fetch.on(
            Method::Get,
            "/api/clubs/my",
            200,
            &format!("[{}]", club_json(9, "Нові", "OWNER")),
        );
        let mut host = mock_host();
        host.expect_haptic()
            .withf(|haptic| *haptic == Haptic::TAP)
            .return_const(());
        host.expect_haptic()
            .withf(|haptic| *haptic == Haptic::WARNING)
            .times(1)
            .return_const(());
        host.expect_alert()
            .withf(|message| message == "Клуб збережено, але аватар не вдалося завантажити")
            .times(1)
            .return_const(());
        let clubs = controller(&fetch, host);

        let draft = ClubDraft {
            name: "Нові".to_owned(),
            ..ClubDraft::default()
        };
        let avatar = Attachment::image("a.png", "image/png", vec![1]).unwrap();
        let committed = clubs
            .save(Target::Create, &draft, Some(avatar))
            .await
            .unwrap();

        assert!(committed.is_partial());
        assert_eq!(clubs.clubs().len(), 1);
    }

    #[test]
    async fn delete_needs_both_confirmations() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/5", 200, &club_json(5, "Читаємо", "OWNER"));
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_confirm()
            .withf(|question| question.starts_with("Ви впевнені"))
            .times(1)
            .returning(|_| async { true }.boxed_local());
        host.expect_confirm()
            .withf(|question| question.starts_with("Останнє попередження"))
            .times(1)
            .returning(|_| async { false }.boxed_local());
        let clubs = controller(&fetch, host);

        clubs.open(5).await.unwrap();
        assert_eq!(clubs.delete(5).await.unwrap(), Outcome::Cancelled);
        assert_eq!(fetch.requests_to(Method::Delete, "/api/clubs/5").len(), 0);
    }

    #[test]
    async fn only_owner_deletes() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/5", 200, &club_json(5, "Читаємо", "ADMIN"));
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert().times(1).return_const(());
        let clubs = controller(&fetch, host);

        clubs.open(5).await.unwrap();
        assert_eq!(clubs.delete(5).await.unwrap_err(), Error::NotAllowed);
    }
}
