//! Join requests of a club.

use std::{cell::RefCell, rc::Rc};

use super::{Busy, MembersController, Result, reported};
use crate::{
    context::Context,
    host::Haptic,
    model::{Club, ClubId, JoinRequest, RequestId, RequestStatus, ReviewAction},
    race::LatestOnly,
};

/// Controller of the join requests screen.
pub struct RequestsController {
    context: Rc<Context>,
    members: Rc<MembersController>,
    club: RefCell<Option<Club>>,
    requests: RefCell<Vec<JoinRequest>>,
    reload_guard: LatestOnly,
    busy: Busy,
}

impl RequestsController {
    pub fn new(context: Rc<Context>, members: Rc<MembersController>) -> Self {
        Self {
            context,
            members,
            club: RefCell::default(),
            requests: RefCell::default(),
            reload_guard: LatestOnly::new(),
            busy: Busy::default(),
        }
    }

    /// Pending requests.
    pub fn requests(&self) -> Vec<JoinRequest> {
        self.requests.borrow().clone()
    }

    /// Invite code to share. Hidden for public clubs, which need no code.
    pub fn invite_code(&self) -> Option<String> {
        self.club
            .borrow()
            .as_ref()
            .filter(|club| !club.is_public)
            .map(|club| club.invite_code.clone())
    }

    /// Load the club and its pending requests.
    ///
    /// # Errors
    ///
    /// Fails if either can't be fetched.
    pub async fn open(&self, club_id: ClubId) -> Result<()> {
        let clubs = self.context.api.clubs();
        let load = async {
            futures::join!(
                clubs.detail(club_id),
                clubs.requests(club_id, RequestStatus::Pending)
            )
        };
        let Some((club, requests)) = self.reload_guard.run(load).await else {
            return Ok(());
        };

        *self.club.borrow_mut() = club.ok().map(|detail| detail.club);
        let requests = reported(&self.context, requests)?;
        *self.requests.borrow_mut() = requests;
        Ok(())
    }

    /// Re-fetch pending requests only.
    ///
    /// # Errors
    ///
    /// Fails if requests can't be fetched.
    pub async fn reload(&self, club_id: ClubId) -> Result<()> {
        let clubs = self.context.api.clubs();
        let load = clubs.requests(club_id, RequestStatus::Pending);
        let Some(requests) = self.reload_guard.run(load).await else {
            return Ok(());
        };
        *self.requests.borrow_mut() = reported(&self.context, requests)?;
        Ok(())
    }

    /// Approve or reject a request and re-fetch the list.
    ///
    /// # Errors
    ///
    /// Fails if the review is refused or the list can't be re-fetched.
    pub async fn review(&self, club_id: ClubId, request_id: RequestId, action: ReviewAction) -> Result<()> {
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::TAP);

        let result = self
            .context
            .api
            .clubs()
            .review_request(club_id, request_id, action)
            .await;
        reported(&self.context, result)?;

        if action == ReviewAction::Approve {
            self.members.invalidate(club_id);
        }
        let action_text = match action {
            ReviewAction::Approve => "схвалено",
            ReviewAction::Reject => "відхилено",
        };
        self.context
            .say_with(Haptic::SUCCESS, &format!("✅ Заявку {action_text}!"));

        self.reload(club_id).await
    }
}
