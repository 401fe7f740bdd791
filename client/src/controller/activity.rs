//! Activity feed of a club.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::debug;

use super::{Result, reported};
use crate::{
    api::ActivityQuery,
    context::Context,
    model::{ActivityEvent, ClubId, EventType},
    race::LatestOnly,
};

/// Controller of the activity feed.
pub struct ActivityController {
    context: Rc<Context>,
    club_id: Cell<Option<ClubId>>,
    filter: Cell<Option<EventType>>,
    events: RefCell<Vec<ActivityEvent>>,
    offset: Cell<u32>,
    has_more: Cell<bool>,
    loading: Cell<bool>,
    page_guard: LatestOnly,
}

impl ActivityController {
    pub fn new(context: Rc<Context>) -> Self {
        Self {
            context,
            club_id: Cell::new(None),
            filter: Cell::new(None),
            events: RefCell::default(),
            offset: Cell::new(0),
            has_more: Cell::new(false),
            loading: Cell::new(false),
            page_guard: LatestOnly::new(),
        }
    }

    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.borrow().clone()
    }

    /// Event type shown, `None` for all.
    pub fn filter(&self) -> Option<EventType> {
        self.filter.get()
    }

    pub fn has_more(&self) -> bool {
        self.has_more.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Show the feed of `club_id` from the start, with all event types.
    ///
    /// # Errors
    ///
    /// Fails if the page can't be fetched.
    pub async fn open(&self, club_id: ClubId) -> Result<()> {
        self.club_id.set(Some(club_id));
        self.filter.set(None);
        self.load_page(true).await
    }

    /// Show only `filter` events, starting from the first page.
    ///
    /// A page still loading for the previous filter is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the page can't be fetched.
    pub async fn set_filter(&self, filter: Option<EventType>) -> Result<()> {
        self.filter.set(filter);
        self.load_page(true).await
    }

    /// Append the next page. Ignored while a page is loading or when there are no more events.
    ///
    /// # Errors
    ///
    /// Fails if the page can't be fetched.
    pub async fn load_more(&self) -> Result<()> {
        if self.loading.get() || !self.has_more.get() {
            debug!("Load more ignored");
            return Ok(());
        }
        self.load_page(false).await
    }

    async fn load_page(&self, from_start: bool) -> Result<()> {
        let Some(club_id) = self.club_id.get() else {
            return Ok(());
        };
        if from_start {
            self.offset.set(0);
            self.has_more.set(false);
            self.events.borrow_mut().clear();
        }
        let query = ActivityQuery {
            event_type: self.filter.get(),
            limit: self.context.config.activity_page_size,
            offset: self.offset.get(),
        };

        self.loading.set(true);
        let clubs = self.context.api.clubs();
        let Some(result) = self.page_guard.run(clubs.activity(club_id, query)).await else {
            return Ok(());
        };
        self.loading.set(false);
        let page = reported(&self.context, result)?;

        let received = u32::try_from(page.events.len()).unwrap_or(u32::MAX);
        debug!(club_id, offset = query.offset, received, "Activity page loaded");
        self.offset.set(query.offset.saturating_add(received));
        self.has_more.set(page.has_more);
        self.events.borrow_mut().extend(page.events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]
    #![allow(clippy::indexing_slicing)]

    use tokio::test;

    use super::*;
    use crate::{
        test_utils::{FakeFetch, context, mock_host},
        transport::{HttpResponse, Method},
    };

    const PATH: &str = "/api/clubs/1/activity";

    fn event_json(book_id: u64) -> String {
        format!(
            r#"{{"event_type": "ADD_BOOK", "actor": {{"display_name": "Оля"}},
                "book": {{"book_id": {book_id}, "title": "Книга"}},
                "event_time": "2024-01-01T00:00:00"}}"#
        )
    }

    fn page_json(ids: &[u64], has_more: bool) -> String {
        let events: Vec<_> = ids.iter().map(|id| event_json(*id)).collect();
        format!(r#"{{"events": [{}], "has_more": {has_more}}}"#, events.join(","))
    }

    fn query_of(fetch: &FakeFetch, index: usize) -> Vec<(String, String)> {
        fetch.requests_to(Method::Get, PATH)[index]
            .url
            .query_pairs()
            .into_owned()
            .collect()
    }

    #[test]
    async fn load_more_continues_from_offset() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, PATH, 200, &page_json(&[1, 2], true));
        fetch.on(Method::Get, PATH, 200, &page_json(&[3], false));
        let activity = ActivityController::new(Rc::new(context(&fetch, mock_host())));

        activity.open(1).await.unwrap();
        activity.load_more().await.unwrap();
        // No more pages, nothing is requested.
        activity.load_more().await.unwrap();

        assert_eq!(activity.events().len(), 3);
        assert!(!activity.has_more());
        assert!(query_of(&fetch, 1).contains(&("offset".to_owned(), "2".to_owned())));
        assert!(query_of(&fetch, 1).contains(&("limit".to_owned(), "50".to_owned())));
    }

    #[test]
    async fn filter_change_resets_offset() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, PATH, 200, &page_json(&[1, 2], true));
        fetch.on(Method::Get, PATH, 200, &page_json(&[7], false));
        let activity = ActivityController::new(Rc::new(context(&fetch, mock_host())));

        activity.open(1).await.unwrap();
        activity.set_filter(Some(EventType::ReviewBook)).await.unwrap();

        let query = query_of(&fetch, 1);
        assert!(query.contains(&("offset".to_owned(), "0".to_owned())));
        assert!(query.contains(&("event_type".to_owned(), "REVIEW_BOOK".to_owned())));
        assert_eq!(activity.events().len(), 1);
    }

    #[test]
    async fn load_more_is_ignored_while_loading() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, PATH, 200, &page_json(&[1], true));
        let next = fetch.on_later(Method::Get, PATH);
        let activity = ActivityController::new(Rc::new(context(&fetch, mock_host())));
        activity.open(1).await.unwrap();

        let first = activity.load_more();
        let second = async {
            tokio::task::yield_now().await;
            assert!(activity.is_loading());
            activity.load_more().await.unwrap();
            next.send(HttpResponse {
                status: 200,
                body: page_json(&[2], false),
            })
            .unwrap();
        };
        let (first, ()) = tokio::join!(first, second);
        first.unwrap();

        assert_eq!(fetch.requests_to(Method::Get, PATH).len(), 2);
        assert_eq!(activity.events().len(), 2);
        assert!(!activity.is_loading());
    }
}
