//! Book list of a club and the book detail.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::{debug, warn};

use super::{Busy, Outcome, Result, reported};
use crate::{
    api::{BookQuery, SortKey},
    context::Context,
    debounce::Debouncer,
    host::{Haptic, ImpactStyle},
    model::{Book, BookDetail, BookId, ClubId},
    race::LatestOnly,
    view::Detail,
};

/// What the current user may do with a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookActions {
    pub can_borrow: bool,
    pub can_return: bool,
    /// Edit and delete.
    pub can_edit: bool,
}

impl BookActions {
    /// Owners edit their books, others borrow available ones, readers return them.
    #[must_use]
    pub fn of(book: &Book, user_id: Option<&str>) -> Self {
        let Some(user_id) = user_id else {
            return Self::default();
        };
        let owner = book.is_owned_by(user_id);
        Self {
            can_borrow: book.is_available() && !owner,
            can_return: book.is_read_by(user_id),
            can_edit: owner,
        }
    }
}

/// Controller of the book list and detail.
pub struct BooksController {
    context: Rc<Context>,
    club_id: Cell<Option<ClubId>>,
    query: RefCell<BookQuery>,
    books: RefCell<Vec<Book>>,
    reload_guard: LatestOnly,
    search: Debouncer,
    detail: RefCell<Detail<BookDetail>>,
    busy: Busy,
}

impl BooksController {
    pub fn new(context: Rc<Context>) -> Self {
        let search = Debouncer::new(context.config.search_debounce, Rc::clone(&context.timer));
        Self {
            context,
            club_id: Cell::new(None),
            query: RefCell::default(),
            books: RefCell::default(),
            reload_guard: LatestOnly::new(),
            search,
            detail: RefCell::default(),
            busy: Busy::default(),
        }
    }

    pub fn books(&self) -> Vec<Book> {
        self.books.borrow().clone()
    }

    pub fn query(&self) -> BookQuery {
        self.query.borrow().clone()
    }

    pub fn club_id(&self) -> Option<ClubId> {
        self.club_id.get()
    }

    pub fn detail(&self) -> Detail<BookDetail> {
        self.detail.borrow().clone()
    }

    /// Actions of the current user over `book`.
    pub fn actions(&self, book: &Book) -> BookActions {
        BookActions::of(book, self.context.user_id().as_deref())
    }

    /// Show books of `club_id` with default filters.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn open_club(&self, club_id: ClubId) -> Result<()> {
        if self.club_id.replace(Some(club_id)) != Some(club_id) {
            *self.query.borrow_mut() = BookQuery::default();
            self.books.borrow_mut().clear();
        }
        self.reload().await
    }

    /// Reload the list with the current filters.
    ///
    /// Only the most recently started reload updates the list, whatever order responses come in.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn reload(&self) -> Result<()> {
        let Some(club_id) = self.club_id.get() else {
            warn!("Books reload requested without an open club");
            return Ok(());
        };
        let query = self.query();

        let books = self.context.api.books();
        let Some(result) = self.reload_guard.run(books.list(club_id, &query)).await else {
            return Ok(());
        };
        let list = reported(&self.context, result)?;
        debug!(club_id, count = list.len(), "Books loaded");
        *self.books.borrow_mut() = list;
        Ok(())
    }

    /// Change the sort order and reload.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn set_sort(&self, sort: SortKey) -> Result<()> {
        self.query.borrow_mut().sort = sort;
        self.reload().await
    }

    /// Register a keystroke in the search box. Reloads once typing pauses.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn search(&self, text: &str) -> Result<()> {
        text.clone_into(&mut self.query.borrow_mut().search);
        if self.search.settle().await {
            self.reload().await
        } else {
            Ok(())
        }
    }

    /// Borrow an available book.
    ///
    /// # Errors
    ///
    /// Fails if the server refuses.
    pub async fn borrow(&self, book_id: BookId) -> Result<()> {
        let Some(club_id) = self.club_id.get() else {
            return Ok(());
        };
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::Impact(ImpactStyle::Medium));

        reported(&self.context, self.context.api.books().borrow(book_id, club_id).await)?;
        self.context
            .say_with(Haptic::SUCCESS, "✅ Книгу успішно позичено!");
        self.after_change(book_id).await
    }

    /// Return a book the user is reading.
    ///
    /// # Errors
    ///
    /// Fails if the server refuses.
    pub async fn return_book(&self, book_id: BookId) -> Result<()> {
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::Impact(ImpactStyle::Medium));

        reported(&self.context, self.context.api.books().return_book(book_id).await)?;
        self.context.say_with(Haptic::SUCCESS, "✅ Книгу повернено!");
        self.after_change(book_id).await
    }

    /// Delete a book after confirmation.
    ///
    /// # Errors
    ///
    /// Fails if the server refuses.
    pub async fn delete(&self, book_id: BookId) -> Result<Outcome> {
        if !self.context.ask("Видалити цю книгу?").await {
            return Ok(Outcome::Cancelled);
        }
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::Impact(ImpactStyle::Heavy));

        reported(&self.context, self.context.api.books().delete(book_id).await)?;
        self.context.say_with(Haptic::SUCCESS, "✅ Книгу видалено");
        if self.detail.borrow().id() == Some(book_id) {
            self.close_detail();
        }
        self.reload().await?;
        Ok(Outcome::Done)
    }

    /// Open the detail of a book, always fetching it anew.
    ///
    /// Reviews are fetched separately. Failing to get them keeps the detail with what it had.
    ///
    /// # Errors
    ///
    /// Fails if the book can't be fetched. The panel then stays in the failed state.
    pub async fn open_detail(&self, book_id: BookId) -> Result<()> {
        self.detail.borrow_mut().start(book_id);

        let books = self.context.api.books();
        let (detail, reviews) = futures::join!(books.detail(book_id), books.reviews(book_id));

        let detail = detail.map(|mut detail| {
            match reviews {
                Ok(reviews) => detail.reviews = reviews,
                Err(err) => warn!(book_id, %err, "Failed to load reviews"),
            }
            detail
        });
        let error = detail.as_ref().err().cloned();
        if !self.detail.borrow_mut().resolve(book_id, detail) {
            debug!(book_id, "Book detail switched while loading, ignoring it");
            return Ok(());
        }

        match error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn close_detail(&self) {
        self.detail.borrow_mut().close();
    }

    /// Re-fetch the open detail, if any.
    ///
    /// # Errors
    ///
    /// Fails if the book can't be fetched.
    pub async fn refresh_detail(&self) -> Result<()> {
        let open = self.detail.borrow().id();
        match open {
            Some(book_id) => self.open_detail(book_id).await,
            None => Ok(()),
        }
    }

    /// Reload the list of `club_id`, switching to it if another club is shown.
    ///
    /// `None` reloads the current club.
    ///
    /// # Errors
    ///
    /// Fails if the list can't be fetched.
    pub async fn reload_club(&self, club_id: Option<ClubId>) -> Result<()> {
        match club_id {
            Some(club_id) => self.open_club(club_id).await,
            None => self.reload().await,
        }
    }

    async fn after_change(&self, book_id: BookId) -> Result<()> {
        self.reload().await?;
        if self.detail.borrow().id() == Some(book_id) {
            self.open_detail(book_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]
    #![allow(clippy::indexing_slicing)]

    use std::time::Duration;

    use futures::FutureExt as _;
    use tokio::test;

    use super::*;
    use crate::{
        test_utils::{FakeFetch, book_json, context, mock_host},
        transport::{HttpResponse, Method},
    };

    fn list_json(books: &[(u64, &str)]) -> String {
        let books: Vec<_> = books
            .iter()
            .map(|(id, title)| book_json(*id, title, "AVAILABLE"))
            .collect();
        format!("[{}]", books.join(","))
    }

    fn titles(controller: &BooksController) -> Vec<String> {
        controller.books().into_iter().map(|book| book.title).collect()
    }

    #[test]
    async fn stale_reload_is_discarded() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/club/1", 200, &list_json(&[(1, "Перша")]));
        let slow = fetch.on_later(Method::Get, "/api/books/club/1");
        let fast = fetch.on_later(Method::Get, "/api/books/club/1");
        let books = BooksController::new(Rc::new(context(&fetch, mock_host())));
        books.open_club(1).await.unwrap();

        let first = books.set_sort(SortKey::Title);
        let second = books.set_sort(SortKey::Rating);
        let respond = async {
            fast.send(HttpResponse {
                status: 200,
                body: list_json(&[(3, "Свіжа")]),
            })
            .unwrap();
            tokio::task::yield_now().await;
            slow.send(HttpResponse {
                status: 200,
                body: list_json(&[(2, "Застаріла")]),
            })
            .unwrap();
        };
        let (first, second, ()) = tokio::join!(first, second, respond);
        first.unwrap();
        second.unwrap();

        assert_eq!(titles(&books), ["Свіжа"]);
    }

    #[test(start_paused = true)]
    async fn typing_burst_reloads_once() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/club/1", 200, "[]");
        fetch.on(Method::Get, "/api/books/club/1", 200, &list_json(&[(4, "Кобзар")]));
        let books = BooksController::new(Rc::new(context(&fetch, mock_host())));
        books.open_club(1).await.unwrap();

        let books = &books;
        let keystroke = move |delay_ms: u64, text: &'static str| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            books.search(text).await.unwrap();
        };
        tokio::join!(
            keystroke(0, "К"),
            keystroke(100, "Ко"),
            keystroke(200, "Коб")
        );

        let searches = fetch.requests_to(Method::Get, "/api/books/club/1");
        assert_eq!(searches.len(), 2);
        assert!(
            searches[1]
                .url
                .query_pairs()
                .any(|(key, value)| key == "search" && value == "Коб")
        );
        assert_eq!(titles(books), ["Кобзар"]);
    }

    #[test]
    async fn borrow_reloads_list() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/club/1", 200, &list_json(&[(5, "Кобзар")]));
        fetch.on(Method::Post, "/api/books/5/borrow", 200, &book_json(5, "Кобзар", "READING"));
        fetch.on(Method::Get, "/api/books/club/1", 200, "[]");
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert()
            .withf(|message| message == "✅ Книгу успішно позичено!")
            .times(1)
            .return_const(());
        let books = BooksController::new(Rc::new(context(&fetch, host)));
        books.open_club(1).await.unwrap();

        books.borrow(5).await.unwrap();
        assert!(books.books().is_empty());
    }

    #[test]
    async fn declined_delete_sends_nothing() {
        let fetch = FakeFetch::new();
        let mut host = mock_host();
        host.expect_confirm()
            .times(1)
            .returning(|_| async { false }.boxed_local());
        let books = BooksController::new(Rc::new(context(&fetch, host)));

        assert_eq!(books.delete(5).await.unwrap(), Outcome::Cancelled);
        assert!(fetch.requests().is_empty());
    }

    #[test]
    async fn reviews_failure_keeps_detail() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/book/5", 200, &book_json(5, "Кобзар", "AVAILABLE"));
        fetch.on(Method::Get, "/api/books/5/reviews", 500, "");
        let mut host = mock_host();
        host.expect_alert().times(1).return_const(());
        let books = BooksController::new(Rc::new(context(&fetch, host)));

        books.open_detail(5).await.unwrap();
        let detail = books.detail();
        assert_eq!(detail.data().unwrap().book.title, "Кобзар");
        assert!(detail.data().unwrap().reviews.is_empty());
    }

    #[test]
    async fn late_detail_of_previous_book_is_ignored() {
        let fetch = FakeFetch::new();
        let slow = fetch.on_later(Method::Get, "/api/books/book/1");
        fetch.on(Method::Get, "/api/books/1/reviews", 200, "[]");
        fetch.on(Method::Get, "/api/books/book/2", 200, &book_json(2, "Друга", "AVAILABLE"));
        fetch.on(Method::Get, "/api/books/2/reviews", 200, "[]");
        let books = BooksController::new(Rc::new(context(&fetch, mock_host())));

        let first = books.open_detail(1);
        let second = async {
            books.open_detail(2).await.unwrap();
            slow.send(HttpResponse {
                status: 200,
                body: book_json(1, "Перша", "AVAILABLE"),
            })
            .unwrap();
        };
        let (first, ()) = tokio::join!(first, second);

        first.unwrap();
        let detail = books.detail();
        assert_eq!(detail.id(), Some(2));
        assert_eq!(detail.data().unwrap().book.title, "Друга");
    }

    #[test]
    async fn reload_club_switches_to_owning_club() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/club/1", 200, &list_json(&[(1, "Перша")]));
        fetch.on(Method::Get, "/api/books/club/3", 200, &list_json(&[(9, "Кобзар")]));
        let books = BooksController::new(Rc::new(context(&fetch, mock_host())));
        books.open_club(1).await.unwrap();

        books.reload_club(Some(3)).await.unwrap();

        assert_eq!(books.club_id(), Some(3));
        assert_eq!(titles(&books), ["Кобзар"]);
    }

    #[test]
    async fn actions_depend_on_ownership() {
        let book: Book = serde_json::from_str(&book_json(1, "A", "AVAILABLE")).unwrap();
        assert_eq!(
            BookActions::of(&book, Some("1")),
            BookActions {
                can_borrow: false,
                can_return: false,
                can_edit: true
            }
        );
        assert!(BookActions::of(&book, Some("2")).can_borrow);
        assert_eq!(BookActions::of(&book, None), BookActions::default());
    }
}
