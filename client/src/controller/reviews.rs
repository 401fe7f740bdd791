//! Review of a book by the current user.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::debug;

use super::{BooksController, Busy, Error, Outcome, Result, reported};
use crate::{
    context::Context,
    host::{Haptic, ImpactStyle},
    model::{BookId, Rating, ReviewDraft},
};

/// Controller of the review form.
pub struct ReviewsController {
    context: Rc<Context>,
    books: Rc<BooksController>,
    book_id: Cell<Option<BookId>>,
    rating: Cell<Option<Rating>>,
    comment: RefCell<String>,
    /// Whether the user already reviewed the book.
    exists: Cell<bool>,
    busy: Busy,
}

impl ReviewsController {
    pub fn new(context: Rc<Context>, books: Rc<BooksController>) -> Self {
        Self {
            context,
            books,
            book_id: Cell::new(None),
            rating: Cell::new(None),
            comment: RefCell::default(),
            exists: Cell::new(false),
            busy: Busy::default(),
        }
    }

    pub fn book_id(&self) -> Option<BookId> {
        self.book_id.get()
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating.get()
    }

    pub fn comment(&self) -> String {
        self.comment.borrow().clone()
    }

    /// Whether there's a saved review to edit or delete.
    pub fn exists(&self) -> bool {
        self.exists.get()
    }

    /// Open the form for `book_id`, prefilled with the saved review if there is one.
    ///
    /// Any failure to get the review means there is none yet.
    pub async fn open(&self, book_id: BookId) {
        self.book_id.set(Some(book_id));
        self.fill(None, String::new(), false);

        match self.context.api.books().my_review(book_id).await {
            Ok(Some(review)) if self.book_id.get() == Some(book_id) => {
                self.fill(
                    Some(review.rating),
                    review.comment.unwrap_or_default(),
                    true,
                );
            }
            Ok(_) => {}
            Err(err) => debug!(book_id, %err, "No review yet"),
        }
    }

    pub fn set_rating(&self, rating: Rating) {
        self.rating.set(Some(rating));
    }

    pub fn set_comment(&self, comment: String) {
        *self.comment.borrow_mut() = comment;
    }

    /// Save the review and close the form.
    ///
    /// # Errors
    ///
    /// Fails if no rating is chosen or the server refuses.
    pub async fn save(&self) -> Result<()> {
        let Some(book_id) = self.book_id.get() else {
            return Err(Error::NotAllowed);
        };
        let Some(rating) = self.rating.get() else {
            let err = Error::Validation("Оберіть рейтинг від 1 до 5 зірок");
            super::report_failure(&self.context, &err);
            return Err(err);
        };
        let _busy = self.busy.start()?;

        let comment = self.comment.borrow().trim().to_owned();
        let draft = ReviewDraft {
            rating,
            comment: (!comment.is_empty()).then_some(comment),
        };
        self.context.host.haptic(Haptic::Impact(ImpactStyle::Medium));
        reported(
            &self.context,
            self.context.api.books().save_review(book_id, &draft).await,
        )?;
        self.context.say_with(Haptic::SUCCESS, "✅ Відгук збережено!");

        self.close();
        self.books.refresh_detail().await
    }

    /// Delete the saved review after confirmation and close the form.
    ///
    /// # Errors
    ///
    /// Fails if the server refuses.
    pub async fn delete(&self) -> Result<Outcome> {
        let Some(book_id) = self.book_id.get() else {
            return Err(Error::NotAllowed);
        };
        if !self.context.ask("Видалити відгук?").await {
            return Ok(Outcome::Cancelled);
        }
        let _busy = self.busy.start()?;

        self.context.host.haptic(Haptic::Impact(ImpactStyle::Heavy));
        reported(
            &self.context,
            self.context.api.books().delete_review(book_id).await,
        )?;
        self.context.say_with(Haptic::SUCCESS, "✅ Відгук видалено");

        self.close();
        self.books.refresh_detail().await?;
        Ok(Outcome::Done)
    }

    /// Close the form, forgetting the book.
    pub fn close(&self) {
        self.book_id.set(None);
        self.fill(None, String::new(), false);
    }

    fn fill(&self, rating: Option<Rating>, comment: String, exists: bool) {
        self.rating.set(rating);
        *self.comment.borrow_mut() = comment;
        self.exists.set(exists);
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
        transport::Method,
    };

    const REVIEW_JSON: &str = r#"{
        "id": 1, "book_id": 5, "user_id": "1", "rating": 4,
        "comment": "Гарна", "created_at": "2024-01-01T00:00:00"
    }"#;

    fn reviews(fetch: &Rc<FakeFetch>, host: crate::host::MockHost) -> ReviewsController {
        let context = Rc::new(context(fetch, host));
        let books = Rc::new(BooksController::new(Rc::clone(&context)));
        ReviewsController::new(context, books)
    }

    #[test]
    async fn missing_review_opens_empty_form_silently() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/5/review", 404, r#"{"detail": "Review not found"}"#);
        // No alert expected: asking for one panics.
        let reviews = reviews(&fetch, mock_host());

        reviews.open(5).await;
        assert_eq!(reviews.book_id(), Some(5));
        assert_eq!(reviews.rating(), None);
        assert!(!reviews.exists());
    }

    #[test]
    async fn existing_review_prefills_form() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/5/review", 200, REVIEW_JSON);
        let reviews = reviews(&fetch, mock_host());

        reviews.open(5).await;
        assert_eq!(reviews.rating(), Some(Rating::new(4).unwrap()));
        assert_eq!(reviews.comment(), "Гарна");
        assert!(reviews.exists());
    }

    #[test]
    async fn rating_is_required() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/5/review", 200, "null");
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert()
            .withf(|message| message == "Оберіть рейтинг від 1 до 5 зірок")
            .times(1)
            .return_const(());
        let reviews = reviews(&fetch, host);

        reviews.open(5).await;
        reviews.set_comment("Без оцінки".to_owned());
        assert!(matches!(reviews.save().await, Err(Error::Validation(_))));
        assert_eq!(fetch.requests_to(Method::Post, "/api/books/5/review").len(), 0);
    }

    #[test]
    async fn save_sends_trimmed_comment_and_closes() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/5/review", 200, "null");
        fetch.on(Method::Post, "/api/books/5/review", 200, REVIEW_JSON);
        let mut host = mock_host();
        host.expect_haptic().return_const(());
        host.expect_alert()
            .withf(|message| message == "✅ Відгук збережено!")
            .times(1)
            .return_const(());
        let reviews = reviews(&fetch, host);

        reviews.open(5).await;
        reviews.set_rating(Rating::new(5).unwrap());
        reviews.set_comment("   ".to_owned());
        reviews.save().await.unwrap();

        let sent = fetch.requests_to(Method::Post, "/api/books/5/review");
        assert_eq!(
            sent[0].body,
            crate::transport::Body::Json(r#"{"rating":5,"comment":null}"#.to_owned())
        );
        assert_eq!(reviews.book_id(), None);
    }
}
