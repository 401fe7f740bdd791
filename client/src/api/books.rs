//! Books endpoints.

use std::cmp::Reverse;

use crate::{
    model::{
        Book, BookDetail, BookId, BookPatch, BorrowBook, ClubId, CoverFromUrl, CoverUploaded,
        MetadataSearch, NewBook, Review, ReviewDraft,
    },
    transport::{Method, RequestOptions, Result, Transport, Upload},
};

/// Order of the book list.
///
/// Sent as `sort_by` and also applied locally, since the backend may ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    Title,
    Rating,
    Popularity,
}

impl SortKey {
    /// All keys in menu order.
    pub const ALL: [Self; 4] = [Self::Newest, Self::Title, Self::Rating, Self::Popularity];

    /// `sort_by` value.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Title => "title",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Нові",
            Self::Title => "За назвою",
            Self::Rating => "За рейтингом",
            Self::Popularity => "Популярні",
        }
    }

    /// Parse a `sort_by` value.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_query() == value)
    }

    /// Sort `books` in place. Stable, so equal books keep server order.
    pub fn apply(self, books: &mut [Book]) {
        match self {
            Self::Newest => books.sort_by_key(|book| Reverse(book.created_at)),
            Self::Title => books.sort_by_cached_key(|book| book.title.to_lowercase()),
            Self::Rating => books.sort_by(|a, b| {
                b.average_rating
                    .unwrap_or_default()
                    .total_cmp(&a.average_rating.unwrap_or_default())
            }),
            Self::Popularity => books.sort_by_key(|book| Reverse(book.readers_count.unwrap_or_default())),
        }
    }
}

/// Filter of the book list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub sort: SortKey,
    pub search: String,
}

/// Books endpoints.
pub struct Books<'a> {
    transport: &'a Transport,
}

impl<'a> Books<'a> {
    pub(super) const fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Books of a club, filtered and sorted.
    pub async fn list(&self, club_id: ClubId, query: &BookQuery) -> Result<Vec<Book>> {
        let search = query.search.trim();
        let mut pairs = vec![("sort_by", query.sort.as_query())];
        if !search.is_empty() {
            pairs.push(("search", search));
        }
        let endpoint = super::with_query(&format!("/api/books/club/{club_id}"), pairs);

        let mut books: Vec<Book> = self
            .transport
            .request(&endpoint, RequestOptions::get())
            .await?
            .unwrap_or_default();
        query.sort.apply(&mut books);
        Ok(books)
    }

    /// Book with loans and reviews.
    pub async fn detail(&self, book_id: BookId) -> Result<BookDetail> {
        self.transport
            .request_body(&format!("/api/books/book/{book_id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, book: &NewBook) -> Result<Book> {
        self.transport
            .request_body("/api/books", RequestOptions::json(Method::Post, book)?)
            .await
    }

    pub async fn update(&self, book_id: BookId, patch: &BookPatch) -> Result<Book> {
        self.transport
            .request_body(
                &format!("/api/books/{book_id}"),
                RequestOptions::json(Method::Patch, patch)?,
            )
            .await
    }

    pub async fn delete(&self, book_id: BookId) -> Result<()> {
        self.transport
            .execute(&format!("/api/books/{book_id}"), RequestOptions::delete())
            .await
    }

    pub async fn borrow(&self, book_id: BookId, club_id: ClubId) -> Result<()> {
        self.transport
            .execute(
                &format!("/api/books/{book_id}/borrow"),
                RequestOptions::json(Method::Post, &BorrowBook { club_id })?,
            )
            .await
    }

    pub async fn return_book(&self, book_id: BookId) -> Result<()> {
        self.transport
            .execute(&format!("/api/books/{book_id}/return"), RequestOptions::post())
            .await
    }

    /// Upload a cover image. Never alerts.
    pub async fn upload_cover(&self, book_id: BookId, upload: Upload) -> Result<CoverUploaded> {
        self.transport
            .upload(&format!("/api/books/{book_id}/cover"), upload)
            .await
            .map(Option::unwrap_or_default)
    }

    /// Ask the backend to download the cover from an external url.
    pub async fn cover_from_url(&self, book_id: BookId, url: &str) -> Result<CoverUploaded> {
        let body = CoverFromUrl {
            url: url.to_owned(),
        };
        self.transport
            .request(
                &format!("/api/books/{book_id}/cover/google"),
                RequestOptions::json(Method::Post, &body)?,
            )
            .await
            .map(Option::unwrap_or_default)
    }

    /// Create or replace the review of the current user.
    pub async fn save_review(&self, book_id: BookId, review: &ReviewDraft) -> Result<Review> {
        self.transport
            .request_body(
                &format!("/api/books/{book_id}/review"),
                RequestOptions::json(Method::Post, review)?,
            )
            .await
    }

    /// Review of the current user. Silent: a failure usually means there is none yet.
    pub async fn my_review(&self, book_id: BookId) -> Result<Option<Review>> {
        self.transport
            .request(
                &format!("/api/books/{book_id}/review"),
                RequestOptions::get().silent(),
            )
            .await
    }

    pub async fn delete_review(&self, book_id: BookId) -> Result<()> {
        self.transport
            .execute(&format!("/api/books/{book_id}/review"), RequestOptions::delete())
            .await
    }

    pub async fn reviews(&self, book_id: BookId) -> Result<Vec<Review>> {
        self.transport
            .request(&format!("/api/books/{book_id}/reviews"), RequestOptions::get())
            .await
            .map(Option::unwrap_or_default)
    }

    /// External metadata for a title. `None` when nothing was found.
    pub async fn search_metadata(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<MetadataSearch>> {
        let mut pairs = vec![("title", title)];
        if let Some(author) = author.filter(|author| !author.is_empty()) {
            pairs.push(("author", author));
        }
        let endpoint = super::with_query("/api/books/google/search", pairs);
        self.transport.request(&endpoint, RequestOptions::get()).await
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]

    use tokio::test;

    use super::*;
    use crate::test_utils::{FakeFetch, book_json, context, mock_host};

    #[test]
    async fn list_sends_filters_and_sorts_locally() {
        let fetch = FakeFetch::new();
        fetch.on(
            Method::Get,
            "/api/books/club/3",
            200,
            &format!(
                "[{}, {}]",
                book_json(1, "Кобзар", "AVAILABLE"),
                book_json(2, "Енеїда", "READING")
            ),
        );
        let context = context(&fetch, mock_host());

        let query = BookQuery {
            sort: SortKey::Title,
            search: " Шевченко ".to_owned(),
        };
        let books = context.api.books().list(3, &query).await.unwrap();

        let titles: Vec<_> = books.iter().map(|book| book.title.as_str()).collect();
        assert_eq!(titles, ["Енеїда", "Кобзар"]);

        let request = fetch.requests().pop().unwrap();
        let pairs: Vec<_> = request.url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("sort_by".to_owned(), "title".to_owned()),
                ("search".to_owned(), "Шевченко".to_owned())
            ]
        );
    }

    #[test]
    async fn metadata_search_may_be_null() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/google/search", 200, "null");
        let context = context(&fetch, mock_host());

        let search = context
            .api
            .books()
            .search_metadata("Кобзар", Some(""))
            .await
            .unwrap();
        assert_eq!(search, None);
        let request = fetch.requests().pop().unwrap();
        assert_eq!(request.url.query(), Some("title=%D0%9A%D0%BE%D0%B1%D0%B7%D0%B0%D1%80"));
    }

    #[test]
    async fn borrow_sends_club() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Post, "/api/books/5/borrow", 200, &book_json(5, "A", "READING"));
        let context = context(&fetch, mock_host());

        context.api.books().borrow(5, 9).await.unwrap();
        let request = fetch.requests().pop().unwrap();
        assert_eq!(
            request.body,
            crate::transport::Body::Json(r#"{"club_id":9}"#.to_owned())
        );
    }
}
