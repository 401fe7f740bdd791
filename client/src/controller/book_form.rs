//! Create and edit form of a book.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::{debug, info};

use super::{BooksController, Busy, Error, Outcome, Result, SaveMessages, report_save, reported};
use crate::{
    context::Context,
    host::{Haptic, ImpactStyle},
    model::{BookId, ClubId},
    mutation::{self, BookCover, BookDraft, Committed, Target},
    provenance::{self, Overwrite, Tracked},
    race::LatestOnly,
    transport::{Attachment, AttachmentError},
    view::BookFormMode,
};

/// Placeholder the backend stores for books without an author.
const UNKNOWN_AUTHOR: &str = "Невідомий автор";

/// Shortest title worth a metadata search.
const MIN_LOOKUP_TITLE_CHARS: usize = 3;

const COVER_PROMPT: &str = "Знайдено іншу обкладинку. Замінити вашу?";
const DESCRIPTION_PROMPT: &str = "Знайдено опис книги. Замінити ваш?";

/// Cover shown in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cover {
    #[default]
    Empty,
    /// Already saved on the server.
    Existing(String),
    /// Picked or pasted by the user, uploaded on save.
    Staged(Attachment),
    /// Suggested by the metadata search, downloaded by the backend on save.
    External(String),
}

impl Cover {
    /// Url to preview, if the cover lives at one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Existing(url) | Self::External(url) => Some(url),
            Self::Empty | Self::Staged(_) => None,
        }
    }

    fn into_upload(self) -> Option<BookCover> {
        match self {
            Self::Staged(attachment) => Some(BookCover::File(attachment)),
            Self::External(url) => Some(BookCover::External(url)),
            Self::Empty | Self::Existing(_) => None,
        }
    }
}

/// How the user provided a cover file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    Picked,
    /// Pasted from the clipboard.
    Pasted,
}

/// What a metadata lookup did to the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lookup {
    /// `None` if nothing was suggested for the field.
    pub cover: Option<Overwrite>,
    pub description: Option<Overwrite>,
}

/// Controller of the book form.
pub struct BookFormController {
    context: Rc<Context>,
    books: Rc<BooksController>,
    mode: Cell<Option<BookFormMode>>,
    club_id: Cell<Option<ClubId>>,
    title: RefCell<String>,
    author: RefCell<String>,
    description: RefCell<Tracked<String>>,
    cover: RefCell<Tracked<Cover>>,
    lookup_guard: LatestOnly,
    busy: Busy,
}

impl BookFormController {
    pub fn new(context: Rc<Context>, books: Rc<BooksController>) -> Self {
        Self {
            context,
            books,
            mode: Cell::new(None),
            club_id: Cell::new(None),
            title: RefCell::default(),
            author: RefCell::default(),
            description: RefCell::default(),
            cover: RefCell::default(),
            lookup_guard: LatestOnly::new(),
            busy: Busy::default(),
        }
    }

    pub fn mode(&self) -> Option<BookFormMode> {
        self.mode.get()
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn author(&self) -> String {
        self.author.borrow().clone()
    }

    pub fn description(&self) -> Tracked<String> {
        self.description.borrow().clone()
    }

    pub fn cover(&self) -> Tracked<Cover> {
        self.cover.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Open an empty form adding a book to `club_id`.
    pub fn open_create(&self, club_id: ClubId) {
        self.context.host.haptic(Haptic::TAP);
        self.reset();
        self.mode.set(Some(BookFormMode::Create { club_id }));
        self.club_id.set(Some(club_id));
    }

    /// Open the form filled with the saved book.
    ///
    /// # Errors
    ///
    /// Fails if the book can't be fetched. The form stays open and empty.
    pub async fn open_edit(&self, book_id: BookId) -> Result<()> {
        self.context.host.haptic(Haptic::TAP);
        self.reset();
        self.mode.set(Some(BookFormMode::Edit { book_id }));

        let detail = reported(&self.context, self.context.api.books().detail(book_id).await)?;
        if self.mode.get() != Some(BookFormMode::Edit { book_id }) {
            debug!(book_id, "Form switched while loading, ignoring book");
            return Ok(());
        }
        let book = detail.book;

        *self.title.borrow_mut() = book.title.clone();
        *self.author.borrow_mut() = if book.author == UNKNOWN_AUTHOR {
            String::new()
        } else {
            book.author.clone()
        };
        *self.description.borrow_mut() = Tracked::new(book.description.clone().unwrap_or_default());
        *self.cover.borrow_mut() = Tracked::new(
            book.cover()
                .map_or(Cover::Empty, |url| Cover::Existing(url.to_owned())),
        );
        self.club_id.set(book.club_id.or_else(|| self.books.club_id()));
        Ok(())
    }

    pub fn set_title(&self, title: String) {
        *self.title.borrow_mut() = title;
    }

    pub fn set_author(&self, author: String) {
        *self.author.borrow_mut() = author;
    }

    pub fn set_description(&self, description: String) {
        self.description.borrow_mut().edit(description);
    }

    /// Stage a cover file. Rejected files are reported and never staged.
    ///
    /// Returns whether the file was staged.
    pub fn stage_cover(
        &self,
        file: std::result::Result<Attachment, AttachmentError>,
        source: CoverSource,
    ) -> bool {
        match file {
            Ok(attachment) => {
                self.cover.borrow_mut().edit(Cover::Staged(attachment));
                if source == CoverSource::Pasted {
                    self.context.say("📋 Зображення вставлено з буферу обміну");
                }
                true
            }
            Err(err) => {
                self.context.say_with(Haptic::WARNING, &err.to_string());
                false
            }
        }
    }

    /// Search external metadata by the current title and offer the best match.
    ///
    /// Cover and description are offered independently. Fields the user filled in change only
    /// with their consent. Titles shorter than three characters are not searched. A result arriving
    /// after the form was closed, reopened or searched again is dropped.
    ///
    /// # Errors
    ///
    /// Fails if the search request fails.
    pub async fn lookup(&self) -> Result<Lookup> {
        let title = self.title.borrow().trim().to_owned();
        if title.chars().count() < MIN_LOOKUP_TITLE_CHARS {
            return Ok(Lookup::default());
        }
        let author = self.author.borrow().trim().to_owned();
        let mode = self.mode.get();

        let books = self.context.api.books();
        let search = books.search_metadata(&title, Some(author.as_str()));
        let Some(search) = self.lookup_guard.run(search).await else {
            return Ok(Lookup::default());
        };
        if self.mode.get() != mode {
            debug!(%title, "Form changed while searching, ignoring suggestion");
            return Ok(Lookup::default());
        }
        let search = reported(&self.context, search)?;
        let Some(candidate) = search.as_ref().and_then(|search| search.suggestion()) else {
            debug!(%title, "Nothing found for the title");
            return Ok(Lookup::default());
        };

        let host = self.context.host.as_ref();
        let mut lookup = Lookup::default();
        if let Some(url) = candidate.cover_url() {
            lookup.cover =
                Some(provenance::offer(&self.cover, Cover::External(url), host, COVER_PROMPT).await);
        }
        if let Some(description) = candidate.description() {
            lookup.description = Some(
                provenance::offer(
                    &self.description,
                    description.to_owned(),
                    host,
                    DESCRIPTION_PROMPT,
                )
                .await,
            );
        }
        Ok(lookup)
    }

    /// Save the book and then its new cover, if any. Reloads the book list of the club.
    ///
    /// # Errors
    ///
    /// Fails if the form is closed, invalid, or the book itself can't be saved.
    /// A failed cover upload still counts as a save.
    pub async fn save(&self) -> Result<Committed<BookId>> {
        let Some(mode) = self.mode.get() else {
            return Err(Error::NotAllowed);
        };
        let _busy = self.busy.start()?;
        self.context.host.haptic(Haptic::Impact(ImpactStyle::Medium));

        let club_id = self.club_id.get();
        let draft = BookDraft {
            club_id: club_id.unwrap_or_default(),
            title: self.title(),
            author: self.author(),
            description: self.description.borrow().value().clone(),
        };
        let (target, success) = match mode {
            BookFormMode::Create { .. } => (Target::Create, "✅ Книгу додано"),
            BookFormMode::Edit { book_id } => (Target::Update(book_id), "✅ Зміни збережено"),
        };
        let cover = self.cover.borrow().value().clone().into_upload();

        let result = mutation::submit(&self.context.api.books(), target, &draft, cover).await;
        report_save(
            &self.context,
            &result,
            &SaveMessages {
                success,
                partial: "Книгу збережено, але обкладинку не вдалося завантажити",
            },
        );
        let committed = result?;
        info!(book_id = committed.id, "Book saved");

        self.books.reload_club(club_id).await?;
        self.reset();
        Ok(committed)
    }

    /// Delete the edited book after confirmation.
    ///
    /// # Errors
    ///
    /// Fails if not editing or the server refuses.
    pub async fn delete(&self) -> Result<Outcome> {
        let Some(BookFormMode::Edit { book_id }) = self.mode.get() else {
            return Err(Error::NotAllowed);
        };
        let outcome = self.books.delete(book_id).await?;
        if outcome == Outcome::Done {
            self.reset();
        }
        Ok(outcome)
    }

    /// Close the form dropping unsaved input.
    pub fn close(&self) {
        self.reset();
    }

    fn reset(&self) {
        self.lookup_guard.invalidate();
        self.mode.set(None);
        self.club_id.set(None);
        self.title.borrow_mut().clear();
        self.author.borrow_mut().clear();
        *self.description.borrow_mut() = Tracked::default();
        *self.cover.borrow_mut() = Tracked::default();
    }
}
