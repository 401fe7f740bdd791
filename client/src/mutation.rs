//! Two-phase mutation: save the record, then upload its attachment.
//!
//! The record step decides success or failure of the whole submit. A failed attachment upload
//! after a committed record is a partial success and is never rolled back.

use std::{fmt, future::Future};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    api::{Books, Clubs},
    model::{BookId, BookPatch, ClubId, ClubPatch, NewBook, NewClub},
    transport::{self, Attachment, Upload},
};

/// Idempotency token generated once per submit and shared by all its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientRequestId(Uuid);

impl ClientRequestId {
    /// Generate a fresh random token.
    #[must_use]
    #[expect(clippy::new_without_default, reason = "every call must produce a different token")]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a submit creates a new record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<Id> {
    Create,
    Update(Id),
}

/// Failed submit. Nothing was saved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, displaydoc::Display)]
pub enum MutationError {
    /// {0}
    Validation(&'static str),
    /// {0}
    Record(#[from] transport::Error),
}

/// What happened to the attachment of a committed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOutcome {
    /// No attachment was staged.
    None,
    Uploaded,
    /// The record is saved but the attachment is not.
    Failed(transport::Error),
}

/// Saved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<Id> {
    pub id: Id,
    pub attachment: AttachmentOutcome,
}

impl<Id> Committed<Id> {
    /// Whether the attachment upload failed.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self.attachment, AttachmentOutcome::Failed(_))
    }
}

/// Resource saved with [`submit()`].
pub trait TwoPhase {
    /// Record identifier.
    type Id: Copy + fmt::Debug;
    /// Text fields of the record.
    type Draft;
    /// Binary or external attachment uploaded after the record.
    type Attachment;

    /// Check the draft before any network call.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message describing the problem.
    fn validate(draft: &Self::Draft) -> Result<(), &'static str>;

    /// Create a record.
    fn create_record(
        &self,
        draft: &Self::Draft,
        token: ClientRequestId,
    ) -> impl Future<Output = transport::Result<Self::Id>>;

    /// Update an existing record.
    fn update_record(
        &self,
        id: Self::Id,
        draft: &Self::Draft,
    ) -> impl Future<Output = transport::Result<Self::Id>>;

    /// Upload the attachment of a saved record.
    fn upload_attachment(
        &self,
        id: Self::Id,
        attachment: Self::Attachment,
        token: ClientRequestId,
    ) -> impl Future<Output = transport::Result<()>>;
}

/// Save `draft` and then upload `attachment`, if any.
///
/// # Errors
///
/// Fails on invalid draft or if the record can't be saved, in which case nothing is uploaded.
pub async fn submit<R: TwoPhase>(
    resource: &R,
    target: Target<R::Id>,
    draft: &R::Draft,
    attachment: Option<R::Attachment>,
) -> Result<Committed<R::Id>, MutationError> {
    R::validate(draft).map_err(MutationError::Validation)?;

    let token = ClientRequestId::new();
    debug!(%token, ?target, "Submitting record");

    let id = match target {
        Target::Create => resource.create_record(draft, token).await?,
        Target::Update(id) => resource.update_record(id, draft).await?,
    };

    let attachment = match attachment {
        None => AttachmentOutcome::None,
        Some(attachment) => match resource.upload_attachment(id, attachment, token).await {
            Ok(()) => AttachmentOutcome::Uploaded,
            Err(err) => {
                warn!(%token, ?id, %err, "Record saved but attachment upload failed");
                AttachmentOutcome::Failed(err)
            }
        },
    };

    info!(%token, ?id, "Record committed");
    Ok(Committed { id, attachment })
}

/// Text fields of the book form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub club_id: ClubId,
    pub title: String,
    pub author: String,
    pub description: String,
}

/// Cover of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookCover {
    /// File chosen by the user.
    File(Attachment),
    /// Image suggested by the metadata search, downloaded by the backend.
    External(String),
}

/// Trim `value`, mapping blank to `None`.
fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

impl TwoPhase for Books<'_> {
    type Id = BookId;
    type Draft = BookDraft;
    type Attachment = BookCover;

    fn validate(draft: &BookDraft) -> Result<(), &'static str> {
        if draft.title.trim().is_empty() {
            return Err("❗ Вкажіть назву книги");
        }
        Ok(())
    }

    async fn create_record(&self, draft: &BookDraft, token: ClientRequestId) -> transport::Result<BookId> {
        let book = NewBook {
            title: draft.title.trim().to_owned(),
            author: non_blank(&draft.author),
            description: non_blank(&draft.description),
            cover_url: None,
            club_id: draft.club_id,
            client_request_id: Some(token.to_string()),
        };
        self.create(&book).await.map(|book| book.id)
    }

    async fn update_record(&self, id: BookId, draft: &BookDraft) -> transport::Result<BookId> {
        let patch = BookPatch {
            title: Some(draft.title.trim().to_owned()),
            author: Some(draft.author.trim().to_owned()),
            description: Some(draft.description.trim().to_owned()),
            cover_url: None,
        };
        self.update(id, &patch).await.map(|book| book.id)
    }

    async fn upload_attachment(
        &self,
        id: BookId,
        cover: BookCover,
        token: ClientRequestId,
    ) -> transport::Result<()> {
        match cover {
            BookCover::File(attachment) => {
                let upload = Upload {
                    attachment,
                    client_request_id: Some(token.to_string()),
                };
                self.upload_cover(id, upload).await.map(drop)
            }
            BookCover::External(url) => self.cover_from_url(id, &url).await.map(drop),
        }
    }
}

/// Fields of the club form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubDraft {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub requires_approval: bool,
}

impl Default for ClubDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            is_public: false,
            requires_approval: true,
        }
    }
}

impl TwoPhase for Clubs<'_> {
    type Id = ClubId;
    type Draft = ClubDraft;
    type Attachment = Attachment;

    fn validate(draft: &ClubDraft) -> Result<(), &'static str> {
        if draft.name.trim().is_empty() {
            return Err("Будь ласка, введіть назву клубу");
        }
        Ok(())
    }

    async fn create_record(&self, draft: &ClubDraft, _token: ClientRequestId) -> transport::Result<ClubId> {
        let club = NewClub {
            name: draft.name.trim().to_owned(),
            description: non_blank(&draft.description),
            is_public: draft.is_public,
            requires_approval: draft.requires_approval,
        };
        self.create(&club).await.map(|detail| detail.club.id)
    }

    async fn update_record(&self, id: ClubId, draft: &ClubDraft) -> transport::Result<ClubId> {
        let patch = ClubPatch {
            name: Some(draft.name.trim().to_owned()),
            description: Some(draft.description.trim().to_owned()),
            is_public: Some(draft.is_public),
            requires_approval: Some(draft.requires_approval),
        };
        self.update(id, &patch).await.map(|club| club.id)
    }

    async fn upload_attachment(
        &self,
        id: ClubId,
        attachment: Attachment,
        token: ClientRequestId,
    ) -> transport::Result<()> {
        let upload = Upload {
            attachment,
            client_request_id: Some(token.to_string()),
        };
        self.upload_avatar(id, upload).await.map(drop)
    }
}
