//! The in-memory registry of travel documents.
//!
//! Documents keep the order they were added in. Nothing is removed
//! automatically: an expired document stays in the registry and only its
//! classification changes.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    domain::{
        document::UnknownKindError, Classification, Document, DocumentDraft, DocumentKind,
        ExpiryStatus,
    },
    error::{Error, RecordKind},
};

/// Restricts a search to one document kind, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    /// Every kind matches.
    #[default]
    All,
    /// Only this kind matches.
    Only(DocumentKind),
}

impl KindFilter {
    /// Whether `kind` passes the filter.
    #[must_use]
    pub fn matches(self, kind: DocumentKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == kind,
        }
    }
}

impl From<DocumentKind> for KindFilter {
    fn from(kind: DocumentKind) -> Self {
        Self::Only(kind)
    }
}

impl FromStr for KindFilter {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => f.write_str(kind.as_str()),
        }
    }
}

/// A document that is about to expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert<'a> {
    /// The document.
    pub document: &'a Document,
    /// Its status tier; always [`ExpiryStatus::Critical`] or
    /// [`ExpiryStatus::Warning`].
    pub status: ExpiryStatus,
    /// Whole days until it expires.
    pub days_left: i64,
}

/// An in-memory collection of travel documents.
#[derive(Debug, Default, Clone)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// A registry populated from `seed`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered; no registry is built
    /// in that case.
    pub fn from_seed<I>(seed: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = DocumentDraft>,
    {
        let mut registry = Self::new();
        for draft in seed {
            registry.add(draft)?;
        }
        Ok(registry)
    }

    /// Insert a document under a caller-chosen id.
    pub(crate) fn insert_with_id(
        &mut self,
        id: Uuid,
        draft: DocumentDraft,
    ) -> Result<&Document, Error> {
        if self.get(id).is_some() {
            return Err(Error::DuplicateId {
                kind: RecordKind::Document,
                id,
            });
        }
        let document = draft.into_document(id)?;
        self.documents.push(document);
        Ok(&self.documents[self.documents.len() - 1])
    }

    /// Validate `draft` and append it under a new id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is missing, a date is
    /// malformed or the attachment is too large.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn add(&mut self, draft: DocumentDraft) -> Result<&Document, Error> {
        let document = self.insert_with_id(Uuid::new_v4(), draft)?;
        info!(id = %document.id(), "added document");
        Ok(document)
    }

    /// Replace every field of the document `id` except the id itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such document, or
    /// [`Error::Validation`] if the draft is invalid. The registry is
    /// unchanged on error.
    #[instrument(skip(self, draft))]
    pub fn update(&mut self, id: Uuid, draft: DocumentDraft) -> Result<&Document, Error> {
        let index = self.position(id)?;
        let document = draft.into_document(id)?;
        self.documents[index] = document;
        info!("updated document");
        Ok(&self.documents[index])
    }

    /// Delete the document `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such document.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> Result<Document, Error> {
        let index = self.position(id)?;
        info!("removed document");
        Ok(self.documents.remove(index))
    }

    /// Delete the document `id` if `confirm` approves it.
    ///
    /// `confirm` is shown the document before anything is removed. Returns
    /// `Ok(None)` if it declines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such document; `confirm` is
    /// not called in that case.
    pub fn remove_confirmed<F>(&mut self, id: Uuid, confirm: F) -> Result<Option<Document>, Error>
    where
        F: FnOnce(&Document) -> bool,
    {
        let index = self.position(id)?;
        if !confirm(&self.documents[index]) {
            debug!(%id, "removal declined");
            return Ok(None);
        }
        self.remove(id).map(Some)
    }

    /// Look up a document.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|document| document.id() == id)
    }

    /// All documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the registry holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents whose name or number contains `term` (ignoring case) and
    /// whose kind passes `filter`.
    ///
    /// An empty `term` matches every document.
    #[must_use]
    pub fn search(&self, term: &str, filter: KindFilter) -> Vec<&Document> {
        let term = term.to_lowercase();
        self.documents
            .iter()
            .filter(|document| filter.matches(document.kind()))
            .filter(|document| document.matches_lowercase(&term))
            .collect()
    }

    /// Classify a single document relative to `today`.
    #[must_use]
    pub fn status_of(&self, id: Uuid, today: NaiveDate) -> Option<Classification> {
        self.get(id).map(|document| document.status(today))
    }

    /// Documents that expire within the warning window.
    ///
    /// Already-expired documents are not included.
    #[must_use]
    pub fn expiring_alerts(&self, today: NaiveDate) -> Vec<Alert<'_>> {
        self.documents
            .iter()
            .filter_map(|document| {
                let Classification { status, days_until } = document.status(today);
                status.needs_attention().then_some(Alert {
                    document,
                    status,
                    days_left: days_until,
                })
            })
            .collect()
    }

    fn position(&self, id: Uuid) -> Result<usize, Error> {
        self.documents
            .iter()
            .position(|document| document.id() == id)
            .ok_or(Error::not_found(RecordKind::Document, id))
    }
}
