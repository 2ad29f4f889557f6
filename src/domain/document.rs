use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        expiry::{self, Classification},
        required,
    },
    error::ValidationError,
};

/// Largest attachment accepted at intake: 5 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// The category of a travel document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A passport.
    #[default]
    Passport,
    /// An entry or transit visa.
    Visa,
    /// A driving licence.
    License,
    /// A travel insurance policy.
    Insurance,
    /// A vaccination record.
    Vaccination,
    /// Anything else.
    Other,
}

impl DocumentKind {
    /// Every document kind, in display order.
    pub const ALL: [Self; 6] = [
        Self::Passport,
        Self::Visa,
        Self::License,
        Self::Insurance,
        Self::Vaccination,
        Self::Other,
    ];

    /// The identifier used in seed files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Visa => "visa",
            Self::License => "license",
            Self::Insurance => "insurance",
            Self::Vaccination => "vaccination",
            Self::Other => "other",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passport => "Passport",
            Self::Visa => "Visa",
            Self::License => "Driver's License",
            Self::Insurance => "Travel Insurance",
            Self::Vaccination => "Vaccination Record",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown document kind.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown document kind '{0}'")]
pub struct UnknownKindError(String);

impl FromStr for DocumentKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

/// An uploaded scan or photo of a document.
///
/// The file contents are opaque; only the name and size are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The original file name.
    pub file_name: String,
    /// Size of the file in bytes.
    pub size_bytes: u64,
}

impl Attachment {
    /// Check the attachment against the upload limit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileTooLarge`] if the file exceeds
    /// [`MAX_ATTACHMENT_BYTES`].
    pub const fn check_size(&self) -> Result<(), ValidationError> {
        if self.size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(ValidationError::FileTooLarge {
                size: self.size_bytes,
                max: MAX_ATTACHMENT_BYTES,
            });
        }
        Ok(())
    }
}

/// Unvalidated document fields, as entered by a user.
///
/// Dates are ISO 8601 strings; an empty `issue_date` means "not recorded".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentDraft {
    /// Display name, e.g. "US Passport". Required.
    #[serde(default)]
    pub name: String,
    /// Document category. Required.
    pub kind: DocumentKind,
    /// Document number. Required.
    #[serde(default)]
    pub number: String,
    /// Date of issue (`YYYY-MM-DD`), optional.
    #[serde(default)]
    pub issue_date: String,
    /// Date of expiry (`YYYY-MM-DD`). Required.
    #[serde(default)]
    pub expiry_date: String,
    /// Issuing country.
    #[serde(default)]
    pub issuing_country: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Uploaded file, if any.
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

impl DocumentDraft {
    /// Create a draft with the mandatory fields filled in.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: DocumentKind,
        number: impl Into<String>,
        expiry_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            number: number.into(),
            expiry_date: expiry_date.into(),
            ..Self::default()
        }
    }

    /// Validate the draft and turn it into a [`Document`] with the given id.
    pub(crate) fn into_document(self, id: Uuid) -> Result<Document, ValidationError> {
        let name = required("name", self.name)?;
        let number = required("number", self.number)?;
        let expiry_date = expiry::parse_date("expiry_date", &self.expiry_date)?;
        let issue_date = if self.issue_date.trim().is_empty() {
            None
        } else {
            Some(expiry::parse_date("issue_date", &self.issue_date)?)
        };
        if let Some(attachment) = &self.attachment {
            attachment.check_size()?;
        }

        Ok(Document {
            id,
            name,
            kind: self.kind,
            number,
            issue_date,
            expiry_date,
            issuing_country: self.issuing_country,
            notes: self.notes,
            attachment: self.attachment,
        })
    }
}

/// A validated travel document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    id: Uuid,
    name: NonEmptyString,
    kind: DocumentKind,
    number: NonEmptyString,
    issue_date: Option<NaiveDate>,
    expiry_date: NaiveDate,
    issuing_country: String,
    notes: String,
    attachment: Option<Attachment>,
}

impl Document {
    /// The unique, stable identifier of this document.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Document category.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Document number.
    #[must_use]
    pub fn number(&self) -> &str {
        self.number.as_str()
    }

    /// Date of issue, if recorded.
    #[must_use]
    pub const fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    /// Date of expiry.
    #[must_use]
    pub const fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    /// Issuing country.
    #[must_use]
    pub fn issuing_country(&self) -> &str {
        &self.issuing_country
    }

    /// Free-form notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// The uploaded file, if any.
    #[must_use]
    pub const fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Classify this document's expiry relative to `today`.
    #[must_use]
    pub const fn status(&self, today: NaiveDate) -> Classification {
        expiry::classify(self.expiry_date, today)
    }

    /// Whether `term` occurs in the name or number, ignoring case.
    ///
    /// `term` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, term: &str) -> bool {
        self.name.as_str().to_lowercase().contains(term)
            || self.number.as_str().to_lowercase().contains(term)
    }

    /// Convert back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> DocumentDraft {
        DocumentDraft {
            name: self.name.to_string(),
            kind: self.kind,
            number: self.number.to_string(),
            issue_date: self
                .issue_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            expiry_date: self.expiry_date.format("%Y-%m-%d").to_string(),
            issuing_country: self.issuing_country.clone(),
            notes: self.notes.clone(),
            attachment: self.attachment.clone(),
        }
    }
}
