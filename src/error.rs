use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// An input record was rejected at the add/update boundary.
///
/// Nothing is applied when validation fails; the caller is expected to correct
/// the input and try again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory field was empty or absent.
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    /// A date field was not a valid `YYYY-MM-DD` calendar date.
    #[error("field '{field}' is not a valid YYYY-MM-DD date: '{value}'")]
    MalformedDate {
        /// Name of the offending field.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    /// A time of day was not a valid `HH:MM` value.
    #[error("'{value}' is not a valid HH:MM time")]
    MalformedTime {
        /// The text that failed to parse.
        value: String,
    },

    /// A star rating outside `1..=5`.
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    /// Free text shorter than the minimum length.
    #[error("review text must be at least {min} characters long (got {len})")]
    TextTooShort {
        /// Length of the supplied text, in characters.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// More photos attached than a review may carry.
    #[error("a review can carry at most {max} photos (got {count})")]
    TooManyPhotos {
        /// Number of photos supplied.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },

    /// An attachment exceeded the upload size limit.
    #[error("file is {size} bytes; files must be no larger than {max} bytes")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Upload limit in bytes.
        max: u64,
    },

    /// A monetary amount that is zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// A monetary amount that could not be parsed.
    #[error("'{0}' is not a valid amount")]
    MalformedAmount(String),
}

impl ValidationError {
    /// Whether this failure is the upload size limit rather than a bad field.
    #[must_use]
    pub const fn is_file_too_large(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. })
    }
}

/// The kind of record an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A travel document.
    Document,
    /// A service review.
    Review,
    /// A budget expense.
    Expense,
    /// An itinerary activity.
    Activity,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Review => "review",
            Self::Expense => "expense",
            Self::Activity => "activity",
        };
        f.write_str(name)
    }
}

/// Errors returned by registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The supplied record was invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation targeted an identifier that is not in the registry.
    #[error("{kind} {id} not found")]
    NotFound {
        /// What sort of record was being looked up.
        kind: RecordKind,
        /// The identifier that was not found.
        id: Uuid,
    },

    /// A seeded record reused an identifier already in the registry.
    #[error("{kind} {id} already exists")]
    DuplicateId {
        /// What sort of record was being inserted.
        kind: RecordKind,
        /// The identifier that clashed.
        id: Uuid,
    },
}

impl Error {
    pub(crate) const fn not_found(kind: RecordKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_breach_is_distinguished() {
        let error = ValidationError::FileTooLarge { size: 10, max: 5 };
        assert!(error.is_file_too_large());
        assert!(!ValidationError::MissingField("name").is_file_too_large());
    }

    #[test]
    fn not_found_names_the_record_kind() {
        let id = Uuid::nil();
        let error = Error::not_found(RecordKind::Review, id);
        assert_eq!(error.to_string(), format!("review {id} not found"));
    }

    #[test]
    fn validation_errors_convert_transparently() {
        let error: Error = ValidationError::RatingOutOfRange(6).into();
        assert_eq!(error.to_string(), "rating must be between 1 and 5, got 6");
    }
}
