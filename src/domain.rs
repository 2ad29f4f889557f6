//! Domain models for travel records.
//!
//! This module contains the record types held by the registries, the expiry
//! classifier, and the configuration.

use non_empty_string::NonEmptyString;

use crate::error::ValidationError;

/// Budget and expense tracking.
pub mod budget;
pub use budget::{Budget, Expense, ExpenseCategory, ExpenseDraft, Money};

mod config;
pub use config::Config;

/// Travel documents and their drafts.
pub mod document;
pub use document::{Attachment, Document, DocumentDraft, DocumentKind};

pub mod expiry;
pub use expiry::{Classification, ExpiryStatus};

/// Day plans for a destination.
pub mod itinerary;
pub use itinerary::{Activity, ActivityDraft, ActivityKind, Itinerary};

/// Service reviews and star ratings.
pub mod review;
pub use review::{Rating, Review, ReviewDraft, ServiceType};

/// Trim `value` and require it to be non-empty.
pub(crate) fn required(
    field: &'static str,
    value: String,
) -> Result<NonEmptyString, ValidationError> {
    let trimmed = value.trim();
    let value = if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    };
    NonEmptyString::new(value).map_err(|_| ValidationError::MissingField(field))
}
