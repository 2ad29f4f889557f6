//! Expiry classification for dated documents.
//!
//! A document's status is derived from the number of whole days between the
//! reference date and its expiry date. Time of day never enters into it.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::ValidationError;

/// Last day-count (inclusive) that is still classified as [`ExpiryStatus::Critical`].
pub const CRITICAL_WINDOW_DAYS: i64 = 7;

/// Last day-count (inclusive) that is still classified as [`ExpiryStatus::Warning`].
pub const WARNING_WINDOW_DAYS: i64 = 30;

/// Status tier of a document relative to a reference date.
///
/// Tiers are ordered from worst to best, so a later expiry date never yields
/// a lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    /// The expiry date has passed.
    Expired,
    /// Expires today or within the next week.
    Critical,
    /// Expires within the next month.
    Warning,
    /// Expires more than a month out.
    Valid,
}

impl ExpiryStatus {
    /// Human readable label for the tier.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::Critical => "Expires Soon",
            Self::Warning => "Expiring Soon",
            Self::Valid => "Valid",
        }
    }

    /// Whether a document in this tier belongs in the "requires attention"
    /// list.
    ///
    /// Expired documents are deliberately excluded: only documents that are
    /// about to expire raise an alert.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::Critical | Self::Warning)
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The result of classifying an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The status tier.
    pub status: ExpiryStatus,
    /// Whole days from the reference date to the expiry date. Negative once
    /// expired.
    pub days_until: i64,
}

impl Classification {
    /// Label of the status tier.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.status.label()
    }
}

/// Whole days from `today` until `expiry`.
#[must_use]
pub const fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

/// Classify an expiry date relative to `today`.
///
/// ```
/// use chrono::NaiveDate;
/// use wanderwise::domain::expiry::{classify, ExpiryStatus};
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let expiry = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
///
/// let classification = classify(expiry, today);
/// assert_eq!(classification.status, ExpiryStatus::Critical);
/// assert_eq!(classification.days_until, 7);
/// ```
#[must_use]
pub const fn classify(expiry: NaiveDate, today: NaiveDate) -> Classification {
    let days_until = days_until(expiry, today);

    let status = match days_until {
        d if d < 0 => ExpiryStatus::Expired,
        d if d <= CRITICAL_WINDOW_DAYS => ExpiryStatus::Critical,
        d if d <= WARNING_WINDOW_DAYS => ExpiryStatus::Warning,
        _ => ExpiryStatus::Valid,
    };

    Classification { status, days_until }
}

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an ISO 8601 (`YYYY-MM-DD`) date.
///
/// Surrounding whitespace is ignored. An empty string is reported as a
/// missing field.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for empty input, or
/// [`ValidationError::MalformedDate`] if the text is not a calendar date.
pub fn parse_date(field: &'static str, text: &str) -> Result<NaiveDate, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| ValidationError::MalformedDate {
        field,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn offset(days: i64) -> NaiveDate {
        let base = today();
        if days >= 0 {
            base.checked_add_days(Days::new(days.unsigned_abs())).unwrap()
        } else {
            base.checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
        }
    }

    #[test]
    fn boundaries_are_inclusive_of_the_lower_tier() {
        let cases = [
            (-1, ExpiryStatus::Expired),
            (0, ExpiryStatus::Critical),
            (7, ExpiryStatus::Critical),
            (8, ExpiryStatus::Warning),
            (30, ExpiryStatus::Warning),
            (31, ExpiryStatus::Valid),
        ];

        for (days, expected) in cases {
            let classification = classify(offset(days), today());
            assert_eq!(classification.status, expected, "days_until = {days}");
            assert_eq!(classification.days_until, days);
        }
    }

    #[test]
    fn labels_match_tiers() {
        assert_eq!(classify(offset(-3), today()).label(), "Expired");
        assert_eq!(classify(offset(3), today()).label(), "Expires Soon");
        assert_eq!(classify(offset(20), today()).label(), "Expiring Soon");
        assert_eq!(classify(offset(365), today()).label(), "Valid");
    }

    #[test]
    fn classification_is_monotonic_in_expiry() {
        let mut previous = ExpiryStatus::Expired;
        for days in -60..=60 {
            let status = classify(offset(days), today()).status;
            assert!(status >= previous, "tier decreased at {days} days");
            previous = status;
        }
    }

    #[test]
    fn only_imminent_tiers_need_attention() {
        assert!(!ExpiryStatus::Expired.needs_attention());
        assert!(ExpiryStatus::Critical.needs_attention());
        assert!(ExpiryStatus::Warning.needs_attention());
        assert!(!ExpiryStatus::Valid.needs_attention());
    }

    #[test]
    fn crossing_a_leap_day_counts_whole_days() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(days_until(expiry, today), 2);
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        let date = parse_date("expiry_date", " 2025-12-15 ").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        let error = parse_date("expiry_date", "2025-02-30").unwrap_err();
        assert_eq!(
            error,
            ValidationError::MalformedDate {
                field: "expiry_date",
                value: "2025-02-30".to_string(),
            }
        );
    }

    #[test]
    fn parse_date_reports_empty_input_as_missing() {
        assert_eq!(
            parse_date("expiry_date", "  ").unwrap_err(),
            ValidationError::MissingField("expiry_date")
        );
    }
}
