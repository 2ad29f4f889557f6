use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::required, error::ValidationError};

/// Minimum length of review text, in characters.
pub const MIN_TEXT_CHARS: usize = 10;

/// Maximum number of photos on a single review.
pub const MAX_PHOTOS: usize = 5;

/// The kind of service being reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Airline flights.
    #[default]
    Flights,
    /// Hotels and other accommodation.
    Hotels,
    /// Ground transport and transfers.
    Transport,
    /// Tours and activities.
    Activities,
}

impl ServiceType {
    /// Every service type, in display order.
    pub const ALL: [Self; 4] = [
        Self::Flights,
        Self::Hotels,
        Self::Transport,
        Self::Activities,
    ];

    /// The identifier used in seed files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flights => "flights",
            Self::Hotels => "hotels",
            Self::Transport => "transport",
            Self::Activities => "activities",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flights => "Flights",
            Self::Hotels => "Hotels",
            Self::Transport => "Transport",
            Self::Activities => "Activities",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown service type.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown service type '{0}'")]
pub struct UnknownServiceError(String);

impl FromStr for ServiceType {
    type Err = UnknownServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == lowered)
            .ok_or_else(|| UnknownServiceError(s.to_string()))
    }
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// The lowest rating.
    pub const MIN: Self = Self(1);
    /// The highest rating.
    pub const MAX: Self = Self(5);

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RatingOutOfRange`] unless `stars` is in
    /// `1..=5`.
    pub const fn new(stars: u8) -> Result<Self, ValidationError> {
        if stars < Self::MIN.0 || stars > Self::MAX.0 {
            return Err(ValidationError::RatingOutOfRange(stars));
        }
        Ok(Self(stars))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Unvalidated review fields, as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewDraft {
    /// Kind of service reviewed.
    pub service: ServiceType,
    /// Name of the flight, hotel, etc. Required.
    #[serde(default)]
    pub service_name: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    /// Review body. Required, at least [`MIN_TEXT_CHARS`] characters.
    #[serde(default)]
    pub text: String,
    /// Photo references, at most [`MAX_PHOTOS`].
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Default for ReviewDraft {
    fn default() -> Self {
        Self {
            service: ServiceType::default(),
            service_name: String::new(),
            rating: Rating::MAX.stars(),
            text: String::new(),
            photos: Vec::new(),
        }
    }
}

impl ReviewDraft {
    /// Create a draft without photos.
    #[must_use]
    pub fn new(
        service: ServiceType,
        service_name: impl Into<String>,
        rating: u8,
        text: impl Into<String>,
    ) -> Self {
        Self {
            service,
            service_name: service_name.into(),
            rating,
            text: text.into(),
            photos: Vec::new(),
        }
    }

    pub(crate) fn validate(self) -> Result<Content, ValidationError> {
        let service_name = required("service_name", self.service_name)?;
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingField("text"));
        }
        // measured and stored as entered; only blankness looks past whitespace
        let len = self.text.chars().count();
        if len < MIN_TEXT_CHARS {
            return Err(ValidationError::TextTooShort {
                len,
                min: MIN_TEXT_CHARS,
            });
        }
        let text =
            NonEmptyString::new(self.text).map_err(|_| ValidationError::MissingField("text"))?;

        let rating = Rating::new(self.rating)?;

        if self.photos.len() > MAX_PHOTOS {
            return Err(ValidationError::TooManyPhotos {
                count: self.photos.len(),
                max: MAX_PHOTOS,
            });
        }

        Ok(Content {
            service: self.service,
            service_name,
            rating,
            text,
            photos: self.photos,
        })
    }
}

/// The user-editable part of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Content {
    pub(crate) service: ServiceType,
    pub(crate) service_name: NonEmptyString,
    pub(crate) rating: Rating,
    pub(crate) text: NonEmptyString,
    pub(crate) photos: Vec<String>,
}

/// A validated review.
///
/// The id, date and author are fixed when the review is first added; edits
/// replace only the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Uuid,
    date: NaiveDate,
    author: String,
    #[serde(flatten)]
    pub(crate) content: Content,
}

impl Review {
    pub(crate) const fn new(id: Uuid, date: NaiveDate, author: String, content: Content) -> Self {
        Self {
            id,
            date,
            author,
            content,
        }
    }

    /// The unique, stable identifier of this review.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The date the review was first written.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Who wrote the review.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Kind of service reviewed.
    #[must_use]
    pub const fn service(&self) -> ServiceType {
        self.content.service
    }

    /// Name of the reviewed service.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.content.service_name.as_str()
    }

    /// Star rating.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.content.rating
    }

    /// Review body.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.text.as_str()
    }

    /// Photo references, in upload order.
    #[must_use]
    pub fn photos(&self) -> &[String] {
        &self.content.photos
    }

    /// Whether `term` occurs in the service name or text, ignoring case.
    ///
    /// `term` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, term: &str) -> bool {
        self.service_name().to_lowercase().contains(term)
            || self.text().to_lowercase().contains(term)
    }

    /// Convert the content back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> ReviewDraft {
        ReviewDraft {
            service: self.content.service,
            service_name: self.content.service_name.to_string(),
            rating: self.content.rating.stars(),
            text: self.content.text.to_string(),
            photos: self.content.photos.clone(),
        }
    }
}
