//! Seed collections and the session they populate.
//!
//! A seed file describes the records a session starts with. It is read once
//! and never written back: everything after construction lives in memory.
//!
//! Seeds may be YAML (`.yaml`, `.yml`) or JSON (`.json`):
//!
//! ```yaml
//! documents:
//!   - name: US Passport
//!     kind: passport
//!     number: A12345678
//!     expiry_date: "2025-12-15"
//! reviews:
//!   - service: flights
//!     service_name: Air France Flight to Paris
//!     rating: 4
//!     text: Great flight experience with excellent service.
//!     date: "2024-01-20"
//!     author: John Doe
//! budget:
//!   limit: 2000
//!   expenses:
//!     - category: flights
//!       amount: 450
//!       description: Round trip to Paris
//!       date: "2024-01-15"
//! itinerary:
//!   destination: Paris
//!   activities:
//!     - time: "09:00"
//!       title: Visit Eiffel Tower
//! ```

use std::{fs, io, path::Path};

use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    domain::{
        expiry, ActivityDraft, Budget, Config, DocumentDraft, ExpenseDraft, Itinerary, Money,
        ReviewDraft,
    },
    error::Error,
    registry::{DocumentRegistry, ReviewRegistry},
};

/// Errors that can occur when loading a seed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The seed file could not be read.
    #[error("failed to read seed file")]
    Io(#[from] io::Error),
    /// The YAML could not be parsed.
    #[error("failed to parse seed YAML")]
    Yaml(#[from] serde_yaml::Error),
    /// The JSON could not be parsed.
    #[error("failed to parse seed JSON")]
    Json(#[from] serde_json::Error),
    /// The file extension is not one of `yaml`, `yml` or `json`.
    #[error("unsupported seed file extension '{0}'")]
    UnsupportedFormat(String),
    /// A record in the seed was rejected.
    #[error("invalid entry {index} in '{section}'")]
    Record {
        /// The seed section holding the record.
        section: &'static str,
        /// Zero-based position within the section.
        index: usize,
        /// Why the record was rejected.
        #[source]
        source: Error,
    },
}

impl LoadError {
    fn record(section: &'static str, index: usize) -> impl FnOnce(Error) -> Self {
        move |source| Self::Record {
            section,
            index,
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeedDocument {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(flatten)]
    draft: DocumentDraft,
}

#[derive(Debug, Deserialize)]
struct SeedReview {
    #[serde(default)]
    id: Option<Uuid>,
    date: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(flatten)]
    draft: ReviewDraft,
}

#[derive(Debug, Deserialize)]
struct SeedExpense {
    date: String,
    #[serde(flatten)]
    draft: ExpenseDraft,
}

#[derive(Debug, Deserialize)]
struct SeedBudget {
    #[serde(default)]
    limit: Option<Money>,
    #[serde(default)]
    expenses: Vec<SeedExpense>,
}

#[derive(Debug, Deserialize)]
struct SeedItinerary {
    #[serde(default)]
    destination: String,
    #[serde(default)]
    activities: Vec<ActivityDraft>,
}

/// The initial contents of a session.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    documents: Vec<SeedDocument>,
    #[serde(default)]
    reviews: Vec<SeedReview>,
    #[serde(default)]
    budget: Option<SeedBudget>,
    #[serde(default)]
    itinerary: Option<SeedItinerary>,
}

impl Seed {
    /// Parse a YAML seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not describe a seed.
    pub fn from_yaml(text: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a JSON seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a seed.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a seed file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or cannot be parsed.
    #[instrument]
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        let text = fs::read_to_string(path)?;
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text),
            "json" => Self::from_json(&text),
            _ => Err(LoadError::UnsupportedFormat(extension)),
        }
    }
}

/// Everything a single session owns.
///
/// There is exactly one registry per record kind.
#[derive(Debug, Clone)]
pub struct Session {
    /// The session configuration.
    pub config: Config,
    /// Travel documents.
    pub documents: DocumentRegistry,
    /// Service reviews.
    pub reviews: ReviewRegistry,
    /// Trip budget and expenses.
    pub budget: Budget,
    /// Planned activities.
    pub itinerary: Itinerary,
}

impl Session {
    /// An empty session.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            documents: DocumentRegistry::new(),
            reviews: ReviewRegistry::new(config.author()),
            budget: Budget::new(config.budget),
            itinerary: Itinerary::default(),
            config,
        }
    }

    /// A session populated from `seed`.
    ///
    /// Every record passes the same validation as a manual add.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Record`] naming the first rejected record.
    pub fn from_seed(seed: Seed, config: Config) -> Result<Self, LoadError> {
        let mut session = Self::new(config);

        for (index, entry) in seed.documents.into_iter().enumerate() {
            let id = entry.id.unwrap_or_else(Uuid::new_v4);
            session
                .documents
                .insert_with_id(id, entry.draft)
                .map_err(LoadError::record("documents", index))?;
        }

        for (index, entry) in seed.reviews.into_iter().enumerate() {
            let id = entry.id.unwrap_or_else(Uuid::new_v4);
            let date = expiry::parse_date("date", &entry.date)
                .map_err(|e| LoadError::record("reviews", index)(e.into()))?;
            let author = entry
                .author
                .filter(|author| !author.trim().is_empty())
                .unwrap_or_else(|| session.reviews.author().to_string());
            session
                .reviews
                .push_seeded(id, entry.draft, date, author)
                .map_err(LoadError::record("reviews", index))?;
        }

        if let Some(budget) = seed.budget {
            if let Some(limit) = budget.limit {
                session.budget.set_limit(limit);
            }
            for (index, entry) in budget.expenses.into_iter().enumerate() {
                let date = expiry::parse_date("date", &entry.date)
                    .map_err(|e| LoadError::record("expenses", index)(e.into()))?;
                session
                    .budget
                    .add_expense(entry.draft, date)
                    .map_err(LoadError::record("expenses", index))?;
            }
        }

        if let Some(itinerary) = seed.itinerary {
            session.itinerary.set_destination(itinerary.destination);
            for (index, draft) in itinerary.activities.into_iter().enumerate() {
                session
                    .itinerary
                    .add(draft)
                    .map_err(LoadError::record("activities", index))?;
            }
        }

        debug!(
            documents = session.documents.len(),
            reviews = session.reviews.len(),
            expenses = session.budget.expenses().len(),
            activities = session.itinerary.activities().len(),
            "loaded seed"
        );
        Ok(session)
    }

    /// Read a seed file and build a session from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a record in
    /// it is invalid.
    pub fn load(path: &Path, config: Config) -> Result<Self, LoadError> {
        Self::from_seed(Seed::read(path)?, config)
    }
}
