use std::fmt;

use chrono::NaiveTime;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    domain::required,
    error::{Error, RecordKind, ValidationError},
};

/// What sort of activity an itinerary entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Landmarks and views.
    #[default]
    Sightseeing,
    /// Meals.
    Dining,
    /// Museums, galleries and shows.
    Culture,
    /// Anything else.
    Other,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sightseeing => "Sightseeing",
            Self::Dining => "Dining",
            Self::Culture => "Culture",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Unvalidated itinerary entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityDraft {
    /// Start time as `HH:MM`.
    pub time: String,
    /// What is planned. Required.
    #[serde(default)]
    pub title: String,
    /// Where it happens. Defaults to the itinerary's destination.
    #[serde(default)]
    pub location: String,
    /// Kind of activity.
    #[serde(default)]
    pub kind: ActivityKind,
}

impl ActivityDraft {
    /// Create a draft at the itinerary's destination.
    #[must_use]
    pub fn new(time: impl Into<String>, title: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            time: time.into(),
            title: title.into(),
            location: String::new(),
            kind,
        }
    }
}

/// A planned activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    id: Uuid,
    time: NaiveTime,
    title: NonEmptyString,
    location: String,
    kind: ActivityKind,
}

impl Activity {
    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Start time.
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    /// What is planned.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Where it happens.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Kind of activity.
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        self.kind
    }
}

fn parse_time(text: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| ValidationError::MalformedTime {
        value: text.to_string(),
    })
}

/// A destination and the activities planned there.
#[derive(Debug, Clone, Default)]
pub struct Itinerary {
    destination: String,
    activities: Vec<Activity>,
}

impl Itinerary {
    /// An empty itinerary for `destination`.
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            activities: Vec::new(),
        }
    }

    /// The destination.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Change the destination.
    ///
    /// Existing activities keep their locations.
    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = destination.into();
    }

    /// Add an activity.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is empty or the time is not
    /// `HH:MM`.
    #[instrument(skip(self, draft), fields(time = %draft.time))]
    pub fn add(&mut self, draft: ActivityDraft) -> Result<&Activity, Error> {
        let title = required("title", draft.title)?;
        let time = parse_time(&draft.time)?;
        let location = if draft.location.trim().is_empty() {
            self.destination.clone()
        } else {
            draft.location
        };

        let activity = Activity {
            id: Uuid::new_v4(),
            time,
            title,
            location,
            kind: draft.kind,
        };
        debug!(id = %activity.id, "added activity");
        self.activities.push(activity);
        Ok(&self.activities[self.activities.len() - 1])
    }

    /// Remove an activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no activity has this id.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> Result<Activity, Error> {
        let index = self
            .activities
            .iter()
            .position(|activity| activity.id == id)
            .ok_or(Error::not_found(RecordKind::Activity, id))?;
        Ok(self.activities.remove(index))
    }

    /// Activities in the order they were added.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Activities ordered by start time.
    ///
    /// Activities at the same time keep the order they were added in.
    #[must_use]
    pub fn chronological(&self) -> Vec<&Activity> {
        let mut activities: Vec<&Activity> = self.activities.iter().collect();
        activities.sort_by_key(|activity| activity.time);
        activities
    }
}
