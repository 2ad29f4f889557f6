//! Travel Records
//!
//! In-memory registries for travel documents and service reviews, with
//! expiry classification, review statistics, and a simple trip budget and
//! itinerary.

pub mod domain;
pub use domain::{Config, Document, DocumentDraft, ExpiryStatus, Review, ReviewDraft};

mod error;
pub use error::{Error, RecordKind, ValidationError};

pub mod registry;
pub use registry::{DocumentRegistry, ReviewRegistry};

pub mod seed;
pub use seed::{LoadError, Seed, Session};
