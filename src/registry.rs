//! Owned, in-memory collections of records.
//!
//! Each registry is the single authoritative copy of its records for a
//! session. Mutations take `&mut self` and either apply completely or not at
//! all.

pub mod documents;
pub use documents::{Alert, DocumentRegistry, KindFilter};

pub mod reviews;
pub use reviews::{RatingBucket, ReviewQuery, ReviewRegistry, ServiceFilter, SortOrder};
