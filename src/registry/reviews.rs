//! The in-memory registry of service reviews.
//!
//! New reviews are placed at the front of the collection. Queries filter by
//! service, then search, then sort; aggregate statistics always cover the
//! whole collection regardless of any query.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    domain::{expiry, review::UnknownServiceError, Rating, Review, ReviewDraft, ServiceType},
    error::{Error, RecordKind},
};

/// Restricts a query to one service type, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceFilter {
    /// Every service matches.
    #[default]
    All,
    /// Only this service matches.
    Only(ServiceType),
}

impl ServiceFilter {
    /// Whether `service` passes the filter.
    #[must_use]
    pub fn matches(self, service: ServiceType) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == service,
        }
    }
}

impl From<ServiceType> for ServiceFilter {
    fn from(service: ServiceType) -> Self {
        Self::Only(service)
    }
}

impl FromStr for ServiceFilter {
    type Err = UnknownServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(service) => f.write_str(service.as_str()),
        }
    }
}

/// Ordering applied to a list of reviews.
///
/// All orderings are stable: reviews that compare equal keep their relative
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent date first.
    #[default]
    Newest,
    /// Oldest date first.
    Oldest,
    /// Highest rating first.
    Highest,
    /// Lowest rating first.
    Lowest,
}

/// Stable sort of `reviews` by `order`.
pub fn sort(reviews: &mut [&Review], order: SortOrder) {
    match order {
        SortOrder::Newest => reviews.sort_by(|a, b| b.date().cmp(&a.date())),
        SortOrder::Oldest => reviews.sort_by_key(|review| review.date()),
        SortOrder::Highest => reviews.sort_by(|a, b| b.rating().cmp(&a.rating())),
        SortOrder::Lowest => reviews.sort_by_key(|review| review.rating()),
    }
}

/// Keep the reviews whose service name or text contains `term`, ignoring
/// case.
///
/// An empty `term` keeps everything.
#[must_use]
pub fn search<'a>(reviews: Vec<&'a Review>, term: &str) -> Vec<&'a Review> {
    if term.is_empty() {
        return reviews;
    }
    let term = term.to_lowercase();
    reviews
        .into_iter()
        .filter(|review| review.matches_lowercase(&term))
        .collect()
}

/// A combined filter, search and sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    /// Which services to include.
    pub service: ServiceFilter,
    /// Search term; empty matches everything.
    pub term: String,
    /// Result ordering.
    pub sort: SortOrder,
}

/// The number and share of reviews with a given star rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingBucket {
    /// Star value, 5 down to 1.
    pub stars: u8,
    /// Number of reviews with exactly this rating.
    pub count: usize,
    /// `count` as a percentage of all reviews; 0 when there are none.
    pub percentage: f64,
}

/// An in-memory collection of reviews written in one session.
#[derive(Debug, Clone)]
pub struct ReviewRegistry {
    author: String,
    reviews: Vec<Review>,
}

impl ReviewRegistry {
    /// An empty registry whose new reviews are attributed to `author`.
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            reviews: Vec::new(),
        }
    }

    /// A registry holding `seed` in the order given.
    ///
    /// Seeded reviews keep the date and author they were written with.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn from_seed<I>(author: impl Into<String>, seed: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (ReviewDraft, NaiveDate, String)>,
    {
        let mut registry = Self::new(author);
        for (draft, date, author) in seed {
            registry.push_seeded(Uuid::new_v4(), draft, date, author)?;
        }
        Ok(registry)
    }

    /// Append an already-written review under a caller-chosen id.
    pub(crate) fn push_seeded(
        &mut self,
        id: Uuid,
        draft: ReviewDraft,
        date: NaiveDate,
        author: String,
    ) -> Result<&Review, Error> {
        if self.get(id).is_some() {
            return Err(Error::DuplicateId {
                kind: RecordKind::Review,
                id,
            });
        }
        let content = draft.validate()?;
        self.reviews.push(Review::new(id, date, author, content));
        Ok(&self.reviews[self.reviews.len() - 1])
    }

    /// The name new reviews are attributed to.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Add a review dated today.
    ///
    /// # Errors
    ///
    /// See [`ReviewRegistry::add_on`].
    pub fn add(&mut self, draft: ReviewDraft) -> Result<&Review, Error> {
        self.add_on(draft, expiry::today())
    }

    /// Add a review dated `date`, placing it at the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the service name or text is empty, the
    /// text is too short, the rating is out of range or there are too many
    /// photos.
    #[instrument(skip(self, draft), fields(service = %draft.service))]
    pub fn add_on(&mut self, draft: ReviewDraft, date: NaiveDate) -> Result<&Review, Error> {
        let content = draft.validate()?;
        let review = Review::new(Uuid::new_v4(), date, self.author.clone(), content);
        info!(id = %review.id(), "added review");
        self.reviews.insert(0, review);
        Ok(&self.reviews[0])
    }

    /// Replace the content of review `id`, keeping its id, date and author.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such review, or
    /// [`Error::Validation`] if the draft is invalid. The registry is
    /// unchanged on error.
    #[instrument(skip(self, draft))]
    pub fn update(&mut self, id: Uuid, draft: ReviewDraft) -> Result<&Review, Error> {
        let index = self.position(id)?;
        let content = draft.validate()?;
        self.reviews[index].content = content;
        info!("updated review");
        Ok(&self.reviews[index])
    }

    /// Delete review `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such review.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: Uuid) -> Result<Review, Error> {
        let index = self.position(id)?;
        info!("removed review");
        Ok(self.reviews.remove(index))
    }

    /// Delete review `id` if `confirm` approves it.
    ///
    /// Returns `Ok(None)` if `confirm` declines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such review; `confirm` is not
    /// called in that case.
    pub fn remove_confirmed<F>(&mut self, id: Uuid, confirm: F) -> Result<Option<Review>, Error>
    where
        F: FnOnce(&Review) -> bool,
    {
        let index = self.position(id)?;
        if !confirm(&self.reviews[index]) {
            debug!(%id, "removal declined");
            return Ok(None);
        }
        self.remove(id).map(Some)
    }

    /// Look up a review.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|review| review.id() == id)
    }

    /// All reviews, newest-added first.
    pub fn iter(&self) -> impl Iterator<Item = &Review> {
        self.reviews.iter()
    }

    /// Number of reviews.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    /// Whether the registry holds no reviews.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Reviews for the services passing `filter`, in collection order.
    #[must_use]
    pub fn filter(&self, filter: ServiceFilter) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|review| filter.matches(review.service()))
            .collect()
    }

    /// Filter, then search, then sort.
    #[must_use]
    pub fn query(&self, query: &ReviewQuery) -> Vec<&Review> {
        let mut reviews = search(self.filter(query.service), &query.term);
        sort(&mut reviews, query.sort);
        reviews
    }

    /// Mean rating of every review, rounded to one decimal place.
    ///
    /// Returns `0.0` when there are no reviews.
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total: u32 = self
            .reviews
            .iter()
            .map(|review| u32::from(review.rating().stars()))
            .sum();
        round_tenths(f64::from(total) / count_as_f64(self.reviews.len()))
    }

    /// Count and share of reviews for each star value, from 5 down to 1.
    #[must_use]
    pub fn rating_distribution(&self) -> [RatingBucket; 5] {
        let total = self.reviews.len();
        [5, 4, 3, 2, 1].map(|stars| {
            let count = self
                .reviews
                .iter()
                .filter(|review| review.rating().stars() == stars)
                .count();
            let percentage = if total == 0 {
                0.0
            } else {
                count_as_f64(count) / count_as_f64(total) * 100.0
            };
            RatingBucket {
                stars,
                count,
                percentage,
            }
        })
    }

    /// The rounded average as a whole-star rating, for star displays.
    ///
    /// `None` when there are no reviews.
    #[must_use]
    pub fn average_stars(&self) -> Option<Rating> {
        if self.reviews.is_empty() {
            return None;
        }
        let average = self.average_rating();
        (Rating::MIN.stars()..=Rating::MAX.stars())
            .rev()
            .find(|&stars| average >= f64::from(stars) - 0.5)
            .and_then(|stars| Rating::new(stars).ok())
    }

    fn position(&self, id: Uuid) -> Result<usize, Error> {
        self.reviews
            .iter()
            .position(|review| review.id() == id)
            .ok_or(Error::not_found(RecordKind::Review, id))
    }
}

/// Saturates at `u32::MAX`.
fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// Round a non-negative value to the nearest tenth of its exact binary value,
/// taking the larger tenth on an exact tie.
///
/// `1.15` is stored as slightly less than 1.15 and so rounds to `1.1`, while
/// `4.25` is exact and rounds to `4.3`.
fn round_tenths(value: f64) -> f64 {
    let scaled = value * 10.0;
    // exact residual of the multiplication
    let error = value.mul_add(10.0, -scaled);
    let mut tenths = scaled.round();
    if tenths - scaled >= 0.5 && error < 0.0 {
        tenths -= 1.0;
    }
    tenths / 10.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::ValidationError;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn draft(service: ServiceType, name: &str, rating: u8) -> ReviewDraft {
        ReviewDraft::new(service, name, rating, format!("A fair account of {name}."))
    }

    fn registry_with(ratings: &[u8]) -> ReviewRegistry {
        let mut registry = ReviewRegistry::new("Current User");
        for (i, &rating) in ratings.iter().enumerate() {
            registry
                .add_on(
                    draft(ServiceType::Hotels, &format!("Hotel {i}"), rating),
                    date(1),
                )
                .unwrap();
        }
        registry
    }

    fn paris() -> ReviewRegistry {
        ReviewRegistry::from_seed(
            "Current User",
            [
                (
                    ReviewDraft::new(
                        ServiceType::Flights,
                        "Air France Flight to Paris",
                        4,
                        "Great flight experience with excellent service.",
                    ),
                    date(20),
                    "John Doe".to_string(),
                ),
                (
                    ReviewDraft::new(
                        ServiceType::Hotels,
                        "Hotel Luxe Central",
                        5,
                        "Amazing hotel with beautiful rooms in Paris.",
                    ),
                    date(18),
                    "Jane Smith".to_string(),
                ),
                (
                    ReviewDraft::new(
                        ServiceType::Transport,
                        "Uber Premium Airport Transfer",
                        4,
                        "Reliable and comfortable transfer service.",
                    ),
                    date(15),
                    "Mike Johnson".to_string(),
                ),
                (
                    ReviewDraft::new(
                        ServiceType::Activities,
                        "Louvre Museum Guided Tour",
                        5,
                        "Incredible experience with a knowledgeable guide.",
                    ),
                    date(12),
                    "Sarah Wilson".to_string(),
                ),
            ],
        )
        .unwrap()
    }

    fn names(reviews: &[&Review]) -> Vec<String> {
        reviews
            .iter()
            .map(|review| review.service_name().to_string())
            .collect()
    }

    #[test]
    fn add_prepends_and_stamps_date_and_author() {
        let mut registry = paris();
        let review = registry
            .add_on(draft(ServiceType::Flights, "BA 304", 3), date(25))
            .unwrap();
        assert_eq!(review.date(), date(25));
        assert_eq!(review.author(), "Current User");

        let first = registry.iter().next().unwrap();
        assert_eq!(first.service_name(), "BA 304");
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn add_validates_text_length() {
        let mut registry = ReviewRegistry::new("Current User");
        let short = ReviewDraft::new(ServiceType::Flights, "AF 1", 4, "x".repeat(9));
        assert_eq!(
            registry.add_on(short, date(1)).unwrap_err(),
            Error::Validation(ValidationError::TextTooShort { len: 9, min: 10 })
        );
        assert!(registry.is_empty());

        let exact = ReviewDraft::new(ServiceType::Flights, "AF 1", 4, "x".repeat(10));
        assert!(registry.add_on(exact, date(1)).is_ok());
    }

    #[test]
    fn add_then_remove_restores_registry() {
        let mut registry = paris();
        let before: HashSet<Uuid> = registry.iter().map(Review::id).collect();

        let id = registry
            .add_on(draft(ServiceType::Hotels, "Ibis", 2), date(2))
            .unwrap()
            .id();
        registry.remove(id).unwrap();

        let after: HashSet<Uuid> = registry.iter().map(Review::id).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn update_preserves_id_date_and_author() {
        let mut registry = paris();
        let original = registry.iter().nth(1).unwrap().clone();

        let mut replacement = draft(ServiceType::Activities, "Seine cruise", 2);
        replacement.photos = vec!["boat.jpg".to_string()];
        let updated = registry.update(original.id(), replacement).unwrap();

        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.date(), original.date());
        assert_eq!(updated.author(), "Jane Smith");
        assert_eq!(updated.service(), ServiceType::Activities);
        assert_eq!(updated.service_name(), "Seine cruise");
        assert_eq!(updated.rating().stars(), 2);
        assert_eq!(updated.photos(), ["boat.jpg"]);
    }

    #[test]
    fn invalid_update_is_not_applied() {
        let mut registry = paris();
        let id = registry.iter().next().unwrap().id();
        let bad = ReviewDraft::new(ServiceType::Flights, "AF", 7, "Too many stars here");
        assert_eq!(
            registry.update(id, bad).unwrap_err(),
            Error::Validation(ValidationError::RatingOutOfRange(7))
        );
        assert_eq!(
            registry.get(id).unwrap().service_name(),
            "Air France Flight to Paris"
        );
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut registry = paris();
        let id = Uuid::new_v4();
        assert_eq!(
            registry.remove(id).unwrap_err(),
            Error::not_found(RecordKind::Review, id)
        );
        assert_eq!(
            registry
                .update(id, draft(ServiceType::Hotels, "Ghost", 3))
                .unwrap_err(),
            Error::not_found(RecordKind::Review, id)
        );
        assert!(
            registry
                .remove_confirmed(id, |_| panic!("must not be asked"))
                .is_err()
        );
    }

    #[test]
    fn remove_confirmed_can_be_declined() {
        let mut registry = paris();
        let id = registry.iter().next().unwrap().id();
        assert!(registry.remove_confirmed(id, |_| false).unwrap().is_none());
        assert_eq!(registry.len(), 4);
        assert!(registry.remove_confirmed(id, |_| true).unwrap().is_some());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn filter_by_service() {
        let registry = paris();
        assert_eq!(registry.filter(ServiceFilter::All).len(), 4);
        assert_eq!(
            names(&registry.filter(ServiceType::Transport.into())),
            ["Uber Premium Airport Transfer"]
        );
    }

    #[test]
    fn search_ignores_case() {
        let registry = paris();
        for term in ["paris", "PARIS", "Paris"] {
            let found = search(registry.filter(ServiceFilter::All), term);
            assert_eq!(
                names(&found),
                ["Air France Flight to Paris", "Hotel Luxe Central"],
                "term {term}"
            );
        }
    }

    #[test]
    fn search_applies_after_filter() {
        let registry = paris();
        let query = ReviewQuery {
            service: ServiceType::Hotels.into(),
            term: "paris".to_string(),
            sort: SortOrder::Newest,
        };
        assert_eq!(names(&registry.query(&query)), ["Hotel Luxe Central"]);
    }

    #[test]
    fn sort_by_date() {
        let registry = paris();
        let mut reviews = registry.filter(ServiceFilter::All);

        sort(&mut reviews, SortOrder::Oldest);
        let dates: Vec<NaiveDate> = reviews.iter().map(|review| review.date()).collect();
        assert_eq!(dates, [date(12), date(15), date(18), date(20)]);

        sort(&mut reviews, SortOrder::Newest);
        let dates: Vec<NaiveDate> = reviews.iter().map(|review| review.date()).collect();
        assert_eq!(dates, [date(20), date(18), date(15), date(12)]);
    }

    #[test]
    fn highest_first_orders_by_rating() {
        // Added in order 3, 5, 4; the registry holds them newest-added first.
        let registry = registry_with(&[3, 5, 4]);
        let mut reviews = registry.filter(ServiceFilter::All);
        reviews.reverse();

        sort(&mut reviews, SortOrder::Highest);
        let ratings: Vec<u8> = reviews.iter().map(|review| review.rating().stars()).collect();
        assert_eq!(ratings, [5, 4, 3]);
    }

    #[test]
    fn rating_sorts_are_stable() {
        let registry = registry_with(&[5, 5, 3]);
        let mut reviews = registry.filter(ServiceFilter::All);
        reviews.reverse();

        sort(&mut reviews, SortOrder::Highest);
        assert_eq!(names(&reviews), ["Hotel 0", "Hotel 1", "Hotel 2"]);

        sort(&mut reviews, SortOrder::Lowest);
        assert_eq!(names(&reviews), ["Hotel 2", "Hotel 0", "Hotel 1"]);
    }

    #[test]
    fn date_sorts_are_stable() {
        let registry = registry_with(&[1, 2, 3]);
        let mut reviews = registry.filter(ServiceFilter::All);
        let before = names(&reviews);

        sort(&mut reviews, SortOrder::Newest);
        assert_eq!(names(&reviews), before);
        sort(&mut reviews, SortOrder::Oldest);
        assert_eq!(names(&reviews), before);
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        assert!((registry_with(&[4, 5]).average_rating() - 4.5).abs() < f64::EPSILON);
        assert!((registry_with(&[5, 4, 4]).average_rating() - 4.3).abs() < f64::EPSILON);
        assert!(registry_with(&[]).average_rating().abs() < f64::EPSILON);
    }

    #[test]
    fn average_rounds_the_stored_mean_with_ties_upward() {
        let twenty = |base: u8, rest: &[u8]| {
            let mut ratings = vec![base; 20 - rest.len()];
            ratings.extend_from_slice(rest);
            registry_with(&ratings)
        };
        // 23 / 20 is stored just below 1.15
        assert!((twenty(1, &[3, 2]).average_rating() - 1.1).abs() < f64::EPSILON);
        // 29 / 20 is stored just below 1.45
        assert!((twenty(1, &[5, 5, 2]).average_rating() - 1.4).abs() < f64::EPSILON);
        // 41 / 20 is stored just below 2.05
        assert!((twenty(2, &[3]).average_rating() - 2.0).abs() < f64::EPSILON);
        // 17 / 4 is exactly 4.25
        assert!((registry_with(&[5, 4, 4, 4]).average_rating() - 4.3).abs() < f64::EPSILON);
    }

    #[test]
    fn average_stars_rounds_half_up() {
        assert_eq!(registry_with(&[4, 5]).average_stars().unwrap().stars(), 5);
        assert_eq!(registry_with(&[4, 4, 5]).average_stars().unwrap().stars(), 4);
        assert_eq!(registry_with(&[1, 2]).average_stars().unwrap().stars(), 2);
        assert_eq!(registry_with(&[1]).average_stars().unwrap().stars(), 1);
    }

    #[test]
    fn average_ignores_active_query() {
        let registry = paris();
        let _ = registry.query(&ReviewQuery {
            service: ServiceType::Flights.into(),
            ..ReviewQuery::default()
        });
        assert!((registry.average_rating() - 4.5).abs() < f64::EPSILON);
        assert_eq!(registry.average_stars().unwrap().stars(), 5);
    }

    #[test]
    fn distribution_counts_each_star_value() {
        let registry = registry_with(&[5, 5, 4, 3, 5]);
        let distribution = registry.rating_distribution();

        let counts: Vec<(u8, usize, f64)> = distribution
            .iter()
            .map(|bucket| (bucket.stars, bucket.count, bucket.percentage))
            .collect();
        assert_eq!(
            counts,
            [
                (5, 3, 60.0),
                (4, 1, 20.0),
                (3, 1, 20.0),
                (2, 0, 0.0),
                (1, 0, 0.0),
            ]
        );
    }

    #[test]
    fn distribution_share_is_fraction_times_hundred() {
        let registry = registry_with(&[5, 4, 3]);
        let bucket = &registry.rating_distribution()[0];
        assert_eq!(
            (bucket.stars, bucket.count, bucket.percentage),
            (5, 1, 33.333_333_333_333_33)
        );
    }

    #[test]
    fn distribution_of_empty_registry_is_zero() {
        let registry = ReviewRegistry::new("Current User");
        assert!(
            registry
                .rating_distribution()
                .iter()
                .all(|bucket| bucket.count == 0 && bucket.percentage == 0.0)
        );
        assert!(registry.average_stars().is_none());
    }
}
