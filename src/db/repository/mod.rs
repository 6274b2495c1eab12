//! Repository trait definitions.
//!
//! One trait per aggregate, combined into [`FullRepository`] for injection
//! into the application state. Implementations live in
//! `crate::db::repositories`.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` to work with async Rust.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{
    Facility, LadiesDay, LadiesDayId, Review, ReviewId, Sauna, SaunaId, User, UserId, Vote,
    VoteType,
};
use crate::models::ladies_day::{NewLadiesDay, TemporalKey};
use crate::models::review::{NewReview, ReviewPatch};
use crate::models::sauna::NewSauna;
use crate::models::user::NewUser;

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Page/limit pair for paginated listings. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Filters for the schedule-entry listing; absent fields impose no
/// constraint, present fields are ANDed.
#[derive(Debug, Clone, Default)]
pub struct LadiesDayFilter {
    pub sauna_id: Option<SaunaId>,
    /// Exact match at day granularity.
    pub specific_date: Option<NaiveDate>,
    pub day_of_week: Option<i16>,
}

/// Filters for the sauna directory listing.
#[derive(Debug, Clone)]
pub struct SaunaFilter {
    /// Case-insensitive substring over name and address.
    pub search: Option<String>,
    /// Keep only saunas with at least one schedule entry.
    pub has_ladies_day: bool,
    /// Keep only saunas offering every named facility.
    pub facility_names: Vec<String>,
    pub page: Pagination,
}

impl Default for SaunaFilter {
    fn default() -> Self {
        Self {
            search: None,
            has_ladies_day: false,
            facility_names: Vec::new(),
            page: Pagination::default(),
        }
    }
}

/// Filters for review listings.
///
/// Without a `user_id` filter only public reviews are returned; with one,
/// all of that user's reviews are included regardless of visibility.
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    pub sauna_id: Option<SaunaId>,
    pub user_id: Option<UserId>,
    pub page: Pagination,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            sauna_id: None,
            user_id: None,
            page: Pagination::new(1, 10),
        }
    }
}

/// Repository operations on user profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new profile and return it with its assigned id.
    async fn insert_user(&self, new_user: NewUser) -> RepositoryResult<User>;

    /// Fetch a user by id, or `None` if absent.
    async fn fetch_user(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Add one to the user's contribution counter.
    async fn increment_contribution(&self, id: UserId) -> RepositoryResult<()>;
}

/// Repository operations on sauna venues, their facilities, and favorites.
#[async_trait]
pub trait SaunaRepository: Send + Sync {
    /// Insert a sauna together with its nested facilities.
    async fn insert_sauna(&self, new_sauna: NewSauna) -> RepositoryResult<Sauna>;

    async fn fetch_sauna(&self, id: SaunaId) -> RepositoryResult<Option<Sauna>>;

    /// List saunas matching `filter`, sorted by rating then review count
    /// (both descending), plus the total match count before pagination.
    async fn list_saunas(&self, filter: &SaunaFilter) -> RepositoryResult<(Vec<Sauna>, i64)>;

    async fn fetch_facilities(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<Facility>>;

    /// Overwrite the derived rating/review-count pair.
    async fn update_rating(
        &self,
        sauna_id: SaunaId,
        rating: f64,
        review_count: i32,
    ) -> RepositoryResult<()>;

    async fn is_favorite(&self, user_id: UserId, sauna_id: SaunaId) -> RepositoryResult<bool>;

    /// Set or clear a favorite mark; setting an existing mark is a no-op.
    async fn set_favorite(
        &self,
        user_id: UserId,
        sauna_id: SaunaId,
        favorited: bool,
    ) -> RepositoryResult<()>;

    /// The user's favorited saunas, most recently favorited first.
    async fn list_favorite_saunas(&self, user_id: UserId) -> RepositoryResult<Vec<Sauna>>;

    async fn count_favorites(&self, sauna_id: SaunaId) -> RepositoryResult<i64>;
}

/// Repository operations on schedule entries and their vote ledger.
#[async_trait]
pub trait LadiesDayRepository: Send + Sync {
    /// Insert a new schedule entry with zeroed vote counts.
    async fn insert_ladies_day(&self, new_entry: NewLadiesDay) -> RepositoryResult<LadiesDay>;

    async fn fetch_ladies_day(&self, id: LadiesDayId) -> RepositoryResult<Option<LadiesDay>>;

    /// Find an entry with the same (sauna, temporal key, submitter)
    /// triple, if any. Dates are compared at day granularity.
    async fn find_duplicate(
        &self,
        sauna_id: SaunaId,
        schedule: &TemporalKey,
        source_user_id: UserId,
    ) -> RepositoryResult<Option<LadiesDay>>;

    /// List entries matching `filter`, sorted by trust score, support
    /// count, and creation time, all descending.
    async fn list_ladies_days(&self, filter: &LadiesDayFilter) -> RepositoryResult<Vec<LadiesDay>>;

    /// Entries active on the given weekday OR calendar date, sorted by
    /// trust score then support count, both descending.
    async fn ladies_days_on(
        &self,
        weekday: i16,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<LadiesDay>>;

    /// All entries for one sauna, sorted by trust score descending.
    async fn list_for_sauna(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<LadiesDay>>;

    /// The user's live vote on an entry, if any.
    async fn fetch_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
    ) -> RepositoryResult<Option<Vote>>;

    /// Record a first-time vote.
    async fn insert_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote>;

    /// Flip an existing vote in place.
    async fn update_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote>;

    /// The full ledger for one entry.
    async fn list_votes(&self, ladies_day_id: LadiesDayId) -> RepositoryResult<Vec<Vote>>;

    /// Persist the recomputed tally and score on the entry.
    async fn update_vote_stats(
        &self,
        ladies_day_id: LadiesDayId,
        support_count: i32,
        opposition_count: i32,
        trust_score: f64,
    ) -> RepositoryResult<()>;
}

/// Repository operations on reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert_review(&self, new_review: NewReview) -> RepositoryResult<Review>;

    async fn fetch_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>>;

    /// The review a user wrote for a sauna, if any.
    async fn find_review_by_author(
        &self,
        sauna_id: SaunaId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Review>>;

    /// List reviews matching `filter`, newest first, plus the total match
    /// count before pagination.
    async fn list_reviews(&self, filter: &ReviewFilter) -> RepositoryResult<(Vec<Review>, i64)>;

    /// Apply a partial update and return the new state.
    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepositoryResult<Review>;

    async fn delete_review(&self, id: ReviewId) -> RepositoryResult<()>;

    /// Ratings of all public reviews for a sauna (for the mean recompute).
    async fn public_ratings(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<i32>>;

    /// Newest public reviews for a sauna, capped at `limit`.
    async fn recent_public_reviews(
        &self,
        sauna_id: SaunaId,
        limit: i64,
    ) -> RepositoryResult<Vec<Review>>;

    async fn count_reviews(&self, sauna_id: SaunaId) -> RepositoryResult<i64>;
}

/// Everything the application needs from a storage backend.
#[async_trait]
pub trait FullRepository:
    UserRepository + SaunaRepository + LadiesDayRepository + ReviewRepository
{
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        assert_eq!(Pagination::new(1, 20).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
        // page 0 is clamped to 1
        assert_eq!(Pagination::new(0, 10).offset(), 0);
    }

    #[test]
    fn test_default_filters() {
        let f = ReviewFilter::default();
        assert_eq!(f.page.limit, 10);
        let s = SaunaFilter::default();
        assert_eq!(s.page.limit, 20);
        assert!(!s.has_ladies_day);
    }
}
