//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs define the JSON wire contract. Field names are camelCase on
//! the wire (the mobile frontend's convention); internal types stay
//! snake_case and are converted via `From` impls.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Facility, LadiesDay, Review, Sauna, User};
use crate::services::ladies_days::{LadiesDayView, SaunaSummary, SubmitterInfo, TodayView};
use crate::services::reviews::{ReviewListPage, ReviewSaunaInfo, ReviewView};
use crate::services::saunas::{
    AuthorInfo, EntryWithSubmitter, FavoriteSauna, PageMeta, ReviewWithAuthor, SaunaDetail,
    SaunaListItem, SaunaListPage,
};

// =============================================================================
// Requests
// =============================================================================

/// Request body for provisioning a user profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Request body for creating a sauna.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaunaRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price_range: Option<String>,
    #[serde(default)]
    pub facilities: Vec<FacilityRequest>,
}

/// A facility nested in a sauna creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_women_only: bool,
}

/// Request body for submitting a ladies-day entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateLadiesDayRequest {
    pub sauna_id: Option<i64>,
    #[serde(default)]
    pub day_of_week: Option<i16>,
    #[serde(default)]
    pub specific_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_official: bool,
    pub source_type: Option<String>,
}

/// Request body for voting on a ladies-day entry. The raw string is
/// parsed server-side so a bad value is a 400, not a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: Option<String>,
}

/// Request body for creating a review.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub sauna_id: Option<i64>,
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub visit_date: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

/// Request body for updating a review; absent fields stay unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

// =============================================================================
// Query parameters
// =============================================================================

/// Query parameters for the ladies-day listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LadiesDayListParams {
    #[serde(default)]
    pub sauna_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<i16>,
}

/// Query parameters for the sauna directory listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaunaListParams {
    #[serde(default)]
    pub search: Option<String>,
    /// The literal string "true" enables the filter.
    #[serde(default)]
    pub has_ladies_day: Option<String>,
    /// Comma-separated facility names.
    #[serde(default)]
    pub facilities: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query parameters for review listings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    #[serde(default)]
    pub sauna_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Bare pagination parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

// =============================================================================
// Responses
// =============================================================================

/// Bare acknowledgement with a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// User profile on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub trust_score: f64,
    pub contribution_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            trust_score: user.trust_score,
            contribution_count: user.contribution_count,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Submitter identity next to a schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterDto {
    pub username: String,
    pub trust_score: f64,
}

impl From<SubmitterInfo> for SubmitterDto {
    fn from(info: SubmitterInfo) -> Self {
        Self {
            username: info.username,
            trust_score: info.trust_score,
        }
    }
}

/// Venue summary next to a schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaSummaryDto {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_range: String,
    pub rating: f64,
}

impl From<SaunaSummary> for SaunaSummaryDto {
    fn from(summary: SaunaSummary) -> Self {
        Self {
            id: summary.id.value(),
            name: summary.name,
            address: summary.address,
            latitude: summary.latitude,
            longitude: summary.longitude,
            price_range: summary.price_range,
            rating: summary.rating,
        }
    }
}

/// Schedule entry on the wire, optionally with joined context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadiesDayDto {
    pub id: i64,
    pub sauna_id: i64,
    pub day_of_week: Option<i16>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: String,
    pub source_user_id: Option<i64>,
    pub trust_score: f64,
    pub support_count: i32,
    pub opposition_count: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sauna: Option<SaunaSummaryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_user: Option<SubmitterDto>,
}

impl LadiesDayDto {
    fn from_entry(
        entry: LadiesDay,
        sauna: Option<SaunaSummaryDto>,
        source_user: Option<SubmitterDto>,
    ) -> Self {
        Self {
            id: entry.id.value(),
            sauna_id: entry.sauna_id.value(),
            day_of_week: entry.day_of_week,
            specific_date: entry.specific_date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            is_official: entry.is_official,
            source_type: entry.source_type.as_str().to_string(),
            source_user_id: entry.source_user_id.map(|id| id.value()),
            trust_score: entry.trust_score,
            support_count: entry.support_count,
            opposition_count: entry.opposition_count,
            created_at: entry.created_at,
            sauna,
            source_user,
        }
    }
}

impl From<LadiesDayView> for LadiesDayDto {
    fn from(view: LadiesDayView) -> Self {
        Self::from_entry(
            view.entry,
            view.sauna.map(SaunaSummaryDto::from),
            view.source_user.map(SubmitterDto::from),
        )
    }
}

impl From<EntryWithSubmitter> for LadiesDayDto {
    fn from(nested: EntryWithSubmitter) -> Self {
        Self::from_entry(nested.entry, None, nested.source_user.map(SubmitterDto::from))
    }
}

/// Response for a created schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLadiesDayResponse {
    pub message: String,
    pub ladies_day: LadiesDayDto,
}

/// Response after a recorded vote: the rebuilt tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub message: String,
    pub support_count: i32,
    pub opposition_count: i32,
    pub trust_score: f64,
}

/// Filtered ladies-day listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadiesDayListResponse {
    pub ladies_days: Vec<LadiesDayDto>,
}

/// Today's ladies-day listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub day_of_week: i16,
    pub ladies_days: Vec<LadiesDayDto>,
}

impl From<TodayView> for TodayResponse {
    fn from(view: TodayView) -> Self {
        Self {
            date: view.date,
            day_of_week: view.day_of_week,
            ladies_days: view.entries.into_iter().map(LadiesDayDto::from).collect(),
        }
    }
}

/// Facility on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDto {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

impl From<Facility> for FacilityDto {
    fn from(facility: Facility) -> Self {
        Self {
            id: facility.id.value(),
            name: facility.name,
            category: facility.category.as_str().to_string(),
            temperature: facility.temperature,
            description: facility.description,
            is_women_only: facility.is_women_only,
        }
    }
}

/// Sauna core fields on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaDto {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub price_range: String,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Sauna> for SaunaDto {
    fn from(sauna: Sauna) -> Self {
        Self {
            id: sauna.id.value(),
            name: sauna.name,
            address: sauna.address,
            latitude: sauna.latitude,
            longitude: sauna.longitude,
            phone: sauna.phone,
            website: sauna.website,
            description: sauna.description,
            price_range: sauna.price_range,
            rating: sauna.rating,
            review_count: sauna.review_count,
            created_at: sauna.created_at,
        }
    }
}

/// One row of the directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaListItemDto {
    #[serde(flatten)]
    pub sauna: SaunaDto,
    pub facilities: Vec<FacilityDto>,
    pub ladies_days: Vec<LadiesDayDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<SaunaListItem> for SaunaListItemDto {
    fn from(item: SaunaListItem) -> Self {
        Self {
            sauna: SaunaDto::from(item.sauna),
            facilities: item.facilities.into_iter().map(FacilityDto::from).collect(),
            ladies_days: item
                .ladies_days
                .into_iter()
                .map(LadiesDayDto::from)
                .collect(),
            distance_km: item.distance_km,
        }
    }
}

/// Pagination metadata on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl From<PageMeta> for PaginationDto {
    fn from(meta: PageMeta) -> Self {
        Self {
            page: meta.page,
            limit: meta.limit,
            total: meta.total,
            total_pages: meta.total_pages,
        }
    }
}

/// Directory listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaListResponse {
    pub saunas: Vec<SaunaListItemDto>,
    pub pagination: PaginationDto,
}

impl From<SaunaListPage> for SaunaListResponse {
    fn from(page: SaunaListPage) -> Self {
        Self {
            saunas: page.items.into_iter().map(SaunaListItemDto::from).collect(),
            pagination: PaginationDto::from(page.meta),
        }
    }
}

/// Reviewer identity next to a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthorDto {
    pub username: String,
    pub avatar: Option<String>,
    pub trust_score: f64,
}

impl From<AuthorInfo> for ReviewAuthorDto {
    fn from(author: AuthorInfo) -> Self {
        Self {
            username: author.username,
            avatar: author.avatar,
            trust_score: author.trust_score,
        }
    }
}

/// Venue fields next to a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSaunaDto {
    pub name: String,
    pub address: String,
}

/// Review on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i64,
    pub sauna_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub visit_date: NaiveDate,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ReviewAuthorDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sauna: Option<ReviewSaunaDto>,
}

impl ReviewDto {
    fn from_review(
        review: Review,
        user: Option<ReviewAuthorDto>,
        sauna: Option<ReviewSaunaDto>,
    ) -> Self {
        Self {
            id: review.id.value(),
            sauna_id: review.sauna_id.value(),
            user_id: review.user_id.value(),
            rating: review.rating,
            title: review.title,
            content: review.content,
            visit_date: review.visit_date,
            visibility: review.visibility.as_str().to_string(),
            created_at: review.created_at,
            updated_at: review.updated_at,
            user,
            sauna,
        }
    }
}

impl From<ReviewView> for ReviewDto {
    fn from(view: ReviewView) -> Self {
        Self::from_review(
            view.review,
            view.author.map(ReviewAuthorDto::from),
            view.sauna.map(|s: ReviewSaunaInfo| ReviewSaunaDto {
                name: s.name,
                address: s.address,
            }),
        )
    }
}

impl From<ReviewWithAuthor> for ReviewDto {
    fn from(nested: ReviewWithAuthor) -> Self {
        Self::from_review(nested.review, nested.author.map(ReviewAuthorDto::from), None)
    }
}

/// Response for a created or updated review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub message: String,
    pub review: ReviewDto,
}

/// Review listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewDto>,
    pub pagination: PaginationDto,
}

impl From<ReviewListPage> for ReviewListResponse {
    fn from(page: ReviewListPage) -> Self {
        Self {
            reviews: page.items.into_iter().map(ReviewDto::from).collect(),
            pagination: PaginationDto::from(page.meta),
        }
    }
}

/// Venue detail page response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaunaDetailResponse {
    #[serde(flatten)]
    pub sauna: SaunaDto,
    pub facilities: Vec<FacilityDto>,
    pub ladies_days: Vec<LadiesDayDto>,
    pub reviews: Vec<ReviewDto>,
    pub review_count: i64,
    pub favorite_count: i64,
    pub is_favorited: bool,
}

impl From<SaunaDetail> for SaunaDetailResponse {
    fn from(detail: SaunaDetail) -> Self {
        Self {
            sauna: SaunaDto::from(detail.sauna),
            facilities: detail
                .facilities
                .into_iter()
                .map(FacilityDto::from)
                .collect(),
            ladies_days: detail
                .ladies_days
                .into_iter()
                .map(LadiesDayDto::from)
                .collect(),
            reviews: detail.reviews.into_iter().map(ReviewDto::from).collect(),
            review_count: detail.review_count,
            favorite_count: detail.favorite_count,
            is_favorited: detail.is_favorited,
        }
    }
}

/// Response for a created sauna.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaunaResponse {
    pub message: String,
    #[serde(flatten)]
    pub sauna: SaunaDto,
    pub facilities: Vec<FacilityDto>,
}

/// Response for a favorite toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleResponse {
    pub message: String,
    pub is_favorited: bool,
}

/// One favorited sauna with its today-relevance flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteSaunaDto {
    pub sauna: SaunaDto,
    pub has_ladies_day_today: bool,
}

impl From<FavoriteSauna> for FavoriteSaunaDto {
    fn from(favorite: FavoriteSauna) -> Self {
        Self {
            sauna: SaunaDto::from(favorite.sauna),
            has_ladies_day_today: favorite.has_ladies_day_today,
        }
    }
}

/// Favorites listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteSaunaDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(VoteResponse {
            message: "Vote recorded successfully".to_string(),
            support_count: 2,
            opposition_count: 1,
            trust_score: 10.0 / 3.0,
        })
        .unwrap();
        assert!(json.get("supportCount").is_some());
        assert!(json.get("oppositionCount").is_some());
        assert!(json.get("trustScore").is_some());
    }

    #[test]
    fn test_create_request_accepts_camel_case() {
        let request: CreateLadiesDayRequest = serde_json::from_str(
            r#"{"saunaId": 3, "dayOfWeek": 2, "sourceType": "USER", "isOfficial": false}"#,
        )
        .unwrap();
        assert_eq!(request.sauna_id, Some(3));
        assert_eq!(request.day_of_week, Some(2));
        assert_eq!(request.source_type.as_deref(), Some("USER"));
    }
}
