//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;

use super::auth::{AuthUser, MaybeAuthUser};
use super::dto::{
    CreateLadiesDayRequest, CreateLadiesDayResponse, CreateReviewRequest, CreateSaunaRequest,
    CreateSaunaResponse, CreateUserRequest, FacilityDto, FavoriteSaunaDto,
    FavoriteToggleResponse, FavoritesResponse, HealthResponse, LadiesDayDto,
    LadiesDayListParams, LadiesDayListResponse, MessageResponse, PageParams, ReviewListParams,
    ReviewListResponse, ReviewResponse, SaunaDetailResponse, SaunaDto, SaunaListParams,
    SaunaListResponse, TodayResponse, UpdateReviewRequest, UserDto, VoteRequest, VoteResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{LadiesDayId, ReviewId, SaunaId};
use crate::db::repository::FullRepository;
use crate::services::ladies_days::{self, LadiesDayQuery, LadiesDaySubmission};
use crate::services::reviews::{self, ReviewListQuery, ReviewSubmission, ReviewUpdate};
use crate::services::saunas::{self, FacilitySubmission, SaunaListQuery, SaunaSubmission};
use crate::services::users::{self, UserSubmission};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store
/// is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Users
// =============================================================================

/// POST /v1/users
///
/// Provision a user profile.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), AppError> {
    let user = users::create_user(
        state.repository.as_ref(),
        UserSubmission {
            username: request.username,
            email: request.email,
            avatar: request.avatar,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// GET /v1/users/me
///
/// The acting user's own profile.
pub async fn get_profile(AuthUser(user): AuthUser) -> HandlerResult<UserDto> {
    Ok(Json(UserDto::from(user)))
}

/// GET /v1/users/favorites
///
/// The acting user's favorited saunas, flagged with today's relevance.
pub async fn list_user_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> HandlerResult<FavoritesResponse> {
    let today = Local::now().date_naive();
    let favorites = saunas::list_favorites(state.repository.as_ref(), &user, today).await?;

    Ok(Json(FavoritesResponse {
        favorites: favorites.into_iter().map(FavoriteSaunaDto::from).collect(),
    }))
}

// =============================================================================
// Saunas
// =============================================================================

/// GET /v1/saunas
///
/// Directory listing with optional search, facility, schedule, and
/// location parameters.
pub async fn list_saunas(
    State(state): State<AppState>,
    Query(params): Query<SaunaListParams>,
) -> HandlerResult<SaunaListResponse> {
    let query = SaunaListQuery {
        search: params.search,
        has_ladies_day: params.has_ladies_day.as_deref() == Some("true"),
        facilities: params
            .facilities
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        lat: params.lat,
        lng: params.lng,
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(20),
    };

    let page = saunas::list_saunas(state.repository.as_ref(), query).await?;
    Ok(Json(SaunaListResponse::from(page)))
}

/// GET /v1/saunas/{id}
///
/// Venue detail, with the viewer's favorite state when identity is present.
pub async fn get_sauna(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(sauna_id): Path<i64>,
) -> HandlerResult<SaunaDetailResponse> {
    let detail = saunas::get_sauna(
        state.repository.as_ref(),
        SaunaId::new(sauna_id),
        viewer.map(|user| user.id),
    )
    .await?;

    Ok(Json(SaunaDetailResponse::from(detail)))
}

/// POST /v1/saunas
///
/// Create a sauna with nested facilities.
pub async fn create_sauna(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(request): Json<CreateSaunaRequest>,
) -> Result<(StatusCode, Json<CreateSaunaResponse>), AppError> {
    let submission = SaunaSubmission {
        name: request.name,
        address: request.address,
        latitude: request.latitude,
        longitude: request.longitude,
        phone: request.phone,
        website: request.website,
        description: request.description,
        price_range: request.price_range,
        facilities: request
            .facilities
            .into_iter()
            .map(|f| FacilitySubmission {
                name: f.name,
                category: f.category,
                temperature: f.temperature,
                description: f.description,
                is_women_only: f.is_women_only,
            })
            .collect(),
    };

    let (sauna, facilities) = saunas::create_sauna(state.repository.as_ref(), submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSaunaResponse {
            message: "Sauna created successfully".to_string(),
            sauna: SaunaDto::from(sauna),
            facilities: facilities.into_iter().map(FacilityDto::from).collect(),
        }),
    ))
}

/// POST /v1/saunas/{id}/favorite
///
/// Toggle the acting user's favorite mark on a sauna.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(sauna_id): Path<i64>,
) -> HandlerResult<FavoriteToggleResponse> {
    let is_favorited =
        saunas::toggle_favorite(state.repository.as_ref(), &user, SaunaId::new(sauna_id)).await?;

    Ok(Json(FavoriteToggleResponse {
        message: if is_favorited {
            "Favorite added".to_string()
        } else {
            "Favorite removed".to_string()
        },
        is_favorited,
    }))
}

// =============================================================================
// Ladies Days
// =============================================================================

/// GET /v1/ladies-days
///
/// Filtered schedule-entry listing.
pub async fn list_ladies_days(
    State(state): State<AppState>,
    Query(params): Query<LadiesDayListParams>,
) -> HandlerResult<LadiesDayListResponse> {
    let views = ladies_days::list_ladies_days(
        state.repository.as_ref(),
        LadiesDayQuery {
            sauna_id: params.sauna_id,
            date: params.date,
            day_of_week: params.day_of_week,
        },
    )
    .await?;

    Ok(Json(LadiesDayListResponse {
        ladies_days: views.into_iter().map(LadiesDayDto::from).collect(),
    }))
}

/// GET /v1/ladies-days/today
///
/// Entries active today, by local weekday or exact date.
pub async fn todays_ladies_days(
    State(state): State<AppState>,
) -> HandlerResult<TodayResponse> {
    let today = Local::now().date_naive();
    let view = ladies_days::today_ladies_days(state.repository.as_ref(), today).await?;
    Ok(Json(TodayResponse::from(view)))
}

/// POST /v1/ladies-days
///
/// Submit a new schedule entry for a venue.
pub async fn create_ladies_day(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateLadiesDayRequest>,
) -> Result<(StatusCode, Json<CreateLadiesDayResponse>), AppError> {
    let view = ladies_days::create_ladies_day(
        state.repository.as_ref(),
        &user,
        LadiesDaySubmission {
            sauna_id: request.sauna_id,
            day_of_week: request.day_of_week,
            specific_date: request.specific_date,
            start_time: request.start_time,
            end_time: request.end_time,
            is_official: request.is_official,
            source_type: request.source_type,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLadiesDayResponse {
            message: "Ladies day information added successfully".to_string(),
            ladies_day: LadiesDayDto::from(view),
        }),
    ))
}

/// POST /v1/ladies-days/{id}/vote
///
/// Cast or flip the acting user's vote on an entry.
pub async fn vote_ladies_day(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(ladies_day_id): Path<i64>,
    Json(request): Json<VoteRequest>,
) -> HandlerResult<VoteResponse> {
    let outcome = ladies_days::cast_vote(
        state.repository.as_ref(),
        &user,
        LadiesDayId::new(ladies_day_id),
        request.vote_type.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(VoteResponse {
        message: "Vote recorded successfully".to_string(),
        support_count: outcome.support_count,
        opposition_count: outcome.opposition_count,
        trust_score: outcome.trust_score,
    }))
}

// =============================================================================
// Reviews
// =============================================================================

/// GET /v1/reviews
///
/// Public review listing with optional venue/user filters.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> HandlerResult<ReviewListResponse> {
    let page = reviews::list_reviews(
        state.repository.as_ref(),
        ReviewListQuery {
            sauna_id: params.sauna_id,
            user_id: params.user_id,
            page: params.page.unwrap_or(1),
            limit: params.limit.unwrap_or(10),
        },
    )
    .await?;

    Ok(Json(ReviewListResponse::from(page)))
}

/// GET /v1/reviews/me
///
/// The acting user's own reviews, all visibility levels.
pub async fn my_reviews(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<PageParams>,
) -> HandlerResult<ReviewListResponse> {
    let page = reviews::my_reviews(
        state.repository.as_ref(),
        &user,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(10),
    )
    .await?;

    Ok(Json(ReviewListResponse::from(page)))
}

/// POST /v1/reviews
///
/// Create a review; one per user per sauna.
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let view = reviews::create_review(
        state.repository.as_ref(),
        &user,
        ReviewSubmission {
            sauna_id: request.sauna_id,
            rating: request.rating,
            title: request.title,
            content: request.content,
            visit_date: request.visit_date,
            visibility: request.visibility,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            message: "Review created successfully".to_string(),
            review: view.into(),
        }),
    ))
}

/// PUT /v1/reviews/{id}
///
/// Update an owned review.
pub async fn update_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(review_id): Path<i64>,
    Json(request): Json<UpdateReviewRequest>,
) -> HandlerResult<ReviewResponse> {
    let view = reviews::update_review(
        state.repository.as_ref(),
        &user,
        ReviewId::new(review_id),
        ReviewUpdate {
            rating: request.rating,
            title: request.title,
            content: request.content,
            visit_date: request.visit_date,
            visibility: request.visibility,
        },
    )
    .await?;

    Ok(Json(ReviewResponse {
        message: "Review updated successfully".to_string(),
        review: view.into(),
    }))
}

/// DELETE /v1/reviews/{id}
///
/// Delete an owned review.
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(review_id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    reviews::delete_review(state.repository.as_ref(), &user, ReviewId::new(review_id)).await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}
