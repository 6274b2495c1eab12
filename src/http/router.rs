//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Users
        .route("/users", post(handlers::create_user))
        .route("/users/me", get(handlers::get_profile))
        .route("/users/favorites", get(handlers::list_user_favorites))
        // Saunas
        .route("/saunas", get(handlers::list_saunas))
        .route("/saunas", post(handlers::create_sauna))
        .route("/saunas/{sauna_id}", get(handlers::get_sauna))
        .route("/saunas/{sauna_id}/favorite", post(handlers::toggle_favorite))
        // Ladies days
        .route("/ladies-days", get(handlers::list_ladies_days))
        .route("/ladies-days", post(handlers::create_ladies_day))
        .route("/ladies-days/today", get(handlers::todays_ladies_days))
        .route("/ladies-days/{ladies_day_id}/vote", post(handlers::vote_ladies_day))
        // Reviews
        .route("/reviews", get(handlers::list_reviews))
        .route("/reviews", post(handlers::create_review))
        .route("/reviews/me", get(handlers::my_reviews))
        .route("/reviews/{review_id}", put(handlers::update_review))
        .route("/reviews/{review_id}", delete(handlers::delete_review));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo =
            Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
