//! Acting-user resolution for handlers.
//!
//! Token issuance and verification happen outside this service; requests
//! arrive with a resolved user id in the `X-User-Id` header (or as a
//! bearer value). The extractors here turn that id into a full [`User`]
//! through the repository, which also gives handlers the submitter's
//! current reputation for trust seeding.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use super::error::AppError;
use super::state::AppState;
use crate::api::{User, UserId};
use crate::db::repository::UserRepository;

/// Header carrying the resolved user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// A required acting user; rejects with 401 when absent or unknown.
pub struct AuthUser(pub User);

/// An optional acting user; `None` when the request is anonymous.
pub struct MaybeAuthUser(pub Option<User>);

fn user_id_from_parts(parts: &Parts) -> Option<UserId> {
    if let Some(value) = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return value.trim().parse().ok().map(UserId::new);
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| token.trim().parse().ok())
        .map(UserId::new)
}

async fn resolve_user(state: &AppState, id: UserId) -> Result<Option<User>, AppError> {
    state
        .repository
        .fetch_user(id)
        .await
        .map_err(AppError::from)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = user_id_from_parts(parts)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        match resolve_user(state, id).await? {
            Some(user) => Ok(AuthUser(user)),
            None => Err(AppError::Unauthorized("Unknown user".to_string())),
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match user_id_from_parts(parts) {
            Some(id) => Ok(MaybeAuthUser(resolve_user(state, id).await?)),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
