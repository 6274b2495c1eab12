//! User profile records.
//!
//! Credentials are deliberately absent: identity verification happens
//! outside this crate, and requests carry only a resolved user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::UserId;

/// Reputation assigned to freshly provisioned profiles, the midpoint of
/// the 0–5 scale.
pub const DEFAULT_TRUST_SCORE: f64 = 3.0;

/// A registered community member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    /// Reputation in [0,5]; seeds the trust score of entries this user submits.
    pub trust_score: f64,
    /// Number of accepted contributions (schedule entries, reviews).
    pub contribution_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user profile.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            avatar: None,
        }
    }
}
