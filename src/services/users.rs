//! User profile provisioning and lookup.
//!
//! Credential handling lives outside this crate; profiles here are plain
//! directory records that submissions and votes attach to.

use crate::api::User;
use crate::db::repository::{
    FullRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::user::NewUser;

/// Raw profile-creation payload.
#[derive(Debug, Clone, Default)]
pub struct UserSubmission {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Provision a new profile.
pub async fn create_user(
    repo: &dyn FullRepository,
    submission: UserSubmission,
) -> RepositoryResult<User> {
    let (username, email) = match (submission.username, submission.email) {
        (Some(username), Some(email)) if !username.is_empty() && !email.is_empty() => {
            (username, email)
        }
        _ => {
            return Err(RepositoryError::validation(
                "Username and email are required",
            ))
        }
    };

    repo.insert_user(NewUser {
        username,
        email,
        avatar: submission.avatar,
    })
    .await
}
