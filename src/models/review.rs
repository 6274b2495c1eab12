//! Review records for sauna venues.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::{ReviewId, SaunaId, UserId};

/// Who may see a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVisibility {
    Public,
    Friends,
    Private,
}

impl ReviewVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewVisibility::Public => "PUBLIC",
            ReviewVisibility::Friends => "FRIENDS",
            ReviewVisibility::Private => "PRIVATE",
        }
    }
}

impl FromStr for ReviewVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PUBLIC" => Ok(ReviewVisibility::Public),
            "FRIENDS" => Ok(ReviewVisibility::Friends),
            "PRIVATE" => Ok(ReviewVisibility::Private),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

/// One user's review of one sauna. A user reviews a venue at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub sauna_id: SaunaId,
    pub user_id: UserId,
    /// 1 through 5, inclusive.
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub visit_date: NaiveDate,
    pub visibility: ReviewVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub sauna_id: SaunaId,
    pub user_id: UserId,
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub visit_date: NaiveDate,
    pub visibility: ReviewVisibility,
}

/// Field-wise update for an existing review; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub visibility: Option<ReviewVisibility>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!(
            "public".parse::<ReviewVisibility>().unwrap(),
            ReviewVisibility::Public
        );
        assert!("SECRET".parse::<ReviewVisibility>().is_err());
    }
}
