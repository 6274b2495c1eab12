//! Ladies-day schedule entries and the vote ledger behind their trust scores.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::{LadiesDayId, SaunaId, UserId};

/// Provenance of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Published by the venue itself or another verified channel.
    Official,
    /// Reported by a community member.
    User,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Official => "OFFICIAL",
            SourceType::User => "USER",
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFFICIAL" => Ok(SourceType::Official),
            "USER" => Ok(SourceType::User),
            other => Err(format!("Unknown source type: {}", other)),
        }
    }
}

/// Direction of a community vote on a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Support,
    Oppose,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Support => "SUPPORT",
            VoteType::Oppose => "OPPOSE",
        }
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUPPORT" => Ok(VoteType::Support),
            "OPPOSE" => Ok(VoteType::Oppose),
            other => Err(format!("Unknown vote type: {}", other)),
        }
    }
}

/// When a ladies-only window recurs.
///
/// Exactly one temporal key exists per entry; the submission gate rejects
/// requests carrying both a weekday and a calendar date, so inserts built
/// from this enum cannot violate that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalKey {
    /// Weekly recurrence, 0 = Sunday through 6 = Saturday.
    Weekly(i16),
    /// A single calendar date, compared at day granularity.
    Date(NaiveDate),
}

impl TemporalKey {
    pub fn day_of_week(&self) -> Option<i16> {
        match self {
            TemporalKey::Weekly(dow) => Some(*dow),
            TemporalKey::Date(_) => None,
        }
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        match self {
            TemporalKey::Weekly(_) => None,
            TemporalKey::Date(date) => Some(*date),
        }
    }
}

/// A ladies-only time window at a venue, recurring or one-off.
///
/// `trust_score`, `support_count`, and `opposition_count` are derived from
/// the vote ledger and only ever change in response to a vote event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadiesDay {
    pub id: LadiesDayId,
    pub sauna_id: SaunaId,
    /// 0 = Sunday through 6 = Saturday; set for weekly entries.
    pub day_of_week: Option<i16>,
    /// Set for one-off entries. Mutually exclusive with `day_of_week`.
    pub specific_date: Option<NaiveDate>,
    /// Local time-of-day like "10:00"; absent means all day.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: SourceType,
    /// Submitting user; absent for official entries with no attributable submitter.
    pub source_user_id: Option<UserId>,
    /// Community confidence in [0,5], seeded from the submitter's reputation.
    pub trust_score: f64,
    pub support_count: i32,
    pub opposition_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LadiesDay {
    /// Whether this entry is active on the given weekday/date.
    pub fn occurs_on(&self, weekday: i16, date: NaiveDate) -> bool {
        self.day_of_week == Some(weekday) || self.specific_date == Some(date)
    }
}

/// Insert payload produced by the submission gate.
#[derive(Debug, Clone)]
pub struct NewLadiesDay {
    pub sauna_id: SaunaId,
    pub schedule: TemporalKey,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: SourceType,
    pub source_user_id: Option<UserId>,
    /// Seed value; replaced by the ratio score once votes exist.
    pub trust_score: f64,
}

/// One user's live vote on one schedule entry.
///
/// Identity is the (`user_id`, `ladies_day_id`) pair; a repeat vote flips
/// `vote_type` in place rather than adding a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: UserId,
    pub ladies_day_id: LadiesDayId,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_type_parse() {
        assert_eq!("SUPPORT".parse::<VoteType>().unwrap(), VoteType::Support);
        assert_eq!("oppose".parse::<VoteType>().unwrap(), VoteType::Oppose);
        assert!("ABSTAIN".parse::<VoteType>().is_err());
    }

    #[test]
    fn test_source_type_parse() {
        assert_eq!("USER".parse::<SourceType>().unwrap(), SourceType::User);
        assert!("BOT".parse::<SourceType>().is_err());
    }

    #[test]
    fn test_temporal_key_exclusivity() {
        let weekly = TemporalKey::Weekly(2);
        assert_eq!(weekly.day_of_week(), Some(2));
        assert_eq!(weekly.specific_date(), None);

        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let oneoff = TemporalKey::Date(date);
        assert_eq!(oneoff.day_of_week(), None);
        assert_eq!(oneoff.specific_date(), Some(date));
    }
}
