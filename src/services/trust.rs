//! Trust scoring for schedule entries.
//!
//! The score is always rebuilt from the full vote ledger rather than
//! patched incrementally, so the stored counts can never drift from the
//! votes that produced them. The recompute is a pure function; it touches
//! no storage and is called directly from tests.

use crate::api::{Vote, VoteType};

/// Upper bound of the trust scale.
pub const MAX_TRUST_SCORE: f64 = 5.0;

/// Result of rebuilding an entry's tally from its ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TallyOutcome {
    pub support_count: i32,
    pub opposition_count: i32,
    /// `None` when the ledger is empty: the entry keeps its prior score.
    pub trust_score: Option<f64>,
}

/// Rebuild counts and score from the full ledger of one entry.
pub fn recompute(votes: &[Vote]) -> TallyOutcome {
    let support_count = votes
        .iter()
        .filter(|v| v.vote_type == VoteType::Support)
        .count() as i32;
    let opposition_count = votes.len() as i32 - support_count;

    TallyOutcome {
        support_count,
        opposition_count,
        trust_score: score(support_count, opposition_count),
    }
}

/// Score a tally: `clamp(0, 5, support/total * 5)`, or `None` for an
/// empty tally.
pub fn score(support_count: i32, opposition_count: i32) -> Option<f64> {
    let total = support_count + opposition_count;
    if total <= 0 {
        return None;
    }
    let ratio = f64::from(support_count) / f64::from(total);
    Some((ratio * MAX_TRUST_SCORE).clamp(0.0, MAX_TRUST_SCORE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LadiesDayId, UserId};
    use chrono::Utc;

    fn vote(user: i64, vote_type: VoteType) -> Vote {
        Vote {
            user_id: UserId::new(user),
            ladies_day_id: LadiesDayId::new(1),
            vote_type,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_ledger_keeps_prior_score() {
        let outcome = recompute(&[]);
        assert_eq!(outcome.support_count, 0);
        assert_eq!(outcome.opposition_count, 0);
        assert_eq!(outcome.trust_score, None);
    }

    #[test]
    fn test_unanimous_support_is_max() {
        let outcome = recompute(&[vote(1, VoteType::Support), vote(2, VoteType::Support)]);
        assert_eq!(outcome.support_count, 2);
        assert_eq!(outcome.opposition_count, 0);
        assert_eq!(outcome.trust_score, Some(5.0));
    }

    #[test]
    fn test_split_vote_is_half() {
        let outcome = recompute(&[vote(1, VoteType::Support), vote(2, VoteType::Oppose)]);
        assert_eq!(outcome.trust_score, Some(2.5));
    }

    #[test]
    fn test_unanimous_opposition_is_zero() {
        let outcome = recompute(&[vote(1, VoteType::Oppose), vote(2, VoteType::Oppose)]);
        assert_eq!(outcome.support_count, 0);
        assert_eq!(outcome.opposition_count, 2);
        assert_eq!(outcome.trust_score, Some(0.0));
    }

    #[test]
    fn test_score_matches_exact_ratio() {
        // 3 of 4 in support: 3/4 * 5 = 3.75
        assert_eq!(score(3, 1), Some(3.75));
        assert_eq!(score(1, 2), Some(5.0 / 3.0));
        assert_eq!(score(0, 0), None);
    }
}
