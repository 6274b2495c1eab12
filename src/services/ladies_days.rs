//! Schedule-entry business logic: submission gate, vote ledger, and the
//! read surface.
//!
//! Every function takes the repository as an explicit handle; nothing here
//! owns state. Derived fields (`trust_score`, `support_count`,
//! `opposition_count`) only change inside [`cast_vote`], which rebuilds
//! them from the full ledger via [`crate::services::trust::recompute`].

use chrono::{DateTime, Datelike, NaiveDate};
use std::collections::HashMap;

use crate::api::{LadiesDay, LadiesDayId, Sauna, SaunaId, SourceType, User, UserId, VoteType};
use crate::db::repository::{
    ErrorContext, FullRepository, LadiesDayFilter, LadiesDayRepository, RepositoryError,
    RepositoryResult, SaunaRepository, UserRepository,
};
use crate::models::ladies_day::{NewLadiesDay, TemporalKey};

/// Raw submission as it arrives from the client; everything optional so
/// the gate can answer with field-level validation errors instead of
/// body-deserialization failures.
#[derive(Debug, Clone, Default)]
pub struct LadiesDaySubmission {
    pub sauna_id: Option<i64>,
    pub day_of_week: Option<i16>,
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
    pub specific_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: Option<String>,
}

/// Query parameters for the filtered listing.
#[derive(Debug, Clone, Default)]
pub struct LadiesDayQuery {
    pub sauna_id: Option<i64>,
    pub date: Option<String>,
    pub day_of_week: Option<i16>,
}

/// Venue summary joined onto a schedule entry.
#[derive(Debug, Clone)]
pub struct SaunaSummary {
    pub id: SaunaId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_range: String,
    pub rating: f64,
}

impl From<Sauna> for SaunaSummary {
    fn from(sauna: Sauna) -> Self {
        Self {
            id: sauna.id,
            name: sauna.name,
            address: sauna.address,
            latitude: sauna.latitude,
            longitude: sauna.longitude,
            price_range: sauna.price_range,
            rating: sauna.rating,
        }
    }
}

/// Submitter identity joined onto a schedule entry.
#[derive(Debug, Clone)]
pub struct SubmitterInfo {
    pub username: String,
    pub trust_score: f64,
}

impl From<User> for SubmitterInfo {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            trust_score: user.trust_score,
        }
    }
}

/// A schedule entry with its joined venue and submitter context.
#[derive(Debug, Clone)]
pub struct LadiesDayView {
    pub entry: LadiesDay,
    pub sauna: Option<SaunaSummary>,
    pub source_user: Option<SubmitterInfo>,
}

/// Tally returned to the caller after a successful vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteOutcome {
    pub support_count: i32,
    pub opposition_count: i32,
    pub trust_score: f64,
}

/// The today view: entries active on the given date, plus the date itself.
#[derive(Debug, Clone)]
pub struct TodayView {
    pub date: NaiveDate,
    pub day_of_week: i16,
    pub entries: Vec<LadiesDayView>,
}

/// Weekday index with Sunday as 0, matching the stored `day_of_week`.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

fn parse_specific_date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date);
    }
    // Clients sometimes send a full timestamp; only the day matters.
    if let Ok(ts) = raw.parse::<DateTime<chrono::FixedOffset>>() {
        return Ok(ts.date_naive());
    }
    Err(RepositoryError::validation(format!(
        "Invalid specificDate: {}",
        raw
    )))
}

fn parse_temporal_key(
    day_of_week: Option<i16>,
    specific_date: Option<&str>,
) -> RepositoryResult<TemporalKey> {
    match (day_of_week, specific_date) {
        (None, None) => Err(RepositoryError::validation(
            "Either dayOfWeek or specificDate must be provided",
        )),
        (Some(_), Some(_)) => Err(RepositoryError::validation(
            "Only one of dayOfWeek and specificDate may be provided",
        )),
        (Some(dow), None) => {
            if !(0..=6).contains(&dow) {
                return Err(RepositoryError::validation(
                    "dayOfWeek must be between 0 (Sunday) and 6 (Saturday)",
                ));
            }
            Ok(TemporalKey::Weekly(dow))
        }
        (None, Some(raw)) => Ok(TemporalKey::Date(parse_specific_date(raw)?)),
    }
}

/// Submission gate: validate, screen for duplicates, persist.
///
/// The new entry's trust score is seeded from the submitter's own
/// reputation, and the submitter's contribution counter goes up by one.
pub async fn create_ladies_day(
    repo: &dyn FullRepository,
    actor: &User,
    submission: LadiesDaySubmission,
) -> RepositoryResult<LadiesDayView> {
    let sauna_id = submission
        .sauna_id
        .map(SaunaId::new)
        .ok_or_else(|| RepositoryError::validation("Sauna ID is required"))?;

    let source_type: SourceType = submission
        .source_type
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(|_| RepositoryError::validation("Valid source type is required"))?;

    let schedule = parse_temporal_key(
        submission.day_of_week,
        submission.specific_date.as_deref(),
    )?;

    let sauna = repo
        .fetch_sauna(sauna_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Sauna not found"))?;

    // The screen and the insert are separate statements; two concurrent
    // submissions of the same triple can both pass. Accepted at this
    // scale rather than closed with a storage constraint.
    if let Some(existing) = repo.find_duplicate(sauna_id, &schedule, actor.id).await? {
        return Err(RepositoryError::conflict_with_context(
            "You have already posted this ladies day information",
            ErrorContext::new("create_ladies_day")
                .with_entity("ladies_day")
                .with_entity_id(existing.id),
        ));
    }

    let entry = repo
        .insert_ladies_day(NewLadiesDay {
            sauna_id,
            schedule,
            start_time: submission.start_time,
            end_time: submission.end_time,
            is_official: submission.is_official,
            source_type,
            source_user_id: Some(actor.id),
            trust_score: actor.trust_score,
        })
        .await?;

    repo.increment_contribution(actor.id).await?;

    log::debug!(
        "ladies day {} created for sauna {} by user {}",
        entry.id,
        sauna_id,
        actor.id
    );

    Ok(LadiesDayView {
        entry,
        sauna: Some(SaunaSummary::from(sauna)),
        source_user: Some(SubmitterInfo::from(actor.clone())),
    })
}

/// Record or flip a vote, then rebuild the entry's tally from the ledger.
pub async fn cast_vote(
    repo: &dyn FullRepository,
    actor: &User,
    ladies_day_id: LadiesDayId,
    vote_type_raw: &str,
) -> RepositoryResult<VoteOutcome> {
    let vote_type: VoteType = vote_type_raw
        .parse()
        .map_err(|_| RepositoryError::validation("Vote type must be SUPPORT or OPPOSE"))?;

    let entry = repo
        .fetch_ladies_day(ladies_day_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Ladies day entry not found"))?;

    match repo.fetch_vote(actor.id, ladies_day_id).await? {
        Some(existing) if existing.vote_type == vote_type => {
            return Err(RepositoryError::conflict_with_context(
                "You have already cast this vote",
                ErrorContext::new("cast_vote")
                    .with_entity("vote")
                    .with_entity_id(ladies_day_id),
            ));
        }
        Some(_) => {
            repo.update_vote(actor.id, ladies_day_id, vote_type).await?;
        }
        None => {
            repo.insert_vote(actor.id, ladies_day_id, vote_type).await?;
        }
    }

    // Exact counts over the full ledger; O(votes) per vote, fine at this
    // scale. A later read may still observe another request's write in
    // between (no transaction around vote + recompute).
    let votes = repo.list_votes(ladies_day_id).await?;
    let outcome = crate::services::trust::recompute(&votes);
    let trust_score = outcome.trust_score.unwrap_or(entry.trust_score);

    repo.update_vote_stats(
        ladies_day_id,
        outcome.support_count,
        outcome.opposition_count,
        trust_score,
    )
    .await?;

    Ok(VoteOutcome {
        support_count: outcome.support_count,
        opposition_count: outcome.opposition_count,
        trust_score,
    })
}

/// Filtered listing, sorted by trust, support, and recency.
pub async fn list_ladies_days(
    repo: &dyn FullRepository,
    query: LadiesDayQuery,
) -> RepositoryResult<Vec<LadiesDayView>> {
    let mut filter = LadiesDayFilter {
        sauna_id: query.sauna_id.map(SaunaId::new),
        specific_date: None,
        day_of_week: query.day_of_week,
    };
    if let Some(ref raw) = query.date {
        filter.specific_date = Some(parse_specific_date(raw)?);
    }

    let entries = repo.list_ladies_days(&filter).await?;
    attach_context(repo, entries).await
}

/// Entries active today: weekday matches OR the date matches exactly.
pub async fn today_ladies_days(
    repo: &dyn FullRepository,
    today: NaiveDate,
) -> RepositoryResult<TodayView> {
    let day_of_week = weekday_index(today);
    let entries = repo.ladies_days_on(day_of_week, today).await?;
    let entries = attach_context(repo, entries).await?;

    Ok(TodayView {
        date: today,
        day_of_week,
        entries,
    })
}

/// Join venue and submitter context onto a batch of entries.
pub(crate) async fn attach_context(
    repo: &dyn FullRepository,
    entries: Vec<LadiesDay>,
) -> RepositoryResult<Vec<LadiesDayView>> {
    let mut saunas: HashMap<SaunaId, SaunaSummary> = HashMap::new();
    let mut users: HashMap<UserId, SubmitterInfo> = HashMap::new();
    let mut views = Vec::with_capacity(entries.len());

    for entry in entries {
        let sauna = match saunas.get(&entry.sauna_id) {
            Some(summary) => Some(summary.clone()),
            None => match repo.fetch_sauna(entry.sauna_id).await? {
                Some(sauna) => {
                    let summary = SaunaSummary::from(sauna);
                    saunas.insert(entry.sauna_id, summary.clone());
                    Some(summary)
                }
                None => None,
            },
        };

        let source_user = match entry.source_user_id {
            Some(user_id) => match users.get(&user_id) {
                Some(info) => Some(info.clone()),
                None => match repo.fetch_user(user_id).await? {
                    Some(user) => {
                        let info = SubmitterInfo::from(user);
                        users.insert(user_id, info.clone());
                        Some(info)
                    }
                    None => None,
                },
            },
            None => None,
        };

        views.push(LadiesDayView {
            entry,
            sauna,
            source_user,
        });
    }

    Ok(views)
}
