//! Unit tests for the submission gate, vote ledger, and read surface,
//! run against the in-memory repository.

use chrono::NaiveDate;

use super::ladies_days::{
    cast_vote, create_ladies_day, list_ladies_days, today_ladies_days, weekday_index,
    LadiesDayQuery, LadiesDaySubmission,
};
use crate::api::User;
use crate::db::repository::{
    LadiesDayRepository, RepositoryError, SaunaRepository, UserRepository,
};
use crate::db::LocalRepository;
use crate::models::sauna::NewSauna;
use crate::models::user::NewUser;

fn sauna_draft(name: &str) -> NewSauna {
    NewSauna {
        name: name.to_string(),
        address: "2-1 Dogenzaka, Shibuya".to_string(),
        latitude: 35.658,
        longitude: 139.699,
        phone: None,
        website: None,
        description: None,
        price_range: "~1500yen".to_string(),
        facilities: vec![],
    }
}

async fn setup() -> (LocalRepository, User, crate::api::Sauna) {
    let repo = LocalRepository::new();
    let user = repo
        .insert_user(NewUser::new("sento_lover", "sento@example.com"))
        .await
        .unwrap();
    let sauna = repo.insert_sauna(sauna_draft("Shibuya Sauna")).await.unwrap();
    (repo, user, sauna)
}

fn weekly_submission(sauna_id: i64, dow: i16) -> LadiesDaySubmission {
    LadiesDaySubmission {
        sauna_id: Some(sauna_id),
        day_of_week: Some(dow),
        source_type: Some("USER".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_submission_requires_a_temporal_key() {
    let (repo, user, sauna) = setup().await;

    let neither = LadiesDaySubmission {
        sauna_id: Some(sauna.id.value()),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    let err = create_ladies_day(&repo, &user, neither).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let both = LadiesDaySubmission {
        sauna_id: Some(sauna.id.value()),
        day_of_week: Some(2),
        specific_date: Some("2025-07-01".to_string()),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    let err = create_ladies_day(&repo, &user, both).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_submission_rejects_missing_sauna_id() {
    let (repo, user, _) = setup().await;
    let submission = LadiesDaySubmission {
        day_of_week: Some(1),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    let err = create_ladies_day(&repo, &user, submission).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_submission_rejects_bad_source_type() {
    let (repo, user, sauna) = setup().await;
    let mut submission = weekly_submission(sauna.id.value(), 1);
    submission.source_type = Some("SCRAPED".to_string());
    let err = create_ladies_day(&repo, &user, submission).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let mut submission = weekly_submission(sauna.id.value(), 1);
    submission.source_type = None;
    let err = create_ladies_day(&repo, &user, submission).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_submission_rejects_out_of_range_weekday() {
    let (repo, user, sauna) = setup().await;
    let err = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 7))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_submission_unknown_sauna_is_not_found() {
    let (repo, user, _) = setup().await;
    let err = create_ladies_day(&repo, &user, weekly_submission(9999, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_duplicate_submission_is_a_conflict() {
    let (repo, user, sauna) = setup().await;

    let created = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 3))
        .await
        .unwrap();

    let err = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 3))
        .await
        .unwrap_err();
    match &err {
        RepositoryError::Conflict { context, .. } => {
            // The colliding entry's id is surfaced so clients can link to it.
            assert_eq!(
                context.entity_id.as_deref(),
                Some(created.entry.id.to_string().as_str())
            );
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    let entries = list_ladies_days(&repo, LadiesDayQuery::default()).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_same_slot_from_another_user_is_allowed() {
    let (repo, user, sauna) = setup().await;
    let other = repo
        .insert_user(NewUser::new("second_user", "second@example.com"))
        .await
        .unwrap();

    create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 3))
        .await
        .unwrap();
    create_ladies_day(&repo, &other, weekly_submission(sauna.id.value(), 3))
        .await
        .unwrap();

    let entries = list_ladies_days(&repo, LadiesDayQuery::default()).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_submission_seeds_score_and_counts_contribution() {
    let (repo, user, sauna) = setup().await;
    let reputable = User {
        trust_score: 4.0,
        ..user.clone()
    };

    let view = create_ladies_day(&repo, &reputable, weekly_submission(sauna.id.value(), 5))
        .await
        .unwrap();
    assert_eq!(view.entry.trust_score, 4.0);
    assert_eq!(view.entry.support_count, 0);
    assert_eq!(view.entry.opposition_count, 0);
    assert_eq!(view.sauna.as_ref().unwrap().name, "Shibuya Sauna");
    assert_eq!(view.source_user.as_ref().unwrap().username, "sento_lover");

    let stored = repo.fetch_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.contribution_count, 1);
}

#[tokio::test]
async fn test_vote_scenario_from_seed_to_split() {
    let (repo, user, sauna) = setup().await;
    let submitter = User {
        trust_score: 4.0,
        ..user.clone()
    };
    let view = create_ladies_day(&repo, &submitter, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();
    let entry_id = view.entry.id;

    let voter_a = repo
        .insert_user(NewUser::new("voter_a", "a@example.com"))
        .await
        .unwrap();
    let voter_b = repo
        .insert_user(NewUser::new("voter_b", "b@example.com"))
        .await
        .unwrap();

    let outcome = cast_vote(&repo, &voter_a, entry_id, "SUPPORT").await.unwrap();
    assert_eq!(outcome.support_count, 1);
    assert_eq!(outcome.opposition_count, 0);
    assert_eq!(outcome.trust_score, 5.0);

    let outcome = cast_vote(&repo, &voter_b, entry_id, "OPPOSE").await.unwrap();
    assert_eq!(outcome.support_count, 1);
    assert_eq!(outcome.opposition_count, 1);
    assert_eq!(outcome.trust_score, 2.5);

    let stored = repo.fetch_ladies_day(entry_id).await.unwrap().unwrap();
    assert_eq!(stored.support_count, 1);
    assert_eq!(stored.opposition_count, 1);
    assert_eq!(stored.trust_score, 2.5);
}

#[tokio::test]
async fn test_repeating_the_same_vote_is_rejected_without_change() {
    let (repo, user, sauna) = setup().await;
    let view = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();
    let voter = repo
        .insert_user(NewUser::new("voter", "voter@example.com"))
        .await
        .unwrap();

    cast_vote(&repo, &voter, view.entry.id, "SUPPORT").await.unwrap();
    let err = cast_vote(&repo, &voter, view.entry.id, "SUPPORT")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict { .. }));

    let stored = repo.fetch_ladies_day(view.entry.id).await.unwrap().unwrap();
    assert_eq!(stored.support_count, 1);
    assert_eq!(stored.opposition_count, 0);
    // One vote row total, matching the counts.
    let votes = repo.list_votes(view.entry.id).await.unwrap();
    assert_eq!(votes.len() as i32, stored.support_count + stored.opposition_count);
}

#[tokio::test]
async fn test_flipping_a_vote_moves_one_count_to_the_other() {
    let (repo, user, sauna) = setup().await;
    let view = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();
    let voter = repo
        .insert_user(NewUser::new("fickle", "fickle@example.com"))
        .await
        .unwrap();

    let first = cast_vote(&repo, &voter, view.entry.id, "SUPPORT").await.unwrap();
    assert_eq!((first.support_count, first.opposition_count), (1, 0));

    let flipped = cast_vote(&repo, &voter, view.entry.id, "OPPOSE").await.unwrap();
    assert_eq!(
        (flipped.support_count, flipped.opposition_count),
        (first.support_count - 1, first.opposition_count + 1)
    );
    assert_eq!(flipped.trust_score, 0.0);

    let votes = repo.list_votes(view.entry.id).await.unwrap();
    assert_eq!(votes.len(), 1);
}

#[tokio::test]
async fn test_vote_rejects_unknown_entry_and_bad_type() {
    let (repo, user, sauna) = setup().await;
    let view = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();

    let err = cast_vote(&repo, &user, crate::api::LadiesDayId::new(4242), "SUPPORT")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = cast_vote(&repo, &user, view.entry.id, "MAYBE").await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_list_filters_and_orders_by_trust() {
    let (repo, user, sauna) = setup().await;
    let other_sauna = repo.insert_sauna(sauna_draft("Ueno Sauna")).await.unwrap();

    let low = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 1))
        .await
        .unwrap();
    let high = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();
    create_ladies_day(&repo, &user, weekly_submission(other_sauna.id.value(), 1))
        .await
        .unwrap();

    let voter = repo
        .insert_user(NewUser::new("curator", "curator@example.com"))
        .await
        .unwrap();
    cast_vote(&repo, &voter, high.entry.id, "SUPPORT").await.unwrap();
    cast_vote(&repo, &voter, low.entry.id, "OPPOSE").await.unwrap();

    let views = list_ladies_days(
        &repo,
        LadiesDayQuery {
            sauna_id: Some(sauna.id.value()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].entry.id, high.entry.id);
    assert_eq!(views[1].entry.id, low.entry.id);

    let filtered = list_ladies_days(
        &repo,
        LadiesDayQuery {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].entry.id, high.entry.id);
}

#[tokio::test]
async fn test_today_unions_weekday_and_date_matches() {
    let (repo, user, sauna) = setup().await;
    // 2025-07-01 is a Tuesday.
    let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    assert_eq!(weekday_index(today), 2);

    let tuesday = create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 2))
        .await
        .unwrap();
    create_ladies_day(&repo, &user, weekly_submission(sauna.id.value(), 3))
        .await
        .unwrap();

    let dated = LadiesDaySubmission {
        sauna_id: Some(sauna.id.value()),
        specific_date: Some("2025-07-01".to_string()),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    let dated = create_ladies_day(&repo, &user, dated).await.unwrap();

    let other_date = LadiesDaySubmission {
        sauna_id: Some(sauna.id.value()),
        specific_date: Some("2025-07-08".to_string()),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    create_ladies_day(&repo, &user, other_date).await.unwrap();

    let view = today_ladies_days(&repo, today).await.unwrap();
    assert_eq!(view.date, today);
    assert_eq!(view.day_of_week, 2);

    let ids: Vec<_> = view.entries.iter().map(|v| v.entry.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&tuesday.entry.id));
    assert!(ids.contains(&dated.entry.id));
}

#[tokio::test]
async fn test_specific_date_accepts_timestamps_at_day_granularity() {
    let (repo, user, sauna) = setup().await;
    let submission = LadiesDaySubmission {
        sauna_id: Some(sauna.id.value()),
        specific_date: Some("2025-07-01T09:30:00+09:00".to_string()),
        source_type: Some("USER".to_string()),
        ..Default::default()
    };
    let view = create_ladies_day(&repo, &user, submission).await.unwrap();
    assert_eq!(
        view.entry.specific_date,
        Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    );
}
