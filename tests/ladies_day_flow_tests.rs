//! End-to-end flows for schedule entries: submission, voting, and the
//! derived-field invariants, run through the service layer against the
//! in-memory repository.

use chrono::NaiveDate;

use ladysauna::api::{SourceType, User, VoteType};
use ladysauna::db::repository::{
    LadiesDayRepository, RepositoryError, SaunaRepository, UserRepository,
};
use ladysauna::db::LocalRepository;
use ladysauna::models::sauna::NewSauna;
use ladysauna::models::user::NewUser;
use ladysauna::services::ladies_days::{
    cast_vote, create_ladies_day, list_ladies_days, today_ladies_days, LadiesDayQuery,
    LadiesDaySubmission,
};
use ladysauna::services::trust;

fn sauna_draft(name: &str) -> NewSauna {
    NewSauna {
        name: name.to_string(),
        address: "3-4-5 Asakusa, Taito".to_string(),
        latitude: 35.714,
        longitude: 139.796,
        phone: None,
        website: None,
        description: None,
        price_range: "~2000yen".to_string(),
        facilities: vec![],
    }
}

async fn user_named(repo: &LocalRepository, name: &str) -> User {
    repo.insert_user(NewUser::new(name, format!("{}@example.com", name)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_tally_always_matches_ledger_through_mixed_voting() {
    let repo = LocalRepository::new();
    let submitter = user_named(&repo, "submitter").await;
    let sauna = repo.insert_sauna(sauna_draft("Ledger Sauna")).await.unwrap();

    let entry = create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(4),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .entry;

    let voters = [
        ("v1", "SUPPORT"),
        ("v2", "SUPPORT"),
        ("v3", "OPPOSE"),
        ("v4", "SUPPORT"),
        ("v5", "OPPOSE"),
    ];
    let mut users = Vec::new();
    for (name, vote) in voters {
        let user = user_named(&repo, name).await;
        cast_vote(&repo, &user, entry.id, vote).await.unwrap();
        users.push(user);
    }

    // v3 flips to SUPPORT, v1 flips to OPPOSE.
    cast_vote(&repo, &users[2], entry.id, "SUPPORT").await.unwrap();
    let outcome = cast_vote(&repo, &users[0], entry.id, "OPPOSE").await.unwrap();

    let votes = repo.list_votes(entry.id).await.unwrap();
    let stored = repo.fetch_ladies_day(entry.id).await.unwrap().unwrap();

    // Counts are exact counts over the ledger after every vote.
    assert_eq!(votes.len(), 5);
    assert_eq!(
        stored.support_count + stored.opposition_count,
        votes.len() as i32
    );
    assert_eq!(stored.support_count, 3);
    assert_eq!(stored.opposition_count, 2);
    assert_eq!(outcome.trust_score, 3.0); // 3/5 * 5

    // The stored score matches the pure recompute over the same ledger.
    let recomputed = trust::recompute(&votes);
    assert_eq!(recomputed.support_count, stored.support_count);
    assert_eq!(recomputed.opposition_count, stored.opposition_count);
    assert_eq!(recomputed.trust_score, Some(stored.trust_score));

    let support = votes
        .iter()
        .filter(|v| v.vote_type == VoteType::Support)
        .count();
    assert_eq!(support, 3);
}

#[tokio::test]
async fn test_unvoted_entry_keeps_its_seeded_score() {
    let repo = LocalRepository::new();
    let submitter = User {
        trust_score: 4.2,
        ..user_named(&repo, "veteran").await
    };
    let sauna = repo.insert_sauna(sauna_draft("Seed Sauna")).await.unwrap();

    let view = create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(0),
            source_type: Some("OFFICIAL".to_string()),
            is_official: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(view.entry.trust_score, 4.2);
    assert_eq!(view.entry.source_type, SourceType::Official);
    assert!(view.entry.is_official);

    let stored = repo.fetch_ladies_day(view.entry.id).await.unwrap().unwrap();
    assert_eq!(stored.trust_score, 4.2);
    assert_eq!(stored.support_count, 0);
    assert_eq!(stored.opposition_count, 0);
}

#[tokio::test]
async fn test_weekly_and_dated_entries_are_distinct_dedup_keys() {
    let repo = LocalRepository::new();
    let submitter = user_named(&repo, "planner").await;
    let sauna = repo.insert_sauna(sauna_draft("Key Sauna")).await.unwrap();

    // 2025-07-01 is a Tuesday; a weekly-Tuesday entry and a dated entry
    // for that Tuesday do not collide.
    create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(2),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            specific_date: Some("2025-07-01".to_string()),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Repeating the dated submission does collide.
    let err = create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            specific_date: Some("2025-07-01".to_string()),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict { .. }));

    // Both entries show up in the today view for that Tuesday.
    let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let view = today_ladies_days(&repo, today).await.unwrap();
    assert_eq!(view.entries.len(), 2);
}

#[tokio::test]
async fn test_list_join_includes_venue_and_submitter() {
    let repo = LocalRepository::new();
    let submitter = user_named(&repo, "joiner").await;
    let sauna = repo.insert_sauna(sauna_draft("Join Sauna")).await.unwrap();

    create_ladies_day(
        &repo,
        &submitter,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(6),
            start_time: Some("10:00".to_string()),
            end_time: Some("14:00".to_string()),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let views = list_ladies_days(&repo, LadiesDayQuery::default()).await.unwrap();
    assert_eq!(views.len(), 1);

    let view = &views[0];
    assert_eq!(view.entry.start_time.as_deref(), Some("10:00"));
    assert_eq!(view.sauna.as_ref().unwrap().name, "Join Sauna");
    assert_eq!(view.source_user.as_ref().unwrap().username, "joiner");
    assert_eq!(
        view.source_user.as_ref().unwrap().trust_score,
        submitter.trust_score
    );
}
