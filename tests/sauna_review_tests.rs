//! Integration tests for the sauna directory, favorites, and review
//! lifecycle (including the derived venue rating).

use chrono::NaiveDate;

use ladysauna::db::repository::{RepositoryError, SaunaRepository, UserRepository};
use ladysauna::db::LocalRepository;
use ladysauna::models::user::NewUser;
use ladysauna::services::ladies_days::{create_ladies_day, LadiesDaySubmission};
use ladysauna::services::reviews::{
    create_review, delete_review, list_reviews, my_reviews, update_review, ReviewListQuery,
    ReviewSubmission, ReviewUpdate,
};
use ladysauna::services::saunas::{
    create_sauna, get_sauna, list_favorites, list_saunas, toggle_favorite, FacilitySubmission,
    SaunaListQuery, SaunaSubmission,
};

fn submission(name: &str, lat: f64, lng: f64) -> SaunaSubmission {
    SaunaSubmission {
        name: Some(name.to_string()),
        address: Some(format!("{} street", name)),
        latitude: Some(lat),
        longitude: Some(lng),
        price_range: Some("~1200yen".to_string()),
        ..Default::default()
    }
}

fn review_for(sauna_id: i64, rating: i32) -> ReviewSubmission {
    ReviewSubmission {
        sauna_id: Some(sauna_id),
        rating: Some(rating),
        title: Some("Great steam".to_string()),
        content: Some("Proper loyly, quiet rest area.".to_string()),
        visit_date: Some("2025-06-15".to_string()),
        visibility: None,
    }
}

#[tokio::test]
async fn test_create_sauna_requires_core_fields() {
    let repo = LocalRepository::new();
    let incomplete = SaunaSubmission {
        name: Some("No Address Sauna".to_string()),
        ..Default::default()
    };
    let err = create_sauna(&repo, incomplete).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_create_sauna_with_facilities_and_search() {
    let repo = LocalRepository::new();

    let mut with_facilities = submission("Kanda Sauna", 35.69, 139.77);
    with_facilities.facilities = vec![
        FacilitySubmission {
            name: "Finnish sauna".to_string(),
            category: Some("SAUNA".to_string()),
            temperature: Some(92.0),
            ..Default::default()
        },
        FacilitySubmission {
            name: "Cold bath".to_string(),
            category: Some("BATH".to_string()),
            temperature: Some(15.0),
            ..Default::default()
        },
    ];
    let (sauna, facilities) = create_sauna(&repo, with_facilities).await.unwrap();
    assert_eq!(facilities.len(), 2);

    create_sauna(&repo, submission("Ebisu Spa", 35.64, 139.71))
        .await
        .unwrap();

    let page = list_saunas(
        &repo,
        SaunaListQuery {
            search: Some("kanda".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].sauna.id, sauna.id);

    let page = list_saunas(
        &repo,
        SaunaListQuery {
            facilities: vec!["cold bath".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].sauna.id, sauna.id);
}

#[tokio::test]
async fn test_listing_sorts_page_by_distance_when_located() {
    let repo = LocalRepository::new();
    // Near Tokyo Station vs. near Yokohama.
    let (near, _) = create_sauna(&repo, submission("Near Sauna", 35.682, 139.766))
        .await
        .unwrap();
    let (far, _) = create_sauna(&repo, submission("Far Sauna", 35.454, 139.631))
        .await
        .unwrap();

    let page = list_saunas(
        &repo,
        SaunaListQuery {
            lat: Some(35.68),
            lng: Some(139.76),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].sauna.id, near.id);
    assert_eq!(page.items[1].sauna.id, far.id);
    let near_distance = page.items[0].distance_km.unwrap();
    let far_distance = page.items[1].distance_km.unwrap();
    assert!(near_distance < 1.0);
    assert!(far_distance > 20.0);
}

#[tokio::test]
async fn test_has_ladies_day_filter() {
    let repo = LocalRepository::new();
    let user = repo
        .insert_user(NewUser::new("poster", "poster@example.com"))
        .await
        .unwrap();
    let (with_entry, _) = create_sauna(&repo, submission("Scheduled Sauna", 35.0, 139.0))
        .await
        .unwrap();
    create_sauna(&repo, submission("Plain Sauna", 35.1, 139.1))
        .await
        .unwrap();

    create_ladies_day(
        &repo,
        &user,
        LadiesDaySubmission {
            sauna_id: Some(with_entry.id.value()),
            day_of_week: Some(1),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let page = list_saunas(
        &repo,
        SaunaListQuery {
            has_ladies_day: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.items[0].sauna.id, with_entry.id);
    assert_eq!(page.items[0].ladies_days.len(), 1);
}

#[tokio::test]
async fn test_favorite_toggle_and_today_flag() {
    let repo = LocalRepository::new();
    let user = repo
        .insert_user(NewUser::new("fav_user", "fav@example.com"))
        .await
        .unwrap();
    let (sauna, _) = create_sauna(&repo, submission("Fav Sauna", 35.0, 139.0))
        .await
        .unwrap();

    assert!(toggle_favorite(&repo, &user, sauna.id).await.unwrap());
    // 2025-07-01 is a Tuesday.
    let tuesday = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

    let favorites = list_favorites(&repo, &user, tuesday).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert!(!favorites[0].has_ladies_day_today);

    create_ladies_day(
        &repo,
        &user,
        LadiesDaySubmission {
            sauna_id: Some(sauna.id.value()),
            day_of_week: Some(2),
            source_type: Some("USER".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let favorites = list_favorites(&repo, &user, tuesday).await.unwrap();
    assert!(favorites[0].has_ladies_day_today);

    // Toggle off removes it from the listing.
    assert!(!toggle_favorite(&repo, &user, sauna.id).await.unwrap());
    assert!(list_favorites(&repo, &user, tuesday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_review_lifecycle_updates_venue_rating() {
    let repo = LocalRepository::new();
    let alice = repo
        .insert_user(NewUser::new("alice", "alice@example.com"))
        .await
        .unwrap();
    let bob = repo
        .insert_user(NewUser::new("bob", "bob@example.com"))
        .await
        .unwrap();
    let (sauna, _) = create_sauna(&repo, submission("Rated Sauna", 35.0, 139.0))
        .await
        .unwrap();

    create_review(&repo, &alice, review_for(sauna.id.value(), 4))
        .await
        .unwrap();
    let stored = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 4.0);
    assert_eq!(stored.review_count, 1);

    create_review(&repo, &bob, review_for(sauna.id.value(), 2))
        .await
        .unwrap();
    let stored = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 3.0);
    assert_eq!(stored.review_count, 2);

    // One review per user per sauna.
    let err = create_review(&repo, &alice, review_for(sauna.id.value(), 5))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict { .. }));

    // Contribution counters moved for both authors.
    let alice_now = repo.fetch_user(alice.id).await.unwrap().unwrap();
    assert_eq!(alice_now.contribution_count, 1);
}

#[tokio::test]
async fn test_review_rating_bounds_and_ownership() {
    let repo = LocalRepository::new();
    let owner = repo
        .insert_user(NewUser::new("owner", "owner@example.com"))
        .await
        .unwrap();
    let stranger = repo
        .insert_user(NewUser::new("stranger", "stranger@example.com"))
        .await
        .unwrap();
    let (sauna, _) = create_sauna(&repo, submission("Owned Sauna", 35.0, 139.0))
        .await
        .unwrap();

    let err = create_review(&repo, &owner, review_for(sauna.id.value(), 6))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let created = create_review(&repo, &owner, review_for(sauna.id.value(), 4))
        .await
        .unwrap();

    let err = update_review(
        &repo,
        &stranger,
        created.review.id,
        ReviewUpdate {
            rating: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::Forbidden { .. }));

    let updated = update_review(
        &repo,
        &owner,
        created.review.id,
        ReviewUpdate {
            rating: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.review.rating, 5);
    let stored = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 5.0);

    let err = delete_review(&repo, &stranger, created.review.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Forbidden { .. }));

    delete_review(&repo, &owner, created.review.id).await.unwrap();
    let stored = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
    assert_eq!(stored.rating, 0.0);
    assert_eq!(stored.review_count, 0);
}

#[tokio::test]
async fn test_visibility_rules_in_listings() {
    let repo = LocalRepository::new();
    let author = repo
        .insert_user(NewUser::new("shy", "shy@example.com"))
        .await
        .unwrap();
    let (sauna, _) = create_sauna(&repo, submission("Quiet Sauna", 35.0, 139.0))
        .await
        .unwrap();

    let mut private = review_for(sauna.id.value(), 5);
    private.visibility = Some("PRIVATE".to_string());
    create_review(&repo, &author, private).await.unwrap();

    // Private reviews stay out of the public listing...
    let page = list_reviews(
        &repo,
        ReviewListQuery {
            sauna_id: Some(sauna.id.value()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 0);

    // ...and out of the venue rating.
    let stored = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
    assert_eq!(stored.review_count, 0);

    // But the author sees their own.
    let mine = my_reviews(&repo, &author, 1, 10).await.unwrap();
    assert_eq!(mine.meta.total, 1);

    // Detail view shows only public reviews.
    let detail = get_sauna(&repo, sauna.id, Some(author.id)).await.unwrap();
    assert!(detail.reviews.is_empty());
    assert_eq!(detail.review_count, 1);
}
