//! Review business logic, including the derived sauna rating.
//!
//! The sauna's `rating`/`review_count` pair is rebuilt from the set of
//! public reviews after every mutation, mirroring how schedule-entry
//! tallies are rebuilt from the vote ledger.

use chrono::NaiveDate;

use crate::api::{Review, ReviewId, ReviewVisibility, Sauna, SaunaId, User};
use crate::db::repository::{
    ErrorContext, FullRepository, Pagination, RepositoryError, RepositoryResult, ReviewFilter,
    ReviewRepository, SaunaRepository, UserRepository,
};
use crate::models::review::{NewReview, ReviewPatch};
use crate::services::saunas::{AuthorInfo, PageMeta};

/// Raw review submission from the client.
#[derive(Debug, Clone, Default)]
pub struct ReviewSubmission {
    pub sauna_id: Option<i64>,
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    /// `YYYY-MM-DD`.
    pub visit_date: Option<String>,
    pub visibility: Option<String>,
}

/// Raw partial update from the client.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub visit_date: Option<String>,
    pub visibility: Option<String>,
}

/// Query parameters for review listings.
#[derive(Debug, Clone, Default)]
pub struct ReviewListQuery {
    pub sauna_id: Option<i64>,
    pub user_id: Option<i64>,
    pub page: u32,
    pub limit: u32,
}

/// A review with its author and venue context.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub review: Review,
    pub author: Option<AuthorInfo>,
    pub sauna: Option<ReviewSaunaInfo>,
}

/// Venue fields shown next to a review.
#[derive(Debug, Clone)]
pub struct ReviewSaunaInfo {
    pub name: String,
    pub address: String,
}

impl From<Sauna> for ReviewSaunaInfo {
    fn from(sauna: Sauna) -> Self {
        Self {
            name: sauna.name,
            address: sauna.address,
        }
    }
}

/// A page of reviews.
#[derive(Debug, Clone)]
pub struct ReviewListPage {
    pub items: Vec<ReviewView>,
    pub meta: PageMeta,
}

fn parse_visit_date(raw: &str) -> RepositoryResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|_| RepositoryError::validation(format!("Invalid visitDate: {}", raw)))
}

fn parse_visibility(raw: &str) -> RepositoryResult<ReviewVisibility> {
    raw.parse()
        .map_err(|_| RepositoryError::validation(format!("Invalid visibility: {}", raw)))
}

fn check_rating(rating: i32) -> RepositoryResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(RepositoryError::validation(
            "Rating must be between 1 and 5",
        ));
    }
    Ok(())
}

/// Rebuild the sauna's rating and review count from its public reviews.
async fn refresh_sauna_rating(
    repo: &dyn FullRepository,
    sauna_id: SaunaId,
) -> RepositoryResult<()> {
    let ratings = repo.public_ratings(sauna_id).await?;
    let rating = if ratings.is_empty() {
        0.0
    } else {
        f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64
    };
    repo.update_rating(sauna_id, rating, ratings.len() as i32)
        .await
}

/// Create a review; one per (user, sauna).
pub async fn create_review(
    repo: &dyn FullRepository,
    actor: &User,
    submission: ReviewSubmission,
) -> RepositoryResult<ReviewView> {
    let (sauna_id, rating, title, content, visit_date) = match (
        submission.sauna_id,
        submission.rating,
        submission.title,
        submission.content,
        submission.visit_date,
    ) {
        (Some(sauna_id), Some(rating), Some(title), Some(content), Some(visit_date)) => {
            (SaunaId::new(sauna_id), rating, title, content, visit_date)
        }
        _ => {
            return Err(RepositoryError::validation(
                "All required fields must be provided",
            ))
        }
    };

    check_rating(rating)?;
    let visit_date = parse_visit_date(&visit_date)?;
    let visibility = match submission.visibility {
        Some(raw) => parse_visibility(&raw)?,
        None => ReviewVisibility::Public,
    };

    let sauna = repo
        .fetch_sauna(sauna_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Sauna not found"))?;

    if let Some(existing) = repo.find_review_by_author(sauna_id, actor.id).await? {
        return Err(RepositoryError::conflict_with_context(
            "You have already reviewed this sauna",
            ErrorContext::new("create_review")
                .with_entity("review")
                .with_entity_id(existing.id),
        ));
    }

    let review = repo
        .insert_review(NewReview {
            sauna_id,
            user_id: actor.id,
            rating,
            title,
            content,
            visit_date,
            visibility,
        })
        .await?;

    refresh_sauna_rating(repo, sauna_id).await?;
    repo.increment_contribution(actor.id).await?;

    Ok(ReviewView {
        review,
        author: Some(AuthorInfo::from(actor.clone())),
        sauna: Some(ReviewSaunaInfo::from(sauna)),
    })
}

async fn attach_review_context(
    repo: &dyn FullRepository,
    reviews: Vec<Review>,
) -> RepositoryResult<Vec<ReviewView>> {
    let mut views = Vec::with_capacity(reviews.len());
    for review in reviews {
        let author = repo.fetch_user(review.user_id).await?.map(AuthorInfo::from);
        let sauna = repo
            .fetch_sauna(review.sauna_id)
            .await?
            .map(ReviewSaunaInfo::from);
        views.push(ReviewView {
            review,
            author,
            sauna,
        });
    }
    Ok(views)
}

/// Public review listing with optional venue/user filters.
pub async fn list_reviews(
    repo: &dyn FullRepository,
    query: ReviewListQuery,
) -> RepositoryResult<ReviewListPage> {
    let page = Pagination::new(query.page.max(1), if query.limit == 0 { 10 } else { query.limit });
    let filter = ReviewFilter {
        sauna_id: query.sauna_id.map(SaunaId::new),
        user_id: query.user_id.map(crate::api::UserId::new),
        page,
    };

    let (reviews, total) = repo.list_reviews(&filter).await?;
    let items = attach_review_context(repo, reviews).await?;

    Ok(ReviewListPage {
        items,
        meta: PageMeta::new(page.page, page.limit, total),
    })
}

/// The caller's own reviews, every visibility level included.
pub async fn my_reviews(
    repo: &dyn FullRepository,
    actor: &User,
    page: u32,
    limit: u32,
) -> RepositoryResult<ReviewListPage> {
    list_reviews(
        repo,
        ReviewListQuery {
            sauna_id: None,
            user_id: Some(actor.id.value()),
            page,
            limit,
        },
    )
    .await
}

/// Update an owned review; recomputes the sauna rating when the rating
/// changed.
pub async fn update_review(
    repo: &dyn FullRepository,
    actor: &User,
    review_id: ReviewId,
    update: ReviewUpdate,
) -> RepositoryResult<ReviewView> {
    let existing = repo
        .fetch_review(review_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Review not found"))?;

    if existing.user_id != actor.id {
        return Err(RepositoryError::forbidden(
            "Not authorized to update this review",
        ));
    }

    if let Some(rating) = update.rating {
        check_rating(rating)?;
    }

    let patch = ReviewPatch {
        rating: update.rating,
        title: update.title,
        content: update.content,
        visit_date: match update.visit_date {
            Some(raw) => Some(parse_visit_date(&raw)?),
            None => None,
        },
        visibility: match update.visibility {
            Some(raw) => Some(parse_visibility(&raw)?),
            None => None,
        },
    };

    let rating_changed = patch.rating.is_some() || patch.visibility.is_some();
    let updated = repo.update_review(review_id, patch).await?;

    if rating_changed {
        refresh_sauna_rating(repo, existing.sauna_id).await?;
    }

    let author = repo.fetch_user(updated.user_id).await?.map(AuthorInfo::from);
    let sauna = repo
        .fetch_sauna(updated.sauna_id)
        .await?
        .map(ReviewSaunaInfo::from);

    Ok(ReviewView {
        review: updated,
        author,
        sauna,
    })
}

/// Delete an owned review and rebuild the sauna's rating.
pub async fn delete_review(
    repo: &dyn FullRepository,
    actor: &User,
    review_id: ReviewId,
) -> RepositoryResult<()> {
    let existing = repo
        .fetch_review(review_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Review not found"))?;

    if existing.user_id != actor.id {
        return Err(RepositoryError::forbidden(
            "Not authorized to delete this review",
        ));
    }

    repo.delete_review(review_id).await?;
    refresh_sauna_rating(repo, existing.sauna_id).await
}
