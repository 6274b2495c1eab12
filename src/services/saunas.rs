//! Sauna directory business logic: listing, detail, creation, favorites.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::api::{Facility, LadiesDay, Review, Sauna, SaunaId, User, UserId};
use crate::db::repository::{
    FullRepository, LadiesDayRepository, Pagination, RepositoryError, RepositoryResult,
    ReviewRepository, SaunaFilter, SaunaRepository, UserRepository,
};
use crate::models::sauna::{NewFacility, NewSauna};
use crate::services::geo;
use crate::services::ladies_days::SubmitterInfo;

/// How many public reviews ride along on the detail view.
const DETAIL_REVIEW_LIMIT: i64 = 5;

/// Query parameters for the directory listing.
#[derive(Debug, Clone)]
pub struct SaunaListQuery {
    pub search: Option<String>,
    pub has_ladies_day: bool,
    pub facilities: Vec<String>,
    /// Both present: attach distances and sort the page nearest-first.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub page: u32,
    pub limit: u32,
}

impl Default for SaunaListQuery {
    fn default() -> Self {
        Self {
            search: None,
            has_ladies_day: false,
            facilities: Vec::new(),
            lat: None,
            lng: None,
            page: 1,
            limit: 20,
        }
    }
}

/// Pagination metadata echoed back with listings.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + i64::from(limit) - 1) / i64::from(limit)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// A schedule entry with its submitter, nested under a sauna.
#[derive(Debug, Clone)]
pub struct EntryWithSubmitter {
    pub entry: LadiesDay,
    pub source_user: Option<SubmitterInfo>,
}

/// One row of the directory listing.
#[derive(Debug, Clone)]
pub struct SaunaListItem {
    pub sauna: Sauna,
    pub facilities: Vec<Facility>,
    pub ladies_days: Vec<EntryWithSubmitter>,
    pub distance_km: Option<f64>,
}

/// A full directory page.
#[derive(Debug, Clone)]
pub struct SaunaListPage {
    pub items: Vec<SaunaListItem>,
    pub meta: PageMeta,
}

/// Review with its author, nested under the detail view.
#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: Option<AuthorInfo>,
}

/// Reviewer identity shown next to a review.
#[derive(Debug, Clone)]
pub struct AuthorInfo {
    pub username: String,
    pub avatar: Option<String>,
    pub trust_score: f64,
}

impl From<User> for AuthorInfo {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            avatar: user.avatar,
            trust_score: user.trust_score,
        }
    }
}

/// Everything the venue page needs in one response.
#[derive(Debug, Clone)]
pub struct SaunaDetail {
    pub sauna: Sauna,
    pub facilities: Vec<Facility>,
    pub ladies_days: Vec<EntryWithSubmitter>,
    pub reviews: Vec<ReviewWithAuthor>,
    pub review_count: i64,
    pub favorite_count: i64,
    pub is_favorited: bool,
}

/// Raw creation payload; required fields are validated here, not by the
/// deserializer, so the client gets one coherent message.
#[derive(Debug, Clone, Default)]
pub struct SaunaSubmission {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub price_range: Option<String>,
    pub facilities: Vec<FacilitySubmission>,
}

/// Facility payload nested in a sauna submission.
#[derive(Debug, Clone, Default)]
pub struct FacilitySubmission {
    pub name: String,
    pub category: Option<String>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

/// A favorited sauna with its today-relevance flag.
#[derive(Debug, Clone)]
pub struct FavoriteSauna {
    pub sauna: Sauna,
    pub has_ladies_day_today: bool,
}

async fn entries_with_submitters(
    repo: &dyn FullRepository,
    sauna_id: SaunaId,
) -> RepositoryResult<Vec<EntryWithSubmitter>> {
    let entries = repo.list_for_sauna(sauna_id).await?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let source_user = match entry.source_user_id {
            Some(user_id) => repo.fetch_user(user_id).await?.map(SubmitterInfo::from),
            None => None,
        };
        out.push(EntryWithSubmitter { entry, source_user });
    }
    Ok(out)
}

/// Directory listing with filters, pagination, and optional
/// nearest-first ordering of the returned page.
pub async fn list_saunas(
    repo: &dyn FullRepository,
    query: SaunaListQuery,
) -> RepositoryResult<SaunaListPage> {
    let filter = SaunaFilter {
        search: query.search.clone(),
        has_ladies_day: query.has_ladies_day,
        facility_names: query.facilities.clone(),
        page: Pagination::new(query.page, query.limit),
    };

    let (saunas, total) = repo.list_saunas(&filter).await?;

    let mut items = Vec::with_capacity(saunas.len());
    for sauna in saunas {
        let facilities = repo.fetch_facilities(sauna.id).await?;
        let ladies_days = entries_with_submitters(repo, sauna.id).await?;
        let distance_km = match (query.lat, query.lng) {
            (Some(lat), Some(lng)) => {
                Some(geo::distance_km(lat, lng, sauna.latitude, sauna.longitude))
            }
            _ => None,
        };
        items.push(SaunaListItem {
            sauna,
            facilities,
            ladies_days,
            distance_km,
        });
    }

    if query.lat.is_some() && query.lng.is_some() {
        items.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
        });
    }

    Ok(SaunaListPage {
        items,
        meta: PageMeta::new(filter.page.page, filter.page.limit, total),
    })
}

/// Venue page: sauna, facilities, schedule entries, review preview,
/// counts, and the viewer's favorite state when a viewer is known.
pub async fn get_sauna(
    repo: &dyn FullRepository,
    sauna_id: SaunaId,
    viewer: Option<UserId>,
) -> RepositoryResult<SaunaDetail> {
    let sauna = repo
        .fetch_sauna(sauna_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Sauna not found"))?;

    let facilities = repo.fetch_facilities(sauna_id).await?;
    let ladies_days = entries_with_submitters(repo, sauna_id).await?;

    let recent = repo
        .recent_public_reviews(sauna_id, DETAIL_REVIEW_LIMIT)
        .await?;
    let mut reviews = Vec::with_capacity(recent.len());
    for review in recent {
        let author = repo.fetch_user(review.user_id).await?.map(AuthorInfo::from);
        reviews.push(ReviewWithAuthor { review, author });
    }

    let review_count = repo.count_reviews(sauna_id).await?;
    let favorite_count = repo.count_favorites(sauna_id).await?;
    let is_favorited = match viewer {
        Some(user_id) => repo.is_favorite(user_id, sauna_id).await?,
        None => false,
    };

    Ok(SaunaDetail {
        sauna,
        facilities,
        ladies_days,
        reviews,
        review_count,
        favorite_count,
        is_favorited,
    })
}

/// Create a sauna with its facilities.
pub async fn create_sauna(
    repo: &dyn FullRepository,
    submission: SaunaSubmission,
) -> RepositoryResult<(Sauna, Vec<Facility>)> {
    let (name, address, latitude, longitude, price_range) = match (
        submission.name,
        submission.address,
        submission.latitude,
        submission.longitude,
        submission.price_range,
    ) {
        (Some(name), Some(address), Some(lat), Some(lng), Some(price_range)) => {
            (name, address, lat, lng, price_range)
        }
        _ => {
            return Err(RepositoryError::validation(
                "Name, address, coordinates, and price range are required",
            ))
        }
    };

    let mut facilities = Vec::with_capacity(submission.facilities.len());
    for draft in submission.facilities {
        let category = match draft.category {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| RepositoryError::validation(e))?,
            None => crate::api::FacilityCategory::Other,
        };
        facilities.push(NewFacility {
            name: draft.name,
            category,
            temperature: draft.temperature,
            description: draft.description,
            is_women_only: draft.is_women_only,
        });
    }

    let sauna = repo
        .insert_sauna(NewSauna {
            name,
            address,
            latitude,
            longitude,
            phone: submission.phone,
            website: submission.website,
            description: submission.description,
            price_range,
            facilities,
        })
        .await?;

    let facilities = repo.fetch_facilities(sauna.id).await?;
    Ok((sauna, facilities))
}

/// Flip the viewer's favorite mark; returns the new state.
pub async fn toggle_favorite(
    repo: &dyn FullRepository,
    actor: &User,
    sauna_id: SaunaId,
) -> RepositoryResult<bool> {
    repo.fetch_sauna(sauna_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Sauna not found"))?;

    let currently = repo.is_favorite(actor.id, sauna_id).await?;
    repo.set_favorite(actor.id, sauna_id, !currently).await?;
    Ok(!currently)
}

/// The viewer's favorites, each flagged when it runs a ladies-only window
/// today.
pub async fn list_favorites(
    repo: &dyn FullRepository,
    actor: &User,
    today: NaiveDate,
) -> RepositoryResult<Vec<FavoriteSauna>> {
    let saunas = repo.list_favorite_saunas(actor.id).await?;

    let weekday = crate::services::ladies_days::weekday_index(today);
    let todays: HashSet<SaunaId> = repo
        .ladies_days_on(weekday, today)
        .await?
        .into_iter()
        .map(|entry| entry.sauna_id)
        .collect();

    Ok(saunas
        .into_iter()
        .map(|sauna| FavoriteSauna {
            has_ladies_day_today: todays.contains(&sauna.id),
            sauna,
        })
        .collect())
}
