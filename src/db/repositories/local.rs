//! In-memory repository implementation.
//!
//! Backs unit and integration tests and the default local-development
//! server build. All state lives behind a single `parking_lot::RwLock`;
//! ids are assigned sequentially from one counter shared by every table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::api::{
    Facility, FacilityId, LadiesDay, LadiesDayId, Review, ReviewId, Sauna, SaunaId, User, UserId,
    Vote, VoteType,
};
use crate::db::repository::{
    ErrorContext, FullRepository, LadiesDayFilter, LadiesDayRepository, RepositoryError,
    RepositoryResult, ReviewFilter, ReviewRepository, SaunaFilter, SaunaRepository,
    UserRepository,
};
use crate::models::ladies_day::{NewLadiesDay, TemporalKey};
use crate::models::review::{NewReview, ReviewPatch, ReviewVisibility};
use crate::models::sauna::NewSauna;
use crate::models::user::{NewUser, DEFAULT_TRUST_SCORE};

#[derive(Default)]
struct Store {
    users: HashMap<i64, User>,
    saunas: HashMap<i64, Sauna>,
    facilities: HashMap<i64, Facility>,
    ladies_days: HashMap<i64, LadiesDay>,
    /// Keyed by (user id, ladies-day id); one live vote per pair.
    votes: HashMap<(i64, i64), Vote>,
    reviews: HashMap<i64, Review>,
    /// Keyed by (user id, sauna id); the value is when it was favorited.
    favorites: HashMap<(i64, i64), DateTime<Utc>>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of all repository traits.
#[derive(Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_trust_support_created(entries: &mut [LadiesDay]) {
    entries.sort_by(|a, b| {
        b.trust_score
            .total_cmp(&a.trust_score)
            .then(b.support_count.cmp(&a.support_count))
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn insert_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let mut store = self.store.write();
        let id = store.next_id();
        let now = Utc::now();
        let user = User {
            id: UserId::new(id),
            username: new_user.username,
            email: new_user.email,
            avatar: new_user.avatar,
            trust_score: DEFAULT_TRUST_SCORE,
            contribution_count: 0,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(id, user.clone());
        Ok(user)
    }

    async fn fetch_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.store.read().users.get(&id.value()).cloned())
    }

    async fn increment_contribution(&self, id: UserId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let user = store.users.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("User {} not found", id),
                ErrorContext::new("increment_contribution").with_entity("user"),
            )
        })?;
        user.contribution_count += 1;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SaunaRepository for LocalRepository {
    async fn insert_sauna(&self, new_sauna: NewSauna) -> RepositoryResult<Sauna> {
        let mut store = self.store.write();
        let id = store.next_id();
        let now = Utc::now();
        let sauna = Sauna {
            id: SaunaId::new(id),
            name: new_sauna.name,
            address: new_sauna.address,
            latitude: new_sauna.latitude,
            longitude: new_sauna.longitude,
            phone: new_sauna.phone,
            website: new_sauna.website,
            description: new_sauna.description,
            price_range: new_sauna.price_range,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };
        store.saunas.insert(id, sauna.clone());

        for draft in new_sauna.facilities {
            let facility_id = store.next_id();
            store.facilities.insert(
                facility_id,
                Facility {
                    id: FacilityId::new(facility_id),
                    sauna_id: sauna.id,
                    name: draft.name,
                    category: draft.category,
                    temperature: draft.temperature,
                    description: draft.description,
                    is_women_only: draft.is_women_only,
                },
            );
        }

        Ok(sauna)
    }

    async fn fetch_sauna(&self, id: SaunaId) -> RepositoryResult<Option<Sauna>> {
        Ok(self.store.read().saunas.get(&id.value()).cloned())
    }

    async fn list_saunas(&self, filter: &SaunaFilter) -> RepositoryResult<(Vec<Sauna>, i64)> {
        let store = self.store.read();

        let mut matches: Vec<Sauna> = store
            .saunas
            .values()
            .filter(|sauna| {
                if let Some(ref term) = filter.search {
                    let term = term.to_lowercase();
                    if !sauna.name.to_lowercase().contains(&term)
                        && !sauna.address.to_lowercase().contains(&term)
                    {
                        return false;
                    }
                }
                if filter.has_ladies_day
                    && !store
                        .ladies_days
                        .values()
                        .any(|entry| entry.sauna_id == sauna.id)
                {
                    return false;
                }
                filter.facility_names.iter().all(|wanted| {
                    store.facilities.values().any(|facility| {
                        facility.sauna_id == sauna.id
                            && facility.name.eq_ignore_ascii_case(wanted)
                    })
                })
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.review_count.cmp(&a.review_count))
                .then(a.id.value().cmp(&b.id.value()))
        });

        let total = matches.len() as i64;
        let page: Vec<Sauna> = matches
            .into_iter()
            .skip(filter.page.offset())
            .take(filter.page.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn fetch_facilities(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<Facility>> {
        let store = self.store.read();
        let mut facilities: Vec<Facility> = store
            .facilities
            .values()
            .filter(|f| f.sauna_id == sauna_id)
            .cloned()
            .collect();
        facilities.sort_by_key(|f| f.id.value());
        Ok(facilities)
    }

    async fn update_rating(
        &self,
        sauna_id: SaunaId,
        rating: f64,
        review_count: i32,
    ) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let sauna = store.saunas.get_mut(&sauna_id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Sauna {} not found", sauna_id),
                ErrorContext::new("update_rating").with_entity("sauna"),
            )
        })?;
        sauna.rating = rating;
        sauna.review_count = review_count;
        sauna.updated_at = Utc::now();
        Ok(())
    }

    async fn is_favorite(&self, user_id: UserId, sauna_id: SaunaId) -> RepositoryResult<bool> {
        Ok(self
            .store
            .read()
            .favorites
            .contains_key(&(user_id.value(), sauna_id.value())))
    }

    async fn set_favorite(
        &self,
        user_id: UserId,
        sauna_id: SaunaId,
        favorited: bool,
    ) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let key = (user_id.value(), sauna_id.value());
        if favorited {
            store.favorites.entry(key).or_insert_with(Utc::now);
        } else {
            store.favorites.remove(&key);
        }
        Ok(())
    }

    async fn list_favorite_saunas(&self, user_id: UserId) -> RepositoryResult<Vec<Sauna>> {
        let store = self.store.read();
        let mut marked: Vec<(DateTime<Utc>, Sauna)> = store
            .favorites
            .iter()
            .filter(|((uid, _), _)| *uid == user_id.value())
            .filter_map(|((_, sid), at)| store.saunas.get(sid).map(|s| (*at, s.clone())))
            .collect();
        marked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(marked.into_iter().map(|(_, sauna)| sauna).collect())
    }

    async fn count_favorites(&self, sauna_id: SaunaId) -> RepositoryResult<i64> {
        Ok(self
            .store
            .read()
            .favorites
            .keys()
            .filter(|(_, sid)| *sid == sauna_id.value())
            .count() as i64)
    }
}

#[async_trait]
impl LadiesDayRepository for LocalRepository {
    async fn insert_ladies_day(&self, new_entry: NewLadiesDay) -> RepositoryResult<LadiesDay> {
        let mut store = self.store.write();
        let id = store.next_id();
        let now = Utc::now();
        let entry = LadiesDay {
            id: LadiesDayId::new(id),
            sauna_id: new_entry.sauna_id,
            day_of_week: new_entry.schedule.day_of_week(),
            specific_date: new_entry.schedule.specific_date(),
            start_time: new_entry.start_time,
            end_time: new_entry.end_time,
            is_official: new_entry.is_official,
            source_type: new_entry.source_type,
            source_user_id: new_entry.source_user_id,
            trust_score: new_entry.trust_score,
            support_count: 0,
            opposition_count: 0,
            created_at: now,
            updated_at: now,
        };
        store.ladies_days.insert(id, entry.clone());
        Ok(entry)
    }

    async fn fetch_ladies_day(&self, id: LadiesDayId) -> RepositoryResult<Option<LadiesDay>> {
        Ok(self.store.read().ladies_days.get(&id.value()).cloned())
    }

    async fn find_duplicate(
        &self,
        sauna_id: SaunaId,
        schedule: &TemporalKey,
        source_user_id: UserId,
    ) -> RepositoryResult<Option<LadiesDay>> {
        let store = self.store.read();
        Ok(store
            .ladies_days
            .values()
            .find(|entry| {
                entry.sauna_id == sauna_id
                    && entry.source_user_id == Some(source_user_id)
                    && entry.day_of_week == schedule.day_of_week()
                    && entry.specific_date == schedule.specific_date()
            })
            .cloned())
    }

    async fn list_ladies_days(
        &self,
        filter: &LadiesDayFilter,
    ) -> RepositoryResult<Vec<LadiesDay>> {
        let store = self.store.read();
        let mut entries: Vec<LadiesDay> = store
            .ladies_days
            .values()
            .filter(|entry| {
                filter.sauna_id.map_or(true, |id| entry.sauna_id == id)
                    && filter
                        .specific_date
                        .map_or(true, |date| entry.specific_date == Some(date))
                    && filter
                        .day_of_week
                        .map_or(true, |dow| entry.day_of_week == Some(dow))
            })
            .cloned()
            .collect();
        sort_by_trust_support_created(&mut entries);
        Ok(entries)
    }

    async fn ladies_days_on(
        &self,
        weekday: i16,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<LadiesDay>> {
        let store = self.store.read();
        let mut entries: Vec<LadiesDay> = store
            .ladies_days
            .values()
            .filter(|entry| entry.occurs_on(weekday, date))
            .cloned()
            .collect();
        sort_by_trust_support_created(&mut entries);
        Ok(entries)
    }

    async fn list_for_sauna(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<LadiesDay>> {
        let store = self.store.read();
        let mut entries: Vec<LadiesDay> = store
            .ladies_days
            .values()
            .filter(|entry| entry.sauna_id == sauna_id)
            .cloned()
            .collect();
        sort_by_trust_support_created(&mut entries);
        Ok(entries)
    }

    async fn fetch_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
    ) -> RepositoryResult<Option<Vote>> {
        Ok(self
            .store
            .read()
            .votes
            .get(&(user_id.value(), ladies_day_id.value()))
            .cloned())
    }

    async fn insert_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote> {
        let mut store = self.store.write();
        let key = (user_id.value(), ladies_day_id.value());
        if store.votes.contains_key(&key) {
            return Err(RepositoryError::conflict_with_context(
                "Vote already exists for this user and entry",
                ErrorContext::new("insert_vote")
                    .with_entity("vote")
                    .with_entity_id(ladies_day_id),
            ));
        }
        let vote = Vote {
            user_id,
            ladies_day_id,
            vote_type,
            created_at: Utc::now(),
        };
        store.votes.insert(key, vote.clone());
        Ok(vote)
    }

    async fn update_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote> {
        let mut store = self.store.write();
        let vote = store
            .votes
            .get_mut(&(user_id.value(), ladies_day_id.value()))
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Vote not found",
                    ErrorContext::new("update_vote")
                        .with_entity("vote")
                        .with_entity_id(ladies_day_id),
                )
            })?;
        vote.vote_type = vote_type;
        Ok(vote.clone())
    }

    async fn list_votes(&self, ladies_day_id: LadiesDayId) -> RepositoryResult<Vec<Vote>> {
        let store = self.store.read();
        let mut votes: Vec<Vote> = store
            .votes
            .values()
            .filter(|vote| vote.ladies_day_id == ladies_day_id)
            .cloned()
            .collect();
        votes.sort_by_key(|vote| vote.user_id.value());
        Ok(votes)
    }

    async fn update_vote_stats(
        &self,
        ladies_day_id: LadiesDayId,
        support_count: i32,
        opposition_count: i32,
        trust_score: f64,
    ) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let entry = store
            .ladies_days
            .get_mut(&ladies_day_id.value())
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Ladies day {} not found", ladies_day_id),
                    ErrorContext::new("update_vote_stats").with_entity("ladies_day"),
                )
            })?;
        entry.support_count = support_count;
        entry.opposition_count = opposition_count;
        entry.trust_score = trust_score;
        entry.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for LocalRepository {
    async fn insert_review(&self, new_review: NewReview) -> RepositoryResult<Review> {
        let mut store = self.store.write();
        let id = store.next_id();
        let now = Utc::now();
        let review = Review {
            id: ReviewId::new(id),
            sauna_id: new_review.sauna_id,
            user_id: new_review.user_id,
            rating: new_review.rating,
            title: new_review.title,
            content: new_review.content,
            visit_date: new_review.visit_date,
            visibility: new_review.visibility,
            created_at: now,
            updated_at: now,
        };
        store.reviews.insert(id, review.clone());
        Ok(review)
    }

    async fn fetch_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>> {
        Ok(self.store.read().reviews.get(&id.value()).cloned())
    }

    async fn find_review_by_author(
        &self,
        sauna_id: SaunaId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Review>> {
        let store = self.store.read();
        Ok(store
            .reviews
            .values()
            .find(|review| review.sauna_id == sauna_id && review.user_id == user_id)
            .cloned())
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> RepositoryResult<(Vec<Review>, i64)> {
        let store = self.store.read();
        let mut matches: Vec<Review> = store
            .reviews
            .values()
            .filter(|review| {
                if let Some(sauna_id) = filter.sauna_id {
                    if review.sauna_id != sauna_id {
                        return false;
                    }
                }
                match filter.user_id {
                    // Listing a user's own reviews includes every visibility.
                    Some(user_id) => review.user_id == user_id,
                    None => review.visibility == ReviewVisibility::Public,
                }
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.value().cmp(&a.id.value()))
        });

        let total = matches.len() as i64;
        let page: Vec<Review> = matches
            .into_iter()
            .skip(filter.page.offset())
            .take(filter.page.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepositoryResult<Review> {
        let mut store = self.store.write();
        let review = store.reviews.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Review {} not found", id),
                ErrorContext::new("update_review").with_entity("review"),
            )
        })?;
        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        if let Some(title) = patch.title {
            review.title = title;
        }
        if let Some(content) = patch.content {
            review.content = content;
        }
        if let Some(visit_date) = patch.visit_date {
            review.visit_date = visit_date;
        }
        if let Some(visibility) = patch.visibility {
            review.visibility = visibility;
        }
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: ReviewId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store.reviews.remove(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Review {} not found", id),
                ErrorContext::new("delete_review").with_entity("review"),
            )
        })?;
        Ok(())
    }

    async fn public_ratings(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<i32>> {
        let store = self.store.read();
        Ok(store
            .reviews
            .values()
            .filter(|review| {
                review.sauna_id == sauna_id && review.visibility == ReviewVisibility::Public
            })
            .map(|review| review.rating)
            .collect())
    }

    async fn recent_public_reviews(
        &self,
        sauna_id: SaunaId,
        limit: i64,
    ) -> RepositoryResult<Vec<Review>> {
        let store = self.store.read();
        let mut reviews: Vec<Review> = store
            .reviews
            .values()
            .filter(|review| {
                review.sauna_id == sauna_id && review.visibility == ReviewVisibility::Public
            })
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews.truncate(limit.max(0) as usize);
        Ok(reviews)
    }

    async fn count_reviews(&self, sauna_id: SaunaId) -> RepositoryResult<i64> {
        Ok(self
            .store
            .read()
            .reviews
            .values()
            .filter(|review| review.sauna_id == sauna_id)
            .count() as i64)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sauna::NewFacility;
    use crate::models::sauna::FacilityCategory;

    fn sauna_draft(name: &str) -> NewSauna {
        NewSauna {
            name: name.to_string(),
            address: "1-2-3 Test".to_string(),
            latitude: 35.0,
            longitude: 139.0,
            phone: None,
            website: None,
            description: None,
            price_range: "~1000yen".to_string(),
            facilities: vec![NewFacility {
                name: "Cold bath".to_string(),
                category: FacilityCategory::Bath,
                temperature: Some(16.0),
                description: None,
                is_women_only: false,
            }],
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_sauna() {
        let repo = LocalRepository::new();
        let sauna = repo.insert_sauna(sauna_draft("Test Sauna")).await.unwrap();
        let fetched = repo.fetch_sauna(sauna.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Test Sauna");

        let facilities = repo.fetch_facilities(sauna.id).await.unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].name, "Cold bath");
    }

    #[tokio::test]
    async fn test_favorite_roundtrip() {
        let repo = LocalRepository::new();
        let user = repo
            .insert_user(NewUser::new("alice", "alice@example.com"))
            .await
            .unwrap();
        let sauna = repo.insert_sauna(sauna_draft("Fav Sauna")).await.unwrap();

        assert!(!repo.is_favorite(user.id, sauna.id).await.unwrap());
        repo.set_favorite(user.id, sauna.id, true).await.unwrap();
        assert!(repo.is_favorite(user.id, sauna.id).await.unwrap());
        assert_eq!(repo.count_favorites(sauna.id).await.unwrap(), 1);
        repo.set_favorite(user.id, sauna.id, false).await.unwrap();
        assert!(!repo.is_favorite(user.id, sauna.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_vote_insert_rejected() {
        let repo = LocalRepository::new();
        let user = repo
            .insert_user(NewUser::new("bob", "bob@example.com"))
            .await
            .unwrap();
        let sauna = repo.insert_sauna(sauna_draft("Vote Sauna")).await.unwrap();
        let entry = repo
            .insert_ladies_day(NewLadiesDay {
                sauna_id: sauna.id,
                schedule: TemporalKey::Weekly(2),
                start_time: None,
                end_time: None,
                is_official: false,
                source_type: crate::api::SourceType::User,
                source_user_id: Some(user.id),
                trust_score: 3.0,
            })
            .await
            .unwrap();

        repo.insert_vote(user.id, entry.id, VoteType::Support)
            .await
            .unwrap();
        let err = repo
            .insert_vote(user.id, entry.id, VoteType::Oppose)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }
}
