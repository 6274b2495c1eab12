use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{facilities, favorites, ladies_days, reviews, saunas, users, votes};
use crate::api::{
    Facility, FacilityId, LadiesDay, LadiesDayId, Review, ReviewId, Sauna, SaunaId, User, UserId,
    Vote,
};
use crate::db::repository::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub trust_score: f64,
    pub contribution_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_domain(self) -> User {
        User {
            id: UserId::new(self.id),
            username: self.username,
            email: self.email,
            avatar: self.avatar,
            trust_score: self.trust_score,
            contribution_count: self.contribution_count,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub trust_score: f64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = saunas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaunaRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub price_range: String,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SaunaRow {
    pub fn into_domain(self) -> Sauna {
        Sauna {
            id: SaunaId::new(self.id),
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            phone: self.phone,
            website: self.website,
            description: self.description,
            price_range: self.price_range,
            rating: self.rating,
            review_count: self.review_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = saunas)]
pub struct NewSaunaRow {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub price_range: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = facilities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FacilityRow {
    pub id: i64,
    pub sauna_id: i64,
    pub name: String,
    pub category: String,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

impl FacilityRow {
    pub fn into_domain(self) -> RepositoryResult<Facility> {
        Ok(Facility {
            id: FacilityId::new(self.id),
            sauna_id: SaunaId::new(self.sauna_id),
            name: self.name,
            category: self
                .category
                .parse()
                .map_err(RepositoryError::internal)?,
            temperature: self.temperature,
            description: self.description,
            is_women_only: self.is_women_only,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = facilities)]
pub struct NewFacilityRow {
    pub sauna_id: i64,
    pub name: String,
    pub category: String,
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub is_women_only: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ladies_days)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LadiesDayRow {
    pub id: i64,
    pub sauna_id: i64,
    pub day_of_week: Option<i16>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: String,
    pub source_user_id: Option<i64>,
    pub trust_score: f64,
    pub support_count: i32,
    pub opposition_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LadiesDayRow {
    pub fn into_domain(self) -> RepositoryResult<LadiesDay> {
        Ok(LadiesDay {
            id: LadiesDayId::new(self.id),
            sauna_id: SaunaId::new(self.sauna_id),
            day_of_week: self.day_of_week,
            specific_date: self.specific_date,
            start_time: self.start_time,
            end_time: self.end_time,
            is_official: self.is_official,
            source_type: self
                .source_type
                .parse()
                .map_err(RepositoryError::internal)?,
            source_user_id: self.source_user_id.map(UserId::new),
            trust_score: self.trust_score,
            support_count: self.support_count,
            opposition_count: self.opposition_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ladies_days)]
pub struct NewLadiesDayRow {
    pub sauna_id: i64,
    pub day_of_week: Option<i16>,
    pub specific_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_official: bool,
    pub source_type: String,
    pub source_user_id: Option<i64>,
    pub trust_score: f64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoteRow {
    pub user_id: i64,
    pub ladies_day_id: i64,
    pub vote_type: String,
    pub created_at: DateTime<Utc>,
}

impl VoteRow {
    pub fn into_domain(self) -> RepositoryResult<Vote> {
        Ok(Vote {
            user_id: UserId::new(self.user_id),
            ladies_day_id: LadiesDayId::new(self.ladies_day_id),
            vote_type: self
                .vote_type
                .parse()
                .map_err(RepositoryError::internal)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub struct NewVoteRow {
    pub user_id: i64,
    pub ladies_day_id: i64,
    pub vote_type: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: i64,
    pub sauna_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub visit_date: NaiveDate,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewRow {
    pub fn into_domain(self) -> RepositoryResult<Review> {
        Ok(Review {
            id: ReviewId::new(self.id),
            sauna_id: SaunaId::new(self.sauna_id),
            user_id: UserId::new(self.user_id),
            rating: self.rating,
            title: self.title,
            content: self.content,
            visit_date: self.visit_date,
            visibility: self
                .visibility
                .parse()
                .map_err(RepositoryError::internal)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub sauna_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub title: String,
    pub content: String,
    pub visit_date: NaiveDate,
    pub visibility: String,
}

/// Partial update for a review; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reviews)]
pub struct ReviewChangeset {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub visibility: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorites)]
pub struct NewFavoriteRow {
    pub user_id: i64,
    pub sauna_id: i64,
}
