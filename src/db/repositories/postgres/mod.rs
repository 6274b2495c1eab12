//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres
//! database, with connection pooling, automatic retry for transient
//! failures, and embedded migrations.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task;

use crate::api::{
    Facility, LadiesDay, LadiesDayId, Review, ReviewId, Sauna, SaunaId, User, UserId, Vote,
    VoteType,
};
use crate::db::repository::{
    ErrorContext, FullRepository, LadiesDayFilter, LadiesDayRepository, RepositoryError,
    RepositoryResult, ReviewFilter, ReviewRepository, SaunaFilter, SaunaRepository,
    UserRepository,
};
use crate::models::ladies_day::{NewLadiesDay, TemporalKey};
use crate::models::review::{NewReview, ReviewPatch};
use crate::models::sauna::NewSauna;
use crate::models::user::{NewUser, DEFAULT_TRUST_SCORE};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: parse_var("PG_MAX_RETRIES", 3) as u32,
            retry_delay_ms: parse_var("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries the operation up to `max_retries` times when a retryable
    /// error occurs (connection errors, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn insert_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let row = NewUserRow {
            username: new_user.username,
            email: new_user.email,
            avatar: new_user.avatar,
            trust_score: DEFAULT_TRUST_SCORE,
        };
        self.with_conn(move |conn| {
            let inserted: UserRow = diesel::insert_into(users::table)
                .values(&row)
                .get_result(conn)
                .map_err(RepositoryError::from)?;
            Ok(inserted.into_domain())
        })
        .await
    }

    async fn fetch_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.with_conn(move |conn| {
            let row: Option<UserRow> = users::table
                .find(id.value())
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            Ok(row.map(UserRow::into_domain))
        })
        .await
    }

    async fn increment_contribution(&self, id: UserId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.find(id.value()))
                .set((
                    users::contribution_count.eq(users::contribution_count + 1),
                    users::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("User {} not found", id),
                    ErrorContext::new("increment_contribution").with_entity("user"),
                ));
            }
            Ok(())
        })
        .await
    }
}

fn filtered_saunas<'a>(
    filter: &'a SaunaFilter,
) -> saunas::BoxedQuery<'a, diesel::pg::Pg> {
    let mut query = saunas::table.into_boxed();

    if let Some(ref term) = filter.search {
        let pattern = format!("%{}%", term);
        query = query.filter(
            saunas::name
                .ilike(pattern.clone())
                .or(saunas::address.ilike(pattern)),
        );
    }

    if filter.has_ladies_day {
        query = query.filter(exists(
            ladies_days::table.filter(ladies_days::sauna_id.eq(saunas::id)),
        ));
    }

    for name in &filter.facility_names {
        query = query.filter(exists(
            facilities::table
                .filter(facilities::sauna_id.eq(saunas::id))
                .filter(facilities::name.ilike(name)),
        ));
    }

    query
}

#[async_trait]
impl SaunaRepository for PostgresRepository {
    async fn insert_sauna(&self, new_sauna: NewSauna) -> RepositoryResult<Sauna> {
        self.with_conn(move |conn| {
            let sauna_row = NewSaunaRow {
                name: new_sauna.name.clone(),
                address: new_sauna.address.clone(),
                latitude: new_sauna.latitude,
                longitude: new_sauna.longitude,
                phone: new_sauna.phone.clone(),
                website: new_sauna.website.clone(),
                description: new_sauna.description.clone(),
                price_range: new_sauna.price_range.clone(),
            };

            // The sauna and its facilities land together or not at all.
            let inserted = conn.transaction::<SaunaRow, RepositoryError, _>(|conn| {
                let inserted: SaunaRow = diesel::insert_into(saunas::table)
                    .values(&sauna_row)
                    .get_result(conn)
                    .map_err(RepositoryError::from)?;

                if !new_sauna.facilities.is_empty() {
                    let facility_rows: Vec<NewFacilityRow> = new_sauna
                        .facilities
                        .iter()
                        .map(|draft| NewFacilityRow {
                            sauna_id: inserted.id,
                            name: draft.name.clone(),
                            category: draft.category.as_str().to_string(),
                            temperature: draft.temperature,
                            description: draft.description.clone(),
                            is_women_only: draft.is_women_only,
                        })
                        .collect();
                    diesel::insert_into(facilities::table)
                        .values(&facility_rows)
                        .execute(conn)
                        .map_err(RepositoryError::from)?;
                }

                Ok(inserted)
            })?;

            Ok(inserted.into_domain())
        })
        .await
    }

    async fn fetch_sauna(&self, id: SaunaId) -> RepositoryResult<Option<Sauna>> {
        self.with_conn(move |conn| {
            let row: Option<SaunaRow> = saunas::table
                .find(id.value())
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            Ok(row.map(SaunaRow::into_domain))
        })
        .await
    }

    async fn list_saunas(&self, filter: &SaunaFilter) -> RepositoryResult<(Vec<Sauna>, i64)> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let total: i64 = filtered_saunas(&filter)
                .count()
                .get_result(conn)
                .map_err(RepositoryError::from)?;

            let rows: Vec<SaunaRow> = filtered_saunas(&filter)
                .order(saunas::rating.desc())
                .then_order_by(saunas::review_count.desc())
                .then_order_by(saunas::id.asc())
                .offset(filter.page.offset() as i64)
                .limit(filter.page.limit as i64)
                .select(SaunaRow::as_select())
                .load(conn)
                .map_err(RepositoryError::from)?;

            Ok((
                rows.into_iter().map(SaunaRow::into_domain).collect(),
                total,
            ))
        })
        .await
    }

    async fn fetch_facilities(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<Facility>> {
        self.with_conn(move |conn| {
            let rows: Vec<FacilityRow> = facilities::table
                .filter(facilities::sauna_id.eq(sauna_id.value()))
                .order(facilities::id.asc())
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(FacilityRow::into_domain).collect()
        })
        .await
    }

    async fn update_rating(
        &self,
        sauna_id: SaunaId,
        rating: f64,
        review_count: i32,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(saunas::table.find(sauna_id.value()))
                .set((
                    saunas::rating.eq(rating),
                    saunas::review_count.eq(review_count),
                    saunas::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Sauna {} not found", sauna_id),
                    ErrorContext::new("update_rating").with_entity("sauna"),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn is_favorite(&self, user_id: UserId, sauna_id: SaunaId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let found: Option<i64> = favorites::table
                .find((user_id.value(), sauna_id.value()))
                .select(favorites::user_id)
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            Ok(found.is_some())
        })
        .await
    }

    async fn set_favorite(
        &self,
        user_id: UserId,
        sauna_id: SaunaId,
        favorited: bool,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            if favorited {
                diesel::insert_into(favorites::table)
                    .values(&NewFavoriteRow {
                        user_id: user_id.value(),
                        sauna_id: sauna_id.value(),
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(RepositoryError::from)?;
            } else {
                diesel::delete(favorites::table.find((user_id.value(), sauna_id.value())))
                    .execute(conn)
                    .map_err(RepositoryError::from)?;
            }
            Ok(())
        })
        .await
    }

    async fn list_favorite_saunas(&self, user_id: UserId) -> RepositoryResult<Vec<Sauna>> {
        self.with_conn(move |conn| {
            let rows: Vec<SaunaRow> = favorites::table
                .inner_join(saunas::table)
                .filter(favorites::user_id.eq(user_id.value()))
                .order(favorites::created_at.desc())
                .select(SaunaRow::as_select())
                .load(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows.into_iter().map(SaunaRow::into_domain).collect())
        })
        .await
    }

    async fn count_favorites(&self, sauna_id: SaunaId) -> RepositoryResult<i64> {
        self.with_conn(move |conn| {
            favorites::table
                .filter(favorites::sauna_id.eq(sauna_id.value()))
                .count()
                .get_result(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }
}

#[async_trait]
impl LadiesDayRepository for PostgresRepository {
    async fn insert_ladies_day(&self, new_entry: NewLadiesDay) -> RepositoryResult<LadiesDay> {
        let row = NewLadiesDayRow {
            sauna_id: new_entry.sauna_id.value(),
            day_of_week: new_entry.schedule.day_of_week(),
            specific_date: new_entry.schedule.specific_date(),
            start_time: new_entry.start_time,
            end_time: new_entry.end_time,
            is_official: new_entry.is_official,
            source_type: new_entry.source_type.as_str().to_string(),
            source_user_id: new_entry.source_user_id.map(|id| id.value()),
            trust_score: new_entry.trust_score,
        };
        self.with_conn(move |conn| {
            let inserted: LadiesDayRow = diesel::insert_into(ladies_days::table)
                .values(&row)
                .get_result(conn)
                .map_err(RepositoryError::from)?;
            inserted.into_domain()
        })
        .await
    }

    async fn fetch_ladies_day(&self, id: LadiesDayId) -> RepositoryResult<Option<LadiesDay>> {
        self.with_conn(move |conn| {
            let row: Option<LadiesDayRow> = ladies_days::table
                .find(id.value())
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(LadiesDayRow::into_domain).transpose()
        })
        .await
    }

    async fn find_duplicate(
        &self,
        sauna_id: SaunaId,
        schedule: &TemporalKey,
        source_user_id: UserId,
    ) -> RepositoryResult<Option<LadiesDay>> {
        let schedule = *schedule;
        self.with_conn(move |conn| {
            let mut query = ladies_days::table
                .filter(ladies_days::sauna_id.eq(sauna_id.value()))
                .filter(ladies_days::source_user_id.eq(source_user_id.value()))
                .into_boxed();

            query = match schedule {
                TemporalKey::Weekly(dow) => query
                    .filter(ladies_days::day_of_week.eq(dow))
                    .filter(ladies_days::specific_date.is_null()),
                TemporalKey::Date(date) => query
                    .filter(ladies_days::specific_date.eq(date))
                    .filter(ladies_days::day_of_week.is_null()),
            };

            let row: Option<LadiesDayRow> = query
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(LadiesDayRow::into_domain).transpose()
        })
        .await
    }

    async fn list_ladies_days(
        &self,
        filter: &LadiesDayFilter,
    ) -> RepositoryResult<Vec<LadiesDay>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = ladies_days::table.into_boxed();

            if let Some(sauna_id) = filter.sauna_id {
                query = query.filter(ladies_days::sauna_id.eq(sauna_id.value()));
            }
            if let Some(date) = filter.specific_date {
                query = query.filter(ladies_days::specific_date.eq(date));
            }
            if let Some(dow) = filter.day_of_week {
                query = query.filter(ladies_days::day_of_week.eq(dow));
            }

            let rows: Vec<LadiesDayRow> = query
                .order(ladies_days::trust_score.desc())
                .then_order_by(ladies_days::support_count.desc())
                .then_order_by(ladies_days::created_at.desc())
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(LadiesDayRow::into_domain).collect()
        })
        .await
    }

    async fn ladies_days_on(
        &self,
        weekday: i16,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<LadiesDay>> {
        self.with_conn(move |conn| {
            let rows: Vec<LadiesDayRow> = ladies_days::table
                .filter(
                    ladies_days::day_of_week
                        .eq(weekday)
                        .or(ladies_days::specific_date.eq(date)),
                )
                .order((
                    ladies_days::trust_score.desc(),
                    ladies_days::support_count.desc(),
                ))
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(LadiesDayRow::into_domain).collect()
        })
        .await
    }

    async fn list_for_sauna(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<LadiesDay>> {
        self.with_conn(move |conn| {
            let rows: Vec<LadiesDayRow> = ladies_days::table
                .filter(ladies_days::sauna_id.eq(sauna_id.value()))
                .order((
                    ladies_days::trust_score.desc(),
                    ladies_days::support_count.desc(),
                ))
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(LadiesDayRow::into_domain).collect()
        })
        .await
    }

    async fn fetch_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
    ) -> RepositoryResult<Option<Vote>> {
        self.with_conn(move |conn| {
            let row: Option<VoteRow> = votes::table
                .find((user_id.value(), ladies_day_id.value()))
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(VoteRow::into_domain).transpose()
        })
        .await
    }

    async fn insert_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote> {
        let row = NewVoteRow {
            user_id: user_id.value(),
            ladies_day_id: ladies_day_id.value(),
            vote_type: vote_type.as_str().to_string(),
        };
        self.with_conn(move |conn| {
            let inserted: VoteRow = diesel::insert_into(votes::table)
                .values(&row)
                .get_result(conn)
                .map_err(RepositoryError::from)?;
            inserted.into_domain()
        })
        .await
    }

    async fn update_vote(
        &self,
        user_id: UserId,
        ladies_day_id: LadiesDayId,
        vote_type: VoteType,
    ) -> RepositoryResult<Vote> {
        self.with_conn(move |conn| {
            let updated: VoteRow = diesel::update(
                votes::table.find((user_id.value(), ladies_day_id.value())),
            )
            .set(votes::vote_type.eq(vote_type.as_str().to_string()))
            .get_result(conn)
            .map_err(RepositoryError::from)?;
            updated.into_domain()
        })
        .await
    }

    async fn list_votes(&self, ladies_day_id: LadiesDayId) -> RepositoryResult<Vec<Vote>> {
        self.with_conn(move |conn| {
            let rows: Vec<VoteRow> = votes::table
                .filter(votes::ladies_day_id.eq(ladies_day_id.value()))
                .order(votes::user_id.asc())
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(VoteRow::into_domain).collect()
        })
        .await
    }

    async fn update_vote_stats(
        &self,
        ladies_day_id: LadiesDayId,
        support_count: i32,
        opposition_count: i32,
        trust_score: f64,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(ladies_days::table.find(ladies_day_id.value()))
                .set((
                    ladies_days::support_count.eq(support_count),
                    ladies_days::opposition_count.eq(opposition_count),
                    ladies_days::trust_score.eq(trust_score),
                    ladies_days::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Ladies day {} not found", ladies_day_id),
                    ErrorContext::new("update_vote_stats").with_entity("ladies_day"),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ReviewRepository for PostgresRepository {
    async fn insert_review(&self, new_review: NewReview) -> RepositoryResult<Review> {
        let row = NewReviewRow {
            sauna_id: new_review.sauna_id.value(),
            user_id: new_review.user_id.value(),
            rating: new_review.rating,
            title: new_review.title,
            content: new_review.content,
            visit_date: new_review.visit_date,
            visibility: new_review.visibility.as_str().to_string(),
        };
        self.with_conn(move |conn| {
            let inserted: ReviewRow = diesel::insert_into(reviews::table)
                .values(&row)
                .get_result(conn)
                .map_err(RepositoryError::from)?;
            inserted.into_domain()
        })
        .await
    }

    async fn fetch_review(&self, id: ReviewId) -> RepositoryResult<Option<Review>> {
        self.with_conn(move |conn| {
            let row: Option<ReviewRow> = reviews::table
                .find(id.value())
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(ReviewRow::into_domain).transpose()
        })
        .await
    }

    async fn find_review_by_author(
        &self,
        sauna_id: SaunaId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Review>> {
        self.with_conn(move |conn| {
            let row: Option<ReviewRow> = reviews::table
                .filter(reviews::sauna_id.eq(sauna_id.value()))
                .filter(reviews::user_id.eq(user_id.value()))
                .first(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(ReviewRow::into_domain).transpose()
        })
        .await
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> RepositoryResult<(Vec<Review>, i64)> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let build = |filter: &ReviewFilter| {
                let mut query = reviews::table.into_boxed();
                if let Some(sauna_id) = filter.sauna_id {
                    query = query.filter(reviews::sauna_id.eq(sauna_id.value()));
                }
                match filter.user_id {
                    // A user's own listing includes every visibility level.
                    Some(user_id) => query = query.filter(reviews::user_id.eq(user_id.value())),
                    None => query = query.filter(reviews::visibility.eq("PUBLIC")),
                }
                query
            };

            let total: i64 = build(&filter)
                .count()
                .get_result(conn)
                .map_err(RepositoryError::from)?;

            let rows: Vec<ReviewRow> = build(&filter)
                .order(reviews::created_at.desc())
                .then_order_by(reviews::id.desc())
                .offset(filter.page.offset() as i64)
                .limit(filter.page.limit as i64)
                .load(conn)
                .map_err(RepositoryError::from)?;

            let reviews = rows
                .into_iter()
                .map(ReviewRow::into_domain)
                .collect::<RepositoryResult<Vec<Review>>>()?;
            Ok((reviews, total))
        })
        .await
    }

    async fn update_review(&self, id: ReviewId, patch: ReviewPatch) -> RepositoryResult<Review> {
        let changeset = ReviewChangeset {
            rating: patch.rating,
            title: patch.title,
            content: patch.content,
            visit_date: patch.visit_date,
            visibility: patch.visibility.map(|v| v.as_str().to_string()),
            updated_at: Utc::now(),
        };
        self.with_conn(move |conn| {
            let updated: ReviewRow = diesel::update(reviews::table.find(id.value()))
                .set(&changeset)
                .get_result(conn)
                .map_err(RepositoryError::from)?;
            updated.into_domain()
        })
        .await
    }

    async fn delete_review(&self, id: ReviewId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(reviews::table.find(id.value()))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Review {} not found", id),
                    ErrorContext::new("delete_review").with_entity("review"),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn public_ratings(&self, sauna_id: SaunaId) -> RepositoryResult<Vec<i32>> {
        self.with_conn(move |conn| {
            reviews::table
                .filter(reviews::sauna_id.eq(sauna_id.value()))
                .filter(reviews::visibility.eq("PUBLIC"))
                .select(reviews::rating)
                .load(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn recent_public_reviews(
        &self,
        sauna_id: SaunaId,
        limit: i64,
    ) -> RepositoryResult<Vec<Review>> {
        self.with_conn(move |conn| {
            let rows: Vec<ReviewRow> = reviews::table
                .filter(reviews::sauna_id.eq(sauna_id.value()))
                .filter(reviews::visibility.eq("PUBLIC"))
                .order(reviews::created_at.desc())
                .limit(limit)
                .load(conn)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(ReviewRow::into_domain).collect()
        })
        .await
    }

    async fn count_reviews(&self, sauna_id: SaunaId) -> RepositoryResult<i64> {
        self.with_conn(move |conn| {
            reviews::table
                .filter(reviews::sauna_id.eq(sauna_id.value()))
                .count()
                .get_result(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(true)
        })
        .await
    }
}
