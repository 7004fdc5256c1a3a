//! Postgres implementation of the tracker store.
//!
//! # Purpose
//! Durable storage for principals and leads. Migrations under `./migrations`
//! run at connect time, before any request is served.
//!
//! # Key invariants
//! - The `users.email` unique index is the single source of truth for
//!   principal uniqueness; a violation (SQLSTATE `23505`) maps to
//!   [`StoreError::Conflict`].
//! - `leads.created_at` is assigned by the database.
//!
//! # Security notes
//! Database URLs may carry credentials; never log `PostgresConfig::url`.
use super::{StoreError, StoreResult, TrackerStore};
use crate::config::PostgresConfig;
use crate::model::{Lead, LeadInput, NewUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

const LEAD_COLUMNS: &str =
    "id, client, title, date, value, likelihood, status, user_id, created_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a pool and apply pending migrations.
    ///
    /// # Errors
    /// - Invalid URL, connection timeout, or migration failure.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections = pg.max_connections, "postgres store ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TrackerStore for PostgresStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, name, email, password_hash",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;
        match inserted {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_leads(&self, user_id: i64) -> StoreResult<Vec<Lead>> {
        let leads = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    async fn get_lead(&self, id: i64) -> StoreResult<Lead> {
        sqlx::query_as::<_, Lead>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("lead {id}")))
    }

    async fn create_lead(&self, user_id: i64, input: LeadInput) -> StoreResult<Lead> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "INSERT INTO leads (client, title, date, value, likelihood, status, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LEAD_COLUMNS}"
        ))
        .bind(&input.client)
        .bind(&input.title)
        .bind(&input.date)
        .bind(input.value)
        .bind(input.likelihood)
        .bind(&input.status)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(lead)
    }

    async fn update_lead(&self, id: i64, input: LeadInput) -> StoreResult<Lead> {
        sqlx::query_as::<_, Lead>(&format!(
            "UPDATE leads SET client = $1, title = $2, date = $3, value = $4, \
             likelihood = $5, status = $6 WHERE id = $7 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(&input.client)
        .bind(&input.title)
        .bind(&input.date)
        .bind(input.value)
        .bind(input.likelihood)
        .bind(&input.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("lead {id}")))
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}
