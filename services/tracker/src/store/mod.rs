//! Storage abstraction for principals and leads.
//!
//! # Purpose
//! Handlers depend on [`TrackerStore`] only, so the in-memory and Postgres
//! backends are interchangeable at startup.
//!
//! # Key invariants
//! - Emails are unique across principals; a duplicate insert fails with
//!   [`StoreError::Conflict`] rather than creating a second row.
//! - Lead listings are ordered newest `created_at` first.
use crate::model::{Lead, LeadInput, NewUser, User};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TrackerStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn list_leads(&self, user_id: i64) -> StoreResult<Vec<Lead>>;
    async fn get_lead(&self, id: i64) -> StoreResult<Lead>;
    async fn create_lead(&self, user_id: i64, input: LeadInput) -> StoreResult<Lead>;
    async fn update_lead(&self, id: i64, input: LeadInput) -> StoreResult<Lead>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
