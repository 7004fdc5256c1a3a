//! In-memory implementation of the tracker store.
//!
//! # Purpose
//! Backs local development and tests when no `DATABASE_URL` is configured.
//! All state lives in one `tokio::sync::RwLock`-guarded table set and is lost
//! on restart.
//!
//! # Consistency
//! The email uniqueness check and the insert happen under the same write lock,
//! so two concurrent registrations for one email cannot both succeed.
use super::{StoreError, StoreResult, TrackerStore};
use crate::model::{Lead, LeadInput, NewUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    leads: HashMap<i64, Lead>,
    next_user_id: i64,
    next_lead_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl TrackerStore for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        tables.next_user_id += 1;
        let stored = User {
            id: tables.next_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_leads(&self, user_id: i64) -> StoreResult<Vec<Lead>> {
        let tables = self.tables.read().await;
        let mut leads: Vec<Lead> = tables
            .leads
            .values()
            .filter(|lead| lead.user_id == user_id)
            .cloned()
            .collect();
        // Ids break ties between leads created within the same clock tick.
        leads.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(leads)
    }

    async fn get_lead(&self, id: i64) -> StoreResult<Lead> {
        let tables = self.tables.read().await;
        tables
            .leads
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("lead {id}")))
    }

    async fn create_lead(&self, user_id: i64, input: LeadInput) -> StoreResult<Lead> {
        let mut tables = self.tables.write().await;
        tables.next_lead_id += 1;
        let lead = Lead {
            id: tables.next_lead_id,
            client: input.client,
            title: input.title,
            date: input.date,
            value: input.value,
            likelihood: input.likelihood,
            status: input.status,
            user_id,
            created_at: Utc::now(),
        };
        tables.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn update_lead(&self, id: i64, input: LeadInput) -> StoreResult<Lead> {
        let mut tables = self.tables.write().await;
        let lead = tables
            .leads
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("lead {id}")))?;
        lead.client = input.client;
        lead.title = input.title;
        lead.date = input.date;
        lead.value = input.value;
        lead.likelihood = input.likelihood;
        lead.status = input.status;
        Ok(lead.clone())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
