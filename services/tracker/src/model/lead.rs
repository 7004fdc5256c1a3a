//! Sales lead records and dashboard statistics.
//!
//! # Key invariants
//! - `won` and `lost` are the only terminal statuses; every other status counts
//!   as active pipeline.
//! - The win rate is `won / (won + lost) * 100` and is `0` when nothing has
//!   closed yet.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

pub const STATUS_WON: &str = "won";
pub const STATUS_LOST: &str = "lost";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Lead {
    pub id: i64,
    pub client: String,
    pub title: String,
    /// ISO-8601 calendar date as entered by the user.
    pub date: Option<String>,
    pub value: f64,
    /// Percent chance of closing.
    pub likelihood: i32,
    pub status: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn is_closed(&self) -> bool {
        self.status == STATUS_WON || self.status == STATUS_LOST
    }
}

/// Client-editable lead fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadInput {
    pub client: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub likelihood: i32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientValue {
    pub client: String,
    pub value: f64,
}

/// Aggregate pipeline statistics for one owner's leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadSummary {
    pub active_count: usize,
    pub active_value: f64,
    pub won_count: usize,
    pub closed_count: usize,
    /// Won share of closed leads as a whole percent.
    pub win_rate: f64,
    pub by_status: BTreeMap<String, usize>,
    /// Total value per client, largest first.
    pub by_client: Vec<ClientValue>,
}

impl LeadSummary {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let mut active_count = 0;
        let mut active_value = 0.0;
        let mut won_count = 0;
        let mut closed_count = 0;
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut client_totals: HashMap<&str, f64> = HashMap::new();

        for lead in leads {
            *by_status.entry(lead.status.clone()).or_default() += 1;
            *client_totals.entry(lead.client.as_str()).or_default() += lead.value;
            if lead.is_closed() {
                closed_count += 1;
                if lead.status == STATUS_WON {
                    won_count += 1;
                }
            } else {
                active_count += 1;
                active_value += lead.value;
            }
        }

        let win_rate = if closed_count == 0 {
            0.0
        } else {
            (won_count as f64 / closed_count as f64 * 100.0).round()
        };

        let mut by_client: Vec<ClientValue> = client_totals
            .into_iter()
            .map(|(client, value)| ClientValue {
                client: client.to_string(),
                value,
            })
            .collect();
        by_client.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.client.cmp(&b.client))
        });

        Self {
            active_count,
            active_value,
            won_count,
            closed_count,
            win_rate,
            by_status,
            by_client,
        }
    }
}
