//! Outbound lead notifications.
//!
//! # Purpose
//! Fans a lead event out to every configured channel. The shipped channels
//! (team chat and email) only log the event; a real webhook or mail relay
//! plugs in by implementing [`NotificationChannel`].
//!
//! # Key invariants
//! - Delivery is fire-and-forget: a channel cannot fail the request that
//!   triggered it.
use crate::model::Lead;
use std::sync::Arc;

pub const NEW_LEAD_ACTION: &str = "New Opportunity Identified";

pub fn status_changed_action(status: &str) -> String {
    format!("Status Changed to {status}")
}

pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;
    fn send(&self, lead: &Lead, action: &str);
}

/// Team chat webhook stub.
#[derive(Debug, Default)]
pub struct TeamChatChannel;

impl NotificationChannel for TeamChatChannel {
    fn name(&self) -> &'static str {
        "team_chat"
    }

    fn send(&self, lead: &Lead, action: &str) {
        tracing::info!(
            channel = self.name(),
            lead_id = lead.id,
            client = %lead.client,
            action,
            "team chat notification"
        );
    }
}

/// Team email stub.
#[derive(Debug, Default)]
pub struct EmailChannel;

impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn send(&self, lead: &Lead, action: &str) {
        tracing::info!(
            channel = self.name(),
            lead_id = lead.id,
            client = %lead.client,
            action,
            "email notification to team"
        );
    }
}

#[derive(Clone)]
pub struct Notifier {
    channels: Arc<Vec<Arc<dyn NotificationChannel>>>,
}

impl Notifier {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    pub fn lead_event(&self, lead: &Lead, action: &str) {
        for channel in self.channels.iter() {
            channel.send(lead, action);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        let channels: Vec<Arc<dyn NotificationChannel>> =
            vec![Arc::new(TeamChatChannel), Arc::new(EmailChannel)];
        Self::new(channels)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.channels.iter().map(|channel| channel.name()).collect();
        f.debug_struct("Notifier").field("channels", &names).finish()
    }
}
