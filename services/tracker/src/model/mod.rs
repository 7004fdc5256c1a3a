//! Domain records persisted by the tracker store.
//!
//! # Purpose
//! Principals (`users`) and sales leads, plus the derived lead summary shown on
//! the dashboard.
pub mod lead;
pub mod user;

pub use lead::{ClientValue, Lead, LeadInput, LeadSummary};
pub use user::{NewUser, User, UserProfile};
