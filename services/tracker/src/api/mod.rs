//! Tracker HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules plus the shared error and payload types.
pub mod error;
pub mod leads;
pub mod openapi;
pub mod system;
pub mod types;
