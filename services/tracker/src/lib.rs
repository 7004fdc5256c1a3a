//! Growth Tracker service library crate.
//!
//! # Purpose
//! Exposes the HTTP API, authentication, configuration, notification, and
//! storage modules for use by the binary and integration tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod notify;
pub mod observability;
pub mod store;
