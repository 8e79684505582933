//! HTTP handlers.

pub mod admin;
pub mod diagnostics;
pub mod health;
pub mod metrics;
