//! Metrics module for the tiercache server.

pub mod http;
pub mod setup;

pub use setup::init_metrics;
