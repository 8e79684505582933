//! Tiercache Server - admin HTTP server
//!
//! This crate provides the Axum-based administration surface over the
//! cache registry: clear, stats, warm, diagnostics and health endpoints.

pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use bootstrap::build_registry;
pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router, create_router_with_metrics, run_server, serve};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }
}
