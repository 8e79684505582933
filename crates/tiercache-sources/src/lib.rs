//! Tiercache Sources - backing data sources
//!
//! This crate provides the secrets providers the `secrets` tier wraps and
//! the warm strategy that loads them into a tier.

pub mod error;
pub mod secrets;
pub mod warmer;

pub use error::SourceError;
pub use secrets::{EnvSecretsProvider, FileSecretsProvider, SecretsProvider};
pub use warmer::SecretsWarmer;

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
