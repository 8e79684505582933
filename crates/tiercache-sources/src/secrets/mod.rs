//! Secrets providers.
//!
//! A provider exposes named credentials. The `secrets` tier caches them and
//! is warmed by listing the provider and fetching every name.

mod env;
mod file;

pub use env::EnvSecretsProvider;
pub use file::FileSecretsProvider;

use async_trait::async_trait;
use tiercache_core::CacheValue;

use crate::error::SourceError;

/// Default prefix of environment variables read by [`EnvSecretsProvider`].
pub const DEFAULT_ENV_PREFIX: &str = "TIERCACHE_SECRET_";

/// A source of named credentials.
///
/// # Example
///
/// ```ignore
/// struct Vault;
///
/// #[async_trait]
/// impl SecretsProvider for Vault {
///     fn name(&self) -> &str {
///         "vault"
///     }
///
///     async fn list(&self) -> Result<Vec<String>, SourceError> {
///         Ok(vec!["db_password".to_string()])
///     }
///
///     async fn fetch(&self, name: &str) -> Result<CacheValue, SourceError> {
///         Ok(json!("hunter2"))
///     }
/// }
/// ```
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Returns the name of this provider, used in logs and error detail.
    fn name(&self) -> &str;

    /// Lists the names of all available secrets.
    ///
    /// # Errors
    ///
    /// `SourceError::Unavailable` if the provider cannot be reached.
    async fn list(&self) -> Result<Vec<String>, SourceError>;

    /// Fetches one secret.
    ///
    /// # Errors
    ///
    /// `SourceError::NotFound` if the name does not exist.
    async fn fetch(&self, name: &str) -> Result<CacheValue, SourceError>;

    /// Verifies that the provider is reachable.
    async fn health_check(&self) -> Result<(), SourceError> {
        self.list().await.map(|_| ())
    }
}
