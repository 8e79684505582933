//! Secrets read from process environment variables.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tiercache_core::CacheValue;
use tracing::debug;

use super::{DEFAULT_ENV_PREFIX, SecretsProvider};
use crate::error::SourceError;

/// Provider over environment variables sharing a prefix.
///
/// `TIERCACHE_SECRET_DB_PASSWORD=hunter2` becomes the secret `db_password`
/// with the string value `"hunter2"`. Variables are captured when the
/// provider is built.
#[derive(Debug, Clone)]
pub struct EnvSecretsProvider {
    prefix: String,
    secrets: IndexMap<String, String>,
}

impl EnvSecretsProvider {
    /// Captures the current process environment.
    pub fn from_env(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Builds a provider from an explicit set of variables.
    pub fn from_vars<I>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = prefix.into();
        let secrets: IndexMap<String, String> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(prefix.as_str())?;
                (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value))
            })
            .collect();

        debug!(prefix = %prefix, count = secrets.len(), "Captured secrets from environment");
        Self { prefix, secrets }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for EnvSecretsProvider {
    fn default() -> Self {
        Self::from_env(DEFAULT_ENV_PREFIX)
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn list(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.secrets.keys().cloned().collect())
    }

    async fn fetch(&self, name: &str) -> Result<CacheValue, SourceError> {
        self.secrets
            .get(name)
            .map(|value| Value::String(value.clone()))
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}
