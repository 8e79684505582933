//! Secrets read from a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tiercache_core::CacheValue;

use super::SecretsProvider;
use crate::error::SourceError;

/// Provider over a JSON object file, `{"<name>": <value>, ...}`.
///
/// The file is read on every call so rotated secrets are picked up by the
/// next warm. A missing or unreadable file makes the provider unavailable.
#[derive(Debug, Clone)]
pub struct FileSecretsProvider {
    path: PathBuf,
}

impl FileSecretsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::unavailable(
                self.name(),
                format!("cannot read {}: {e}", self.path.display()),
            )
        })?;

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(SourceError::parse(
                &self.path,
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
            Err(e) => Err(SourceError::parse(&self.path, e.to_string())),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl SecretsProvider for FileSecretsProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn list(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.load().await?.keys().cloned().collect())
    }

    async fn fetch(&self, name: &str) -> Result<CacheValue, SourceError> {
        self.load()
            .await?
            .remove(name)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}
