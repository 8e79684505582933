//! Cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Opaque value stored in a tier.
pub type CacheValue = serde_json::Value;

/// A computed value held by a tier, stamped with its write version.
///
/// `expires_at` is always `created_at + ttl` for tiers with a TTL, and
/// `None` otherwise.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Arc<CacheValue>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    version: u64,
}

impl CacheEntry {
    /// Creates an entry written now.
    pub fn new(value: CacheValue, version: u64, ttl: Option<Duration>) -> Self {
        Self::created_at(value, version, ttl, Utc::now())
    }

    /// Creates an entry with an explicit creation time.
    pub fn created_at(
        value: CacheValue,
        version: u64,
        ttl: Option<Duration>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = ttl
            .and_then(|ttl| TimeDelta::from_std(ttl).ok())
            .and_then(|delta| created_at.checked_add_signed(delta));

        Self {
            value: Arc::new(value),
            created_at,
            expires_at,
            version,
        }
    }

    /// Returns the cached value.
    pub fn value(&self) -> &CacheValue {
        &self.value
    }

    /// Returns when the entry was written.
    pub fn created_at_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the entry stops being served, if the tier has a TTL.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the write version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true once `now` is past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }

    /// Returns true if the entry is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns the metadata of this entry without the value.
    pub fn info(&self, key: impl Into<String>) -> EntryInfo {
        EntryInfo {
            key: key.into(),
            version: self.version,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Entry metadata reported by diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub key: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
