//! Error types for tiercache.
//!
//! Tier operations, registry lookups and warm runs all report failures
//! through [`CacheError`]. The registry turns per-tier failures into
//! structured report entries, so callers of the bulk operations only see
//! a `CacheError` for caller mistakes (unknown tier, invalid parameter).
//!
//! # Example
//!
//! ```
//! use tiercache_core::CacheError;
//!
//! let error = CacheError::unknown_tier("sessions");
//! assert!(error.is_client_error());
//! assert_eq!(error.to_string(), "unknown cache tier 'sessions'");
//! ```

use thiserror::Error;

/// Main error type for cache administration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// A tier with the same name was registered twice.
    #[error("cache tier '{tier}' is already registered")]
    DuplicateTier {
        /// Name of the duplicated tier
        tier: String,
    },

    /// A request referenced a tier that does not exist.
    #[error("unknown cache tier '{tier}'")]
    UnknownTier {
        /// Name that was requested
        tier: String,
    },

    /// A request parameter is missing or malformed.
    #[error("invalid parameter '{field}': {message}")]
    Validation {
        /// Parameter that failed validation
        field: String,
        /// Why it was rejected
        message: String,
    },

    /// A specific tier failed an operation (backing store unavailable, etc.).
    #[error("tier '{tier}' failed: {message}")]
    TierOperation {
        /// Tier that failed
        tier: String,
        /// Provider or tier reported detail
        message: String,
    },

    /// Warm requested for a tier without a registered strategy.
    #[error("tier '{tier}' has no warm strategy")]
    WarmUnsupported {
        /// Tier that was asked to warm
        tier: String,
    },

    /// A bounded operation exceeded its budget.
    #[error("warm of tier '{tier}' timed out after {elapsed_ms}ms ({items_loaded} items loaded)")]
    Timeout {
        /// Tier being warmed
        tier: String,
        /// Time spent before giving up
        elapsed_ms: u64,
        /// Progress made before the timeout
        items_loaded: u64,
    },
}

impl CacheError {
    /// Creates a DuplicateTier error.
    pub fn duplicate_tier(tier: impl Into<String>) -> Self {
        Self::DuplicateTier { tier: tier.into() }
    }

    /// Creates an UnknownTier error.
    pub fn unknown_tier(tier: impl Into<String>) -> Self {
        Self::UnknownTier { tier: tier.into() }
    }

    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a TierOperation error.
    pub fn tier_operation(tier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TierOperation {
            tier: tier.into(),
            message: message.into(),
        }
    }

    /// Creates a WarmUnsupported error.
    pub fn warm_unsupported(tier: impl Into<String>) -> Self {
        Self::WarmUnsupported { tier: tier.into() }
    }

    /// Returns true if the error was caused by the caller (bad tier name or parameter).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTier { .. } | Self::Validation { .. } | Self::DuplicateTier { .. }
        )
    }
}

/// Type alias for Results with CacheError.
pub type Result<T> = std::result::Result<T, CacheError>;
