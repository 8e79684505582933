//! Key validation and key-scoped matching.

use glob::Pattern;

use crate::error::{CacheError, Result};

/// Maximum accepted length for an identifier used in key-scoped operations.
pub const MAX_KEY_LEN: usize = 256;

/// Characters with glob meaning, rejected in identifiers.
const GLOB_META: &[char] = &['*', '?', '[', ']'];

/// Validates an identifier used for key-scoped clears and diagnostics.
///
/// Returns the trimmed identifier.
///
/// # Examples
///
/// ```
/// use tiercache_core::tier::validate_key;
///
/// assert_eq!(validate_key("user_id", " 42 ").unwrap(), "42");
/// assert!(validate_key("user_id", "").is_err());
/// assert!(validate_key("user_id", "4*").is_err());
/// ```
pub fn validate_key(field: &str, raw: &str) -> Result<String> {
    let key = raw.trim();

    if key.is_empty() {
        return Err(CacheError::validation(field, "must not be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::validation(
            field,
            format!("must be at most {MAX_KEY_LEN} characters"),
        ));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(CacheError::validation(
            field,
            "must not contain control characters",
        ));
    }
    if key.contains(GLOB_META) {
        return Err(CacheError::validation(
            field,
            "must not contain wildcard characters (*, ?, [, ])",
        ));
    }

    Ok(key.to_string())
}

/// Matches the entries that belong to one identifier.
///
/// An identifier `42` owns the plain key `42` and every composite key
/// `42:<suffix>` (e.g. `42:status=open`).
#[derive(Debug, Clone)]
pub struct KeyPattern {
    exact: String,
    composite: Pattern,
}

impl KeyPattern {
    /// Builds the pattern for an identifier.
    pub fn scoped(id: &str) -> Result<Self> {
        let composite = Pattern::new(&format!("{}:*", Pattern::escape(id)))
            .map_err(|e| CacheError::validation("key", e.to_string()))?;

        Ok(Self {
            exact: id.to_string(),
            composite,
        })
    }

    /// Returns the identifier this pattern was built from.
    pub fn id(&self) -> &str {
        &self.exact
    }

    pub fn matches(&self, key: &str) -> bool {
        key == self.exact || self.composite.matches(key)
    }
}
