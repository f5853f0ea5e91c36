//! Cache entry and option types

use std::time::Duration;

use portico_domain::constants::{CACHE_STORAGE_PREFIX, DEFAULT_CACHE_TTL_MS};
use serde::{Deserialize, Serialize};

/// A cached value with its absolute expiry.
///
/// Serialized as `{"value": ..., "expiresAt": <epoch ms>}` in the persistent
/// tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, expires_at: u64) -> Self {
        Self { value, expires_at }
    }

    /// Fresh iff `expires_at > now_ms`.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.expires_at > now_ms
    }
}

/// Per-call options for [`PublicCache::get`](super::PublicCache::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Lifetime of a newly fetched entry. `None` uses the cache default.
    pub ttl: Option<Duration>,
    /// Serve any cached entry, however old, when the fetch fails.
    pub allow_stale_on_error: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { ttl: None, allow_stale_on_error: true }
    }
}

impl CacheOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn stale_on_error(mut self, allow: bool) -> Self {
        self.allow_stale_on_error = allow;
        self
    }
}

/// Construction-time settings for a cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub default_ttl: Duration,
    /// Namespace for persistent keys.
    pub storage_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            storage_prefix: CACHE_STORAGE_PREFIX.to_string(),
        }
    }
}

impl From<&portico_domain::CacheConfig> for CacheSettings {
    fn from(config: &portico_domain::CacheConfig) -> Self {
        Self { default_ttl: config.default_ttl(), storage_prefix: config.storage_prefix.clone() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn freshness_is_strict() {
        let entry = CacheEntry::new(1, 1_000);
        assert!(entry.is_fresh(999));
        assert!(!entry.is_fresh(1_000));
        assert!(!entry.is_fresh(1_001));
    }

    #[test]
    fn entry_uses_camel_case_on_the_wire() {
        let entry = CacheEntry::new(json!({ "v": 1 }), 42);
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({ "value": { "v": 1 }, "expiresAt": 42 }));
    }

    #[test]
    fn options_default_to_stale_fallback() {
        let options = CacheOptions::default();
        assert!(options.allow_stale_on_error);
        assert_eq!(options.ttl, None);

        let custom = options.with_ttl(Duration::from_secs(5)).stale_on_error(false);
        assert_eq!(custom.ttl, Some(Duration::from_secs(5)));
        assert!(!custom.allow_stale_on_error);
    }
}
