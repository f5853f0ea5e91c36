//! Configuration structures
//!
//! Every section defaults, so a partial file (or no file at all) yields a
//! usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CACHE_STORAGE_PREFIX, DEFAULT_API_URL, DEFAULT_CACHE_TTL_MS, SESSION_CHECK_INTERVAL_SECS,
    SESSION_REFRESH_THRESHOLD_SECS, TOKEN_STORAGE_KEY,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout. `None` leaves timeout policy to the transport.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string(), timeout_secs: None, user_agent: None }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Public response cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl_ms: u64,
    pub storage_prefix: String,
    /// Mirror entries into the persistent store.
    pub persistent: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_CACHE_TTL_MS,
            storage_prefix: CACHE_STORAGE_PREFIX.to_string(),
            persistent: true,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

/// Session refresh scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub check_interval_secs: u64,
    pub refresh_threshold_secs: u64,
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: SESSION_CHECK_INTERVAL_SECS,
            refresh_threshold_secs: SESSION_REFRESH_THRESHOLD_SECS,
            storage_key: TOKEN_STORAGE_KEY.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }
}

/// Persistent key/value store location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file. Unset keeps everything in memory.
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { json: false, filter: "info".to_string() }
    }
}
