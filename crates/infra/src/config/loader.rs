//! Configuration loader
//!
//! Builds the application [`Config`] from an optional file plus environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file
//! 2. Parse it by extension (JSON or TOML); with no file, start from defaults
//! 3. Apply `PORTICO_*` environment overrides on top
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `PORTICO_API_URL`: Backend base URL
//! - `PORTICO_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `PORTICO_STORAGE_PATH`: SQLite file for the persistent store
//! - `PORTICO_CACHE_TTL_MS`: Default public cache TTL in milliseconds
//! - `PORTICO_CACHE_PERSISTENT`: Mirror cache entries to storage (true/false)
//! - `PORTICO_SESSION_CHECK_INTERVAL_SECS`: Session check period
//! - `PORTICO_SESSION_REFRESH_THRESHOLD_SECS`: Refresh when less remains
//! - `PORTICO_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./portico.toml`, `./portico.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use portico_domain::{Config, PorticoError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["portico.toml", "portico.json", "config.toml", "config.json"];

/// Load configuration: file (or defaults), then environment overrides.
///
/// # Errors
/// Returns `PorticoError::Config` if a found file cannot be read or parsed,
/// an environment override is invalid, or the result fails validation.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `PorticoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PorticoError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PorticoError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PorticoError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PorticoError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PorticoError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PorticoError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Apply `PORTICO_*` overrides to `config`.
///
/// # Errors
/// Returns `PorticoError::Config` for a value that does not parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(url) = env_string("PORTICO_API_URL") {
        config.api.base_url = url;
    }
    if let Some(secs) = env_parse::<u64>("PORTICO_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = Some(secs);
    }
    if let Some(path) = env_string("PORTICO_STORAGE_PATH") {
        config.storage.path = Some(path);
    }
    if let Some(ttl) = env_parse::<u64>("PORTICO_CACHE_TTL_MS")? {
        config.cache.default_ttl_ms = ttl;
    }
    if let Some(persistent) = env_bool("PORTICO_CACHE_PERSISTENT")? {
        config.cache.persistent = persistent;
    }
    if let Some(secs) = env_parse::<u64>("PORTICO_SESSION_CHECK_INTERVAL_SECS")? {
        config.session.check_interval_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>("PORTICO_SESSION_REFRESH_THRESHOLD_SECS")? {
        config.session.refresh_threshold_secs = secs;
    }
    if let Some(json) = env_bool("PORTICO_LOG_JSON")? {
        config.logging.json = json;
    }
    Ok(())
}

/// Reject configurations the runtime cannot use.
///
/// # Errors
/// Returns `PorticoError::Config` describing the first problem found.
pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(PorticoError::Config("api.base_url must not be empty".to_string()));
    }
    if config.session.check_interval_secs == 0 {
        return Err(PorticoError::Config(
            "session.check_interval_secs must be greater than zero".to_string(),
        ));
    }
    if config.session.storage_key.is_empty() {
        return Err(PorticoError::Config("session.storage_key must not be empty".to_string()));
    }
    Ok(())
}

/// Non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                PorticoError::Config(format!("Invalid value for {}: {} ({})", key, raw, e))
            })
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Unset is `None`; anything else is an error.
fn env_bool(key: &str) -> Result<Option<bool>> {
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(PorticoError::Config(format!("Invalid boolean for {}: {}", key, raw))),
    }
}
