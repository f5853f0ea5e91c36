//! SQLite-backed [`KeyValueStore`]
//!
//! One `kv_store` table behind an r2d2 pool. Each connection runs in WAL
//! mode with a busy timeout, so the cache and the token store can write from
//! different threads without failing on lock contention.

use std::path::Path;
use std::time::Duration;

use portico_common::{KeyValueStore, StorageError, StorageResult};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, instrument, warn};

use crate::errors::IntoStorageError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)";

/// Pool settings
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    pub max_size: u32,
    pub connection_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_size: 4,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// `StorageError::Connection` when the pool cannot be built, or a mapped
    /// SQLite error when the schema cannot be created.
    #[instrument(skip(config), fields(db_path = ?path, pool_size = config.max_size))]
    pub fn open(path: &Path, config: SqliteStoreConfig) -> StorageResult<Self> {
        info!("Opening SQLite key/value store");

        let busy_timeout = config.busy_timeout;
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.execute_batch("PRAGMA journal_mode=WAL;\nPRAGMA synchronous=NORMAL;")?;
            conn.busy_timeout(busy_timeout)
        });

        Self::build(manager, &config)
    }

    /// Private in-memory database. The pool holds a single connection so
    /// every call sees the same data.
    ///
    /// # Errors
    /// Same as [`open`](Self::open).
    pub fn in_memory() -> StorageResult<Self> {
        let config = SqliteStoreConfig { max_size: 1, ..SqliteStoreConfig::default() };
        Self::build(SqliteConnectionManager::memory(), &config)
    }

    fn build(manager: SqliteConnectionManager, config: &SqliteStoreConfig) -> StorageResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!("Failed to create connection pool: {}", e);
                StorageError::Connection(format!("Failed to create pool: {}", e))
            })?;

        let store = Self { pool };
        store.connection()?.execute_batch(SCHEMA).map_err(IntoStorageError::into_storage)?;
        debug!("kv_store schema ready");

        Ok(store)
    }

    fn connection(&self) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(IntoStorageError::into_storage)
    }

    /// Number of stored keys.
    pub fn len(&self) -> StorageResult<usize> {
        let count: i64 = self
            .connection()?
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .map_err(IntoStorageError::into_storage)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.connection()?
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(IntoStorageError::into_storage)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.connection()?
            .execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )
            .map_err(IntoStorageError::into_storage)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.connection()?
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(IntoStorageError::into_storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("portfolio_auth_token", "jwt").unwrap();
        store.set("portfolio_auth_token", "jwt-2").unwrap();
        assert_eq!(store.get("portfolio_auth_token").unwrap().as_deref(), Some("jwt-2"));
        assert_eq!(store.len().unwrap(), 1);

        store.remove("portfolio_auth_token").unwrap();
        store.remove("portfolio_auth_token").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portico.db");

        {
            let store = SqliteStore::open(&path, SqliteStoreConfig::default()).unwrap();
            store.set("public-cache:public-skills", r#"{"value":1,"expiresAt":5}"#).unwrap();
        }

        let reopened = SqliteStore::open(&path, SqliteStoreConfig::default()).unwrap();
        assert_eq!(
            reopened.get("public-cache:public-skills").unwrap().as_deref(),
            Some(r#"{"value":1,"expiresAt":5}"#)
        );
    }

    #[test]
    fn concurrent_writers_share_the_pool() {
        let dir = TempDir::new().unwrap();
        let store =
            Arc::new(SqliteStore::open(&dir.path().join("kv.db"), SqliteStoreConfig::default()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for idx in 0..25 {
                        store.set(&format!("k-{worker}-{idx}"), "v").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 100);
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("kv.db");

        let config = SqliteStoreConfig {
            connection_timeout: Duration::from_millis(200),
            ..SqliteStoreConfig::default()
        };

        assert!(SqliteStore::open(&path, config).is_err());
    }
}
