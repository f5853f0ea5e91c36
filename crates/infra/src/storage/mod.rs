//! Persistent key/value storage

pub mod sqlite;

pub use sqlite::{SqliteStore, SqliteStoreConfig};
