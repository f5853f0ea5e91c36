//! Key/value storage port
//!
//! The persistent tier used by the public cache and the session token store.
//! Calls are synchronous and string keyed, the same shape as browser storage.
//!
//! Implementations here are process local: [`MemoryStore`] for tests and
//! single-run tools, [`NoopStore`] when no persistent store exists. A
//! SQLite-backed store lives in `portico-infra`.

pub mod error;
pub mod memory;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryStore, NoopStore};
pub use types::KeyValueStore;
