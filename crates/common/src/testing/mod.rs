//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: unsigned JWT builders for session tests
//! - **[`mocks`]**: stores that fail or park on demand, signal event counters
//!
//! ## Usage
//!
//! ```rust
//! use portico_common::testing::{token_expiring_at, FailingStore};
//! use portico_common::KeyValueStore;
//!
//! let token = token_expiring_at(1_700_000_000);
//! assert_eq!(token.split('.').count(), 3);
//!
//! let store = FailingStore::new();
//! assert!(store.set("k", "v").is_err());
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{token_expiring_at, token_with_payload, unsigned_jwt};
pub use mocks::{EventCounter, FailingStore, GatedStore};
