//! Public response cache
//!
//! Memoizes read-mostly public endpoints. See [`PublicCache`] for the lookup
//! order and failure handling.

pub mod entry;
pub mod public;

pub use entry::{CacheEntry, CacheOptions, CacheSettings};
pub use public::PublicCache;
