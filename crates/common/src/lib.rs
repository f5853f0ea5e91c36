//! Runtime building blocks shared across Portico crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction, key/value storage port
//! - `runtime`: session signal bus (adds tracing)
//! - `test-utils`: mock clock, failing and gated stores, unsigned JWT fixtures,
//!   event counters
//! - `observability`: tracing only

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod storage;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod signal;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use signal::{AuthEvent, SessionSignal, Subscription};
#[cfg(feature = "foundation")]
pub use storage::{KeyValueStore, MemoryStore, NoopStore, StorageError, StorageResult};
#[cfg(feature = "foundation")]
pub use time::{Clock, SystemClock};
#[cfg(feature = "test-utils")]
pub use time::MockClock;
