//! # Portico App
//!
//! Application layer - wiring and entry point.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Tracing setup
//! - The `portico` binary
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Owns the session scheduler lifecycle

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::*;
