//! # Portico Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The HTTP request executor (reqwest)
//! - Typed backend API facades
//! - The SQLite key/value store (rusqlite + r2d2)
//! - Configuration loading (file + environment)
//!
//! ## Architecture
//! - Implements traits defined in `portico-core` and `portico-common`
//! - Contains all "impure" code (network, disk, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{AuthApi, ContactApi, ExperiencesApi, OpsApi, SkillsApi, ToolsApi};
pub use errors::InfraError;
pub use http::{RequestExecutor, RequestExecutorBuilder, RequestOptions};
pub use storage::{SqliteStore, SqliteStoreConfig};
