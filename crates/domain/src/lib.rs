//! # Portico Domain
//!
//! Data types shared by every Portico crate.
//!
//! This crate contains:
//! - The client error taxonomy (`ClientError`, `PorticoError`) and `Result`
//! - Configuration structures
//! - Endpoint paths, storage keys and other constants
//! - Wire types for the backend API (content, auth, contact, ops, tools)
//!
//! ## Architecture
//! - No dependencies on other Portico crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
