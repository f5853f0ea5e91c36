//! # Portico Core
//!
//! Client resilience logic with no HTTP or database code.
//!
//! This crate contains:
//! - The public response cache (two tiers, TTL, single-flight,
//!   stale-on-error)
//! - The session token store and refresh scheduler
//! - Port interfaces implemented by `portico-infra`
//!
//! ## Architecture Principles
//! - Depends only on `portico-common` and `portico-domain`
//! - Persistence and network access come in through traits
//! - Time comes in through `Clock`, so every expiry rule is testable

pub mod cache;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use cache::{CacheEntry, CacheOptions, CacheSettings, PublicCache};
pub use session::{
    decode_expiry, ClaimsError, RefreshGuard, SessionManager, SessionRefresher, SessionSettings,
    SessionState, TickOutcome, TokenExpiry, TokenStore,
};
