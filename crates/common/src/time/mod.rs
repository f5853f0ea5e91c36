//! Time abstraction for testability
//!
//! Cache freshness and token expiry are both computed against a [`Clock`],
//! so tests can move time forward without sleeping.

pub mod clock;

#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
