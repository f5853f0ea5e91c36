//! Bearer-token session
//!
//! [`TokenStore`] is the single source of truth for the active token.
//! [`SessionManager`] keeps it alive: a periodic tick decodes the token's
//! expiry and refreshes it ahead of time, and the `auth:expired` signal
//! clears it when the backend rejects it. [`RefreshGuard`] keeps the two
//! paths from racing.

pub mod claims;
pub mod guard;
pub mod manager;
pub mod ports;
pub mod store;

pub use claims::{decode_expiry, ClaimsError, TokenExpiry};
pub use guard::RefreshGuard;
pub use manager::{SessionManager, SessionSettings, SessionState, TickOutcome};
pub use ports::SessionRefresher;
pub use store::TokenStore;
