//! Port interfaces for session maintenance

use async_trait::async_trait;
use portico_domain::Result;

/// Exchanges a still-valid token for a new one.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Refresh `token`.
    ///
    /// `Ok(None)` means the backend answered without a new token; the
    /// current session is left as it is.
    async fn refresh(&self, token: &str) -> Result<Option<String>>;
}
