//! Session refresh scheduler
//!
//! Keeps the bearer token alive without user-visible interruption:
//! - every `check_interval` the token's `exp` claim is decoded; a token
//!   expiring within `refresh_threshold` is refreshed, an already expired
//!   token is cleared without calling the backend
//! - an `auth:expired` signal clears the token unless a refresh is in flight,
//!   in which case the refresh outcome decides
//! - a token that cannot be decoded is left alone; only a 401 removes it
//!
//! The periodic loop runs on its own task with lifecycle handled like the
//! other schedulers: `start`, `stop` (graceful, bounded wait) and
//! cancellation on drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portico_common::{AuthEvent, Clock, SessionSignal, Subscription, SystemClock};
use portico_domain::{PorticoError, Result, SessionConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::claims::decode_expiry;
use super::guard::RefreshGuard;
use super::ports::SessionRefresher;
use super::store::TokenStore;

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the session scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Period of the background check.
    pub check_interval: Duration,
    /// Refresh once less than this much time remains.
    pub refresh_threshold: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            check_interval: config.check_interval(),
            refresh_threshold: config.refresh_threshold(),
        }
    }
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token and none was lost.
    Anonymous,
    /// Token present and not yet due for refresh.
    Active,
    /// Token present with less than the threshold remaining.
    RefreshDue,
    /// A refresh call is outstanding.
    Refreshing,
    /// Token cleared by expiry, failed refresh or a 401, or present but past
    /// its `exp`.
    Expired,
}

/// What a single check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NoSession,
    RefreshInFlight,
    Undecodable,
    Healthy,
    /// Token was past expiry and has been cleared.
    Expired,
    Refreshed,
    /// Refresh succeeded without a new token.
    Unchanged,
    /// Refresh failed and the token has been cleared.
    RefreshFailed,
    /// The token changed while this check ran; nothing was applied.
    Superseded,
    /// The scheduler was stopped before the refresh settled.
    Ignored,
}

struct SessionInner<C: Clock> {
    tokens: Arc<TokenStore>,
    refresher: Arc<dyn SessionRefresher>,
    clock: C,
    settings: SessionSettings,
    refreshing: AtomicBool,
    stopped: AtomicBool,
    expired: AtomicBool,
}

/// Auth session manager
pub struct SessionManager<C: Clock = SystemClock> {
    inner: Arc<SessionInner<C>>,
    cancellation_token: parking_lot::Mutex<CancellationToken>,
    task_handle: TaskHandle,
    _subscription: Subscription,
}

impl SessionManager<SystemClock> {
    pub fn new(
        tokens: Arc<TokenStore>,
        refresher: Arc<dyn SessionRefresher>,
        signal: &SessionSignal,
        settings: SessionSettings,
    ) -> Self {
        Self::with_clock(tokens, refresher, signal, SystemClock, settings)
    }
}

impl<C: Clock> SessionManager<C> {
    /// Create a manager and subscribe it to `signal`.
    ///
    /// The background loop is not started; call [`start`](Self::start).
    pub fn with_clock(
        tokens: Arc<TokenStore>,
        refresher: Arc<dyn SessionRefresher>,
        signal: &SessionSignal,
        clock: C,
        settings: SessionSettings,
    ) -> Self {
        let inner = Arc::new(SessionInner {
            tokens,
            refresher,
            clock,
            settings,
            refreshing: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            expired: AtomicBool::new(false),
        });

        let listener = Arc::downgrade(&inner);
        let subscription = signal.subscribe(move |event| {
            if let Some(inner) = listener.upgrade() {
                inner.on_signal(event);
            }
        });

        Self {
            inner,
            cancellation_token: parking_lot::Mutex::new(CancellationToken::new()),
            task_handle: Arc::new(Mutex::new(None)),
            _subscription: subscription,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.tokens.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.is_present()
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.inner.tokens
    }

    /// Install a token from login or registration. Empty clears.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let present = !token.is_empty();
        self.inner.tokens.set(token);
        self.inner.expired.store(false, Ordering::Release);
        info!(present, "session token set");
    }

    /// Explicit logout.
    pub fn logout(&self) {
        self.inner.tokens.clear();
        self.inner.expired.store(false, Ordering::Release);
        info!("session logged out");
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// Run one check immediately, outside the periodic loop.
    pub async fn check_and_refresh(&self) -> TickOutcome {
        self.inner.tick().await
    }

    /// Start the periodic check. The first check runs one interval after
    /// start.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut slot = self.task_handle.lock().await;
        if slot.is_some() {
            return Err(PorticoError::Internal("Session scheduler already running".to_string()));
        }

        info!(
            interval_secs = self.inner.settings.check_interval.as_secs(),
            threshold_secs = self.inner.settings.refresh_threshold.as_secs(),
            "Starting session scheduler"
        );

        // Fresh token so a stopped scheduler can be restarted
        let cancel = CancellationToken::new();
        *self.cancellation_token.lock() = cancel.clone();
        self.inner.stopped.store(false, Ordering::Release);

        let inner = Arc::clone(&self.inner);
        *slot = Some(tokio::spawn(Self::refresh_loop(inner, cancel)));

        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// A check already running is allowed to finish, but a refresh that
    /// settles from here on is not applied.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is not running or its task does not
    /// finish in time
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        let Some(handle) = self.task_handle.lock().await.take() else {
            return Err(PorticoError::Internal("Session scheduler not running".to_string()));
        };

        info!("Stopping session scheduler");
        self.inner.stopped.store(true, Ordering::Release);
        self.cancellation_token.lock().cancel();

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Session scheduler task panicked: {}", e);
                return Err(PorticoError::Internal("Session scheduler task panicked".to_string()));
            }
            Err(_) => {
                warn!("Session scheduler task did not complete within timeout");
                return Err(PorticoError::Internal("Session scheduler task timeout".to_string()));
            }
        }

        info!("Session scheduler stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.task_handle.lock().await.is_some()
    }

    async fn refresh_loop(inner: Arc<SessionInner<C>>, cancel: CancellationToken) {
        let period = inner.settings.check_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Session refresh loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    // Runs to completion; cancellation is observed on the next turn
                    let outcome = inner.tick().await;
                    debug!(?outcome, "Session check completed");
                }
            }
        }
    }
}

impl<C: Clock> SessionInner<C> {
    async fn tick(&self) -> TickOutcome {
        if self.refreshing.load(Ordering::Acquire) {
            return TickOutcome::RefreshInFlight;
        }
        let Some(token) = self.tokens.get() else {
            return TickOutcome::NoSession;
        };

        let expiry = match decode_expiry(&token) {
            Ok(expiry) => expiry,
            Err(err) => {
                debug!(error = %err, "session token not decodable, skipping check");
                return TickOutcome::Undecodable;
            }
        };

        let remaining_ms = expiry.remaining_ms(self.clock.millis_since_epoch());
        if remaining_ms <= 0.0 {
            if self.tokens.clear_if_current(&token) {
                self.expired.store(true, Ordering::Release);
                info!("session token expired, cleared without refresh");
                return TickOutcome::Expired;
            }
            return TickOutcome::Superseded;
        }
        if remaining_ms >= self.threshold_ms() {
            return TickOutcome::Healthy;
        }

        let Some(_guard) = RefreshGuard::try_acquire(&self.refreshing) else {
            return TickOutcome::RefreshInFlight;
        };

        info!(remaining_secs = (remaining_ms / 1_000.0) as u64, "refreshing session token");
        let result = self.refresher.refresh(&token).await;

        if self.stopped.load(Ordering::Acquire) {
            debug!("session scheduler stopped, ignoring refresh result");
            return TickOutcome::Ignored;
        }

        match result {
            Ok(Some(fresh)) if !fresh.is_empty() => {
                if self.tokens.replace_if_current(&token, fresh) {
                    info!("session token refreshed");
                    TickOutcome::Refreshed
                } else {
                    debug!("session token changed during refresh, discarding result");
                    TickOutcome::Superseded
                }
            }
            Ok(_) => {
                debug!("refresh returned no token, keeping current session");
                TickOutcome::Unchanged
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                if self.tokens.clear_if_current(&token) {
                    self.expired.store(true, Ordering::Release);
                    TickOutcome::RefreshFailed
                } else {
                    TickOutcome::Superseded
                }
            }
        }
    }

    fn on_signal(&self, event: AuthEvent) {
        match event {
            AuthEvent::Expired => {
                if self.stopped.load(Ordering::Acquire) {
                    return;
                }
                let Some(_guard) = RefreshGuard::try_acquire(&self.refreshing) else {
                    debug!(event = %event, "ignored while a session refresh is in flight");
                    return;
                };
                if self.tokens.is_present() {
                    self.tokens.clear();
                    self.expired.store(true, Ordering::Release);
                    info!(event = %event, "session cleared");
                }
            }
        }
    }

    fn state(&self) -> SessionState {
        if self.refreshing.load(Ordering::Acquire) {
            return SessionState::Refreshing;
        }
        let Some(token) = self.tokens.get() else {
            return if self.expired.load(Ordering::Acquire) {
                SessionState::Expired
            } else {
                SessionState::Anonymous
            };
        };

        match decode_expiry(&token) {
            Ok(expiry) => {
                let remaining_ms = expiry.remaining_ms(self.clock.millis_since_epoch());
                if remaining_ms <= 0.0 {
                    SessionState::Expired
                } else if remaining_ms < self.threshold_ms() {
                    SessionState::RefreshDue
                } else {
                    SessionState::Active
                }
            }
            Err(_) => SessionState::Active,
        }
    }

    fn threshold_ms(&self) -> f64 {
        self.settings.refresh_threshold.as_millis() as f64
    }
}

impl<C: Clock> fmt::Debug for SessionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

/// Ensure the loop is stopped when the manager is dropped
impl<C: Clock> Drop for SessionManager<C> {
    fn drop(&mut self) {
        let token = self.cancellation_token.lock();
        if !token.is_cancelled() {
            debug!("SessionManager dropped; cancelling refresh loop");
            self.inner.stopped.store(true, Ordering::Release);
            token.cancel();
        }
    }
}
