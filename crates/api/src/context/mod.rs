//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use portico_common::{KeyValueStore, MemoryStore, NoopStore, SessionSignal};
use portico_core::{CacheSettings, PublicCache, SessionManager, SessionSettings, TokenStore};
use portico_domain::{AuthSuccess, Config, Credentials, PorticoError, Profile, Result};
use portico_infra::{
    AuthApi, ContactApi, ExperiencesApi, InfraError, OpsApi, RequestExecutor, SkillsApi,
    SqliteStore, SqliteStoreConfig, ToolsApi,
};
use tracing::{info, warn};

const START_TIMEOUT: Duration = Duration::from_secs(10);

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub signal: SessionSignal,
    pub executor: RequestExecutor,
    pub cache: PublicCache,
    pub session: Arc<SessionManager>,

    // Backend facades
    pub auth: AuthApi,
    pub experiences: ExperiencesApi,
    pub skills: SkillsApi,
    pub contact: ContactApi,
    pub ops: OpsApi,
    pub tools: ToolsApi,
}

impl AppContext {
    /// Wire every service from `config` and start the session scheduler.
    ///
    /// # Errors
    /// Configuration errors for a bad base URL, storage errors when the
    /// configured database cannot be opened, or a scheduler start failure.
    pub async fn new(config: Config) -> Result<Self> {
        let store = open_store(&config)?;
        let cache_store: Arc<dyn KeyValueStore> =
            if config.cache.persistent { Arc::clone(&store) } else { Arc::new(NoopStore) };

        let signal = SessionSignal::new();
        let executor = build_executor(&config, &signal)?;

        let cache = PublicCache::new(cache_store, CacheSettings::from(&config.cache));
        let tokens = Arc::new(TokenStore::open(store, config.session.storage_key.clone()).await?);
        let auth = AuthApi::new(executor.clone());

        let session = Arc::new(SessionManager::new(
            tokens,
            Arc::new(auth.clone()),
            &signal,
            SessionSettings::from(&config.session),
        ));

        let ctx = Self {
            experiences: ExperiencesApi::new(executor.clone(), cache.clone()),
            skills: SkillsApi::new(executor.clone(), cache.clone()),
            contact: ContactApi::new(executor.clone()),
            ops: OpsApi::new(executor.clone()),
            tools: ToolsApi::new(executor.clone()),
            config,
            signal,
            executor,
            cache,
            session,
            auth,
        };
        ctx.start().await?;

        info!(
            base_url = %ctx.executor.base_url(),
            persistent_cache = ctx.config.cache.persistent,
            authenticated = ctx.session.is_authenticated(),
            "application context ready"
        );
        Ok(ctx)
    }

    /// Start the session scheduler.
    ///
    /// # Errors
    /// `PorticoError::Internal` if it is already running or does not start
    /// within the start-up timeout.
    pub async fn start(&self) -> Result<()> {
        tokio::time::timeout(START_TIMEOUT, self.session.start())
            .await
            .map_err(|_| {
                tracing::error!(
                    timeout_secs = START_TIMEOUT.as_secs(),
                    "session scheduler start timed out"
                );
                PorticoError::Internal("Session scheduler start timed out".into())
            })?
            .map_err(|err| {
                tracing::error!(error = %err, "failed to start session scheduler");
                err
            })
    }

    /// Log in and install the returned token.
    ///
    /// # Errors
    /// The backend's error, or `PorticoError::Auth` without a token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSuccess> {
        let success = self.auth.login(credentials).await?;
        self.install(&success);
        Ok(success)
    }

    /// Register and install the returned token.
    ///
    /// # Errors
    /// Same as [`login`](Self::login).
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthSuccess> {
        let success = self.auth.register(credentials).await?;
        self.install(&success);
        Ok(success)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Profile of the signed in user.
    ///
    /// # Errors
    /// `PorticoError::Auth` when no session is active, otherwise the
    /// backend's error.
    pub async fn profile(&self) -> Result<Profile> {
        let token = self.require_token()?;
        self.auth.me(&token).await
    }

    /// Current token, or an auth error when signed out.
    ///
    /// # Errors
    /// `PorticoError::Auth` when no session is active.
    pub fn require_token(&self) -> Result<String> {
        self.session.token().ok_or_else(|| PorticoError::Auth("Not signed in".to_string()))
    }

    /// Stop background work and flush the session token. Safe to call more
    /// than once.
    pub async fn shutdown(&self) {
        if self.session.is_running().await {
            if let Err(err) = self.session.stop().await {
                warn!(error = %err, "session scheduler did not stop cleanly");
            }
        }
        self.session.tokens().flush().await;
    }

    fn install(&self, success: &AuthSuccess) {
        if let Some(token) = success.token.as_deref() {
            self.session.set_token(token);
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.path.as_deref() {
        Some(path) => {
            let store = SqliteStore::open(std::path::Path::new(path), SqliteStoreConfig::default())
                .map_err(InfraError::from)?;
            info!(path, "using sqlite storage");
            Ok(Arc::new(store))
        }
        None => {
            info!("no storage path configured, state is kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_executor(config: &Config, signal: &SessionSignal) -> Result<RequestExecutor> {
    let mut builder = RequestExecutor::builder(config.api.base_url.clone()).signal(signal.clone());
    if let Some(secs) = config.api.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(agent) = config.api.user_agent.as_deref() {
        builder = builder.user_agent(agent);
    }
    builder.build()
}
