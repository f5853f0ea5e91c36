//! Portico - resilient backend client
//!
//! Loads configuration, warms the public cache and reports what the backend
//! serves.

use anyhow::Context;
use portico_lib::utils::{error_label, init_tracing};
use portico_lib::AppContext;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file before reading config
    let dotenv = dotenvy::dotenv();

    let config = portico_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => info!(error = %err, "no .env file loaded"),
    }

    info!(base_url = %config.api.base_url, "Portico starting...");
    let ctx = AppContext::new(config).await.context("failed to initialize application")?;

    match ctx.skills.list_public().await {
        Ok(skills) => info!(count = skills.len(), "public skills loaded"),
        Err(err) => warn!(error = %err, kind = error_label(&err), "public skills unavailable"),
    }

    match ctx.experiences.list_public().await {
        Ok(experiences) => info!(count = experiences.len(), "public experiences loaded"),
        Err(err) => warn!(error = %err, kind = error_label(&err), "public experiences unavailable"),
    }

    if let Some(token) = ctx.token() {
        match ctx.auth.me(&token).await {
            Ok(profile) => info!(email = ?profile.email, "restored session is valid"),
            Err(err) => warn!(error = %err, kind = error_label(&err), "restored session rejected"),
        }
    }

    info!(state = ?ctx.session.state(), "session state");
    ctx.shutdown().await;
    Ok(())
}
