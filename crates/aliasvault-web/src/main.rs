mod api;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;
mod upstream;

use std::sync::Arc;
use std::time::Duration;

use aliasvault_core::FileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aliasvault_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let tls_config = config.tls.clone();

    tracing::info!("Settings stored in {}", config.data_dir.display());
    tracing::info!("Forwarding to {}", config.upstream.base_url);
    tracing::info!(
        "Login limit: {} failures per {}s per client",
        config.rate_limit.max_attempts,
        config.rate_limit.window_secs
    );

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let state = AppState::new(config, store)?;

    if state.settings().await.is_none() {
        tracing::warn!("System not initialized; POST /initialize to complete setup");
    }

    // Rate-limit table cleanup
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = limiter.prune_expired();
            if removed > 0 {
                tracing::debug!("Pruned {removed} expired rate-limit entries");
            }
        }
    });

    let app = api::router(state);

    if let (Some(cert), Some(key)) = (&tls_config.cert_path, &tls_config.key_path) {
        use axum_server::tls_rustls::RustlsConfig;
        let rustls_config = RustlsConfig::from_pem_file(cert, key).await?;
        tracing::info!("aliasvault-web listening on https://{}", bind_addr);
        axum_server::bind_rustls(bind_addr, rustls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        tracing::info!("aliasvault-web listening on http://{}", bind_addr);
        axum::serve(listener, app).await?;
    }

    Ok(())
}
