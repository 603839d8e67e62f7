use std::sync::Arc;

use aliasvault_core::{load_settings, KeyValueStore, LoginRateLimiter, Settings};
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::upstream::AddyClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn KeyValueStore>,
    /// Failed-login table for this instance only; not shared across replicas.
    pub rate_limiter: Arc<LoginRateLimiter>,
    pub upstream: AddyClient,
    /// Serialises read-modify-write cycles on the settings blob.
    pub settings_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let rate_limiter = LoginRateLimiter::new(
            config.rate_limit.max_attempts,
            config.rate_limit.window(),
        );
        let upstream = AddyClient::new(&config.upstream)?;

        Ok(Self {
            config: Arc::new(config),
            store,
            rate_limiter: Arc::new(rate_limiter),
            upstream,
            settings_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Current settings, or `None` until setup has completed.
    pub async fn settings(&self) -> Option<Settings> {
        load_settings(self.store.as_ref())
            .await
            .filter(|s| s.initialized)
    }
}
