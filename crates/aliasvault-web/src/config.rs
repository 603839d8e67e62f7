use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// One week.
const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}
fn default_data_dir() -> PathBuf { PathBuf::from("./data") }
fn default_allowed_origin() -> String { "http://localhost:5173".to_string() }
fn default_client_ip_header() -> String { "cf-connecting-ip".to_string() }
fn default_upstream_url() -> String { "https://app.addy.io/api/v1".to_string() }
fn default_upstream_timeout_secs() -> u64 { 30 }
fn default_max_attempts() -> u32 { 5 }
fn default_window_secs() -> u64 { 15 * 60 }

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
            allowed_origin: default_allowed_origin(),
            client_ip_header: default_client_ip_header(),
            upstream: UpstreamConfig::default(),
            rate_limit: RateLimitConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl ServerConfig {
    pub fn tls_enabled(&self) -> bool {
        self.tls.cert_path.is_some() && self.tls.key_path.is_some()
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("ALIASVAULT_CONFIG").map(PathBuf::from).ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml(&contents)?
        } else {
            ServerConfig::default()
        };

        if let Ok(addr) = std::env::var("ALIASVAULT_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }
        if let Ok(dir) = std::env::var("ALIASVAULT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(origin) = std::env::var("ALIASVAULT_ALLOWED_ORIGIN") {
            config.allowed_origin = origin;
        }
        if let Ok(url) = std::env::var("ALIASVAULT_UPSTREAM_URL") {
            config.upstream.base_url = url;
        }
        if let Ok(header) = std::env::var("ALIASVAULT_CLIENT_IP_HEADER") {
            config.client_ip_header = header.to_ascii_lowercase();
        }
        if let Ok(cert) = std::env::var("ALIASVAULT_TLS_CERT") {
            config.tls.cert_path = Some(cert);
        }
        if let Ok(key) = std::env::var("ALIASVAULT_TLS_KEY") {
            config.tls.key_path = Some(key);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit.max_attempts == 0 {
            anyhow::bail!("rate_limit.max_attempts must be at least 1");
        }
        if self.rate_limit.window_secs == 0 || self.rate_limit.window_secs > MAX_WINDOW_SECS {
            anyhow::bail!("rate_limit.window_secs must be between 1 and {MAX_WINDOW_SECS}");
        }
        if self.client_ip_header.trim().is_empty() {
            anyhow::bail!("client_ip_header must not be empty");
        }
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "upstream.base_url must be an http(s) URL, got {}",
                self.upstream.base_url
            );
        }
        if self.tls.cert_path.is_some() != self.tls.key_path.is_some() {
            tracing::warn!("Only one of tls.cert_path / tls.key_path is set; serving plain HTTP");
        }
        Ok(())
    }
}
