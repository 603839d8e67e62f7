//! The persisted settings blob and the key-value stores that hold it.
//!
//! The proxy keeps exactly one record: the admin password hash, the
//! upstream API key and the token signing secret, serialised as JSON under
//! the [`SETTINGS_KEY`] key. Stores only need atomic `get`/`put`.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};

/// Key under which the settings blob is stored.
pub const SETTINGS_KEY: &str = "config";

const SECRET_LEN: usize = 32;

/// Minimal key-value persistence used for the settings blob.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// Stored configuration of an initialized proxy.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub admin_password_hash: String,
    pub addy_api_key: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub initialized: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("admin_password_hash", &"<redacted>")
            .field("addy_api_key", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("initialized", &self.initialized)
            .finish()
    }
}

/// Partial update of [`Settings`]. `None` or empty fields keep the stored value.
#[derive(Default, Clone)]
pub struct SettingsUpdate {
    pub admin_password_hash: Option<String>,
    pub addy_api_key: Option<String>,
    pub jwt_secret: Option<String>,
}

impl Settings {
    /// Returns a copy of `self` with the non-empty fields of `update` applied.
    #[must_use]
    pub fn merged(&self, update: SettingsUpdate) -> Self {
        fn pick(new: Option<String>, old: &str) -> String {
            new.filter(|v| !v.is_empty())
                .unwrap_or_else(|| old.to_string())
        }

        Self {
            admin_password_hash: pick(update.admin_password_hash, &self.admin_password_hash),
            addy_api_key: pick(update.addy_api_key, &self.addy_api_key),
            jwt_secret: pick(update.jwt_secret, &self.jwt_secret),
            initialized: self.initialized,
        }
    }
}

/// Reads the settings blob.
///
/// A missing or unreadable blob is reported as `None`, which callers treat
/// as "not initialized".
pub async fn load_settings(store: &dyn KeyValueStore) -> Option<Settings> {
    let raw = match store.get(SETTINGS_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read settings: {e}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Stored settings are not valid JSON: {e}");
            None
        }
    }
}

pub async fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> CoreResult<()> {
    let raw = serde_json::to_string(settings)?;
    store.put(SETTINGS_KEY, &raw).await
}

/// Generates a random 32-character alphanumeric signing secret.
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers never observe a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::Store(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    async fn put(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// In-process store; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
