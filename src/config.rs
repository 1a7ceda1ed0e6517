use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Environment variable naming an optional TOML settings file.
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";

/// About one frame at 60 Hz.
pub const DEFAULT_SCROLL_THROTTLE_MS: u64 = 16;

pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;

pub const DEFAULT_FORM_KEY: &str = "contactForm";

pub const DEFAULT_CONSENT_KEY: &str = "cookieConsent";

/// Typical browser storage allowance per origin (5 MiB).
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub scroll_throttle_ms: u64,
    pub resize_debounce_ms: u64,
    pub form_key: String,
    pub consent_key: String,
    /// Entries live in memory only when unset.
    pub store_path: Option<PathBuf>,
    pub quota_bytes: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: DEFAULT_SCROLL_THROTTLE_MS,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            form_key: DEFAULT_FORM_KEY.to_string(),
            consent_key: DEFAULT_CONSENT_KEY.to_string(),
            store_path: None,
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Reads the file named by [`CONFIG_ENV`], or falls back to defaults.
    pub fn from_env() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                info!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match (&self.store_path, self.quota_bytes) {
            (Some(path), quota) => {
                let store = FileStore::open(path)
                    .with_context(|| format!("failed to open store at {}", path.display()))?;
                match quota {
                    Some(quota) => Box::new(store.with_quota(quota)),
                    None => Box::new(store),
                }
            }
            (None, Some(quota)) => Box::new(MemoryStore::with_quota(quota)),
            (None, None) => Box::new(MemoryStore::new()),
        };
        Ok(store)
    }
}
