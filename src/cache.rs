use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    QuotaExceeded(StoreError),
    #[error(transparent)]
    StoreUnavailable(StoreError),
    #[error("failed to encode value for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode value for {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for CacheError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::QuotaExceeded { .. } => CacheError::QuotaExceeded(e),
            _ => CacheError::StoreUnavailable(e),
        }
    }
}

/// JSON values on top of a string store.
///
/// `save`, `load` and `remove` are best effort: failures are logged and never
/// reach the caller, and an unreadable entry looks exactly like a missing one.
/// The `try_` variants expose what actually happened.
pub struct Cache<S> {
    store: S,
}

impl<S: KeyValueStore> Cache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, json)?;
        debug!(key, "saved");
        Ok(())
    }

    /// `Ok(None)` for a missing key or an empty entry.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let raw = match self.store.get(key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub fn try_remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)?;
        Ok(())
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            error!(key, error = %e, "failed to save to storage");
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_load(key).unwrap_or_else(|e| {
            error!(key, error = %e, "failed to get from storage");
            None
        })
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            error!(key, error = %e, "failed to remove from storage");
        }
    }
}
