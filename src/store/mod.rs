//! Persistent key-value store for list and settings documents.
//!
//! DESIGN
//! ======
//! Each key maps to one JSON document. [`FileStore`] keeps them as
//! `<dir>/<key>.json`; [`MemoryStore`] keeps them in a shared map and can be
//! told to fail writes so callers' swallow-and-log paths can be exercised.
//!
//! ERROR HANDLING
//! ==============
//! The raw trait returns [`StoreError`]. The typed helpers [`load_json`] and
//! [`save_json`] log failures and never propagate them: the in-memory state
//! owned by the managers stays authoritative for the session.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ErrorCode;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Store key holding the JSON array of list items.
pub const SHOPPING_LIST_KEY: &str = "shoppingList";
/// Store key holding the JSON settings object.
pub const APP_SETTINGS_KEY: &str = "appSettings";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("store I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "E_STORE_KEY",
            Self::Io { .. } => "E_STORE_IO",
            Self::Encode { .. } => "E_STORE_ENCODE",
            Self::Decode { .. } => "E_STORE_DECODE",
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_))
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Raw string storage keyed by document name.
pub trait KeyValueStore {
    /// Read the raw value for `key`, or `None` when nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed or the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the raw value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed or the backing medium fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(StoreError::InvalidKey(key.to_string())) }
}

// =============================================================================
// TYPED HELPERS
// =============================================================================

/// Decode the JSON document at `key`.
///
/// # Errors
///
/// Returns an error when the read fails or the stored text is not a valid `T`.
pub fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode { key: key.to_string(), source })
}

/// Encode `value` as JSON and write it at `key`.
///
/// # Errors
///
/// Returns an error when encoding or the write fails.
pub fn write_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
    store.set(key, &raw)
}

/// Load a JSON value for `key`, logging and discarding any failure.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    match read_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, code = e.error_code(), key, "store: read failed; using defaults");
            None
        }
    }
}

/// Save a JSON value for `key`, logging and discarding any failure.
pub fn save_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) {
    match write_json(store, key, value) {
        Ok(()) => debug!(key, "store: saved"),
        Err(e) => warn!(error = %e, code = e.error_code(), key, "store: write failed; in-memory state kept"),
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Durable store keeping each key as a JSON file under one directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let io_err = |source| StoreError::Io { key: key.to_string(), source };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        // Write-then-rename so a crash mid-write never truncates the document.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, self.path_for(key)).map_err(io_err)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again when `false`).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a raw value, bypassing write-failure injection.
    ///
    /// # Errors
    ///
    /// Returns an error if the map lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
