// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable key/value storage for the session, and the vault that owns the
//! two session keys.
//!
//! The storage engine itself is opaque to the rest of the crate: anything
//! implementing [`SessionStore`] works. [`FileStore`] is the desktop analog
//! of the device key/value storage; [`MemoryStore`] backs tests.

use crate::models::User;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Storage key holding the cached user profile (JSON).
pub const USER_KEY: &str = "pooty_user";

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "pooty_token";

/// Errors from the storage engine.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage: {0}")]
    Corrupt(String),
}

/// Persistent key/value storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store with write-through persistence.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            return self.flush(&entries);
        }
        Ok(())
    }
}

/// The only code path allowed to touch the two session keys.
///
/// Profile and token are written and cleared as a pair; a half-present pair
/// reads back as no session and is cleaned up on sight. Both the session
/// manager and the gateway's 401 handler go through this type, so the
/// dual-write invariant has a single owner.
pub struct SessionVault {
    store: Arc<dyn SessionStore>,
}

impl SessionVault {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Write the cached profile and token together.
    pub fn persist(&self, user: &User, token: &str) -> Result<(), StorageError> {
        let profile =
            serde_json::to_string(user).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.store.set(USER_KEY, &profile)?;
        self.store.set(TOKEN_KEY, token)?;
        Ok(())
    }

    /// Remove both keys. Idempotent; concurrent clears commute. Storage
    /// errors are logged rather than propagated since every caller treats
    /// a failed clear the same as an already-empty store.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(USER_KEY) {
            tracing::warn!(error = %err, "Failed to remove cached profile");
        }
        if let Err(err) = self.store.remove(TOKEN_KEY) {
            tracing::warn!(error = %err, "Failed to remove bearer token");
        }
    }

    /// Read the stored session, both keys or nothing.
    pub fn load(&self) -> Option<(User, String)> {
        let profile = match self.store.get(USER_KEY) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read cached profile");
                return None;
            }
        };
        let token = match self.store.get(TOKEN_KEY) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read bearer token");
                return None;
            }
        };

        match (profile, token) {
            (Some(profile), Some(token)) => match serde_json::from_str::<User>(&profile) {
                Ok(user) => Some((user, token)),
                Err(err) => {
                    tracing::warn!(error = %err, "Cached profile is corrupt, clearing session");
                    self.clear();
                    None
                }
            },
            (None, None) => None,
            _ => {
                // Half a session is no session.
                tracing::warn!("Storage held only one of profile/token, clearing session");
                self.clear();
                None
            }
        }
    }

    /// Current bearer token, if any. Read per request by the gateway.
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read bearer token");
                None
            }
        }
    }
}
