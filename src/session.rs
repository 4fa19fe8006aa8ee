// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: restore, login, register, logout, account deletion.

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::models::user::{AuthPayload, User};
use crate::storage::SessionVault;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Where the client is in the authentication lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Before `restore` has run
    Unknown,
    /// No user signed in
    Anonymous,
    /// A user is signed in
    Authenticated,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

/// Owns the "who is logged in" state and keeps it durable.
///
/// This is the only mutation surface for the in-memory user; consumers
/// read via [`SessionManager::current_user`] and [`SessionManager::state`].
pub struct SessionManager {
    gateway: Arc<Gateway>,
    vault: Arc<SessionVault>,
    user: Mutex<Option<User>>,
    restored: AtomicBool,
}

impl SessionManager {
    pub fn new(gateway: Arc<Gateway>, vault: Arc<SessionVault>) -> Self {
        Self {
            gateway,
            vault,
            user: Mutex::new(None),
            restored: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.current_user().is_some() {
            SessionState::Authenticated
        } else if self.restored.load(Ordering::SeqCst) {
            SessionState::Anonymous
        } else {
            SessionState::Unknown
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Restore the session from storage. No network call is made: the
    /// cached profile may be stale and is not re-validated until the next
    /// authenticated request. Any storage problem lands in `Anonymous`.
    pub fn restore(&self) {
        if let Some((user, _token)) = self.vault.load() {
            tracing::info!(user_id = %user.id, username = %user.username, "Session restored from storage");
            self.set_user(Some(user));
        }
        self.restored.store(true, Ordering::SeqCst);
    }

    /// Log in with credentials. On success the profile and token are
    /// persisted together and the in-memory user replaced; a session that
    /// was already authenticated is silently replaced. On failure nothing
    /// changes and the error is surfaced for display.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let payload: AuthPayload = self
            .gateway
            .post_json("/auth/login", &LoginBody { username, password })
            .await?;
        Ok(self.install(payload))
    }

    /// Create an account and sign in. A blank display name is omitted from
    /// the request entirely.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, ClientError> {
        let display_name = display_name.map(str::trim).filter(|name| !name.is_empty());
        let payload: AuthPayload = self
            .gateway
            .post_json(
                "/auth/register",
                &RegisterBody {
                    username,
                    password,
                    display_name,
                },
            )
            .await?;
        Ok(self.install(payload))
    }

    /// Clear the in-memory user immediately, then the stored keys. Never
    /// calls the backend. Safe to call repeatedly.
    pub fn logout(&self) {
        self.set_user(None);
        self.vault.clear();
        self.restored.store(true, Ordering::SeqCst);
    }

    /// Delete the current account on the backend, then drop the local
    /// session.
    pub async fn delete_account(&self) -> Result<(), ClientError> {
        self.gateway.delete("/auth/account").await?;
        self.logout();
        Ok(())
    }

    fn install(&self, payload: AuthPayload) -> User {
        let user = User::from(payload.user);
        if let Err(err) = self.vault.persist(&user, &payload.token) {
            // The session still works for this process; it just will not
            // survive a restart.
            tracing::error!(error = %err, "Failed to persist session");
        }
        tracing::info!(user_id = %user.id, username = %user.username, "Signed in");
        self.set_user(Some(user.clone()));
        self.restored.store(true, Ordering::SeqCst);
        user
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }
}
