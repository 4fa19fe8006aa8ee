// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Pooty Tracker client core.
//!
//! The non-presentational heart of the mobile app: durable session
//! lifecycle, an authenticated HTTP gateway, and the view models that keep
//! activity and social data consistent with the backend. Screens consume
//! these types exclusively through their public operations.

pub mod achievements;
pub mod config;
pub mod error;
pub mod gateway;
pub mod media;
pub mod models;
pub mod session;
pub mod storage;
pub mod views;

use config::Config;
use error::ClientError;
use gateway::Gateway;
use models::User;
use session::{SessionManager, SessionState};
use std::sync::Arc;
use storage::{SessionStore, SessionVault};
use views::{ActivityData, SocialData};

/// Composition root wiring the session, gateway, and view models together.
///
/// Owns the reactive contract the screens rely on: whenever the session
/// transitions into authenticated (restore, login, or register), the
/// activity and social collections are refreshed once without further
/// caller action.
pub struct App {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub activity: Arc<ActivityData>,
    pub social: Arc<SocialData>,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let vault = Arc::new(SessionVault::new(store));
        let gateway = Arc::new(Gateway::new(&config, Arc::clone(&vault))?);
        let session = Arc::new(SessionManager::new(Arc::clone(&gateway), vault));
        let activity = Arc::new(ActivityData::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
        ));
        let social = Arc::new(SocialData::new(gateway, Arc::clone(&session)));

        Ok(Self {
            config,
            session,
            activity,
            social,
        })
    }

    /// Restore the session from storage and, if a user is present, load
    /// the initial data set.
    pub async fn start(&self) {
        self.session.restore();
        if self.session.state() == SessionState::Authenticated {
            self.refresh_all().await;
        }
    }

    /// Log in and load the signed-in data set before returning.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let user = self.session.login(username, password).await?;
        self.refresh_all().await;
        Ok(user)
    }

    /// Register and load the signed-in data set before returning.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, ClientError> {
        let user = self.session.register(username, password, display_name).await?;
        self.refresh_all().await;
        Ok(user)
    }

    /// Clear the session. View-model collections keep their last values
    /// until the next sign-in replaces them; screens stop rendering them
    /// once the session is anonymous.
    pub fn logout(&self) {
        self.session.logout();
    }

    async fn refresh_all(&self) {
        self.activity.fetch_logs().await;
        self.activity.fetch_stats().await;
        self.social.fetch_friends().await;
        self.social.fetch_pending_requests().await;
        self.social.fetch_leaderboard().await;
    }
}
