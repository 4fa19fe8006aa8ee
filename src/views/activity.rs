// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View model for the current user's logged entries and aggregate stats.
//!
//! Collections are replaced wholesale on every fetch. Consistency after a
//! mutation comes from refetching rather than optimistic local edits: when
//! `create_entry` or `delete_entry` returns `true`, both the entry list
//! and the stats snapshot have already been refreshed, so callers get
//! read-your-writes without doing anything else.

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::models::entry::{LogEntry, LogListWire, NewEntry};
use crate::models::stats::Stats;
use crate::session::SessionManager;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use validator::Validate;

/// Scope selector for the shared feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Me,
    Friends,
}

impl FeedFilter {
    fn as_query(self) -> &'static str {
        match self {
            FeedFilter::All => "all",
            FeedFilter::Me => "me",
            FeedFilter::Friends => "friends",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEntryBody<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    entry: &'a NewEntry,
}

/// Client-side view of "my logs", "my stats", and the shared feed.
pub struct ActivityData {
    gateway: Arc<Gateway>,
    session: Arc<SessionManager>,
    logs: Mutex<Vec<LogEntry>>,
    feed: Mutex<Vec<LogEntry>>,
    stats: Mutex<Option<Stats>>,
    loading: AtomicBool,
    /// Entry ids with a delete currently outstanding
    deletes_in_flight: DashMap<String, ()>,
}

impl ActivityData {
    pub fn new(gateway: Arc<Gateway>, session: Arc<SessionManager>) -> Self {
        Self {
            gateway,
            session,
            logs: Mutex::new(Vec::new()),
            feed: Mutex::new(Vec::new()),
            stats: Mutex::new(None),
            loading: AtomicBool::new(false),
            deletes_in_flight: DashMap::new(),
        }
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn feed(&self) -> Vec<LogEntry> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// True while an entry-list fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Fetch and replace the entry list. No-op when signed out; on error
    /// the previous list is kept so a transient failure never blanks a
    /// working screen. The loading flag is reset on every path.
    pub async fn fetch_logs(&self) {
        let Some(user) = self.session.current_user() else {
            return;
        };

        self.loading.store(true, Ordering::SeqCst);
        let result = self
            .gateway
            .get_json::<LogListWire>("/poops", &[("userId", user.id.clone())])
            .await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(list) => {
                *self.logs.lock().unwrap_or_else(PoisonError::into_inner) = list.into_entries();
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch logs"),
        }
    }

    /// Fetch and replace the stats snapshot. Same failure semantics as
    /// [`fetch_logs`](Self::fetch_logs).
    pub async fn fetch_stats(&self) {
        let Some(user) = self.session.current_user() else {
            return;
        };

        match self
            .gateway
            .get_json::<Stats>("/stats", &[("userId", user.id.clone())])
            .await
        {
            Ok(stats) => {
                *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = Some(stats);
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch stats"),
        }
    }

    /// Fetch the shared feed for the given scope.
    pub async fn fetch_feed(&self, filter: FeedFilter) {
        if self.session.current_user().is_none() {
            return;
        }

        match self
            .gateway
            .get_json::<LogListWire>("/poops/feed", &[("filter", filter.as_query().to_string())])
            .await
        {
            Ok(list) => {
                *self.feed.lock().unwrap_or_else(PoisonError::into_inner) = list.into_entries();
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch feed"),
        }
    }

    /// Create an entry. Validates locally first (the backend re-checks);
    /// on success both dependent collections are refreshed, sequentially,
    /// before `true` is returned. Failure returns `false` and leaves the
    /// collections untouched.
    pub async fn create_entry(&self, entry: NewEntry) -> bool {
        let Some(user) = self.session.current_user() else {
            return false;
        };

        if let Err(err) = entry.validate() {
            tracing::warn!(error = %err, "Rejected invalid entry locally");
            return false;
        }

        let body = CreateEntryBody {
            user_id: &user.id,
            entry: &entry,
        };

        match self.gateway.post("/poops", &body).await {
            Ok(()) => {
                self.fetch_logs().await;
                self.fetch_stats().await;
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to create entry");
                false
            }
        }
    }

    /// Delete an entry by id, with the same refetch-on-success contract as
    /// [`create_entry`](Self::create_entry). A second delete for an id
    /// that is still in flight is ignored and returns `false`.
    pub async fn delete_entry(&self, id: &str) -> bool {
        if self.session.current_user().is_none() {
            return false;
        }

        if self.deletes_in_flight.insert(id.to_string(), ()).is_some() {
            tracing::debug!(id, "Delete already in flight, ignoring");
            return false;
        }

        let result = self.gateway.delete(&format!("/poops/{id}")).await;
        self.deletes_in_flight.remove(id);

        match result {
            Ok(()) => {
                self.fetch_logs().await;
                self.fetch_stats().await;
                true
            }
            Err(err) => {
                tracing::error!(error = %err, id, "Failed to delete entry");
                false
            }
        }
    }

    /// Fetch a friend's entries. Returned to the caller rather than stored;
    /// the friend-detail screen owns its own copy.
    pub async fn fetch_friend_logs(&self, user_id: &str) -> Result<Vec<LogEntry>, ClientError> {
        let list: LogListWire = self
            .gateway
            .get_json(&format!("/friends/{user_id}/poops"), &[])
            .await?;
        Ok(list.into_entries())
    }
}
