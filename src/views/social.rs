// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View model for friends, pending requests, leaderboard, and user search.

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::models::social::{
    Friend, FriendListWire, FriendStatus, LeaderboardEntry, LeaderboardWire, PendingListWire,
    SearchListWire, UserSearchResult,
};
use crate::session::SessionManager;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Keystroke debounce window for username search.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FriendRequestBody<'a> {
    friend_username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RespondBody<'a> {
    friendship_id: &'a str,
    accept: bool,
}

/// Client-side view of the social graph.
///
/// Friends and pending requests are separate collections and never mix:
/// `friends` holds only `accepted` rows, pending incoming requests live in
/// `pending`.
pub struct SocialData {
    gateway: Arc<Gateway>,
    session: Arc<SessionManager>,
    friends: Mutex<Vec<Friend>>,
    pending: Mutex<Vec<Friend>>,
    leaderboard: Mutex<Vec<LeaderboardEntry>>,
    search_results: Mutex<Vec<UserSearchResult>>,
    /// Bumped on every search call; stale responses compare and bail
    search_seq: AtomicU64,
    /// Target user ids with a friend request currently outstanding
    requests_in_flight: DashMap<String, ()>,
}

impl SocialData {
    pub fn new(gateway: Arc<Gateway>, session: Arc<SessionManager>) -> Self {
        Self {
            gateway,
            session,
            friends: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            leaderboard: Mutex::new(Vec::new()),
            search_results: Mutex::new(Vec::new()),
            search_seq: AtomicU64::new(0),
            requests_in_flight: DashMap::new(),
        }
    }

    pub fn friends(&self) -> Vec<Friend> {
        self.friends.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn pending_requests(&self) -> Vec<Friend> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn search_results(&self) -> Vec<UserSearchResult> {
        self.search_results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while a friend request to this user is outstanding. Screens
    /// use this to disable the per-row button.
    pub fn is_requesting(&self, target_id: &str) -> bool {
        self.requests_in_flight.contains_key(target_id)
    }

    /// Fetch accepted friendships. Rows with any other status are dropped
    /// here even if the backend over-returns, so pending requests can
    /// never leak into the friends list.
    pub async fn fetch_friends(&self) {
        if self.session.current_user().is_none() {
            return;
        }

        match self.gateway.get_json::<FriendListWire>("/friends", &[]).await {
            Ok(list) => {
                let friends: Vec<Friend> = list
                    .friends
                    .into_iter()
                    .map(Friend::from)
                    .filter(|f| f.status == FriendStatus::Accepted)
                    .collect();
                *self.friends.lock().unwrap_or_else(PoisonError::into_inner) = friends;
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch friends"),
        }
    }

    /// Fetch incoming pending requests.
    pub async fn fetch_pending_requests(&self) {
        if self.session.current_user().is_none() {
            return;
        }

        match self
            .gateway
            .get_json::<PendingListWire>("/friends/requests/pending", &[])
            .await
        {
            Ok(list) => {
                *self.pending.lock().unwrap_or_else(PoisonError::into_inner) =
                    list.requests.into_iter().map(Friend::from).collect();
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch pending requests"),
        }
    }

    /// Fetch the weekly leaderboard.
    pub async fn fetch_leaderboard(&self) {
        if self.session.current_user().is_none() {
            return;
        }

        match self
            .gateway
            .get_json::<LeaderboardWire>("/leaderboard", &[])
            .await
        {
            Ok(list) => {
                *self
                    .leaderboard
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = list
                    .leaderboard
                    .into_iter()
                    .map(LeaderboardEntry::from)
                    .collect();
            }
            Err(err) => tracing::warn!(error = %err, "Failed to fetch leaderboard"),
        }
    }

    /// Debounced username search.
    ///
    /// A blank query clears the results locally without touching the
    /// network. Otherwise the call waits out the debounce window and bails
    /// if a newer query arrived in the meantime; the sequence number is
    /// checked again after the response so a slow, stale response can
    /// never overwrite a newer one.
    pub async fn search_users(&self, query: &str) {
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let query = query.trim();
        if query.is_empty() {
            self.search_results
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            return;
        }
        if self.session.current_user().is_none() {
            return;
        }

        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        if self.search_seq.load(Ordering::SeqCst) != seq {
            return; // superseded by a newer keystroke
        }

        let result = self
            .gateway
            .get_json::<SearchListWire>("/friends/search", &[("query", query.to_string())])
            .await;

        if self.search_seq.load(Ordering::SeqCst) != seq {
            return; // a newer query won the race; keep its results
        }

        match result {
            Ok(list) => {
                *self
                    .search_results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = list
                    .users
                    .into_iter()
                    .map(UserSearchResult::from)
                    .collect();
            }
            Err(err) => tracing::warn!(error = %err, "User search failed"),
        }
    }

    /// Send a friend request to a search result.
    ///
    /// Concurrent requests to different targets proceed independently; a
    /// duplicate for a target that is still in flight is a no-op. On
    /// success the matching search row flips to pending and both friend
    /// collections are refreshed.
    pub async fn send_friend_request(&self, target: &UserSearchResult) -> Result<(), ClientError> {
        if self.session.current_user().is_none() {
            return Err(ClientError::Unauthorized);
        }

        let target_id = target.user.id.clone();
        if self
            .requests_in_flight
            .insert(target_id.clone(), ())
            .is_some()
        {
            tracing::debug!(target_id = %target_id, "Friend request already in flight");
            return Ok(());
        }

        let result = self
            .gateway
            .post(
                "/friends/request",
                &FriendRequestBody {
                    friend_username: &target.user.username,
                },
            )
            .await;
        self.requests_in_flight.remove(&target_id);

        match result {
            Ok(()) => {
                {
                    // Flip the search row right away; the refetches below
                    // bring the authoritative state.
                    let mut rows = self
                        .search_results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if let Some(row) = rows.iter_mut().find(|r| r.user.id == target_id) {
                        row.friendship_status = Some(FriendStatus::Pending);
                    }
                }
                self.fetch_friends().await;
                self.fetch_pending_requests().await;
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, target_id = %target_id, "Failed to send friend request");
                Err(err)
            }
        }
    }

    /// Accept or reject a pending request. Acceptance changes the ranking,
    /// so the leaderboard refreshes along with both friend collections.
    pub async fn respond_to_request(
        &self,
        request_id: &str,
        accept: bool,
    ) -> Result<(), ClientError> {
        if self.session.current_user().is_none() {
            return Err(ClientError::Unauthorized);
        }

        self.gateway
            .post(
                "/friends/respond",
                &RespondBody {
                    friendship_id: request_id,
                    accept,
                },
            )
            .await?;

        self.fetch_friends().await;
        self.fetch_pending_requests().await;
        self.fetch_leaderboard().await;
        Ok(())
    }
}
