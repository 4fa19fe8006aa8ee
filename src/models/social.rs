// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend relationships, leaderboard rows, and user search results.

use crate::models::User;
use serde::{Deserialize, Serialize};

/// Relationship status. The only transition is `Pending` → `Accepted`;
/// rejection removes the record entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
}

/// Profile as embedded in social payloads (camelCase fields).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWire {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl From<ProfileWire> for User {
    fn from(wire: ProfileWire) -> Self {
        let display_name = wire
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| wire.username.clone());
        Self {
            id: wire.id,
            username: wire.username,
            display_name,
            created_at: None,
        }
    }
}

/// A friend edge with denormalized counters for the friends list and
/// leaderboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Friend {
    /// Relationship id (what respond actions reference)
    pub id: String,
    /// The other party
    pub user: User,
    pub status: FriendStatus,
    pub streak_count: u32,
    pub today_count: u32,
    pub week_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendWire {
    pub id: String,
    pub user: ProfileWire,
    pub status: FriendStatus,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub today_count: u32,
    #[serde(default)]
    pub week_count: u32,
}

impl From<FriendWire> for Friend {
    fn from(wire: FriendWire) -> Self {
        Self {
            id: wire.id,
            user: wire.user.into(),
            status: wire.status,
            streak_count: wire.streak_count,
            today_count: wire.today_count,
            week_count: wire.week_count,
        }
    }
}

/// `{friends: [...]}` envelope.
#[derive(Debug, Deserialize)]
pub struct FriendListWire {
    #[serde(default)]
    pub friends: Vec<FriendWire>,
}

/// `{requests: [...]}` envelope for incoming pending requests.
#[derive(Debug, Deserialize)]
pub struct PendingListWire {
    #[serde(default)]
    pub requests: Vec<FriendWire>,
}

/// One leaderboard row for the weekly ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// 1-based; ties broken by the server
    pub rank: u32,
    pub user: User,
    /// Entry count over the ranking week
    pub value: u32,
    pub is_current_user: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryWire {
    pub rank: u32,
    pub user: ProfileWire,
    pub value: u32,
    #[serde(default)]
    pub is_current_user: bool,
}

impl From<LeaderboardEntryWire> for LeaderboardEntry {
    fn from(wire: LeaderboardEntryWire) -> Self {
        Self {
            rank: wire.rank,
            user: wire.user.into(),
            value: wire.value,
            is_current_user: wire.is_current_user,
        }
    }
}

/// `{leaderboard: [...]}` envelope.
#[derive(Debug, Deserialize)]
pub struct LeaderboardWire {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntryWire>,
}

/// Username search hit with its friendship-status annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSearchResult {
    pub user: User,
    /// `None` when there is no relationship with this user yet
    pub friendship_status: Option<FriendStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchWire {
    #[serde(flatten)]
    pub user: ProfileWire,
    #[serde(default)]
    pub friendship_status: Option<FriendStatus>,
}

impl From<UserSearchWire> for UserSearchResult {
    fn from(wire: UserSearchWire) -> Self {
        Self {
            user: wire.user.into(),
            friendship_status: wire.friendship_status,
        }
    }
}

/// `{users: [...]}` envelope.
#[derive(Debug, Deserialize)]
pub struct SearchListWire {
    #[serde(default)]
    pub users: Vec<UserSearchWire>,
}
