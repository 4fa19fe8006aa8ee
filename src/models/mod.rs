// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Each entity's wire shape (field casing, envelope, coercions) lives next
//! to its domain struct, so normalization rules are defined once per type.

pub mod entry;
pub mod social;
pub mod stats;
pub mod user;

pub use entry::{LogEntry, NewEntry};
pub use social::{Friend, FriendStatus, LeaderboardEntry, UserSearchResult};
pub use stats::{DailyCount, Stats};
pub use user::User;
