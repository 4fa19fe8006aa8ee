// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement catalog and unlock detection.
//!
//! Achievements derive purely from the aggregate stats snapshot. The set
//! of already-celebrated ids is remembered in device storage so each
//! unlock is announced exactly once.

use crate::models::stats::Stats;
use crate::storage::SessionStore;
use std::sync::Arc;

/// Storage key remembering which achievement ids were already celebrated.
const UNLOCKED_KEY: &str = "unlocked_achievements";

/// What an achievement gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threshold {
    /// Minimum all-time entry count
    Total(u32),
    /// Minimum longest consecutive-day streak
    Streak(u32),
}

/// One achievement definition with its unlock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

const DEFINITIONS: &[(&str, &str, &str, &str, Threshold)] = &[
    ("first", "Baptism", "🎉", "Log your first one", Threshold::Total(1)),
    ("streak3", "Active Volcano", "🌋", "Keep a 3-day streak", Threshold::Streak(3)),
    ("streak7", "Well-Oiled Machine", "⚙️", "Keep a 7-day streak", Threshold::Streak(7)),
    ("streak30", "Throne King", "👑", "Keep a 30-day streak", Threshold::Streak(30)),
    ("total10", "Beginner", "🐣", "Log 10 in total", Threshold::Total(10)),
    ("total50", "Restroom Veteran", "🎖️", "Log 50 in total", Threshold::Total(50)),
    ("total100", "Golden Throne", "🏆", "Log 100 in total", Threshold::Total(100)),
    ("total500", "Living Legend", "🐐", "Log 500 in total", Threshold::Total(500)),
    ("streak14", "Iron Gut", "💪", "Keep a 14-day streak", Threshold::Streak(14)),
];

/// Full catalog with unlock state computed from the given stats.
pub fn catalog(stats: Option<&Stats>) -> Vec<Achievement> {
    DEFINITIONS
        .iter()
        .map(|&(id, name, emoji, description, threshold)| {
            let unlocked = match (threshold, stats) {
                (_, None) => false,
                (Threshold::Total(n), Some(s)) => s.all_time >= n,
                (Threshold::Streak(n), Some(s)) => s.longest_streak >= n,
            };
            Achievement {
                id,
                name,
                emoji,
                description,
                unlocked,
            }
        })
        .collect()
}

/// Tracks which unlocks have already been celebrated.
pub struct AchievementLedger {
    store: Arc<dyn SessionStore>,
}

impl AchievementLedger {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Diff the currently unlocked achievements against the remembered
    /// set, persist the union, and return what is newly unlocked (in
    /// catalog order) for the caller to celebrate.
    pub fn newly_unlocked(&self, stats: &Stats) -> Vec<Achievement> {
        let previous = self.load_ids();
        let unlocked: Vec<Achievement> = catalog(Some(stats))
            .into_iter()
            .filter(|a| a.unlocked)
            .collect();

        let fresh: Vec<Achievement> = unlocked
            .iter()
            .filter(|a| !previous.iter().any(|p| p == a.id))
            .cloned()
            .collect();

        if !fresh.is_empty() {
            let ids: Vec<&str> = unlocked.iter().map(|a| a.id).collect();
            match serde_json::to_string(&ids) {
                Ok(raw) => {
                    if let Err(err) = self.store.set(UNLOCKED_KEY, &raw) {
                        tracing::warn!(error = %err, "Failed to persist unlocked achievements");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "Failed to encode unlocked achievements"),
            }
        }

        fresh
    }

    fn load_ids(&self) -> Vec<String> {
        match self.store.get(UNLOCKED_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read unlocked achievements");
                Vec::new()
            }
        }
    }
}
