//! Aggregate statistics snapshot for the current user.
//!
//! Computed server-side; the client only ever replaces the whole snapshot,
//! never mutates it.

use serde::{Deserialize, Serialize};

/// Per-day entry count for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Calendar date, "YYYY-MM-DD"
    pub date: String,
    pub count: u32,
}

/// Aggregate snapshot. The stats endpoint serializes these fields in
/// camelCase, unlike the entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub today: u32,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub all_time: u32,
    /// Consecutive calendar days ending today with at least one entry
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub avg_per_day: f64,
    #[serde(default)]
    pub daily_data: Vec<DailyCount>,
}
