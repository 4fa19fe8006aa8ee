// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity log entries: the domain shape, the creation payload, and the
//! wire normalization boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// One recorded event, normalized for display.
///
/// Entries are never updated in place; a correction is a delete followed
/// by a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Server-assigned at creation
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    /// Decimal degrees
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub photo_url: Option<String>,
    /// 1..=5 when present
    pub rating: Option<u8>,
    /// Whole minutes
    pub duration_minutes: Option<u32>,
}

/// Entry as the backend serializes it: snake_case fields, with coordinates
/// sometimes sent as decimal strings.
#[derive(Debug, Deserialize)]
pub struct LogEntryWire {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl From<LogEntryWire> for LogEntry {
    fn from(wire: LogEntryWire) -> Self {
        Self {
            id: wire.id,
            user_id: wire.user_id,
            timestamp: wire.timestamp,
            notes: wire.notes,
            latitude: wire.latitude,
            longitude: wire.longitude,
            location_name: wire.location_name,
            photo_url: wire.photo_url,
            rating: wire.rating,
            duration_minutes: wire.duration_minutes,
        }
    }
}

/// Accept a coordinate as a JSON number or a decimal string.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(value)) => Ok(Some(value)),
        // An unparseable coordinate drops to None rather than failing the
        // whole list.
        Some(Raw::Text(text)) => Ok(text.trim().parse().ok()),
    }
}

/// `{logs: [...]}` envelope used by every entry list endpoint.
#[derive(Debug, Deserialize)]
pub struct LogListWire {
    #[serde(default)]
    pub logs: Vec<LogEntryWire>,
}

impl LogListWire {
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.logs.into_iter().map(LogEntry::from).collect()
    }
}

/// Client-constructed creation payload for the create endpoint, which
/// expects camelCase field names. Validated locally before sending.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[validate(range(min = 1, max = 5))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}
