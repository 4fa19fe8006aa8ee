//! User profile model and the auth endpoint wire mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user profile as held by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Immutable after creation
    pub username: String,
    pub display_name: String,
    /// When the account was created (absent on some older accounts)
    pub created_at: Option<DateTime<Utc>>,
}

/// User as the auth endpoints serialize it (snake_case fields).
#[derive(Debug, Clone, Deserialize)]
pub struct UserWire {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        // Accounts registered without a display name fall back to the
        // username for display.
        let display_name = wire
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| wire.username.clone());

        Self {
            id: wire.id,
            username: wire.username,
            display_name,
            created_at: wire.created_at,
        }
    }
}

/// `{user, token}` payload returned by the login and register endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    pub user: UserWire,
    pub token: String,
}
