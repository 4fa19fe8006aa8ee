// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: an in-process stub of the Pooty backend plus a
//! helper to build an `App` wired to it.
//!
//! The stub keeps its state in memory and hands tests a handle for
//! seeding and assertions. Coordinates are serialized as strings, the way
//! the real backend's decimal columns come out, so the client's coercion
//! path is exercised end to end.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use pooty_client::config::Config;
use pooty_client::storage::{MemoryStore, SessionStore};
use pooty_client::App;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct StubUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct StubLog {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub photo_url: Option<String>,
    pub rating: Option<u8>,
    pub duration_minutes: Option<u32>,
}

impl StubLog {
    /// Minimal log for seeding.
    #[allow(dead_code)]
    pub fn seed(user_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: String::new(), // assigned by Backend::seed_log
            user_id: user_id.to_string(),
            timestamp,
            notes: None,
            latitude: None,
            longitude: None,
            location_name: None,
            photo_url: None,
            rating: None,
            duration_minutes: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StubFriendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub accepted: bool,
}

/// In-memory backend state, shared with tests.
#[derive(Default)]
pub struct Backend {
    pub users: Mutex<Vec<StubUser>>,
    /// token -> user id
    pub tokens: Mutex<HashMap<String, String>>,
    pub logs: Mutex<Vec<StubLog>>,
    pub friendships: Mutex<Vec<StubFriendship>>,
    /// Requests served by the search endpoint
    pub search_hits: AtomicU64,
    next_id: AtomicU64,
}

impl Backend {
    fn next_id(&self, prefix: &str) -> String {
        format!(
            "{}{}",
            prefix,
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        )
    }

    /// Register a user directly, returning its id.
    pub fn seed_user(&self, username: &str, password: &str, display_name: &str) -> String {
        let id = self.next_id("u");
        self.users.lock().unwrap().push(StubUser {
            id: id.clone(),
            username: username.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        });
        id
    }

    /// Insert a log directly, returning its id.
    #[allow(dead_code)]
    pub fn seed_log(&self, mut log: StubLog) -> String {
        let id = self.next_id("p");
        log.id = id.clone();
        self.logs.lock().unwrap().push(log);
        id
    }

    /// Insert a friendship record directly.
    #[allow(dead_code)]
    pub fn seed_friendship(
        &self,
        requester_id: &str,
        addressee_id: &str,
        accepted: bool,
    ) -> String {
        let id = self.next_id("f");
        self.friendships.lock().unwrap().push(StubFriendship {
            id: id.clone(),
            requester_id: requester_id.to_string(),
            addressee_id: addressee_id.to_string(),
            accepted,
        });
        id
    }

    /// Invalidate every issued token (simulates server-side expiry).
    #[allow(dead_code)]
    pub fn revoke_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    fn user_by_name(&self, username: &str) -> Option<StubUser> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    fn user_by_id(&self, id: &str) -> Option<StubUser> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    fn issue_token(&self, user_id: &str) -> String {
        let token = format!(
            "tok-{}-{}",
            user_id,
            self.next_id.fetch_add(1, Ordering::SeqCst)
        );
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), user_id.to_string());
        token
    }

    fn auth(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?;
        self.tokens.lock().unwrap().get(token).cloned()
    }

    fn profile_json(user: &StubUser) -> Value {
        json!({
            "id": user.id,
            "username": user.username,
            "displayName": user.display_name,
        })
    }

    fn auth_user_json(user: &StubUser) -> Value {
        // Auth endpoints serialize the profile snake_case
        json!({
            "id": user.id,
            "username": user.username,
            "display_name": user.display_name,
            "created_at": "2026-01-01T00:00:00Z",
        })
    }

    fn log_json(log: &StubLog) -> Value {
        json!({
            "id": log.id,
            "user_id": log.user_id,
            "timestamp": log.timestamp.to_rfc3339(),
            "notes": log.notes,
            "latitude": log.latitude.map(|v| v.to_string()),
            "longitude": log.longitude.map(|v| v.to_string()),
            "location_name": log.location_name,
            "photo_url": log.photo_url,
            "rating": log.rating,
            "duration_minutes": log.duration_minutes,
        })
    }

    fn accepted_friend_ids(&self, user_id: &str) -> Vec<String> {
        self.friendships
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.accepted)
            .filter_map(|f| {
                if f.requester_id == user_id {
                    Some(f.addressee_id.clone())
                } else if f.addressee_id == user_id {
                    Some(f.requester_id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> u32 {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && l.timestamp >= since)
            .count() as u32
    }

    fn stats_json(&self, user_id: &str) -> Value {
        let now = Utc::now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight")
            .and_utc();
        let mine: Vec<StubLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        let all_time = mine.len() as u32;

        let mut days: Vec<NaiveDate> = mine.iter().map(|l| l.timestamp.date_naive()).collect();
        days.sort_unstable();
        days.dedup();

        let mut longest = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for day in &days {
            run = match prev {
                Some(p) if *day == p + Duration::days(1) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            prev = Some(*day);
        }

        let day_set: HashSet<NaiveDate> = days.iter().copied().collect();
        let mut current = 0u32;
        let mut cursor = now.date_naive();
        while day_set.contains(&cursor) {
            current += 1;
            cursor = cursor - Duration::days(1);
        }

        let daily: Vec<Value> = days
            .iter()
            .map(|day| {
                let count = mine
                    .iter()
                    .filter(|l| l.timestamp.date_naive() == *day)
                    .count();
                json!({"date": day.to_string(), "count": count})
            })
            .collect();

        let avg = if days.is_empty() {
            0.0
        } else {
            all_time as f64 / days.len() as f64
        };

        json!({
            "today": mine.iter().filter(|l| l.timestamp >= today_start).count(),
            "week": mine.iter().filter(|l| l.timestamp >= now - Duration::days(7)).count(),
            "month": mine.iter().filter(|l| l.timestamp >= now - Duration::days(30)).count(),
            "allTime": all_time,
            "currentStreak": current,
            "longestStreak": longest,
            "avgPerDay": avg,
            "dailyData": daily,
        })
    }

    fn friend_row_json(&self, friendship: &StubFriendship, viewer_id: &str) -> Value {
        let other_id = if friendship.requester_id == viewer_id {
            &friendship.addressee_id
        } else {
            &friendship.requester_id
        };
        let other = self.user_by_id(other_id).expect("user exists");
        let now = Utc::now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight")
            .and_utc();

        json!({
            "id": friendship.id,
            "user": Self::profile_json(&other),
            "status": if friendship.accepted { "accepted" } else { "pending" },
            "streakCount": self.stats_json(other_id)["currentStreak"].clone(),
            "todayCount": self.count_since(other_id, today_start),
            "weekCount": self.count_since(other_id, now - Duration::days(7)),
        })
    }
}

// ─── Handlers ────────────────────────────────────────────────

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match backend.user_by_name(username) {
        Some(user) if user.password == password => {
            let token = backend.issue_token(&user.id);
            Json(json!({"user": Backend::auth_user_json(&user), "token": token})).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn register(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if username.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if backend.user_by_name(&username).is_some() {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "username_taken"})),
        )
            .into_response();
    }

    let display_name = body
        .get("displayName")
        .and_then(|v| v.as_str())
        .unwrap_or(&username)
        .to_string();
    let id = backend.seed_user(
        &username,
        body["password"].as_str().unwrap_or_default(),
        &display_name,
    );
    let user = backend.user_by_id(&id).expect("just created");
    let token = backend.issue_token(&id);

    Json(json!({"user": Backend::auth_user_json(&user), "token": token})).into_response()
}

async fn delete_account(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    let Some(user_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    backend.users.lock().unwrap().retain(|u| u.id != user_id);
    backend.logs.lock().unwrap().retain(|l| l.user_id != user_id);
    backend
        .friendships
        .lock()
        .unwrap()
        .retain(|f| f.requester_id != user_id && f.addressee_id != user_id);
    backend.tokens.lock().unwrap().retain(|_, v| *v != user_id);

    Json(json!({"success": true})).into_response()
}

async fn list_logs(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if backend.auth(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let user_id = params.get("userId").cloned().unwrap_or_default();

    let logs: Vec<Value> = backend
        .logs
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.user_id == user_id)
        .map(Backend::log_json)
        .collect();

    Json(json!({"logs": logs})).into_response()
}

async fn feed(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let filter = params.get("filter").map(String::as_str).unwrap_or("all");

    let mut visible: HashSet<String> = HashSet::new();
    match filter {
        "me" => {
            visible.insert(viewer_id.clone());
        }
        "friends" => {
            visible.insert(viewer_id.clone());
            visible.extend(backend.accepted_friend_ids(&viewer_id));
        }
        _ => {
            let users = backend.users.lock().unwrap();
            visible.extend(users.iter().map(|u| u.id.clone()));
        }
    }

    let logs: Vec<Value> = backend
        .logs
        .lock()
        .unwrap()
        .iter()
        .filter(|l| visible.contains(&l.user_id))
        .map(Backend::log_json)
        .collect();

    Json(json!({"logs": logs})).into_response()
}

async fn create_log(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let rating = body.get("rating").and_then(|v| v.as_u64());
    if let Some(rating) = rating {
        if !(1..=5).contains(&rating) {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad_rating"}))).into_response();
        }
    }

    let log = StubLog {
        id: backend.next_id("p"),
        user_id: viewer_id,
        timestamp: Utc::now(),
        notes: body
            .get("notes")
            .and_then(|v| v.as_str())
            .map(String::from),
        latitude: body.get("latitude").and_then(|v| v.as_f64()),
        longitude: body.get("longitude").and_then(|v| v.as_f64()),
        location_name: body
            .get("locationName")
            .and_then(|v| v.as_str())
            .map(String::from),
        photo_url: body
            .get("photoUrl")
            .and_then(|v| v.as_str())
            .map(String::from),
        rating: rating.map(|r| r as u8),
        duration_minutes: body
            .get("durationMinutes")
            .and_then(|v| v.as_u64())
            .map(|d| d as u32),
    };
    let response = Backend::log_json(&log);
    backend.logs.lock().unwrap().push(log);

    (StatusCode::CREATED, Json(response)).into_response()
}

async fn delete_log(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let mut logs = backend.logs.lock().unwrap();
    let before = logs.len();
    logs.retain(|l| !(l.id == id && l.user_id == viewer_id));
    if logs.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(json!({"success": true})).into_response()
}

async fn stats(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if backend.auth(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let user_id = params.get("userId").cloned().unwrap_or_default();
    Json(backend.stats_json(&user_id)).into_response()
}

async fn friends(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    // Like the real backend, this returns the viewer's relationships in
    // every status; keeping only accepted rows is the client's job.
    let friendships: Vec<StubFriendship> = backend
        .friendships
        .lock()
        .unwrap()
        .iter()
        .filter(|f| f.requester_id == viewer_id || f.addressee_id == viewer_id)
        .cloned()
        .collect();
    let rows: Vec<Value> = friendships
        .iter()
        .map(|f| backend.friend_row_json(f, &viewer_id))
        .collect();

    Json(json!({"friends": rows})).into_response()
}

async fn pending_requests(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let friendships: Vec<StubFriendship> = backend
        .friendships
        .lock()
        .unwrap()
        .iter()
        .filter(|f| f.addressee_id == viewer_id && !f.accepted)
        .cloned()
        .collect();
    let rows: Vec<Value> = friendships
        .iter()
        .map(|f| backend.friend_row_json(f, &viewer_id))
        .collect();

    Json(json!({"requests": rows})).into_response()
}

async fn search(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    backend.search_hits.fetch_add(1, Ordering::SeqCst);

    let query = params.get("query").cloned().unwrap_or_default();
    let friendships = backend.friendships.lock().unwrap().clone();

    let users: Vec<Value> = backend
        .users
        .lock()
        .unwrap()
        .iter()
        .filter(|u| u.id != viewer_id && u.username.contains(&query))
        .map(|u| {
            let status = friendships
                .iter()
                .find(|f| {
                    (f.requester_id == viewer_id && f.addressee_id == u.id)
                        || (f.requester_id == u.id && f.addressee_id == viewer_id)
                })
                .map(|f| if f.accepted { "accepted" } else { "pending" });
            json!({
                "id": u.id,
                "username": u.username,
                "displayName": u.display_name,
                "friendshipStatus": status,
            })
        })
        .collect();

    Json(json!({"users": users})).into_response()
}

async fn friend_request(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let username = body["friendUsername"].as_str().unwrap_or_default();
    let Some(target) = backend.user_by_name(username) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut friendships = backend.friendships.lock().unwrap();
    let exists = friendships.iter().any(|f| {
        (f.requester_id == viewer_id && f.addressee_id == target.id)
            || (f.requester_id == target.id && f.addressee_id == viewer_id)
    });
    if exists || target.id == viewer_id {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "already_exists"})),
        )
            .into_response();
    }

    let id = backend.next_id("f");
    friendships.push(StubFriendship {
        id: id.clone(),
        requester_id: viewer_id,
        addressee_id: target.id,
        accepted: false,
    });

    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

async fn respond(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let friendship_id = body["friendshipId"].as_str().unwrap_or_default();
    let accept = body["accept"].as_bool().unwrap_or(false);

    let mut friendships = backend.friendships.lock().unwrap();
    let Some(index) = friendships
        .iter()
        .position(|f| f.id == friendship_id && f.addressee_id == viewer_id)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if accept {
        friendships[index].accepted = true;
    } else {
        friendships.remove(index);
    }

    Json(json!({"success": true})).into_response()
}

async fn friend_logs(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response {
    if backend.auth(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let logs: Vec<Value> = backend
        .logs
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.user_id == user_id)
        .map(Backend::log_json)
        .collect();

    Json(json!({"logs": logs})).into_response()
}

async fn leaderboard(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    let Some(viewer_id) = backend.auth(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let mut member_ids = backend.accepted_friend_ids(&viewer_id);
    member_ids.push(viewer_id.clone());

    let week_ago = Utc::now() - Duration::days(7);
    let mut rows: Vec<(StubUser, u32)> = member_ids
        .iter()
        .filter_map(|id| backend.user_by_id(id))
        .map(|user| {
            let count = backend.count_since(&user.id, week_ago);
            (user, count)
        })
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));

    let entries: Vec<Value> = rows
        .iter()
        .enumerate()
        .map(|(i, (user, count))| {
            json!({
                "rank": i + 1,
                "user": Backend::profile_json(user),
                "value": count,
                "isCurrentUser": user.id == viewer_id,
            })
        })
        .collect();

    Json(json!({"leaderboard": entries})).into_response()
}

// ─── Wiring ──────────────────────────────────────────────────

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/account", delete(delete_account))
        .route("/poops", get(list_logs).post(create_log))
        .route("/poops/feed", get(feed))
        .route("/poops/{id}", delete(delete_log))
        .route("/stats", get(stats))
        .route("/friends", get(friends))
        .route("/friends/requests/pending", get(pending_requests))
        .route("/friends/search", get(search))
        .route("/friends/request", post(friend_request))
        .route("/friends/respond", post(respond))
        .route("/friends/{user_id}/poops", get(friend_logs))
        .route("/leaderboard", get(leaderboard))
        .with_state(backend)
}

/// Start a stub backend on an ephemeral port.
pub async fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("local addr");
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub backend");
    });

    (backend, format!("http://{}", addr))
}

/// Build an `App` wired to a fresh stub backend and an in-memory store.
#[allow(dead_code)]
pub async fn test_app() -> (App, Arc<Backend>, Arc<MemoryStore>) {
    let (backend, base_url) = spawn_backend().await;
    let mut config = Config::test_default();
    config.api_url = base_url;

    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let app = App::new(config, dyn_store).expect("build app");

    (app, backend, store)
}
