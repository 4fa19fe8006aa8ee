//! Client configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development, matching how the mobile
//! builds select their backend.

use std::env;
use std::path::PathBuf;

/// Production backend used when no override is configured.
const DEFAULT_API_URL: &str = "https://api.ganasuperfacil.com";

/// Fixed per-request timeout, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Path of the file-backed session store
    pub storage_path: PathBuf,
    /// Cloudinary account for photo uploads (upload disabled when absent)
    pub cloudinary_cloud_name: Option<String>,
    /// Cloudinary unsigned upload preset
    pub cloudinary_upload_preset: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default, so loading never fails; a malformed
    /// timeout falls back to the default rather than aborting startup.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            api_url: env::var("POOTY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout_secs: env::var("POOTY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            storage_path: env::var("POOTY_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("pooty_session.json")),
            cloudinary_cloud_name: env::var("POOTY_CLOUDINARY_CLOUD_NAME").ok(),
            cloudinary_upload_preset: env::var("POOTY_CLOUDINARY_UPLOAD_PRESET").ok(),
        }
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://127.0.0.1:0".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage_path: PathBuf::from("pooty_session_test.json"),
            cloudinary_cloud_name: None,
            cloudinary_upload_preset: None,
        }
    }
}
