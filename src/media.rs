// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo upload to Cloudinary.
//!
//! Entries reference photos by URL; the bytes themselves go to Cloudinary
//! via an unsigned upload preset and only the resulting `secure_url` is
//! sent to the backend.

use crate::config::Config;
use crate::error::ClientError;
use serde::Deserialize;

/// Folder uploads are grouped under in the Cloudinary account.
const UPLOAD_FOLDER: &str = "popometro";

/// Result of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedPhoto {
    pub secure_url: String,
    pub public_id: String,
}

/// Uploads entry photos to Cloudinary.
///
/// Uses its own HTTP client without the gateway's fixed timeout: a photo
/// on a slow uplink routinely takes longer than an API round trip.
pub struct MediaUploader {
    http: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

impl MediaUploader {
    /// Build from config. Returns `None` when the Cloudinary settings are
    /// absent, in which case photo upload is simply unavailable.
    pub fn from_config(config: &Config) -> Option<Self> {
        let cloud_name = config.cloudinary_cloud_name.clone()?;
        let upload_preset = config.cloudinary_upload_preset.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            cloud_name,
            upload_preset,
        })
    }

    /// Upload raw image bytes. The returned `secure_url` is what gets
    /// stored on the entry as its photo reference.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedPhoto, ClientError> {
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(&mime_for(filename))
            .map_err(|e| ClientError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", UPLOAD_FOLDER);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Upload(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Upload(format!("Malformed upload response: {}", e)))
    }
}

/// Guess an image MIME type from the file extension, defaulting to JPEG.
fn mime_for(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("image/{}", ext.to_ascii_lowercase()),
        _ => "image/jpeg".to_string(),
    }
}
