// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request gateway.
//!
//! Centralizes outbound HTTP so nothing else in the crate touches
//! transport details:
//! - attaches `Authorization: Bearer <token>` when a token is stored
//! - applies the fixed request timeout
//! - on HTTP 401, purges the stored session before propagating the error
//!
//! No retries, no backoff; callers own those policies if they want them.

use crate::config::Config;
use crate::error::ClientError;
use crate::storage::SessionVault;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Outbound HTTP gateway to the backend.
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    vault: Arc<SessionVault>,
}

impl Gateway {
    pub fn new(config: &Config, vault: Arc<SessionVault>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            vault,
        })
    }

    /// GET with query parameters, decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path)).query(query);
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    /// POST a JSON body, decoding a JSON response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.execute(request).await?;
        Self::decode(response).await
    }

    /// POST a JSON body where only success matters.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(request).await?;
        Ok(())
    }

    /// DELETE by path.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(path));
        self.execute(request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token when one is stored, send, and map the
    /// response status. An absent token means the request goes out
    /// unauthenticated; rejecting it is the backend's job.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = match self.vault.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(ClientError::from_transport)?;
        self.check_response(response).await
    }

    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            // Expired or invalid token: purge the stored session. In-memory
            // state stays; the presentation layer clears it on seeing the
            // error (single-writer rule).
            tracing::warn!("Received 401, clearing stored session");
            self.vault.clear();
            return Err(ClientError::Unauthorized);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
