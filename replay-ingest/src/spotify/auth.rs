//! Spotify OAuth client
//!
//! Exchanges the long-lived refresh token for a short-lived access token
//! at the start of each run. 401/403 mean the refresh token or client
//! credentials are bad - that is terminal, not retryable.

use replay_common::config::SpotifyCredentials;
use replay_common::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth token-refresh client
pub struct SpotifyOAuthClient {
    http_client: Client,
    credentials: SpotifyCredentials,
}

impl SpotifyOAuthClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            credentials,
        }
    }

    /// Obtain an access token from the stored refresh token
    pub async fn access_token(&self) -> Result<String> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self
            .http_client
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Authentication failed ({}): {}",
                status.as_u16(),
                body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "Error getting token: {} - {}",
                status.as_u16(),
                body
            )));
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Api(format!("Access token not found in token response: {}", e)))?;

        debug!("Refreshed Spotify access token");
        Ok(data.access_token)
    }
}
