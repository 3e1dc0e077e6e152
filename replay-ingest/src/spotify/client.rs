//! Recently-played fetch client
//!
//! Fetches one page (up to 50 items) of the listener's play history.
//! Transient failures (connect/timeout, 429, 5xx) are retried with
//! exponential backoff; auth failures and other client errors are not.

use crate::spotify::types::RecentlyPlayedPage;
use replay_common::{Error, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::warn;

const RECENTLY_PLAYED_URL: &str = "https://api.spotify.com/v1/me/player/recently-played";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Retry policy for transient upstream failures
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

enum FetchFailure {
    /// Worth retrying with backoff
    Transient(Error),
    /// Retrying cannot help (bad token, bad request)
    Fatal(Error),
}

/// Client for the recently-played endpoint
pub struct SpotifyClient {
    http_client: Client,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            access_token,
        }
    }

    /// Fetch one page of recently-played items, most-recent-first.
    ///
    /// `after` is the high-water mark in unix milliseconds; when set, the
    /// source only returns items played strictly after it. The engine
    /// filters by timestamp again regardless, so this is an optimization,
    /// not a correctness requirement.
    pub async fn recently_played(
        &self,
        limit: u8,
        after: Option<i64>,
    ) -> Result<RecentlyPlayedPage> {
        if !(1..=50).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and 50, got {}",
                limit
            )));
        }

        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_page(limit, after).await {
                Ok(page) => return Ok(page),
                Err(FetchFailure::Fatal(err)) => return Err(err),
                Err(FetchFailure::Transient(err)) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    warn!(
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %err,
                        "Transient error fetching recently played, will retry"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    async fn fetch_page(
        &self,
        limit: u8,
        after: Option<i64>,
    ) -> std::result::Result<RecentlyPlayedPage, FetchFailure> {
        let mut request = self
            .http_client
            .get(RECENTLY_PLAYED_URL)
            .bearer_auth(&self.access_token)
            .query(&[("limit", i64::from(limit))]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }

        let response = request.send().await.map_err(|e| {
            FetchFailure::Transient(Error::Http(e.to_string()))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Fatal(Error::Auth(format!(
                "Authentication failed ({}): {}",
                status.as_u16(),
                body
            ))));
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Transient(Error::Api(format!(
                "Spotify API request failed with status {}: {}",
                status.as_u16(),
                body
            ))));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Fatal(Error::Api(format!(
                "Spotify API request failed with status {}: {}",
                status.as_u16(),
                body
            ))));
        }

        response
            .json()
            .await
            .map_err(|e| FetchFailure::Fatal(Error::Api(format!("Malformed response body: {}", e))))
    }
}
