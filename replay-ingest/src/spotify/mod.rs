//! Spotify API collaborators: OAuth token refresh and the
//! recently-played fetch. Both are thin; all ingestion correctness lives
//! behind them in [`crate::ingest`].

pub mod auth;
pub mod client;
pub mod types;

pub use auth::SpotifyOAuthClient;
pub use client::SpotifyClient;
pub use types::RecentlyPlayedPage;
