//! Wire types for the recently-played endpoint
//!
//! Everything the source might omit is an `Option` or a defaulted list;
//! the normalizer decides which absences are fatal for an item. The
//! `track` field carries the played item even when it is actually a
//! podcast episode - the payload's `type` tag is the only reliable
//! discriminator.

use serde::Deserialize;

/// One page of recently-played history, most-recent-first
#[derive(Debug, Clone, Deserialize)]
pub struct RecentlyPlayedPage {
    #[serde(default)]
    pub items: Vec<PlayHistoryItem>,
}

/// One raw play-history entry
#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Option<PlayedItem>,
    pub played_at: Option<String>,
}

/// The played item payload (track or episode, per `type`)
#[derive(Debug, Clone, Deserialize)]
pub struct PlayedItem {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub duration_ms: Option<i64>,
    pub explicit: Option<bool>,
    pub popularity: Option<i64>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    pub show: Option<ShowRef>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: Option<String>,
}

/// Artist reference nested in a track payload
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Album reference nested in a track payload
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumRef {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub album_type: Option<String>,
}

/// Show (podcast series) reference nested in an episode payload
#[derive(Debug, Clone, Deserialize)]
pub struct ShowRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}
