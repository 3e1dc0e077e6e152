//! Entity models shared between the normalizer and the persistence layer
//!
//! All primary identifiers are the source system's opaque IDs, stable
//! across runs. Artist, album, series, and episode attributes are
//! write-once: the first observed values are authoritative and are never
//! overwritten by later ingestion runs. The only mutable field anywhere
//! is `Track::last_played_at`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Performer of a track (first listed artist on the source payload)
#[derive(Debug, Clone)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub spotify_url: Option<String>,
    pub image_url: Option<String>,
    pub genres: Vec<String>,
}

/// Release (album) owning a track
#[derive(Debug, Clone)]
pub struct Album {
    pub album_id: String,
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub album_type: Option<String>,
    pub spotify_url: Option<String>,
    pub image_url: Option<String>,
    /// Nullable only if the source payload carries no artist reference
    pub primary_artist_id: Option<String>,
}

/// Music track
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: String,
    pub name: String,
    pub duration_ms: Option<i64>,
    pub explicit: Option<bool>,
    pub popularity: Option<i64>,
    pub preview_url: Option<String>,
    pub spotify_url: Option<String>,
    pub album_id: String,
    pub available_markets: Vec<String>,
    /// Monotonic: equals max(played_at) over all committed listens of
    /// this track, regardless of processing order
    pub last_played_at: DateTime<Utc>,
}

/// Podcast series (show)
#[derive(Debug, Clone)]
pub struct PodcastSeries {
    pub series_id: String,
    pub name: String,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
}

/// Podcast episode
#[derive(Debug, Clone)]
pub struct PodcastEpisode {
    pub episode_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_ms: Option<i64>,
    pub explicit: Option<bool>,
    pub release_date: Option<NaiveDate>,
    pub spotify_url: Option<String>,
    pub series_id: String,
}

/// Kind tag of a listen event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenKind {
    Track,
    Episode,
}

impl ListenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenKind::Track => "track",
            ListenKind::Episode => "episode",
        }
    }
}

impl std::fmt::Display for ListenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity graph extracted from one raw play-history item.
///
/// The track/episode polymorphism is a tagged union here; the listens
/// table CHECK constraint is the runtime backstop for the same
/// invariant.
#[derive(Debug, Clone)]
pub enum ListenedItem {
    Track {
        artist: Artist,
        album: Album,
        track: Track,
    },
    Episode {
        series: PodcastSeries,
        episode: PodcastEpisode,
    },
}

/// One normalized listen event with its full entity graph
#[derive(Debug, Clone)]
pub struct NormalizedListen {
    /// Natural key: globally unique across all listens
    pub played_at: DateTime<Utc>,
    pub item: ListenedItem,
}

impl NormalizedListen {
    pub fn kind(&self) -> ListenKind {
        match self.item {
            ListenedItem::Track { .. } => ListenKind::Track,
            ListenedItem::Episode { .. } => ListenKind::Episode,
        }
    }

    /// Source ID of the played item (track or episode)
    pub fn item_id(&self) -> &str {
        match &self.item {
            ListenedItem::Track { track, .. } => &track.track_id,
            ListenedItem::Episode { episode, .. } => &episode.episode_id,
        }
    }
}

/// A committed listens row, as read back from the store
#[derive(Debug, Clone, FromRow)]
pub struct ListenRow {
    pub listen_id: i64,
    /// RFC 3339 text as stored (see `crate::time`)
    pub played_at: String,
    pub item_type: String,
    pub track_id: Option<String>,
    pub episode_id: Option<String>,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}
