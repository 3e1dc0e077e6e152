//! Entity normalizer
//!
//! Maps one raw play-history item into its typed entity graph: artist,
//! album, and track for music items; series and episode for podcast
//! items. Pure with respect to its input - no I/O happens here.
//!
//! Items of unrecognized kind or with missing required nested fields
//! produce a [`NormalizeError`], which the engine treats as skippable
//! with a warning, never as fatal for the run.

use crate::spotify::types::{AlbumRef, ArtistRef, PlayHistoryItem, PlayedItem, ShowRef};
use chrono::{DateTime, NaiveDate, Utc};
use replay_common::db::models::{
    Album, Artist, ListenedItem, NormalizedListen, PodcastEpisode, PodcastSeries, Track,
};
use replay_common::time::format_timestamp;
use thiserror::Error;

/// Why a raw item could not be normalized
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Identified by the play timestamp: a payload-less item has no
    /// item ID to report
    #[error("item played at {played_at} has no playable payload")]
    MissingPayload { played_at: String },

    #[error("unrecognized item kind '{kind}' for item {item_id}")]
    UnrecognizedKind { kind: String, item_id: String },

    #[error("missing required field '{field}' for item {item_id}")]
    MissingField {
        field: &'static str,
        item_id: String,
    },
}

/// Normalize one raw item into its entity graph.
///
/// `played_at` has already been parsed and filtered by the caller; it
/// becomes both the listen's natural key and, for tracks, the candidate
/// `last_played_at` value.
pub fn normalize_item(
    raw: &PlayHistoryItem,
    played_at: DateTime<Utc>,
) -> Result<NormalizedListen, NormalizeError> {
    let payload = raw.track.as_ref().ok_or_else(|| NormalizeError::MissingPayload {
        played_at: format_timestamp(played_at),
    })?;

    let item = match payload.kind.as_str() {
        "track" => normalize_track(payload, played_at)?,
        "episode" => normalize_episode(payload)?,
        other => {
            return Err(NormalizeError::UnrecognizedKind {
                kind: other.to_string(),
                item_id: item_id_for_errors(payload),
            })
        }
    };

    Ok(NormalizedListen { played_at, item })
}

fn normalize_track(
    payload: &PlayedItem,
    played_at: DateTime<Utc>,
) -> Result<ListenedItem, NormalizeError> {
    let track_id = require(payload.id.clone(), "id", payload)?;
    let track_name = require(payload.name.clone(), "name", payload)?;

    let artist_ref: &ArtistRef = payload
        .artists
        .first()
        .ok_or_else(|| missing("artists", payload))?;
    let artist_id = require(artist_ref.id.clone(), "artists[0].id", payload)?;
    let artist_name = require(artist_ref.name.clone(), "artists[0].name", payload)?;

    let album_ref: &AlbumRef = payload.album.as_ref().ok_or_else(|| missing("album", payload))?;
    let album_id = require(album_ref.id.clone(), "album.id", payload)?;
    let album_name = require(album_ref.name.clone(), "album.name", payload)?;

    // The source exposes no artist imagery on play-history items; the
    // album cover stands in for it.
    let album_image_url = album_ref.images.first().and_then(|img| img.url.clone());

    let artist = Artist {
        artist_id: artist_id.clone(),
        name: artist_name,
        spotify_url: artist_ref.external_urls.spotify.clone(),
        image_url: album_image_url.clone(),
        genres: artist_ref.genres.clone(),
    };

    let album = Album {
        album_id: album_id.clone(),
        name: album_name,
        release_date: parse_release_date(
            album_ref.release_date.as_deref(),
            album_ref.release_date_precision.as_deref(),
        ),
        album_type: album_ref.album_type.clone(),
        spotify_url: album_ref.external_urls.spotify.clone(),
        image_url: album_image_url,
        primary_artist_id: Some(artist_id),
    };

    let track = Track {
        track_id,
        name: track_name,
        duration_ms: payload.duration_ms,
        explicit: payload.explicit,
        popularity: payload.popularity,
        preview_url: payload.preview_url.clone(),
        spotify_url: payload.external_urls.spotify.clone(),
        album_id,
        available_markets: payload.available_markets.clone(),
        last_played_at: played_at,
    };

    Ok(ListenedItem::Track {
        artist,
        album,
        track,
    })
}

fn normalize_episode(payload: &PlayedItem) -> Result<ListenedItem, NormalizeError> {
    let episode_id = require(payload.id.clone(), "id", payload)?;
    let episode_name = require(payload.name.clone(), "name", payload)?;

    let show: &ShowRef = payload.show.as_ref().ok_or_else(|| missing("show", payload))?;
    let series_id = require(show.id.clone(), "show.id", payload)?;
    let series_name = require(show.name.clone(), "show.name", payload)?;

    let series = PodcastSeries {
        series_id: series_id.clone(),
        name: series_name,
        publisher: show.publisher.clone(),
        description: show.description.clone(),
        image_url: show.images.first().and_then(|img| img.url.clone()),
        spotify_url: show.external_urls.spotify.clone(),
    };

    let episode = PodcastEpisode {
        episode_id,
        name: episode_name,
        description: payload.description.clone(),
        duration_ms: payload.duration_ms,
        explicit: payload.explicit,
        release_date: parse_release_date(
            payload.release_date.as_deref(),
            payload.release_date_precision.as_deref(),
        ),
        spotify_url: payload.external_urls.spotify.clone(),
        series_id,
    };

    Ok(ListenedItem::Episode { series, episode })
}

/// Parse a release date under the source's precision tag.
///
/// Month precision arrives as `YYYY-MM` and year precision as `YYYY`;
/// both are pinned to the first day of the period. Unknown precision or
/// a malformed date yields `None` rather than an error - release dates
/// are informational, not structural.
pub fn parse_release_date(date: Option<&str>, precision: Option<&str>) -> Option<NaiveDate> {
    let date = date?;
    match precision? {
        "day" => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        "month" => NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d").ok(),
        "year" => date
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        _ => None,
    }
}

fn item_id_for_errors(payload: &PlayedItem) -> String {
    payload.id.clone().unwrap_or_else(|| "unknown".to_string())
}

fn missing(field: &'static str, payload: &PlayedItem) -> NormalizeError {
    NormalizeError::MissingField {
        field,
        item_id: item_id_for_errors(payload),
    }
}

fn require(
    value: Option<String>,
    field: &'static str,
    payload: &PlayedItem,
) -> Result<String, NormalizeError> {
    value.ok_or_else(|| missing(field, payload))
}
