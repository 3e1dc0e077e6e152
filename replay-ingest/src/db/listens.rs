//! Listen event database operations
//!
//! `played_at` is the natural key: a single user cannot start two plays
//! at the same instant, so the UNIQUE column doubles as the idempotency
//! guard and the high-water mark for incremental fetches.

use chrono::{DateTime, Utc};
use replay_common::db::models::{ListenRow, ListenedItem, NormalizedListen};
use replay_common::time::{format_timestamp, parse_timestamp};
use replay_common::Result;
use sqlx::{SqliteConnection, SqlitePool};

/// Read the high-water mark: the most recent `played_at` on record.
///
/// Returns `None` for an empty store. Timestamps are stored as
/// fixed-width RFC3339 UTC text, so SQL `MAX()` is chronologically
/// correct.
pub async fn max_played_at(pool: &SqlitePool) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = sqlx::query_scalar("SELECT MAX(played_at) FROM listens")
        .fetch_one(pool)
        .await?;

    raw.map(|s| parse_timestamp(&s)).transpose()
}

/// Insert a listen event, keyed by `played_at`.
///
/// Returns `true` if a row was inserted, `false` if a listen at that
/// instant already exists. The conflict path is an expected outcome of
/// re-fetching overlapping pages, not an error.
pub async fn insert_listen(
    conn: &mut SqliteConnection,
    listen: &NormalizedListen,
) -> Result<bool> {
    let (track_id, episode_id, artist_id, album_id) = match &listen.item {
        ListenedItem::Track {
            artist,
            album,
            track,
        } => (
            Some(track.track_id.as_str()),
            None,
            Some(artist.artist_id.as_str()),
            Some(album.album_id.as_str()),
        ),
        ListenedItem::Episode { episode, .. } => {
            (None, Some(episode.episode_id.as_str()), None, None)
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO listens (played_at, item_type, track_id, episode_id, artist_id, album_id)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(played_at) DO NOTHING
        "#,
    )
    .bind(format_timestamp(listen.played_at))
    .bind(listen.kind().as_str())
    .bind(track_id)
    .bind(episode_id)
    .bind(artist_id)
    .bind(album_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Count all recorded listens
pub async fn count_listens(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listens")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Load a single listen by its `played_at` key
pub async fn load_listen(
    pool: &SqlitePool,
    played_at: DateTime<Utc>,
) -> Result<Option<ListenRow>> {
    let row = sqlx::query_as::<_, ListenRow>(
        r#"
        SELECT listen_id, played_at, item_type, track_id, episode_id, artist_id, album_id
        FROM listens
        WHERE played_at = ?
        "#,
    )
    .bind(format_timestamp(played_at))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
