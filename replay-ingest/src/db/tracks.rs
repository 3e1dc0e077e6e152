//! Track database operations
//!
//! Tracks carry the engine's only mutable field, `last_played_at`. The
//! upsert advances it with a single conditional statement, so the value
//! is monotonic under any interleaving of runs - no read-modify-write,
//! no lost updates.

use chrono::{DateTime, Utc};
use replay_common::db::models::Track;
use replay_common::time::{format_timestamp, parse_timestamp};
use replay_common::Result;
use sqlx::types::Json;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert a track, or advance its `last_played_at` watermark.
///
/// On conflict the immutable attributes keep their first-seen values;
/// `last_played_at` is updated only when the incoming value is strictly
/// newer than the stored one.
pub async fn upsert_track(conn: &mut SqliteConnection, track: &Track) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tracks (
            track_id, name, duration_ms, explicit, popularity,
            preview_url, spotify_url, album_id, available_markets, last_played_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(track_id) DO UPDATE SET
            last_played_at = excluded.last_played_at
        WHERE tracks.last_played_at IS NULL
           OR excluded.last_played_at > tracks.last_played_at
        "#,
    )
    .bind(&track.track_id)
    .bind(&track.name)
    .bind(track.duration_ms)
    .bind(track.explicit)
    .bind(track.popularity)
    .bind(&track.preview_url)
    .bind(&track.spotify_url)
    .bind(&track.album_id)
    .bind(Json(&track.available_markets))
    .bind(format_timestamp(track.last_played_at))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Read a track's `last_played_at` watermark (`None` if the track is
/// unknown or has never been played)
pub async fn last_played_at(
    pool: &SqlitePool,
    track_id: &str,
) -> Result<Option<DateTime<Utc>>> {
    let row = sqlx::query("SELECT last_played_at FROM tracks WHERE track_id = ?")
        .bind(track_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let raw: Option<String> = row.get("last_played_at");
            raw.map(|s| parse_timestamp(&s)).transpose()
        }
        None => Ok(None),
    }
}
