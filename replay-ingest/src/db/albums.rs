//! Album database operations

use replay_common::db::models::Album;
use replay_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert an album if absent (attributes are write-once, like artists).
///
/// Must run after the owning artist's upsert within the same unit of
/// work, so the `primary_artist_id` foreign key resolves.
pub async fn upsert_album(conn: &mut SqliteConnection, album: &Album) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO albums (album_id, name, release_date, album_type, spotify_url, image_url, primary_artist_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(album_id) DO NOTHING
        "#,
    )
    .bind(&album.album_id)
    .bind(&album.name)
    .bind(album.release_date.map(|d| d.to_string()))
    .bind(&album.album_type)
    .bind(&album.spotify_url)
    .bind(&album.image_url)
    .bind(&album.primary_artist_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load album by source ID
pub async fn load_album(pool: &SqlitePool, album_id: &str) -> Result<Option<Album>> {
    let row = sqlx::query(
        r#"
        SELECT album_id, name, release_date, album_type, spotify_url, image_url, primary_artist_id
        FROM albums
        WHERE album_id = ?
        "#,
    )
    .bind(album_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let release_date: Option<String> = row.get("release_date");
        Album {
            album_id: row.get("album_id"),
            name: row.get("name"),
            release_date: release_date.and_then(|d| d.parse().ok()),
            album_type: row.get("album_type"),
            spotify_url: row.get("spotify_url"),
            image_url: row.get("image_url"),
            primary_artist_id: row.get("primary_artist_id"),
        }
    }))
}
