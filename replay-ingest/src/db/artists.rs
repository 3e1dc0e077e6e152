//! Artist database operations

use replay_common::db::models::Artist;
use replay_common::Result;
use sqlx::types::Json;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert an artist if absent.
///
/// Artist attributes are write-once: on a primary-key conflict the
/// existing row is authoritative and nothing is overwritten.
pub async fn upsert_artist(conn: &mut SqliteConnection, artist: &Artist) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artists (artist_id, name, spotify_url, image_url, genres)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(artist_id) DO NOTHING
        "#,
    )
    .bind(&artist.artist_id)
    .bind(&artist.name)
    .bind(&artist.spotify_url)
    .bind(&artist.image_url)
    .bind(Json(&artist.genres))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load artist by source ID
pub async fn load_artist(pool: &SqlitePool, artist_id: &str) -> Result<Option<Artist>> {
    let row = sqlx::query(
        r#"
        SELECT artist_id, name, spotify_url, image_url, genres
        FROM artists
        WHERE artist_id = ?
        "#,
    )
    .bind(artist_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let genres: Json<Vec<String>> = row.get("genres");
        Artist {
            artist_id: row.get("artist_id"),
            name: row.get("name"),
            spotify_url: row.get("spotify_url"),
            image_url: row.get("image_url"),
            genres: genres.0,
        }
    }))
}
