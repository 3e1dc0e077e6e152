//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. Every ingestion invariant the engine relies on is
//! declared here: the unique natural key on `listens.played_at`, the
//! foreign keys from listens to their entities, and the CHECK constraint
//! tying the listen's item-type tag to its populated reference columns.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Referential integrity is load-bearing for the engine, and pragmas
    // are per-connection, so they go through the connect options rather
    // than one-off queries. WAL allows a concurrent manual run alongside
    // a scheduled one.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    initialize_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent - safe to call repeatedly)
///
/// Split out from [`init_database`] so tests can run against
/// `sqlite::memory:` pools.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_tracks_table(pool).await?;
    create_podcast_series_table(pool).await?;
    create_podcast_episodes_table(pool).await?;
    create_listens_table(pool).await?;

    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            artist_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            spotify_url TEXT,
            image_url TEXT,
            genres TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            album_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            release_date TEXT,
            album_type TEXT,
            spotify_url TEXT,
            image_url TEXT,
            primary_artist_id TEXT REFERENCES artists(artist_id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_albums_artist ON albums(primary_artist_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            track_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            duration_ms INTEGER,
            explicit INTEGER,
            popularity INTEGER,
            preview_url TEXT,
            spotify_url TEXT,
            album_id TEXT NOT NULL REFERENCES albums(album_id),
            available_markets TEXT NOT NULL DEFAULT '[]',
            last_played_at TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (duration_ms IS NULL OR duration_ms >= 0),
            CHECK (popularity IS NULL OR (popularity >= 0 AND popularity <= 100))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_album ON tracks(album_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_last_played ON tracks(last_played_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_podcast_series_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS podcast_series (
            series_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            publisher TEXT,
            description TEXT,
            image_url TEXT,
            spotify_url TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_podcast_episodes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS podcast_episodes (
            episode_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            duration_ms INTEGER,
            explicit INTEGER,
            release_date TEXT,
            spotify_url TEXT,
            series_id TEXT NOT NULL REFERENCES podcast_series(series_id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (duration_ms IS NULL OR duration_ms >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_episodes_series ON podcast_episodes(series_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_listens_table(pool: &SqlitePool) -> Result<()> {
    // played_at is both the natural key and the high-water mark ordering
    // key. The item-type CHECK makes a listen row reference exactly one
    // of track/episode, with artist/album denormalized for track listens
    // only.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listens (
            listen_id INTEGER PRIMARY KEY AUTOINCREMENT,
            played_at TEXT NOT NULL UNIQUE,
            item_type TEXT NOT NULL CHECK (item_type IN ('track', 'episode')),
            track_id TEXT REFERENCES tracks(track_id),
            episode_id TEXT REFERENCES podcast_episodes(episode_id),
            artist_id TEXT REFERENCES artists(artist_id),
            album_id TEXT REFERENCES albums(album_id),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (
                (item_type = 'track'
                    AND track_id IS NOT NULL
                    AND artist_id IS NOT NULL
                    AND album_id IS NOT NULL
                    AND episode_id IS NULL)
                OR
                (item_type = 'episode'
                    AND episode_id IS NOT NULL
                    AND track_id IS NULL
                    AND artist_id IS NULL
                    AND album_id IS NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listens_track ON listens(track_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listens_episode ON listens(episode_id)")
        .execute(pool)
        .await?;

    Ok(())
}
