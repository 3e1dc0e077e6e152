//! End-to-end ingestion tests
//!
//! Each test drives full pages through the engine against a real
//! on-disk database, then inspects the resulting store. The recurring
//! theme is convergence: overlapping, repeated, and partially-bad pages
//! must all land on the same final state.

use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;

use replay_common::db::init_database;
use replay_common::time::parse_timestamp;
use replay_ingest::db::listens::{count_listens, load_listen, max_played_at};
use replay_ingest::db::tracks::last_played_at;
use replay_ingest::ingest::ingest_page;
use replay_ingest::spotify::RecentlyPlayedPage;

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let pool = init_database(&dir.path().join("replay.db"))
        .await
        .expect("Failed to initialize database");
    (dir, pool)
}

fn page(items: Vec<serde_json::Value>) -> RecentlyPlayedPage {
    serde_json::from_value(json!({ "items": items })).expect("Invalid page fixture")
}

fn track_item(track_id: &str, played_at: &str) -> serde_json::Value {
    json!({
        "played_at": played_at,
        "track": {
            "id": track_id,
            "name": format!("Track {}", track_id),
            "type": "track",
            "duration_ms": 180000,
            "explicit": false,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", track_id) },
            "artists": [{
                "id": "artist_1",
                "name": "Artist One",
                "external_urls": {},
                "genres": []
            }],
            "album": {
                "id": "album_1",
                "name": "Album One",
                "images": [],
                "external_urls": {},
                "release_date": "2023-06-01",
                "release_date_precision": "day",
                "album_type": "album"
            },
            "available_markets": ["US"]
        }
    })
}

fn episode_item(episode_id: &str, played_at: &str) -> serde_json::Value {
    json!({
        "played_at": played_at,
        "track": {
            "id": episode_id,
            "name": format!("Episode {}", episode_id),
            "type": "episode",
            "duration_ms": 2400000,
            "external_urls": {},
            "show": {
                "id": "show_1",
                "name": "Show One",
                "publisher": "Publisher",
                "images": [],
                "external_urls": {}
            }
        }
    })
}

async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_single_track_into_empty_store() {
    let (_dir, pool) = test_pool().await;

    let summary = ingest_page(&pool, &page(vec![track_item("t1", "2024-01-01T00:00:00Z")]))
        .await
        .unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.new_items, 1);
    assert_eq!(summary.committed, 1);
    assert_eq!(summary.failed, 0);

    assert_eq!(table_count(&pool, "artists").await, 1);
    assert_eq!(table_count(&pool, "albums").await, 1);
    assert_eq!(table_count(&pool, "tracks").await, 1);
    assert_eq!(count_listens(&pool).await.unwrap(), 1);
    assert_eq!(
        max_played_at(&pool).await.unwrap(),
        Some(parse_timestamp("2024-01-01T00:00:00Z").unwrap())
    );

    let row = load_listen(&pool, parse_timestamp("2024-01-01T00:00:00Z").unwrap())
        .await
        .unwrap()
        .expect("listen not found");
    assert_eq!(row.item_type, "track");
    assert_eq!(row.track_id.as_deref(), Some("t1"));
    assert_eq!(row.artist_id.as_deref(), Some("artist_1"));
    assert_eq!(row.album_id.as_deref(), Some("album_1"));
    assert_eq!(row.episode_id, None);
}

#[tokio::test]
async fn test_reingesting_the_same_page_changes_nothing() {
    let (_dir, pool) = test_pool().await;
    let fixture = page(vec![
        track_item("t2", "2024-01-01T02:00:00Z"),
        track_item("t1", "2024-01-01T01:00:00Z"),
    ]);

    let first = ingest_page(&pool, &fixture).await.unwrap();
    assert_eq!(first.committed, 2);

    let second = ingest_page(&pool, &fixture).await.unwrap();
    assert_eq!(second.fetched, 2);
    // Everything is at or before the watermark now
    assert_eq!(second.new_items, 0);
    assert_eq!(second.committed, 0);

    assert_eq!(count_listens(&pool).await.unwrap(), 2);
    assert_eq!(table_count(&pool, "tracks").await, 2);
}

#[tokio::test]
async fn test_overlapping_page_adds_only_the_newer_listen() {
    let (_dir, pool) = test_pool().await;

    ingest_page(&pool, &page(vec![track_item("t1", "2024-01-01T00:00:00Z")]))
        .await
        .unwrap();

    // Next fetch overlaps the already-ingested listen
    let summary = ingest_page(
        &pool,
        &page(vec![
            track_item("t1", "2024-01-02T00:00:00Z"),
            track_item("t1", "2024-01-01T00:00:00Z"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(summary.new_items, 1);
    assert_eq!(summary.committed, 1);
    assert_eq!(count_listens(&pool).await.unwrap(), 2);
    assert_eq!(
        max_played_at(&pool).await.unwrap(),
        Some(parse_timestamp("2024-01-02T00:00:00Z").unwrap())
    );
}

#[tokio::test]
async fn test_duplicate_timestamp_within_a_page_commits_once() {
    let (_dir, pool) = test_pool().await;

    let summary = ingest_page(
        &pool,
        &page(vec![
            track_item("t1", "2024-01-01T00:00:00Z"),
            track_item("t2", "2024-01-01T00:00:00Z"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(summary.committed, 1);
    assert_eq!(summary.already_present, 1);
    assert_eq!(count_listens(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_repeated_track_advances_last_played_at() {
    let (_dir, pool) = test_pool().await;

    ingest_page(
        &pool,
        &page(vec![
            track_item("t1", "2024-01-01T08:00:00Z"),
            track_item("t1", "2024-01-01T06:00:00Z"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(count_listens(&pool).await.unwrap(), 2);
    assert_eq!(table_count(&pool, "tracks").await, 1);
    assert_eq!(
        last_played_at(&pool, "t1").await.unwrap(),
        Some(parse_timestamp("2024-01-01T08:00:00Z").unwrap())
    );
}

#[tokio::test]
async fn test_episode_listen_creates_no_music_entities() {
    let (_dir, pool) = test_pool().await;

    let summary = ingest_page(&pool, &page(vec![episode_item("e1", "2024-02-01T09:30:00Z")]))
        .await
        .unwrap();
    assert_eq!(summary.committed, 1);

    assert_eq!(table_count(&pool, "artists").await, 0);
    assert_eq!(table_count(&pool, "albums").await, 0);
    assert_eq!(table_count(&pool, "tracks").await, 0);
    assert_eq!(table_count(&pool, "podcast_series").await, 1);
    assert_eq!(table_count(&pool, "podcast_episodes").await, 1);

    let row = load_listen(&pool, parse_timestamp("2024-02-01T09:30:00Z").unwrap())
        .await
        .unwrap()
        .expect("listen not found");
    assert_eq!(row.item_type, "episode");
    assert_eq!(row.episode_id.as_deref(), Some("e1"));
    assert_eq!(row.track_id, None);
    assert_eq!(row.artist_id, None);
    assert_eq!(row.album_id, None);
}

#[tokio::test]
async fn test_unrecognized_kind_is_skipped_without_failing_the_run() {
    let (_dir, pool) = test_pool().await;

    let audiobook = json!({
        "played_at": "2024-01-01T01:30:00Z",
        "track": { "id": "ab1", "name": "Chapter 1", "type": "audiobook" }
    });

    let summary = ingest_page(
        &pool,
        &page(vec![
            track_item("t1", "2024-01-01T01:00:00Z"),
            audiobook,
            track_item("t2", "2024-01-01T02:00:00Z"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(summary.new_items, 3);
    assert_eq!(summary.committed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(count_listens(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn test_items_without_timestamps_are_skipped() {
    let (_dir, pool) = test_pool().await;

    let no_timestamp = json!({
        "track": { "id": "t9", "name": "Orphan", "type": "track" }
    });

    let summary = ingest_page(
        &pool,
        &page(vec![no_timestamp, track_item("t1", "2024-01-01T00:00:00Z")]),
    )
    .await
    .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.committed, 1);
}

#[tokio::test]
async fn test_interleaved_partial_runs_converge() {
    let (_dir, pool_a) = test_pool().await;
    let (_dir_b, pool_b) = test_pool().await;

    let full = vec![
        track_item("t3", "2024-01-03T00:00:00Z"),
        episode_item("e1", "2024-01-02T00:00:00Z"),
        track_item("t1", "2024-01-01T00:00:00Z"),
    ];

    // Store A sees the history in two overlapping fetches
    ingest_page(&pool_a, &page(vec![full[2].clone()])).await.unwrap();
    ingest_page(&pool_a, &page(full.clone())).await.unwrap();

    // Store B sees it all at once
    ingest_page(&pool_b, &page(full)).await.unwrap();

    for pool in [&pool_a, &pool_b] {
        assert_eq!(count_listens(pool).await.unwrap(), 3);
        assert_eq!(
            max_played_at(pool).await.unwrap(),
            Some(parse_timestamp("2024-01-03T00:00:00Z").unwrap())
        );
        assert_eq!(table_count(pool, "tracks").await, 2);
        assert_eq!(table_count(pool, "podcast_episodes").await, 1);
    }
}

#[tokio::test]
async fn test_empty_page_is_a_clean_noop() {
    let (_dir, pool) = test_pool().await;

    let summary = ingest_page(&pool, &page(vec![])).await.unwrap();
    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.committed, 0);
    assert_eq!(count_listens(&pool).await.unwrap(), 0);
    assert_eq!(max_played_at(&pool).await.unwrap(), None);
}
