//! Podcast series and episode database operations
//!
//! Both are write-once: insert if absent, never update. Episodes have no
//! mutable field analogous to a track's `last_played_at`.

use replay_common::db::models::{PodcastEpisode, PodcastSeries};
use replay_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Insert a podcast series if absent
pub async fn upsert_series(conn: &mut SqliteConnection, series: &PodcastSeries) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO podcast_series (series_id, name, publisher, description, image_url, spotify_url)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(series_id) DO NOTHING
        "#,
    )
    .bind(&series.series_id)
    .bind(&series.name)
    .bind(&series.publisher)
    .bind(&series.description)
    .bind(&series.image_url)
    .bind(&series.spotify_url)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert a podcast episode if absent.
///
/// Must run after the owning series' upsert within the same unit of
/// work, so the `series_id` foreign key resolves.
pub async fn upsert_episode(conn: &mut SqliteConnection, episode: &PodcastEpisode) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO podcast_episodes (
            episode_id, name, description, duration_ms, explicit,
            release_date, spotify_url, series_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(episode_id) DO NOTHING
        "#,
    )
    .bind(&episode.episode_id)
    .bind(&episode.name)
    .bind(&episode.description)
    .bind(episode.duration_ms)
    .bind(episode.explicit)
    .bind(episode.release_date.map(|d| d.to_string()))
    .bind(&episode.spotify_url)
    .bind(&episode.series_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load an episode's owning series ID (`None` if the episode is unknown)
pub async fn episode_series_id(pool: &SqlitePool, episode_id: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT series_id FROM podcast_episodes WHERE episode_id = ?")
        .bind(episode_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("series_id")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_common::db::initialize_schema;

    fn sample_series() -> PodcastSeries {
        PodcastSeries {
            series_id: "show_1".to_string(),
            name: "Test Show".to_string(),
            publisher: Some("Publisher".to_string()),
            description: None,
            image_url: None,
            spotify_url: None,
        }
    }

    fn sample_episode() -> PodcastEpisode {
        PodcastEpisode {
            episode_id: "episode_1".to_string(),
            name: "Test Episode".to_string(),
            description: Some("About nothing.".to_string()),
            duration_ms: Some(1800000),
            explicit: Some(false),
            release_date: None,
            spotify_url: None,
            series_id: "show_1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_series_and_episode() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        initialize_schema(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        upsert_series(&mut conn, &sample_series()).await.unwrap();
        upsert_episode(&mut conn, &sample_episode()).await.unwrap();

        assert_eq!(
            episode_series_id(&pool, "episode_1").await.unwrap().as_deref(),
            Some("show_1")
        );

        // Re-inserting either is a no-op
        upsert_series(&mut conn, &sample_series()).await.unwrap();
        upsert_episode(&mut conn, &sample_episode()).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM podcast_episodes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
