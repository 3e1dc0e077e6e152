//! Ingestion engine
//!
//! Drives one page of play history through filter, normalizer, and
//! per-item persistence. Each listen commits in its own transaction,
//! oldest first, so an interrupted run leaves a consistent store whose
//! high-water mark reflects exactly the listens that made it in.

use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use replay_common::db::models::{ListenedItem, NormalizedListen};
use replay_common::time::{beginning_of_time, format_timestamp};
use replay_common::Result;

use crate::db::{
    albums::upsert_album,
    artists::upsert_artist,
    listens::{insert_listen, max_played_at},
    podcasts::{upsert_episode, upsert_series},
    tracks::upsert_track,
};
use crate::ingest::filter::filter_new_items;
use crate::normalizer::normalize_item;
use crate::spotify::types::RecentlyPlayedPage;

/// Per-run accounting, logged at the end of every ingestion run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items on the fetched page
    pub fetched: usize,
    /// Items strictly after the high-water mark
    pub new_items: usize,
    /// Listens committed by this run
    pub committed: usize,
    /// Listens whose `played_at` was already on record
    pub already_present: usize,
    /// Items dropped before persistence (bad timestamp, malformed payload)
    pub skipped: usize,
    /// Items that failed during persistence
    pub failed: usize,
}

enum ItemOutcome {
    Committed,
    AlreadyIngested,
}

/// Ingest one recently-played page into the store.
///
/// Reads the current high-water mark, drops everything at or before it,
/// then normalizes and persists the remainder oldest-first. Item-level
/// problems are counted and logged, never fatal; only setup failures
/// (reading the watermark) abort the run.
pub async fn ingest_page(pool: &SqlitePool, page: &RecentlyPlayedPage) -> Result<RunSummary> {
    let watermark = max_played_at(pool).await?.unwrap_or_else(beginning_of_time);
    debug!("High-water mark: {}", format_timestamp(watermark));

    let mut summary = RunSummary {
        fetched: page.items.len(),
        ..RunSummary::default()
    };

    let (new_items, unkeyed) = filter_new_items(&page.items, watermark);
    summary.new_items = new_items.len();
    summary.skipped += unkeyed;

    for item in new_items {
        let listen = match normalize_item(item.raw, item.played_at) {
            Ok(listen) => listen,
            Err(e) => {
                warn!(
                    played_at = %format_timestamp(item.played_at),
                    error = %e,
                    "Skipping item that could not be normalized"
                );
                summary.skipped += 1;
                continue;
            }
        };

        match persist_listen(pool, &listen).await {
            Ok(ItemOutcome::Committed) => summary.committed += 1,
            Ok(ItemOutcome::AlreadyIngested) => summary.already_present += 1,
            Err(e) => {
                error!(
                    played_at = %format_timestamp(listen.played_at),
                    item_id = %listen.item_id(),
                    error = %e,
                    "Failed to persist listen"
                );
                summary.failed += 1;
            }
        }
    }

    info!(
        "Ingestion run: {} fetched, {} new, {} committed, {} already present, {} skipped, {} failed",
        summary.fetched,
        summary.new_items,
        summary.committed,
        summary.already_present,
        summary.skipped,
        summary.failed
    );

    Ok(summary)
}

/// Persist one listen and its entity graph in a single transaction.
///
/// Entities are upserted before the listen row so its foreign keys
/// resolve; the listen insert itself decides whether this instant was
/// already on record.
async fn persist_listen(pool: &SqlitePool, listen: &NormalizedListen) -> Result<ItemOutcome> {
    let mut tx = pool.begin().await?;

    match &listen.item {
        ListenedItem::Track {
            artist,
            album,
            track,
        } => {
            upsert_artist(&mut *tx, artist).await?;
            upsert_album(&mut *tx, album).await?;
            upsert_track(&mut *tx, track).await?;
        }
        ListenedItem::Episode { series, episode } => {
            upsert_series(&mut *tx, series).await?;
            upsert_episode(&mut *tx, episode).await?;
        }
    }

    let inserted = insert_listen(&mut *tx, listen).await?;
    tx.commit().await?;

    if inserted {
        Ok(ItemOutcome::Committed)
    } else {
        Ok(ItemOutcome::AlreadyIngested)
    }
}
