//! High-water mark filtering
//!
//! Pages arrive newest-first and may overlap previously ingested
//! history. Only items strictly after the watermark survive, and the
//! survivors are reordered oldest-first so the watermark advances
//! monotonically as each one commits.

use chrono::{DateTime, Utc};
use tracing::warn;

use replay_common::time::parse_timestamp;

use crate::spotify::types::PlayHistoryItem;

/// A raw page item paired with its parsed play timestamp
pub struct FilteredItem<'a> {
    pub played_at: DateTime<Utc>,
    pub raw: &'a PlayHistoryItem,
}

/// Keep the items played strictly after `watermark`, oldest first.
///
/// Items with a missing or unparseable `played_at` are skipped with a
/// warning; they cannot be keyed and would poison the watermark.
/// Returns the survivors and the skip count.
pub fn filter_new_items<'a>(
    items: &'a [PlayHistoryItem],
    watermark: DateTime<Utc>,
) -> (Vec<FilteredItem<'a>>, usize) {
    let mut skipped = 0;
    let mut kept: Vec<FilteredItem<'a>> = Vec::with_capacity(items.len());

    for item in items {
        let raw_ts = match item.played_at.as_deref() {
            Some(ts) => ts,
            None => {
                warn!("Skipping play history item with no played_at");
                skipped += 1;
                continue;
            }
        };
        let played_at = match parse_timestamp(raw_ts) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping play history item with bad played_at {raw_ts:?}: {e}");
                skipped += 1;
                continue;
            }
        };
        if played_at > watermark {
            kept.push(FilteredItem { played_at, raw: item });
        }
    }

    // Pages are nominally newest-first, but do not rely on it
    kept.sort_by_key(|item| item.played_at);

    (kept, skipped)
}
