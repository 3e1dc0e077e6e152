//! Ingestion pipeline
//!
//! A run is: fetch one recently-played page, drop everything at or
//! before the stored high-water mark, normalize the remainder, then
//! persist each listen in its own transaction, oldest first. Crashing
//! mid-run loses nothing: committed listens advance the watermark, and
//! the next run picks up exactly where this one stopped.

pub mod engine;
pub mod filter;

pub use engine::{ingest_page, RunSummary};
pub use filter::{filter_new_items, FilteredItem};
