//! # Replay Ingest
//!
//! Pulls the listener's recently-played history from the Spotify API and
//! persists it as a deduplicated, foreign-key-consistent listen log.
//!
//! The interesting part is not the fetch: it is making repeated, possibly
//! overlapping, possibly partially-failed runs converge to the same store
//! state. That lives in [`ingest::engine`], which commits one listen (and
//! its entity graph) per transaction under insert-or-ignore and
//! conditional monotonic update semantics.

pub mod db;
pub mod ingest;
pub mod normalizer;
pub mod spotify;
