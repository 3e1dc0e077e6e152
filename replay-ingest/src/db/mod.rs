//! Per-table database operations
//!
//! Every write here is a single atomic statement with conflict handling
//! baked in (`ON CONFLICT DO NOTHING`, or the conditional monotonic
//! update on `tracks.last_played_at`). There are no read-modify-write
//! sequences, so two overlapping ingestion runs converge to the same
//! state under any interleaving.

pub mod albums;
pub mod artists;
pub mod listens;
pub mod podcasts;
pub mod tracks;
