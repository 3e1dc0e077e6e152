//! # Replay Common Library
//!
//! Shared code for the Replay listening-history service:
//! - Database initialization and schema
//! - Entity models (artists, albums, tracks, podcasts, listens)
//! - Configuration loading
//! - Error types
//! - Timestamp formatting helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
