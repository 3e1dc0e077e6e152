//! replay-ingest - Spotify listening history ingestion
//!
//! One invocation performs one ingestion run: refresh the access token,
//! fetch one page of recently-played items, and persist everything newer
//! than the stored high-water mark. Designed to run unattended on a
//! timer; re-running early or late never duplicates listens.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use replay_common::config::{database_path, load_spotify_credentials, resolve_root_folder};
use replay_common::db::init_database;
use replay_ingest::db::listens::max_played_at;
use replay_ingest::ingest::ingest_page;
use replay_ingest::spotify::{SpotifyClient, SpotifyOAuthClient};

#[derive(Parser, Debug)]
#[command(name = "replay-ingest", version, about = "Ingest Spotify listening history")]
struct Args {
    /// Root folder for the database (overrides REPLAY_ROOT_FOLDER and the config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Page size to request from the recently-played endpoint (1-50)
    #[arg(long, default_value_t = 50)]
    limit: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting replay-ingest v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref());
    std::fs::create_dir_all(&root_folder)?;

    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    let credentials = load_spotify_credentials()?;
    let access_token = SpotifyOAuthClient::new(credentials).access_token().await?;

    // The source-side `after` cursor trims the page to items past the
    // high-water mark; the engine re-filters by timestamp regardless.
    let after = max_played_at(&pool).await?.map(|ts| ts.timestamp_millis());

    let client = SpotifyClient::new(access_token);
    let page = client.recently_played(args.limit, after).await?;
    info!("Fetched {} recently played item(s)", page.items.len());

    let summary = ingest_page(&pool, &page).await?;
    if summary.failed > 0 {
        warn!("{} item(s) failed to persist; see error logs above", summary.failed);
    }

    Ok(())
}
