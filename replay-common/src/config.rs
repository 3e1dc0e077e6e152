//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV: &str = "REPLAY_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "replay.db";

/// Spotify API credentials
///
/// The refresh token is long-lived and obtained once out of band; each
/// run exchanges it for a short-lived access token.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    root_folder: Option<String>,
    spotify: Option<SpotifyCredentials>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `REPLAY_ROOT_FOLDER` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Ok(config) = load_config_file() {
        if let Some(root_folder) = config.root_folder {
            return PathBuf::from(root_folder);
        }
    }

    default_root_folder()
}

/// Path of the SQLite database inside the resolved root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Load Spotify credentials.
///
/// Environment variables (`SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`,
/// `SPOTIFY_REFRESH_TOKEN`) take priority; the `[spotify]` table of the
/// config file is the fallback. Missing values are a fatal setup error
/// naming every absent variable.
pub fn load_spotify_credentials() -> Result<SpotifyCredentials> {
    let from_env = (
        non_empty_env("SPOTIFY_CLIENT_ID"),
        non_empty_env("SPOTIFY_CLIENT_SECRET"),
        non_empty_env("SPOTIFY_REFRESH_TOKEN"),
    );

    if let (Some(client_id), Some(client_secret), Some(refresh_token)) = from_env.clone() {
        return Ok(SpotifyCredentials {
            client_id,
            client_secret,
            refresh_token,
        });
    }

    if let Ok(config) = load_config_file() {
        if let Some(credentials) = config.spotify {
            return Ok(credentials);
        }
    }

    let mut missing = Vec::new();
    if from_env.0.is_none() {
        missing.push("SPOTIFY_CLIENT_ID");
    }
    if from_env.1.is_none() {
        missing.push("SPOTIFY_CLIENT_SECRET");
    }
    if from_env.2.is_none() {
        missing.push("SPOTIFY_REFRESH_TOKEN");
    }
    Err(Error::Config(format!(
        "Missing required environment variables: {}",
        missing.join(", ")
    )))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn load_config_file() -> Result<ConfigFile> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Per-user config file path (`~/.config/replay/config.toml` on Linux),
/// with `/etc/replay/config.toml` as a system-wide fallback.
fn config_file_path() -> Result<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("replay").join("config.toml")) {
        if path.exists() {
            return Ok(path);
        }
    }

    let system_config = PathBuf::from("/etc/replay/config.toml");
    if system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("replay"))
        .unwrap_or_else(|| PathBuf::from("./replay_data"))
}
