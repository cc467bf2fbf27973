use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTING_URL: &str = "https://www.residentadvisor.net/podcast.aspx";
pub const DEFAULT_SITE_BASE_URL: &str = "https://www.residentadvisor.net";

/// Global configuration loaded from `~/.config/rapod/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RapodConfig {
    /// Number of episodes processed concurrently.
    pub max_threads: usize,
    /// Directory where audio files are saved.
    pub downloads_dir: PathBuf,
    /// Page enumerating the podcast episodes.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    /// Prefix joined with each relative episode link.
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,
    /// Optional connect timeout for every request (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_site_base_url() -> String {
    DEFAULT_SITE_BASE_URL.to_string()
}

impl Default for RapodConfig {
    fn default() -> Self {
        Self {
            max_threads: 4,
            downloads_dir: PathBuf::from("downloads/"),
            listing_url: default_listing_url(),
            site_base_url: default_site_base_url(),
            connect_timeout_secs: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rapod")
        .context("failed to resolve XDG base directories")?;
    xdg_dirs
        .place_config_file("config.toml")
        .context("failed to create config directory")
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RapodConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`], for a config file at `path`.
pub fn load_or_init_at(path: &Path) -> Result<RapodConfig> {
    if !path.exists() {
        let default_cfg = RapodConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<RapodConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: RapodConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
