//! CLI for rapod, the RA podcast downloader.

mod download;
mod output;

use anyhow::Result;
use clap::Parser;
use rapod_core::config::{self, RapodConfig};
use std::path::PathBuf;

const AFTER_HELP: &str = "Examples:
  Download all podcast episodes:
    $ rapod

  Limit the number of concurrent workers and choose the download folder:
    $ rapod --max_threads=8 --downloads_dir=path/to/ra_downloads/";

/// Top-level CLI. Flags override values from the config file.
#[derive(Debug, Parser)]
#[command(name = "rapod", version)]
#[command(about = "RA Podcast Downloader", long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Max number of episodes processed concurrently [config default: 4].
    #[arg(long = "max_threads", alias = "max-threads", value_name = "N", value_parser = parse_threads)]
    pub max_threads: Option<usize>,

    /// Directory where downloaded podcasts are saved [config default: downloads/].
    #[arg(long = "downloads_dir", alias = "downloads-dir", value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Read settings from this TOML file instead of ~/.config/rapod/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Overlays the flags given on the command line onto `cfg`.
    pub fn apply(&self, cfg: &mut RapodConfig) {
        if let Some(n) = self.max_threads {
            cfg.max_threads = n;
        }
        if let Some(dir) = &self.downloads_dir {
            cfg.downloads_dir = dir.clone();
        }
    }
}

fn parse_threads(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Effective config before flags are applied. An explicit `--config` must
/// load; the XDG default file is optional and falls back to built-in defaults.
fn base_config(
    cli: &Cli,
    load_default: impl FnOnce() -> Result<RapodConfig>,
) -> Result<RapodConfig> {
    match &cli.config {
        Some(path) => config::load_from_path(path),
        None => Ok(load_default().unwrap_or_else(|e| {
            tracing::warn!("using built-in config defaults: {:#}", e);
            RapodConfig::default()
        })),
    }
}

pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = base_config(&cli, config::load_or_init)?;
    cli.apply(&mut cfg);
    tracing::debug!("effective config: {:?}", cfg);

    download::run_download(&cfg).await
}

#[cfg(test)]
mod tests;
