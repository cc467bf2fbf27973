//! CLI parse tests.

use super::{base_config, Cli};
use clap::Parser;
use rapod_core::config::RapodConfig;
use std::fs;
use std::path::{Path, PathBuf};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_defaults() {
    let cli = parse(&["rapod"]);
    assert!(cli.max_threads.is_none());
    assert!(cli.downloads_dir.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn cli_parse_underscore_flags() {
    let cli = parse(&[
        "rapod",
        "--max_threads=8",
        "--downloads_dir",
        "path/to/ra_downloads/",
    ]);
    assert_eq!(cli.max_threads, Some(8));
    assert_eq!(
        cli.downloads_dir.as_deref(),
        Some(Path::new("path/to/ra_downloads/"))
    );
}

#[test]
fn cli_parse_hyphen_aliases() {
    let cli = parse(&["rapod", "--max-threads", "2", "--downloads-dir=/tmp/ra"]);
    assert_eq!(cli.max_threads, Some(2));
    assert_eq!(cli.downloads_dir.as_deref(), Some(Path::new("/tmp/ra")));
}

#[test]
fn cli_parse_config_path() {
    let cli = parse(&["rapod", "--config", "/etc/rapod.toml"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/rapod.toml")));
}

#[test]
fn cli_rejects_zero_threads() {
    assert!(Cli::try_parse_from(["rapod", "--max_threads", "0"]).is_err());
    assert!(Cli::try_parse_from(["rapod", "--max_threads", "many"]).is_err());
}

#[test]
fn cli_rejects_subcommands() {
    assert!(Cli::try_parse_from(["rapod", "run"]).is_err());
}

#[test]
fn flags_override_config() {
    let mut cfg = RapodConfig::default();
    parse(&["rapod", "--max_threads", "16"]).apply(&mut cfg);
    assert_eq!(cfg.max_threads, 16);
    assert_eq!(cfg.downloads_dir, PathBuf::from("downloads/"));

    parse(&["rapod", "--downloads_dir", "out"]).apply(&mut cfg);
    assert_eq!(cfg.max_threads, 16);
    assert_eq!(cfg.downloads_dir, PathBuf::from("out"));
}

#[test]
fn unusable_default_config_falls_back_to_defaults() {
    let cli = parse(&["rapod", "--max_threads", "2", "--downloads_dir", "/tmp/ra"]);
    let mut cfg = base_config(&cli, || anyhow::bail!("read-only config dir")).unwrap();
    assert_eq!(cfg.max_threads, 4);
    assert_eq!(cfg.listing_url, RapodConfig::default().listing_url);

    cli.apply(&mut cfg);
    assert_eq!(cfg.max_threads, 2);
    assert_eq!(cfg.downloads_dir, PathBuf::from("/tmp/ra"));
}

#[test]
fn explicit_config_errors_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let cli = parse(&["rapod", "--config", path.to_str().unwrap()]);
    assert!(base_config(&cli, || Ok(RapodConfig::default())).is_err());
}

#[test]
fn explicit_config_skips_default_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rapod.toml");
    fs::write(&path, "max_threads = 3\ndownloads_dir = \"ra\"\n").unwrap();
    let cli = parse(&["rapod", "--config", path.to_str().unwrap()]);
    let cfg = base_config(&cli, || panic!("default config must not be read")).unwrap();
    assert_eq!(cfg.max_threads, 3);
}
