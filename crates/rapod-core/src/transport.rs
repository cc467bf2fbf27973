//! HTTP transport seam used by the orchestrator.
//!
//! `CurlTransport` is the production implementation (libcurl, blocking);
//! tests drive the orchestrator with in-memory fakes.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::config::RapodConfig;
use crate::download::{self, DownloadOutcome};
use crate::fetch;
use crate::probe::{self, Downloadability};

const USER_AGENT: &str = concat!("rapod/", env!("CARGO_PKG_VERSION"));

/// Options applied to every curl handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlOptions {
    /// Connect timeout; None keeps the libcurl default.
    pub connect_timeout: Option<Duration>,
}

impl CurlOptions {
    pub fn from_config(cfg: &RapodConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// New handle for `url` that follows redirects.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(USER_AGENT)?;
        if let Some(timeout) = self.connect_timeout {
            easy.connect_timeout(timeout)?;
        }
        Ok(easy)
    }
}

/// Blocking network operations needed for one run. Implementations must be
/// shareable across worker threads.
pub trait Transport: Send + Sync {
    /// GET `url` and return the body as text.
    fn fetch_page(&self, url: &str) -> Result<String>;

    /// HEAD `url` and classify it; network failures are `NotDownloadable`.
    fn probe(&self, url: &str) -> Downloadability;

    /// Stream `url` into `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome>;
}

/// libcurl-backed transport.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: CurlOptions,
}

impl CurlTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl Transport for CurlTransport {
    fn fetch_page(&self, url: &str) -> Result<String> {
        fetch::fetch_page(url, &self.opts)
    }

    fn probe(&self, url: &str) -> Downloadability {
        probe::probe_downloadable(url, &self.opts)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome> {
        download::download_file(url, dest, &self.opts)
    }
}
