//! Run orchestration: listing page → episode links → per-episode workflow
//! on a fixed-size worker pool.
//!
//! Per-episode steps run strictly in order: fetch the detail page, resolve
//! audio URLs, then for each URL probe, check the destination, download.
//! Any failure inside an episode is logged and counted; only the listing
//! fetch can fail the whole run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::RapodConfig;
use crate::download::DownloadOutcome;
use crate::listing::{LinkExtractor, RaListingExtractor};
use crate::pool::WorkerPool;
use crate::probe::Downloadability;
use crate::resolver::AudioLinkResolver;
use crate::transport::Transport;
use crate::url_model;

/// Per-file progress, for console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// Probe said the URL serves a page, not a file.
    Unavailable { file: String },
    AlreadyPresent { file: String },
    Downloading { file: String },
    Downloaded { file: String, bytes: u64 },
    Failed { url: String, reason: String },
    /// The detail page could not be fetched or yielded no audio URL.
    EpisodeFailed { link: String, reason: String },
}

/// What happened to one audio URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutcome {
    Downloaded,
    AlreadyPresent,
    NotDownloadable,
    Failed,
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Work items processed (one per listing link).
    pub episodes: usize,
    /// Episodes whose detail page could not be fetched or resolved.
    pub episodes_failed: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub not_downloadable: usize,
    /// Audio URLs that failed to download.
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: AudioOutcome) {
        match outcome {
            AudioOutcome::Downloaded => self.downloaded += 1,
            AudioOutcome::AlreadyPresent => self.already_present += 1,
            AudioOutcome::NotDownloadable => self.not_downloadable += 1,
            AudioOutcome::Failed => self.failed += 1,
        }
    }
}

/// State shared by all workers. Read-only apart from the filesystem.
struct EpisodeContext {
    transport: Arc<dyn Transport>,
    resolver: AudioLinkResolver,
    site_base_url: String,
    downloads_dir: PathBuf,
    events: Option<UnboundedSender<AudioEvent>>,
}

impl EpisodeContext {
    fn emit(&self, event: AudioEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

pub struct Orchestrator {
    listing_url: String,
    extractor: Arc<dyn LinkExtractor>,
    pool: WorkerPool,
    ctx: EpisodeContext,
}

impl Orchestrator {
    /// Orchestrator for `cfg` using the default listing strategy.
    pub fn new(cfg: &RapodConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            listing_url: cfg.listing_url.clone(),
            extractor: Arc::new(RaListingExtractor::new()?),
            pool: WorkerPool::new(cfg.max_threads),
            ctx: EpisodeContext {
                transport,
                resolver: AudioLinkResolver::new()?,
                site_base_url: cfg.site_base_url.clone(),
                downloads_dir: cfg.downloads_dir.clone(),
                events: None,
            },
        })
    }

    /// Replaces the listing strategy.
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sends per-file progress to `tx`.
    pub fn with_events(mut self, tx: UnboundedSender<AudioEvent>) -> Self {
        self.ctx.events = Some(tx);
        self
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.ctx.downloads_dir
    }

    /// Fetches the listing page and extracts episode links.
    ///
    /// This is the only fatal step: without the listing there is nothing to do.
    pub fn discover(&self) -> Result<Vec<String>> {
        let listing = self
            .ctx
            .transport
            .fetch_page(&self.listing_url)
            .with_context(|| format!("failed to fetch listing {}", self.listing_url))?;
        let links = self.extractor.extract(&listing);
        tracing::info!(count = links.len(), url = %self.listing_url, "episode links found");
        Ok(links)
    }

    /// Creates the downloads directory and processes every link on the pool.
    pub async fn download_all(self: &Arc<Self>, links: Vec<String>) -> Result<RunSummary> {
        fs::create_dir_all(&self.ctx.downloads_dir).with_context(|| {
            format!(
                "failed to create downloads dir {}",
                self.ctx.downloads_dir.display()
            )
        })?;

        let this = Arc::clone(self);
        let reports = self
            .pool
            .run(links, move |link: String| this.process_episode(&link))
            .await;

        let mut summary = RunSummary::default();
        for report in reports {
            summary.episodes += 1;
            match report.result {
                Ok(outcomes) => outcomes.into_iter().for_each(|o| summary.record(o)),
                Err(e) => {
                    summary.episodes_failed += 1;
                    tracing::warn!(link = %report.item, "episode skipped: {:#}", e);
                    self.ctx.emit(AudioEvent::EpisodeFailed {
                        link: report.item,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        tracing::info!(?summary, "run finished");
        Ok(summary)
    }

    /// `discover` followed by `download_all`.
    pub async fn run(self: &Arc<Self>) -> Result<RunSummary> {
        let links = self.discover()?;
        self.download_all(links).await
    }

    /// Runs the per-episode workflow for one listing link (blocking).
    pub fn process_episode(&self, link: &str) -> Result<Vec<AudioOutcome>> {
        let ctx = &self.ctx;
        let page_url = format!("{}{}", ctx.site_base_url, link);
        let html = ctx
            .transport
            .fetch_page(&page_url)
            .with_context(|| format!("failed to fetch episode page {}", page_url))?;
        let audio_urls = ctx
            .resolver
            .resolve(&html)
            .with_context(|| format!("no audio link for {}", page_url))?;

        tracing::debug!(page = %page_url, count = audio_urls.len(), "resolved audio urls");
        Ok(audio_urls.iter().map(|url| self.fetch_audio(url)).collect())
    }

    fn fetch_audio(&self, url: &str) -> AudioOutcome {
        let ctx = &self.ctx;
        let Some((file, dest)) = url_model::destination_for(&ctx.downloads_dir, url) else {
            tracing::warn!(url, "cannot derive a filename");
            ctx.emit(AudioEvent::Failed {
                url: url.to_string(),
                reason: "cannot derive a filename".to_string(),
            });
            return AudioOutcome::Failed;
        };

        if ctx.transport.probe(url) == Downloadability::NotDownloadable {
            tracing::info!(url, "not downloadable");
            ctx.emit(AudioEvent::Unavailable { file });
            return AudioOutcome::NotDownloadable;
        }

        if dest.exists() {
            tracing::debug!(path = %dest.display(), "already downloaded");
            ctx.emit(AudioEvent::AlreadyPresent { file });
            return AudioOutcome::AlreadyPresent;
        }

        ctx.emit(AudioEvent::Downloading { file: file.clone() });
        match ctx.transport.download(url, &dest) {
            Ok(DownloadOutcome::Downloaded { bytes }) => {
                tracing::info!(url, bytes, path = %dest.display(), "download complete");
                ctx.emit(AudioEvent::Downloaded { file, bytes });
                AudioOutcome::Downloaded
            }
            Ok(DownloadOutcome::HttpStatus(code)) => {
                tracing::warn!(url, code, "download returned non-200 status");
                ctx.emit(AudioEvent::Failed {
                    url: url.to_string(),
                    reason: format!("HTTP {}", code),
                });
                AudioOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(url, "download failed: {:#}", e);
                ctx.emit(AudioEvent::Failed {
                    url: url.to_string(),
                    reason: format!("{:#}", e),
                });
                AudioOutcome::Failed
            }
        }
    }
}
