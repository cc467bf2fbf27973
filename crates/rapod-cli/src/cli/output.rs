//! Console lines for progress events and the final summary.

use rapod_core::orchestrator::{AudioEvent, RunSummary};

pub fn describe(event: &AudioEvent) -> String {
    match event {
        AudioEvent::Unavailable { file } => format!("Can't download {}", file),
        AudioEvent::AlreadyPresent { file } => format!("Skipping {} (already downloaded)", file),
        AudioEvent::Downloading { file } => format!("Downloading {}", file),
        AudioEvent::Downloaded { file, bytes } => {
            format!("Downloaded {} ({:.1} MiB)", file, *bytes as f64 / 1_048_576.0)
        }
        AudioEvent::Failed { url, reason } => format!("Failed to download {}: {}", url, reason),
        AudioEvent::EpisodeFailed { link, reason } => {
            format!("Skipping episode {}: {}", link, reason)
        }
    }
}

pub fn listing_failed() -> &'static str {
    "Connection error while getting list of RA Podcasts."
}

pub fn summary_line(s: &RunSummary) -> String {
    format!(
        "{} episodes: {} downloaded, {} already present, {} unavailable, {} failed downloads, {} failed episodes",
        s.episodes, s.downloaded, s.already_present, s.not_downloadable, s.failed, s.episodes_failed
    )
}
