//! The download run: discover episodes, then fetch them on the worker pool
//! while printing per-file progress.

use anyhow::Result;
use rapod_core::config::RapodConfig;
use rapod_core::orchestrator::{AudioEvent, Orchestrator};
use rapod_core::transport::{CurlOptions, CurlTransport, Transport};
use std::sync::Arc;

use super::output;

pub async fn run_download(cfg: &RapodConfig) -> Result<()> {
    let transport: Arc<dyn Transport> =
        Arc::new(CurlTransport::new(CurlOptions::from_config(cfg)));
    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel::<AudioEvent>();
    let orch = Arc::new(Orchestrator::new(cfg, transport)?.with_events(events_tx));

    println!("Getting list of RA Podcasts...");
    let links = match orch.discover() {
        Ok(links) => links,
        Err(e) => {
            println!("{}", output::listing_failed());
            tracing::error!("listing fetch failed: {:#}", e);
            return Err(e);
        }
    };
    println!("There are {} RA Podcasts.", links.len());
    println!(
        "Saving downloaded podcasts to {}",
        orch.downloads_dir().display()
    );

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", output::describe(&event));
        }
    });

    let summary = orch.download_all(links).await;
    // Last sender lives in the orchestrator; dropping it ends the printer.
    drop(orch);
    let _ = printer.await;
    let summary = summary?;

    println!("Finished downloading podcasts.");
    println!("{}", output::summary_line(&summary));
    tracing::info!(?summary, "rapod run completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_listing_fails_before_downloading() {
        let dir = tempfile::tempdir().unwrap();
        let downloads = dir.path().join("ra");
        let cfg = RapodConfig {
            max_threads: 2,
            downloads_dir: downloads.clone(),
            listing_url: "http://127.0.0.1:9/podcast.aspx".to_string(),
            site_base_url: "http://127.0.0.1:9".to_string(),
            connect_timeout_secs: Some(2),
        };

        assert!(run_download(&cfg).await.is_err());
        assert!(!downloads.exists());
    }
}
