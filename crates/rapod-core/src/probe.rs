//! HEAD probing: decide whether a candidate audio URL serves a file.
//!
//! Only the declared `Content-Type` is inspected. A text or HTML type means
//! an error or landing page; anything else is assumed to be the audio file.

use anyhow::{Context, Result};
use std::str;

use crate::transport::CurlOptions;

/// Classification of a probed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downloadability {
    Downloadable,
    NotDownloadable,
}

/// Classifies a `Content-Type` value. A missing header counts as downloadable.
pub fn classify_content_type(content_type: Option<&str>) -> Downloadability {
    let Some(ct) = content_type else {
        return Downloadability::Downloadable;
    };
    let ct = ct.to_ascii_lowercase();
    if ct.contains("text") || ct.contains("html") {
        Downloadability::NotDownloadable
    } else {
        Downloadability::Downloadable
    }
}

/// Performs a HEAD request (following redirects) and returns the
/// `Content-Type` of the final response, if any.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn fetch_content_type(url: &str, opts: &CurlOptions) -> Result<Option<String>> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = opts.easy(url)?;
    easy.nobody(true)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    Ok(parse_content_type(&headers))
}

/// Probes `url`; network failures are logged and classified as not downloadable.
pub fn probe_downloadable(url: &str, opts: &CurlOptions) -> Downloadability {
    match fetch_content_type(url, opts) {
        Ok(ct) => {
            let verdict = classify_content_type(ct.as_deref());
            tracing::debug!(url, content_type = ?ct, ?verdict, "probed");
            verdict
        }
        Err(e) => {
            tracing::warn!(url, "probe failed: {:#}", e);
            Downloadability::NotDownloadable
        }
    }
}

/// Content-Type of the last response in a header stream. Each status line
/// starts a new response (redirect hops), resetting what was seen before.
fn parse_content_type(lines: &[String]) -> Option<String> {
    let mut content_type = None;
    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            content_type = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_string());
            }
        }
    }
    content_type
}
