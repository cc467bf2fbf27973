//! Streaming GET downloader.
//!
//! The body is written to disk chunk by chunk as libcurl delivers it, so
//! memory use does not depend on file size. The destination file is only
//! created once the final response is known to be `200 OK`.
//!
//! A transfer interrupted midway leaves a truncated file behind, and the
//! existence check will treat it as complete on the next run.

use anyhow::{Context, Result};
use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str;

use crate::transport::CurlOptions;

/// Result of a completed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Status 200; the body was written to the destination.
    Downloaded { bytes: u64 },
    /// Any other final status; nothing was written.
    HttpStatus(u32),
}

/// Downloads `url` into `path`, overwriting it if present.
///
/// Network and disk errors are returned as `Err`; a non-200 response is
/// `Ok(DownloadOutcome::HttpStatus(_))` and leaves no file behind.
pub fn download_file(url: &str, path: &Path, opts: &CurlOptions) -> Result<DownloadOutcome> {
    let status = Cell::new(0u32);
    let mut file: Option<BufWriter<File>> = None;
    let mut written = 0u64;
    let mut write_err: Option<io::Error> = None;

    let mut easy = opts.easy(url)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            if status.get() != 200 {
                // Body of an error response; drain and discard.
                return Ok(data.len());
            }
            if file.is_none() {
                match File::create(path) {
                    Ok(f) => file = Some(BufWriter::new(f)),
                    Err(e) => {
                        write_err = Some(e);
                        return Ok(0); // abort transfer
                    }
                }
            }
            let Some(out) = file.as_mut() else {
                return Ok(0);
            };
            match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(e).with_context(|| format!("failed to write {}", path.display()));
    }
    performed.with_context(|| format!("GET {} failed", url))?;

    let code = easy.response_code().context("no response code")?;
    if code != 200 {
        tracing::debug!(url, code, "download rejected");
        return Ok(DownloadOutcome::HttpStatus(code));
    }

    match file {
        Some(mut out) => out
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?,
        None => {
            // 200 with an empty body still produces the file.
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        }
    }

    tracing::debug!(url, bytes = written, path = %path.display(), "downloaded");
    Ok(DownloadOutcome::Downloaded { bytes: written })
}

/// Status code from a header line such as `HTTP/1.1 200 OK` or `HTTP/2 404`.
fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_http11() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line("HTTP/1.0 404 Not Found"), Some(404));
    }

    #[test]
    fn status_line_http2() {
        assert_eq!(parse_status_line("HTTP/2 302"), Some(302));
    }

    #[test]
    fn status_line_rejects_headers() {
        assert_eq!(parse_status_line("Content-Type: audio/mpeg"), None);
        assert_eq!(parse_status_line("HTTP/1.1 abc"), None);
        assert_eq!(parse_status_line(""), None);
    }
}
