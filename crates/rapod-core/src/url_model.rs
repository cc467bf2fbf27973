//! Local filename derivation for audio URLs.
//!
//! The basename of the URL path is both the on-disk name and the dedup key,
//! so it is used as-is (no sanitizing that could make two runs disagree).

use std::path::{Path, PathBuf};

/// Extracts the last path segment from a URL for use as a filename.
///
/// Returns `None` if the URL cannot be parsed or the path ends in `/`.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Filename and destination path for `url` inside `dir`, or `None` if no
/// filename can be derived.
pub fn destination_for(dir: &Path, url: &str) -> Option<(String, PathBuf)> {
    let name = filename_from_url_path(url)?;
    let path = dir.join(&name);
    Some((name, path))
}
