//! Audio link resolution for an episode detail page.
//!
//! Direct `.mp3` anchors win. Older episodes no longer link their audio, but
//! the file still lives at a predictable path on the audio host, so the URL
//! is rebuilt from the page heading (`RA.<number> <artist>`) and the
//! publish date.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::listing::parse_selector;

const AUDIO_EXTENSION: &str = ".mp3";
const HEADING_SELECTOR: &str = "#sectionHead > h1:nth-child(2)";
const DATE_SELECTOR: &str = "ul.clearfix > li:nth-child(1)";
const HEADING_PATTERN: &str = r"^RA\.([0-9]+) (.*)$";
const PAGE_DATE_FORMAT: &str = "%d %b %Y";
const URL_DATE_FORMAT: &str = "%y%m%d";

/// Why a detail page without direct links could not be turned into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("episode heading not found")]
    MissingHeading,
    #[error("heading {0:?} does not look like \"RA.<number> <artist>\"")]
    MalformedHeading(String),
    #[error("publish date not found")]
    MissingDate,
    #[error("unparsable publish date {0:?}")]
    InvalidDate(String),
}

/// Builds the audio host URL for an episode.
pub fn audio_url(number: u64, date: NaiveDate, artist_slug: &str) -> String {
    format!(
        "http://audio.ra.co/podcast/RA{}_{}_{}-residentadvisor.net.mp3",
        number,
        date.format(URL_DATE_FORMAT),
        artist_slug
    )
}

/// URL-safe artist name: trimmed, periods removed, spaces to hyphens,
/// then transliterated to ASCII.
pub fn artist_slug(name: &str) -> String {
    let slug = name.trim().replace('.', "").replace(' ', "-");
    deunicode::deunicode(&slug)
}

/// Resolves detail pages to one or more audio URLs.
#[derive(Debug, Clone)]
pub struct AudioLinkResolver {
    anchors: Selector,
    heading: Selector,
    date: Selector,
    heading_re: Regex,
}

impl AudioLinkResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchors: parse_selector("a[href]")?,
            heading: parse_selector(HEADING_SELECTOR)?,
            date: parse_selector(DATE_SELECTOR)?,
            heading_re: Regex::new(HEADING_PATTERN)?,
        })
    }

    /// Direct anchors verbatim if the page has any, else the reconstructed URL.
    pub fn resolve(&self, html: &str) -> Result<Vec<String>, ResolveError> {
        let document = Html::parse_document(html);

        let direct = self.direct_links(&document);
        if !direct.is_empty() {
            return Ok(direct);
        }

        self.reconstruct(&document).map(|url| vec![url])
    }

    fn direct_links(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.anchors)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.ends_with(AUDIO_EXTENSION))
            .map(str::to_string)
            .collect()
    }

    fn reconstruct(&self, document: &Html) -> Result<String, ResolveError> {
        let heading = document
            .select(&self.heading)
            .next()
            .ok_or(ResolveError::MissingHeading)?
            .text()
            .collect::<String>();
        let heading = heading.trim();

        let caps = self
            .heading_re
            .captures(heading)
            .ok_or_else(|| ResolveError::MalformedHeading(heading.to_string()))?;
        let number: u64 = caps[1]
            .parse()
            .map_err(|_| ResolveError::MalformedHeading(heading.to_string()))?;
        let slug = artist_slug(&caps[2]);

        let date_text = document
            .select(&self.date)
            .next()
            .ok_or(ResolveError::MissingDate)?
            .text()
            .collect::<String>();
        // "Released / 28 Dec 2015"
        let raw_date = date_text
            .split('/')
            .nth(1)
            .ok_or(ResolveError::MissingDate)?
            .trim();
        let date = NaiveDate::parse_from_str(raw_date, PAGE_DATE_FORMAT)
            .map_err(|_| ResolveError::InvalidDate(raw_date.to_string()))?;

        let url = audio_url(number, date, &slug);
        tracing::debug!(heading, %date, url = %url, "reconstructed audio url");
        Ok(url)
    }
}
