//! Episode link extraction from the podcast listing page.
//!
//! The selectors are positional and mirror the site's markup, so they are
//! the first thing to break when the layout changes. They live behind
//! [`LinkExtractor`] so a new strategy can be dropped in without touching
//! the orchestrator.

use anyhow::Result;
use scraper::{Html, Selector};

/// Anchors in the featured block at the top of the listing page.
pub const FEATURED_SELECTOR: &str = ".music-border > li:nth-child(1) > section:nth-child(1) \
     > div:nth-child(1) > div:nth-child(1) > div:nth-child(2) > ul:nth-child(1) > li \
     > article:nth-child(1) > a:nth-child(1)";

/// Anchors in the paginated list at the bottom of the listing page.
pub const LIST_SELECTOR: &str = "html body#body form#Form1 main ul.content-list.music-border \
     li.alt section.content.clearfix div.plus8 div.col2.fl:first-child div.pr8 div.col2 \
     ul.list li.ptb2 article a";

/// Strategy for turning a listing page into episode detail-page links.
pub trait LinkExtractor: Send + Sync {
    /// Returns the links in page order. An empty result is not an error.
    fn extract(&self, html: &str) -> Vec<String>;
}

/// Two-region extractor for the Resident Advisor podcast page.
#[derive(Debug, Clone)]
pub struct RaListingExtractor {
    featured: Selector,
    list: Selector,
}

impl RaListingExtractor {
    pub fn new() -> Result<Self> {
        Self::with_selectors(FEATURED_SELECTOR, LIST_SELECTOR)
    }

    /// Builds the extractor from custom CSS selectors for the two regions.
    pub fn with_selectors(featured: &str, list: &str) -> Result<Self> {
        Ok(Self {
            featured: parse_selector(featured)?,
            list: parse_selector(list)?,
        })
    }
}

impl LinkExtractor for RaListingExtractor {
    /// Featured links first, then list links. Duplicates across the two
    /// regions are kept.
    fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = hrefs(&document, &self.featured);
        links.extend(hrefs(&document, &self.list));
        links
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {:?}: {}", css, e))
}

fn hrefs(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}
