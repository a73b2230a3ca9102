//! Extraction of [`NewsRecord`]s from listing and article bodies.
//!
//! Two listing formats are supported:
//!
//! | Kind | Module | Method |
//! |------|--------|--------|
//! | HTML | [`html`] | Ordered selector strategies, then an aggressive heading scan |
//! | JSON | [`json_api`] | Direct field access on a post list |
//!
//! [`article`] re-extracts a longer description and body images from a single
//! article page, and [`images`] holds the image URL rules both formats share.
//!
//! Every function here is synchronous: `scraper::Html` is not `Send`, so
//! parsing never spans an `.await`.

pub mod article;
pub mod html;
pub mod images;
pub mod json_api;

use crate::cleaning::collapse_whitespace;
use crate::config::ExtractionSettings;
use crate::error::Result;
use crate::models::{DebugInfo, NewsRecord};
use crate::sources::{SourceConfig, SourceKind};
use scraper::ElementRef;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Article URLs already emitted during one run.
///
/// Created per request or snapshot and passed into extraction; never kept
/// between runs.
#[derive(Debug, Default)]
pub struct SeenUrls(HashSet<String>);

impl SeenUrls {
    /// Record `url`; returns `false` if it was already seen. Empty URLs are always accepted.
    pub fn insert(&mut self, url: &str) -> bool {
        if url.is_empty() {
            return true;
        }
        self.0.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// What a listing extractor needs to know about the source being scraped.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub origin: &'a str,
    pub source: &'a SourceConfig,
    pub settings: &'a ExtractionSettings,
}

/// Candidates from a listing body plus the page summary used when none were found.
#[derive(Debug)]
pub struct Listing {
    pub records: Vec<NewsRecord>,
    pub debug: DebugInfo,
}

/// Extract candidates from a listing body according to the source kind.
#[instrument(level = "info", skip_all, fields(kind = ?ctx.source.kind, bytes = body.len()))]
pub fn extract_listing(
    body: &str,
    ctx: &ExtractContext<'_>,
    url: &str,
    seen: &mut SeenUrls,
) -> Result<Listing> {
    let listing = match ctx.source.kind {
        SourceKind::Html => html::extract(body, ctx, seen),
        SourceKind::Json => json_api::extract(body, ctx, url)?,
    };
    debug!(
        count = listing.records.len(),
        seen = seen.len(),
        "Listing extraction finished"
    );
    Ok(listing)
}

/// Text of an element with whitespace collapsed. Inline markup does not split words.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Shared acceptance rule for topics: trimmed, capped, and longer than the minimum.
pub(crate) fn accept_topic(raw: &str, settings: &ExtractionSettings) -> Option<String> {
    let topic = crate::utils::truncate_chars(&collapse_whitespace(raw), settings.max_topic_len);
    let topic = topic.trim_end().to_string();
    if crate::utils::char_len(&topic) > settings.min_topic_len {
        Some(topic)
    } else {
        None
    }
}
