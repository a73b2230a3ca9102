//! One scrape of one source: fetch, extract, deduplicate, enrich, finalize.
//!
//! Both the HTTP handler and the snapshot command run [`scrape`]. All state
//! (including the seen-URL set) is created here and dropped at the end of the
//! run.

use crate::cleaning::description_or_placeholder;
use crate::config::Settings;
use crate::dedup::dedup_by_topic;
use crate::enrich::enrich;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::models::{DebugInfo, NO_ADDITIONAL_IMAGES, NewsRecord};
use crate::scrapers::{ExtractContext, Listing, SeenUrls, extract_listing};
use crate::sources::SourceConfig;
use std::time::Instant;
use tracing::{info, instrument};

/// Result of a successful scrape.
#[derive(Debug)]
pub enum ScrapeOutcome {
    /// At least one record survived; `enriched` is true when article pages were fetched.
    Records {
        records: Vec<NewsRecord>,
        enriched: bool,
    },
    /// Nothing was extracted; carries the page summary.
    Empty(DebugInfo),
}

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
    /// Value of the `type` parameter; unknown or absent means `latest`.
    pub source: Option<String>,
    /// `descriptions=true`: enrich every record, not only thin ones.
    pub force_descriptions: bool,
}

impl ScrapeRequest {
    /// Build a request from raw query values. Only the literal string `"true"` forces enrichment.
    pub fn from_query(source: Option<String>, descriptions: Option<&str>) -> Self {
        Self {
            source,
            force_descriptions: descriptions == Some("true"),
        }
    }
}

/// Run one scrape. Errors are listing fetch or parse failures only.
#[instrument(
    level = "info",
    skip_all,
    fields(source = ?request.source, forced = request.force_descriptions)
)]
pub async fn scrape<F: PageFetcher>(
    fetcher: &F,
    settings: &Settings,
    request: &ScrapeRequest,
) -> Result<ScrapeOutcome> {
    let t0 = Instant::now();
    let (name, source) = settings.source(request.source.as_deref());
    let origin = source.origin();
    info!(source = name, url = %source.url, "Scraping listing");

    let body = fetcher
        .fetch_text(&source.url, settings.listing_timeout())
        .await?;
    let Listing { records, debug } = extract(&body, source, &origin, settings)?;

    let mut records = dedup_by_topic(records);
    if records.is_empty() {
        info!(source = name, "No news items found");
        return Ok(ScrapeOutcome::Empty(debug));
    }

    let fetched = enrich(
        fetcher,
        settings,
        &origin,
        &mut records,
        request.force_descriptions,
    )
    .await;
    let records: Vec<NewsRecord> = records.into_iter().map(finalize).collect();

    info!(
        source = name,
        count = records.len(),
        enriched = fetched,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Scrape complete"
    );
    Ok(ScrapeOutcome::Records {
        records,
        enriched: fetched > 0,
    })
}

/// Parse and extract synchronously so no document outlives an `.await`.
fn extract(
    body: &str,
    source: &SourceConfig,
    origin: &str,
    settings: &Settings,
) -> Result<Listing> {
    let ctx = ExtractContext {
        origin,
        source,
        settings: &settings.extraction,
    };
    let mut seen = SeenUrls::default();
    extract_listing(body, &ctx, &source.url, &mut seen)
}

/// Apply the placeholders so no emitted field is left empty where one is expected.
fn finalize(mut record: NewsRecord) -> NewsRecord {
    let has_images = record.real_additional_images().next().is_some();
    if record.description.trim().is_empty() {
        record.description = description_or_placeholder(None, has_images);
    }
    if !has_images {
        record.additional_images = vec![NO_ADDITIONAL_IMAGES.to_string()];
    }
    record
}
