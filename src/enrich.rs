//! Article-page enrichment for records with missing or thin descriptions.
//!
//! Targets are fetched in batches of `batch_size` concurrent requests. Inside
//! a batch the *i*-th request starts after `i × stagger_ms`, and consecutive
//! batches are separated by `batch_delay_ms`. A failed fetch leaves its record
//! untouched. Nothing is retried.

use crate::config::Settings;
use crate::fetch::PageFetcher;
use crate::models::NewsRecord;
use crate::scrapers::article::{ArticleDetails, extract_article};
use crate::utils::{char_len, truncate_for_log};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Whether a record's description is a placeholder or shorter than `short_len`.
pub fn needs_enrichment(record: &NewsRecord, short_len: usize) -> bool {
    record.has_placeholder_description() || char_len(&record.description) < short_len
}

/// Indices of the records to enrich, in scrape order.
///
/// Forced enrichment takes every record with an article URL. Otherwise only
/// thin records are taken, at most `auto_limit` of them.
pub fn select_targets(records: &[NewsRecord], settings: &Settings, forced: bool) -> Vec<usize> {
    let candidates = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.article_url.is_empty())
        .filter(|(_, r)| forced || needs_enrichment(r, settings.enrich.short_len))
        .map(|(i, _)| i);
    if forced {
        candidates.collect()
    } else {
        candidates.take(settings.enrich.auto_limit).collect()
    }
}

struct Job {
    index: usize,
    url: String,
    exclude: Vec<String>,
}

/// Enrich `records` in place. Returns the number of records that were fetched.
#[instrument(level = "info", skip_all, fields(forced = forced, records = records.len()))]
pub async fn enrich<F: PageFetcher>(
    fetcher: &F,
    settings: &Settings,
    origin: &str,
    records: &mut [NewsRecord],
    forced: bool,
) -> usize {
    let targets = select_targets(records, settings, forced);
    if targets.is_empty() {
        debug!("No records need enrichment");
        return 0;
    }
    info!(targets = targets.len(), "Fetching article pages for descriptions");

    let jobs: Vec<Job> = targets
        .iter()
        .map(|&index| {
            let record = &records[index];
            let mut exclude: Vec<String> =
                record.images.urls().iter().map(|u| u.to_string()).collect();
            if !record.image_url.is_empty() {
                exclude.push(record.image_url.clone());
            }
            Job {
                index,
                url: record.article_url.clone(),
                exclude,
            }
        })
        .collect();

    let stagger = Duration::from_millis(settings.enrich.stagger_ms);
    let batch_delay = Duration::from_millis(settings.enrich.batch_delay_ms);
    let batches: Vec<&[Job]> = jobs.chunks(settings.enrich.batch_size.max(1)).collect();
    let mut improved = 0usize;

    for (batch_no, batch) in batches.iter().enumerate() {
        if batch_no > 0 && !batch_delay.is_zero() {
            sleep(batch_delay).await;
        }
        let results = join_all(batch.iter().enumerate().map(|(pos, job)| async move {
            if pos > 0 {
                sleep(stagger * pos as u32).await;
            }
            let details = fetch_details(fetcher, settings, origin, job).await;
            (job.index, details)
        }))
        .await;

        for (index, details) in results {
            if let Some(details) = details {
                if apply_details(&mut records[index], details) {
                    improved += 1;
                }
            }
        }
        debug!(batch = batch_no, size = batch.len(), "Enrichment batch complete");
    }

    info!(fetched = jobs.len(), improved, "Enrichment finished");
    jobs.len()
}

async fn fetch_details<F: PageFetcher>(
    fetcher: &F,
    settings: &Settings,
    origin: &str,
    job: &Job,
) -> Option<ArticleDetails> {
    match fetcher
        .fetch_text(&job.url, settings.article_timeout())
        .await
    {
        Ok(body) => Some(extract_article(
            &body,
            origin,
            &settings.extraction,
            settings.enrich.description_cap,
            &job.exclude,
        )),
        Err(e) => {
            warn!(url = %job.url, error = %e, "Article fetch failed; keeping listing values");
            None
        }
    }
}

/// Overwrite a record with article details. Returns whether the description changed.
fn apply_details(record: &mut NewsRecord, details: ArticleDetails) -> bool {
    if !details.additional_images.is_empty() {
        record.additional_images = details.additional_images;
    }
    match details.description {
        Some(description) => {
            debug!(
                url = %record.article_url,
                description = %truncate_for_log(&description, 80),
                "Replaced description from article page"
            );
            record.description = description;
            true
        }
        None => false,
    }
}
