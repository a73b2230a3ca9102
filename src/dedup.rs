//! Topic-based deduplication.
//!
//! Topics are compared exactly. Whitespace is already collapsed during
//! extraction; case and punctuation differences are kept distinct.

use crate::models::NewsRecord;
use itertools::Itertools;
use tracing::debug;

/// Keep the first record for each distinct topic, in scrape order.
pub fn dedup_by_topic(records: Vec<NewsRecord>) -> Vec<NewsRecord> {
    let before = records.len();
    let unique: Vec<NewsRecord> = records
        .into_iter()
        .unique_by(|r| r.topic.clone())
        .collect();
    if unique.len() != before {
        debug!(removed = before - unique.len(), "Removed duplicate topics");
    }
    unique
}
