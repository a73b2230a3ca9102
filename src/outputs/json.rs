//! Snapshot files for the command-line variant.
//!
//! Each run writes one file:
//! ```text
//! output_dir/
//! ├── news_latest_20241012_083015.json
//! └── news_world_20241012_090000.json
//! ```
//!
//! A run with records writes the record array; a run that found nothing
//! writes the same `{error, debug}` object the HTTP endpoint returns.

use crate::models::EmptyBody;
use crate::pipeline::ScrapeOutcome;
use crate::utils::ensure_writable_dir;
use chrono::Local;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// File name for a snapshot of `source` taken at `stamp` (`YYYYMMDD_HHMMSS`).
pub fn snapshot_filename(source: &str, stamp: &str) -> String {
    format!("news_{source}_{stamp}.json")
}

/// Serialize `outcome` as pretty JSON into `output_dir` and return the written path.
#[instrument(level = "info", skip(outcome), fields(output_dir = %output_dir))]
pub async fn write_snapshot(
    outcome: &ScrapeOutcome,
    source: &str,
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = match outcome {
        ScrapeOutcome::Records { records, .. } => serde_json::to_string_pretty(records)?,
        ScrapeOutcome::Empty(summary) => {
            serde_json::to_string_pretty(&EmptyBody::new(summary.clone()))?
        }
    };

    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(error = %e, "Snapshot directory is not writable");
        return Err(e);
    }

    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = PathBuf::from(output_dir).join(snapshot_filename(source, &stamp));

    let bytes = json.len();
    fs::write(&path, json).await?;
    info!(path = %path.display(), bytes, "Wrote snapshot");

    Ok(path)
}
