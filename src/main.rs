//! # Newsfirst Feed
//!
//! Scrapes the Newsfirst Sinhala news site (HTML listing pages and the JSON
//! API) and turns each listing into a clean, deduplicated list of news records.
//!
//! ## Features
//!
//! - HTML listings through an ordered cascade of container selectors with an
//!   aggressive heading scan as the last resort
//! - JSON API listings read field by field, including sized image variants
//! - Boilerplate removal for bylines, meta text, "read more" labels and date stamps
//! - Optional article-page enrichment in small staggered batches
//! - An HTTP endpoint with cache headers, or timestamped JSON snapshot files
//!
//! ## Usage
//!
//! ```sh
//! newsfirst_feed serve --bind 0.0.0.0:3000
//! newsfirst_feed snapshot --type sports -o ./snapshots
//! ```
//!
//! ## Architecture
//!
//! Each request or snapshot is one independent run:
//! 1. **Fetching**: GET the listing page or JSON endpoint for the chosen source
//! 2. **Extraction**: Turn the body into candidate records
//! 3. **Dedup**: Keep the first record per topic
//! 4. **Enrichment**: Fetch article pages for thin descriptions
//! 5. **Output**: Answer the HTTP request or write a snapshot file

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cleaning;
mod cli;
mod config;
mod dedup;
mod enrich;
mod error;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod server;
mod sources;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use fetch::Fetcher;
use outputs::json;
use pipeline::{ScrapeOutcome, ScrapeRequest, scrape};
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsfirst_feed starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to load settings");
            return Err(e.into());
        }
    };

    match args.command {
        Command::Serve { bind } => {
            let state = AppState::new(settings)?;
            server::serve(&bind, state).await?;
        }
        Command::Snapshot {
            source,
            descriptions,
            output_dir,
        } => {
            let fetcher = Fetcher::new(&settings)?;
            let request = ScrapeRequest {
                source: Some(source),
                force_descriptions: descriptions,
            };
            let (name, _) = settings.source(request.source.as_deref());

            let outcome = scrape(&fetcher, &settings, &request).await?;
            if let ScrapeOutcome::Records { records, .. } = &outcome {
                info!(source = name, count = records.len(), "Scraped news items");
            }
            let path = json::write_snapshot(&outcome, name, &output_dir).await?;
            info!(path = %path.display(), "Snapshot saved");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
