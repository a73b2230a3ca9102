//! Error types shared by the fetcher, the extractors and the pipeline.
//!
//! Network, timeout and status failures all describe a listing or article page
//! that could not be retrieved. `Parse` covers payloads that arrived but could
//! not be understood. Empty results are not errors; see
//! [`crate::pipeline::ScrapeOutcome::Empty`].

use thiserror::Error;

/// Errors that can occur while scraping a source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request did not complete within its timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or body read failure.
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body was fetched but is not the expected shape.
    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },

    /// Invalid settings file or values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Build the right variant for a failed reqwest call against `url`.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            ScrapeError::Network {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
