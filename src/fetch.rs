//! Outbound HTTP for listing and article pages.
//!
//! [`PageFetcher`] is the seam the pipeline and the enricher depend on;
//! [`Fetcher`] is the reqwest-backed implementation used at runtime. Every
//! request carries browser-like `User-Agent`, `Accept` and `Accept-Language`
//! headers and its own timeout. Failures are never retried.

use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Something that can fetch a page body as text.
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body, failing on timeout, transport error or non-2xx status.
    fn fetch_text(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed [`PageFetcher`] sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a client with the configured default headers.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &settings.user_agent),
            (ACCEPT, &settings.accept),
            (ACCEPT_LANGUAGE, &settings.accept_language),
        ] {
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScrapeError::Config(format!("invalid {name} header: {e}")))?;
            headers.insert(name, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageFetcher for Fetcher {
    #[instrument(level = "info", skip(self), fields(%url))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let t0 = Instant::now();
        let result = async {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| ScrapeError::from_reqwest(url, e))?
                .error_for_status()
                .map_err(|e| ScrapeError::from_reqwest(url, e))?;
            response
                .text()
                .await
                .map_err(|e| ScrapeError::from_reqwest(url, e))
        }
        .await;

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &result {
            Ok(body) => info!(bytes = body.len(), elapsed_ms, "Fetched page"),
            Err(e) => warn!(error = %e, elapsed_ms, "Fetch failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/latest-news")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla/5.0".into()))
            .match_header("accept-language", "en-US,en;q=0.5")
            .with_status(200)
            .with_body("<html></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let body = fetcher
            .fetch_text(&format!("{}/latest-news", server.url()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body, "<html></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/local")
            .with_status(503)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let err = fetcher
            .fetch_text(&format!("{}/local", server.url()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let err = fetcher
            .fetch_text("http://127.0.0.1:9/latest-news", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Network { .. } | ScrapeError::Timeout { .. }
        ));
    }

    /// Accepts connections and never answers them.
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_slow_server_is_timeout() {
        let url = format!("{}/latest-news", silent_server().await);
        let fetcher = Fetcher::new(&Settings::default()).unwrap();
        let err = fetcher
            .fetch_text(&url, Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { url: ref u } if *u == url));
        assert_eq!(err.to_string(), format!("Request to {url} timed out"));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let settings = Settings {
            user_agent: "bad\nagent".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            Fetcher::new(&settings),
            Err(ScrapeError::Config(_))
        ));
    }
}
