//! HTTP entry point.
//!
//! `GET /` and `GET /api` run one scrape per request and answer with the
//! record list, the empty-result debug body, or a 500 error body. `GET /health`
//! answers `ok`.

use crate::config::Settings;
use crate::fetch::Fetcher;
use crate::models::{EmptyBody, ErrorBody};
use crate::pipeline::{ScrapeOutcome, ScrapeRequest, scrape};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::error::Error;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Shared per-process state. Nothing in here changes between requests.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(settings: Settings) -> crate::error::Result<Self> {
        let fetcher = Fetcher::new(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            fetcher,
        })
    }
}

/// Query parameters accepted by the news endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    /// Source name; unknown or absent falls back to `latest`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `"true"` fetches every article page for descriptions
    pub descriptions: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_news))
        .route("/api", get(get_news))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// GET / and GET /api
#[instrument(level = "info", skip(state))]
async fn get_news(State(state): State<AppState>, Query(params): Query<NewsQuery>) -> Response {
    let request = ScrapeRequest::from_query(params.kind, params.descriptions.as_deref());
    let settings = &state.settings;

    match scrape(&state.fetcher, settings, &request).await {
        Ok(ScrapeOutcome::Records { records, enriched }) => {
            let max_age = if enriched {
                settings.cache.enriched_max_age_secs
            } else {
                settings.cache.max_age_secs
            };
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, format!("public, max-age={max_age}"))],
                Json(records),
            )
                .into_response()
        }
        Ok(ScrapeOutcome::Empty(debug)) => {
            (StatusCode::OK, Json(EmptyBody::new(debug))).into_response()
        }
        Err(e) => {
            let (_, source) = settings.source(request.source.as_deref());
            error!(url = %source.url, error = %e, "Scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(e.to_string(), source.url.clone())),
            )
                .into_response()
        }
    }
}
