//! Pull endpoint.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Static index page |
//! | GET | `/health` | Liveness probe |
//! | GET | `/metrics` | Runs a scrape, returns Prometheus exposition |

use crate::application::scraper::Scraper;
use crate::domain::errors::ScrapeError;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use tracing::error;

const INDEX_PAGE: &str = r#"<html>
	<head>
		<meta charset="UTF-8">
		<meta name="viewport" content="width=device-width, initial-scale=1.0">
		<title>HackerOne Exporter</title>
	</head>
	<body>
		<h1>HackerOne Exporter</h1>
		<p><a href="/metrics">Metrics</a></p>
		<p><a href="/health">Healthcheck</a></p>
	</body>
</html>
"#;

const HEALTH_BODY: &str = r#"{"status": "ok"}"#;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub scraper: Arc<Scraper>,
}

/// Failure of a metrics pull
#[derive(Debug)]
pub struct MetricsError(ScrapeError);

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        error!("Metrics endpoint: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
    }
}

/// Build the exporter router.
pub fn build_router(scraper: Arc<Scraper>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(HttpState { scraper })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], HEALTH_BODY)
}

/// GET /metrics
async fn metrics(State(state): State<HttpState>) -> Result<impl IntoResponse, MetricsError> {
    let body = state.scraper.scrape_and_encode().await.map_err(MetricsError)?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
