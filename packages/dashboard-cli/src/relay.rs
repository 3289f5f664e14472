//! Fetch relay.
//!
//! GET /api/proxy?url=<absolute url>
//!
//! Fetches the target with a browser-like identity and answers with its body
//! and content type. Failing targets answer with their own status, transport
//! failures with 502.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use proposals::fetchers::{validate_url, RELAY_PATH};
use proposals::{FetchError, PageFetcher};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// 10 minutes shared, 5 minutes stale.
const CACHE_CONTROL: &str = "s-maxage=600, stale-while-revalidate=300";

pub type SharedFetcher = Arc<dyn PageFetcher>;

#[derive(Deserialize)]
pub struct ProxyQuery {
    url: Option<String>,
}

/// Build the relay router around a fetcher.
pub fn router(fetcher: SharedFetcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route(RELAY_PATH, get(proxy_handler))
        .layer(Extension(fetcher))
        .layer(TimeoutLayer::new(Duration::from_secs(45)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn proxy_handler(
    Extension(fetcher): Extension<SharedFetcher>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    let Some(target) = query.url.filter(|url| !url.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Error: The \"url\" query parameter is missing.",
        )
            .into_response();
    };

    if let Err(e) = validate_url(&target) {
        return error_response(&e);
    }

    match fetcher.fetch(&target).await {
        Ok(page) => {
            let content_type = page
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
                ],
                page.body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "Relay fetch failed");
            error_response(&e)
        }
    }
}

fn error_response(error: &FetchError) -> Response {
    (status_for(error), format!("Error fetching the URL: {}", error)).into_response()
}

/// Status the relay answers with for a failed fetch.
fn status_for(error: &FetchError) -> StatusCode {
    match error {
        FetchError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        FetchError::NotFound { .. } => StatusCode::NOT_FOUND,
        FetchError::Status { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        FetchError::Transport { .. } | FetchError::EmptyBody { .. } => StatusCode::BAD_GATEWAY,
    }
}
