//! Router construction and shared response utilities.

use axum::{
    Router,
    http::{HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::json;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::middleware::security_headers::SecurityHeadersLayer;
use crate::web::{products, search, status};

/// Cache-Control presets for public endpoints.
pub mod cache {
    /// Landing rankings; change slowly.
    pub const REFERENCE: &str = "public, max-age=300, s-maxage=3600, stale-while-revalidate=300";
    /// Search results, raw or filtered.
    pub const SEARCH: &str = "public, max-age=60, s-maxage=300, stale-while-revalidate=120";
    /// Single product detail.
    pub const DETAIL: &str = "public, max-age=60, s-maxage=300, stale-while-revalidate=120";
    /// Health and status.
    pub const NONE: &str = "no-store";
}

/// Wraps a JSON response with a `Cache-Control` header.
pub fn with_cache_control<T: serde::Serialize>(value: T, header: &'static str) -> Response {
    let mut response = Json(value).into_response();
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(header),
    );
    response
}

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let status_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .layer(axum::middleware::map_response(
            |mut resp: Response| async move {
                resp.headers_mut().insert(
                    axum::http::header::CACHE_CONTROL,
                    HeaderValue::from_static(cache::NONE),
                );
                resp
            },
        ))
        .with_state(app_state.clone());

    let api_router = Router::new()
        .route("/sneakers/search", get(search::proxy_search))
        .route("/search", get(search::list_search))
        .route("/products/{key}", get(products::get_product))
        .route("/top", get(products::top))
        .with_state(app_state);

    let router = Router::new()
        .nest("/api", api_router)
        .nest("/api", status_router)
        .fallback(not_found);

    router.layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        SecurityHeadersLayer,
        CompressionLayer::new()
            .zstd(true)
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        TimeoutLayer::new(Duration::from_secs(60)),
    ))
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "path": uri.path() })),
    )
        .into_response()
}
