//! Extractors whose rejections use the API's JSON error shape.

use axum::extract::{FromRequestParts, Query};

use crate::web::error::ApiError;

/// `Query`, but a malformed query string answers `400 {"error": ...}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
