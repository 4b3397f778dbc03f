//! JSON error responses for the API.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::catalog::detail::DetailError;
use crate::kicks::UpstreamError;
use crate::search::SearchError;

/// An error body plus the status it is sent with.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Upstream answered with a non-success status; its status and body are passed along.
    fn upstream_status(status: u16, detail: String) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: json!({ "error": "Upstream error", "status": status, "detail": detail }),
        }
    }

    fn upstream_failure(detail: String) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: json!({ "error": "Upstream error", "detail": detail }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Query(e) => ApiError::bad_request(e.to_string()),
            SearchError::ConfigurationMissing => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Missing KICKSDB_KEY")
            }
            SearchError::Upstream(e) => e.into(),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, detail } => ApiError::upstream_status(status, detail),
            UpstreamError::Timeout => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Upstream timed out")
            }
            UpstreamError::MissingCredential => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Missing KICKSDB_KEY")
            }
            other @ (UpstreamError::Transport(_)
            | UpstreamError::Malformed(_)
            | UpstreamError::Aborted(_)) => ApiError::upstream_failure(other.to_string()),
        }
    }
}

impl From<DetailError> for ApiError {
    fn from(err: DetailError) -> Self {
        match err {
            DetailError::NotFound => ApiError::not_found("No item found"),
            DetailError::Search(e) => e.into(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
