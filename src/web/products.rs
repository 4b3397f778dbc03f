//! Product detail and landing rankings.

use axum::extract::{Path, State};
use axum::response::Response;

use crate::catalog::{detail, landing};
use crate::state::AppState;
use crate::web::error::ApiError;
use crate::web::routes::{cache, with_cache_control};

/// `GET /api/products/{key}`
pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let product = detail::lookup(&state.search, &key).await?;
    Ok(with_cache_control(product, cache::DETAIL))
}

/// `GET /api/top`
///
/// Never fails: brands whose search fails just contribute nothing.
pub(super) async fn top(State(state): State<AppState>) -> Response {
    let landing = landing::load_landing(&state.search).await;
    with_cache_control(landing, cache::REFERENCE)
}
