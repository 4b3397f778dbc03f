//! Search endpoints: the raw proxy and the filtered product list.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::fetch_products;
use crate::catalog::filter::{ResultFilter, SortKey};
use crate::kicks::Product;
use crate::search::RawQuery;
use crate::state::AppState;
use crate::web::error::ApiError;
use crate::web::extract::ApiQuery;
use crate::web::routes::{cache, with_cache_control};

/// Results requested for the filtered search list.
const LIST_LIMIT: u32 = 50;

/// `GET /api/sneakers/search`
///
/// Returns the upstream body byte-for-byte, with the cache outcome in `X-Cache`.
pub(super) async fn proxy_search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RawQuery>,
) -> Result<Response, ApiError> {
    let outcome = state.search.search(&params).await?;

    let mut response = Response::new(Body::from(outcome.payload.body.clone()));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert("x-cache", HeaderValue::from_static(outcome.status.as_str()));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache::SEARCH));
    Ok(response)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub term: Option<String>,
    pub q: Option<String>,
    pub sku: Option<String>,
    pub style_id: Option<String>,
    pub brand: Option<String>,
    /// `all` or blank means no gender filter.
    pub gender: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
}

impl ListParams {
    /// Free text with the brand appended, as one term.
    fn raw_query(&self) -> RawQuery {
        let text = self.term.as_deref().or(self.q.as_deref());
        let term = [text, self.brand.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        RawQuery {
            term: Some(term),
            sku: self.sku.clone(),
            style_id: self.style_id.clone(),
            ..Default::default()
        }
        .with_limit(LIST_LIMIT)
    }

    fn filter(&self) -> ResultFilter {
        let price = |raw: &Option<String>| raw.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        ResultFilter {
            gender: self
                .gender
                .as_deref()
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty() && g != "all"),
            min_price: price(&self.min_price),
            max_price: price(&self.max_price),
            sort: self.sort,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ListResponse {
    pub items: Vec<Product>,
    pub count: usize,
}

/// `GET /api/search`
pub(super) async fn list_search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Response, ApiError> {
    let products = fetch_products(&state.search, &params.raw_query()).await?;
    let fetched = products.len();
    let items = params.filter().apply(products);
    debug!(fetched, shown = items.len(), "search list filtered");

    Ok(with_cache_control(
        ListResponse {
            count: items.len(),
            items,
        },
        cache::SEARCH,
    ))
}
