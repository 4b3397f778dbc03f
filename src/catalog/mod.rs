//! What the pages do with search results: ranking, detail lookup, filtering.

pub mod blurb;
pub mod detail;
pub mod filter;
pub mod landing;
pub mod ranking;

use crate::kicks::Product;
use crate::search::{RawQuery, SearchCoalescer, SearchError};

/// Run a search through the shared cache and return only the decoded products.
pub async fn fetch_products(
    search: &SearchCoalescer,
    query: &RawQuery,
) -> Result<Vec<Product>, SearchError> {
    let outcome = search.search(query).await?;
    Ok(outcome.payload.products.clone())
}
