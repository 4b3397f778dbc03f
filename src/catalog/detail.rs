//! Single-item lookup for the detail view.

use crate::kicks::Product;
use crate::search::{RawQuery, SearchCoalescer, SearchError};

/// Results requested when resolving a detail key.
pub const DETAIL_LIMIT: u32 = 25;

#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error("No item found")]
    NotFound,
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Pick the item `key` most likely refers to: exact slug, exact SKU, title
/// containing the key, then simply the first result.
pub fn pick_best<'a>(items: &'a [Product], key: &str) -> Option<&'a Product> {
    let key = key.to_lowercase();
    let eq = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase() == key);

    items
        .iter()
        .find(|p| eq(p.slug.as_deref()))
        .or_else(|| items.iter().find(|p| eq(p.sku.as_deref())))
        .or_else(|| {
            items.iter().find(|p| {
                let title = p.title.as_deref().or(p.name.as_deref()).unwrap_or_default();
                title.to_lowercase().contains(&key)
            })
        })
        .or_else(|| items.first())
}

/// Search for `key` and resolve it to one product.
///
/// Keys are identifiers (slug, SKU, or id), so they go out as a SKU lookup and
/// are not held to the free-text minimum length. A blank key finds nothing.
pub async fn lookup(search: &SearchCoalescer, key: &str) -> Result<Product, DetailError> {
    let query = RawQuery {
        sku: Some(key.to_owned()),
        ..Default::default()
    }
    .with_limit(DETAIL_LIMIT);

    let items = match super::fetch_products(search, &query).await {
        Ok(items) => items,
        Err(SearchError::Query(_)) => return Err(DetailError::NotFound),
        Err(e) => return Err(e.into()),
    };
    pick_best(&items, key).cloned().ok_or(DetailError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str, sku: &str, title: &str) -> Product {
        Product {
            slug: Some(slug.into()),
            sku: Some(sku.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[test]
    fn preference_order_is_slug_sku_title_first() {
        let items = vec![
            item("first", "F-1", "Something"),
            item("other", "CT8012-104", "Air Jordan 11 Retro"),
            item("ct8012-104", "X-2", "Exact Slug"),
        ];
        assert_eq!(pick_best(&items, "CT8012-104").unwrap().title.as_deref(), Some("Exact Slug"));
        assert_eq!(pick_best(&items, "f-1").unwrap().slug.as_deref(), Some("first"));
        assert_eq!(pick_best(&items, "jordan 11").unwrap().slug.as_deref(), Some("other"));
        assert_eq!(pick_best(&items, "no such thing").unwrap().slug.as_deref(), Some("first"));
    }

    #[test]
    fn empty_results_pick_nothing() {
        assert!(pick_best(&[], "anything").is_none());
    }
}
