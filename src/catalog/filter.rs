//! Client-side style filtering and ordering of search results.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::kicks::Product;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Rank,
    /// High to low.
    AvgPrice,
    /// Low to high.
    AvgPriceAsc,
    /// Newest first.
    UpdatedAt,
}

#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    /// Lower-cased gender; `None` keeps every gender.
    pub gender: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: SortKey,
}

impl ResultFilter {
    /// Items missing a gender or a price are never filtered out by that criterion.
    pub fn keeps(&self, product: &Product) -> bool {
        if let (Some(wanted), Some(gender)) = (&self.gender, product.gender.as_deref()) {
            let gender = gender.to_lowercase();
            if !gender.is_empty() && gender != *wanted {
                return false;
            }
        }
        if let Some(price) = product.representative_price() {
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut kept: Vec<Product> = products.into_iter().filter(|p| self.keeps(p)).collect();
        kept.sort_by(|a, b| self.sort.compare(a, b));
        kept
    }
}

impl SortKey {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Rank => rank_or_last(a).cmp(&rank_or_last(b)),
            SortKey::AvgPrice => price_or_zero(b).total_cmp(&price_or_zero(a)),
            SortKey::AvgPriceAsc => price_or_zero(a).total_cmp(&price_or_zero(b)),
            SortKey::UpdatedAt => updated_or_epoch(b).cmp(&updated_or_epoch(a)),
        }
    }
}

fn rank_or_last(p: &Product) -> i64 {
    p.rank.unwrap_or(i64::MAX)
}

fn price_or_zero(p: &Product) -> f64 {
    p.avg_price.unwrap_or(0.0)
}

/// Unparseable timestamps sort as the epoch.
fn updated_or_epoch(p: &Product) -> DateTime<Utc> {
    p.updated_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
