//! Landing data: merged brand rankings split into top-10 lists per kind.

use futures::future::join_all;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ts_rs::TS;

use super::blurb::blurb_for;
use super::ranking::{
    BRAND_SEEDS, BrandSeed, ProductKind, contiguous_from_one, kind_of, merge_ranked, top_ten,
};
use crate::kicks::Product;
use crate::search::{RawQuery, SearchCoalescer};
use crate::utils::log_if_slow;

/// Results requested per brand seed.
pub const SEED_LIMIT: u32 = 10;

const SLOW_LANDING: Duration = Duration::from_secs(5);

/// One list row, already shaped for display.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LandingRow {
    pub rank: Option<i64>,
    pub title: String,
    /// Detail key (slug, SKU or id).
    pub key: Option<String>,
    pub image: Option<String>,
    pub blurb: String,
    /// Gender and prices joined for a subtitle, e.g. `men · avg $212 · max $480`.
    pub meta: String,
    pub kind: ProductKind,
}

impl LandingRow {
    fn from_product(p: &Product) -> Self {
        let mut meta: Vec<String> = Vec::new();
        if let Some(gender) = p.gender.as_deref().filter(|g| !g.is_empty()) {
            meta.push(gender.to_owned());
        }
        if let Some(avg) = p.avg_price {
            meta.push(format!("avg ${}", avg.round()));
        }
        if let Some(max) = p.max_price {
            meta.push(format!("max ${}", max.round()));
        }

        Self {
            rank: p.rank,
            title: p.display_title().to_owned(),
            key: p.link_key().map(str::to_owned),
            image: p.image.clone(),
            blurb: blurb_for(p),
            meta: meta.join(" · "),
            kind: kind_of(p),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LandingResponse {
    pub all: Vec<LandingRow>,
    pub sneakers: Vec<LandingRow>,
    pub streetwear: Vec<LandingRow>,
    pub collectibles: Vec<LandingRow>,
    /// Last rank of the unbroken run starting at #1, if there is one.
    pub contiguous_through: Option<i64>,
}

impl LandingResponse {
    pub fn from_merged(merged: &[Product]) -> Self {
        let pool: Vec<&Product> = merged.iter().collect();
        let of_kind = |kind: ProductKind| -> Vec<LandingRow> {
            let filtered: Vec<&Product> =
                pool.iter().copied().filter(|p| kind_of(p) == kind).collect();
            rows(top_ten(&filtered))
        };

        Self {
            all: rows(top_ten(&pool)),
            sneakers: of_kind(ProductKind::Sneakers),
            streetwear: of_kind(ProductKind::Streetwear),
            collectibles: of_kind(ProductKind::Collectibles),
            contiguous_through: contiguous_from_one(&pool).last().and_then(|p| p.rank),
        }
    }
}

fn rows(products: Vec<&Product>) -> Vec<LandingRow> {
    products.into_iter().map(LandingRow::from_product).collect()
}

/// Fetch one batch; any failure is logged and treated as an empty batch.
async fn fetch_seed(search: &SearchCoalescer, seed: &BrandSeed) -> Vec<Product> {
    let query = RawQuery {
        q: Some(seed.query.to_owned()),
        ..Default::default()
    }
    .with_limit(SEED_LIMIT);

    match super::fetch_products(search, &query).await {
        Ok(products) => products,
        Err(e) => {
            warn!(seed = seed.query, error = %e, "brand batch failed, treating as empty");
            Vec::new()
        }
    }
}

/// Query every brand seed concurrently and merge into one ranked list.
pub async fn load_merged(search: &SearchCoalescer) -> Vec<Product> {
    let start = Instant::now();
    let seeds: &[BrandSeed] = &BRAND_SEEDS;
    let batches = join_all(seeds.iter().map(|seed| fetch_seed(search, seed))).await;
    log_if_slow(start, SLOW_LANDING, "landing aggregation");

    let merged = merge_ranked(seeds, batches);
    debug!(seeds = seeds.len(), merged = merged.len(), "landing rankings merged");
    merged
}

pub async fn load_landing(search: &SearchCoalescer) -> LandingResponse {
    LandingResponse::from_merged(&load_merged(search).await)
}
