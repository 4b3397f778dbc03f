//! Landing-page ranking over the brand seed batches.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use ts_rs::TS;

use crate::kicks::Product;

/// Walking ranks from #1 stops here even without a gap.
const MAX_CONTIGUOUS_RANK: i64 = 1000;

pub const TOP_N: usize = 10;

/// A brand query plus the patterns its results' `brand` must match.
pub struct BrandSeed {
    pub query: &'static str,
    matchers: Vec<Regex>,
}

impl BrandSeed {
    fn new(query: &'static str, patterns: &[&str]) -> Self {
        let matchers = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .unwrap_or_else(|e| panic!("invalid brand pattern {p:?}: {e}"))
            })
            .collect();
        Self { query, matchers }
    }

    pub fn matches(&self, brand: Option<&str>) -> bool {
        let brand = brand.unwrap_or_default().trim();
        !brand.is_empty() && self.matchers.iter().any(|rx| rx.is_match(brand))
    }
}

pub static BRAND_SEEDS: LazyLock<Vec<BrandSeed>> = LazyLock::new(|| {
    vec![
        BrandSeed::new("Jordan", &["^jordan$", "^air jordan"]),
        BrandSeed::new("Nike", &["^nike$"]),
        BrandSeed::new("adidas", &["^adidas$"]),
        BrandSeed::new("New Balance", &["^new balance$", "^nb$"]),
        BrandSeed::new("ASICS", &["^asics$"]),
        BrandSeed::new("Yeezy", &["^yeezy$"]),
        BrandSeed::new("Puma", &["^puma$"]),
        BrandSeed::new("Reebok", &["^reebok$"]),
        BrandSeed::new("Converse", &["^converse$"]),
        BrandSeed::new("Vans", &["^vans$"]),
        BrandSeed::new("Salomon", &["^salomon$"]),
        BrandSeed::new("Hoka", &["^hoka( one one)?$"]),
        BrandSeed::new("On Running", &["^on( running)?$"]),
        BrandSeed::new("UGG", &["^ugg$"]),
        BrandSeed::new("Crocs", &["^crocs"]),
        BrandSeed::new("Birkenstock", &["^birkenstock$"]),
        BrandSeed::new("Timberland", &["^timberland$"]),
        // streetwear
        BrandSeed::new("Supreme", &["^supreme$"]),
        BrandSeed::new("Essentials", &["^essentials$", "fear of god"]),
        BrandSeed::new("Fear of God Essentials", &["fear of god", "essentials"]),
        BrandSeed::new("Palace", &["^palace$"]),
        BrandSeed::new("BAPE", &["^bape$", "a bathing ape"]),
        BrandSeed::new("Kith", &["^kith$"]),
        BrandSeed::new("Stussy", &["^st[üu]ssy$"]),
        // collectibles
        BrandSeed::new("POP MART", &["^pop ?mart$"]),
        BrandSeed::new("BEARBRICK", &["^be@?rbrick$", "^medicom( toy)?$"]),
        BrandSeed::new("LEGO", &["^lego$"]),
        BrandSeed::new("Funko", &["^funko$"]),
        BrandSeed::new("KAWS", &["^kaws$"]),
        BrandSeed::new("Hot Wheels", &["^hot wheels$"]),
        BrandSeed::new("Pokémon", &["^pok[eé]mon"]),
        BrandSeed::new("Panini", &["^panini$"]),
        BrandSeed::new("Topps", &["^topps$"]),
    ]
});

/// Merge per-seed batches (same order as the seeds) into one rank-sorted list.
///
/// A product survives only if its brand matches its own seed, its rank is
/// positive and its identity key is non-empty and not already taken.
pub fn merge_ranked(seeds: &[BrandSeed], batches: Vec<Vec<Product>>) -> Vec<Product> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (seed, batch) in seeds.iter().zip(batches) {
        for product in batch {
            if !seed.matches(product.brand.as_deref()) || product.positive_rank().is_none() {
                continue;
            }
            let key = product.identity_key();
            if key.is_empty() || !seen.insert(key) {
                continue;
            }
            merged.push(product);
        }
    }

    // Stable, so equal ranks keep seed order.
    merged.sort_by_key(|p| p.positive_rank().unwrap_or(i64::MAX));
    merged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ProductKind {
    Sneakers,
    Streetwear,
    Collectibles,
    Other,
}

static SNEAKER_HINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("sneaker|shoe|footwear").unwrap());
static STREETWEAR_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("streetwear|hoodie|t-?shirt|tee|sweatshirt|jacket|pants|shorts|essentials").unwrap()
});
static COLLECTIBLE_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("collectible|figure|vinyl|toy|bearbrick|be@?rbrick|trading|card|pop ?mart").unwrap()
});

/// Loose classification from type, categories and brand. First match wins.
pub fn kind_of(product: &Product) -> ProductKind {
    let hay = [
        product.product_type.as_deref(),
        product.category.as_deref(),
        product.secondary_category.as_deref(),
        product.brand.as_deref(),
    ]
    .map(Option::unwrap_or_default)
    .join(" ")
    .to_lowercase();

    if SNEAKER_HINTS.is_match(&hay) {
        ProductKind::Sneakers
    } else if STREETWEAR_HINTS.is_match(&hay) {
        ProductKind::Streetwear
    } else if COLLECTIBLE_HINTS.is_match(&hay) {
        ProductKind::Collectibles
    } else {
        ProductKind::Other
    }
}

/// The first product for each rank, walking 1, 2, 3… until the first missing rank.
pub fn contiguous_from_one<'a>(items: &[&'a Product]) -> Vec<&'a Product> {
    let mut by_rank: HashMap<i64, &Product> = HashMap::new();
    for &product in items {
        if let Some(rank) = product.positive_rank() {
            by_rank.entry(rank).or_insert(product);
        }
    }

    (1..=MAX_CONTIGUOUS_RANK)
        .map_while(|want| by_rank.get(&want).copied())
        .collect()
}

/// Top 10 of `pool`: the contiguous run when it is long enough, otherwise pool order.
pub fn top_ten<'a>(pool: &[&'a Product]) -> Vec<&'a Product> {
    let contiguous = contiguous_from_one(pool);
    let base = if contiguous.len() >= TOP_N {
        contiguous
    } else {
        pool.to_vec()
    };
    base.into_iter().take(TOP_N).collect()
}
