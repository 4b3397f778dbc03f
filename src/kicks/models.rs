//! Upstream response shapes and the normalized payload built from them.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use ts_rs::TS;

use crate::kicks::errors::UpstreamError;
use crate::kicks::json::parse_json_with_path;

/// One marketplace item. Every field may be absent upstream, and a field whose
/// value has the wrong JSON type reads as absent instead of rejecting the item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub gallery: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub gallery_360: Option<Vec<String>>,

    /// May contain HTML.
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_description: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub secondary_category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub categories: Option<Vec<String>>,

    /// Outbound marketplace URL.
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub weekly_orders: Option<i64>,
    /// Marketplace popularity; lower is more popular.
    #[serde(default, deserialize_with = "lenient_integer")]
    pub rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub upcoming: Option<bool>,

    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

impl Product {
    /// Title for display: `title`, then `name`, then a placeholder.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref())
            .or_else(|| non_blank(self.name.as_deref()))
            .unwrap_or("Untitled")
    }

    /// Lower-cased identity used to de-duplicate items across searches: slug, then SKU, then id.
    pub fn identity_key(&self) -> String {
        self.link_key().unwrap_or_default().to_lowercase()
    }

    /// Key used to address this item's detail view: slug, then SKU, then id.
    pub fn link_key(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .or(self.sku.as_deref())
            .or(self.id.as_deref())
    }

    /// A single price for filtering: average, then minimum, then maximum.
    pub fn representative_price(&self) -> Option<f64> {
        self.avg_price.or(self.min_price).or(self.max_price)
    }

    /// Rank, only when it is a positive number.
    pub fn positive_rank(&self) -> Option<i64> {
        self.rank.filter(|r| *r > 0)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Accepts ids sent as either JSON strings or numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Keeps the string entries of a list and drops the rest.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Numbers, or strings holding a number, e.g. `"129.99"`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite()))
}

/// Integers, integral floats such as `12.0`, or strings holding an integer.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// The two shapes the search endpoint answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchEnvelope {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<Value>>,
    },
}

impl SearchEnvelope {
    fn into_items(self) -> Vec<Value> {
        match self {
            SearchEnvelope::Bare(items) => items,
            SearchEnvelope::Wrapped { data } => data.unwrap_or_default(),
        }
    }
}

/// A successful upstream search: the verbatim body plus its decoded item list.
#[derive(Debug, Clone)]
pub struct SearchPayload {
    pub body: Bytes,
    pub products: Vec<Product>,
}

impl SearchPayload {
    /// Normalize a success body. The envelope shape is checked here and nowhere else.
    pub fn from_body(body: Bytes) -> Result<Self, UpstreamError> {
        let envelope: SearchEnvelope =
            parse_json_with_path(&body).map_err(UpstreamError::Malformed)?;

        let items = envelope.into_items();
        let total = items.len();
        let products: Vec<Product> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(product) => Some(product),
                Err(e) => {
                    debug!(index, error = %e, "skipping undecodable search item");
                    None
                }
            })
            .collect();

        if products.len() < total {
            debug!(
                decoded = products.len(),
                total, "some search items were skipped"
            );
        }

        Ok(Self { body, products })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> Result<SearchPayload, UpstreamError> {
        SearchPayload::from_body(Bytes::from(json.to_owned()))
    }

    #[test]
    fn wrapped_envelope_is_unwrapped_and_body_kept_verbatim() {
        let json = r#"{"status":"ok","data":[{"id":"x","title":"Air Jordan 11 Legend Blue","sku":"CT8012-104","rank":12}],"meta":{"total":1}}"#;
        let parsed = payload(json).unwrap();
        assert_eq!(parsed.body, json.as_bytes());
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].sku.as_deref(), Some("CT8012-104"));
        assert_eq!(parsed.products[0].rank, Some(12));
    }

    #[test]
    fn bare_list_is_accepted() {
        let parsed = payload(r#"[{"id": 7, "title": "Samba OG"}, {"title": "Gazelle"}]"#).unwrap();
        assert_eq!(parsed.products.len(), 2);
        assert_eq!(parsed.products[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn object_without_data_yields_no_products() {
        assert!(payload(r#"{"status":"ok"}"#).unwrap().products.is_empty());
        assert!(payload(r#"{"status":"ok","data":null}"#).unwrap().products.is_empty());
    }

    #[test]
    fn non_object_items_are_skipped() {
        let parsed = payload(r#"[{"title":"ok"}, 42, "loose", null]"#).unwrap();
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].display_title(), "ok");
    }

    #[test]
    fn mistyped_fields_read_as_absent_without_dropping_the_item() {
        let parsed = payload(
            r#"[{"slug":"aj11","brand":"Jordan","rank":12.0},
                {"title":"Dunk","categories":[{"name":"x"}, "Lifestyle"]},
                {"title":"bad rank","rank":"first","upcoming":"soon","min_price":"129.99","gallery":"one.jpg"}]"#,
        )
        .unwrap();
        assert_eq!(parsed.products.len(), 3);

        assert_eq!(parsed.products[0].slug.as_deref(), Some("aj11"));
        assert_eq!(parsed.products[0].rank, Some(12));

        assert_eq!(parsed.products[1].display_title(), "Dunk");
        assert_eq!(parsed.products[1].categories, Some(vec!["Lifestyle".to_owned()]));

        let bad = &parsed.products[2];
        assert_eq!(bad.rank, None);
        assert_eq!(bad.upcoming, None);
        assert_eq!(bad.min_price, Some(129.99));
        assert_eq!(bad.gallery, None);
    }

    #[test]
    fn fractional_ranks_are_not_truncated() {
        let parsed = payload(r#"[{"title":"x","rank":3.5,"weekly_orders":"40"}]"#).unwrap();
        assert_eq!(parsed.products[0].rank, None);
        assert_eq!(parsed.products[0].weekly_orders, Some(40));
    }

    #[test]
    fn non_json_and_scalar_bodies_are_malformed() {
        assert!(matches!(payload("<html>"), Err(UpstreamError::Malformed(_))));
        assert!(matches!(payload(r#""nope""#), Err(UpstreamError::Malformed(_))));
    }

    #[test]
    fn product_helpers_fall_back_in_order() {
        let product = Product {
            name: Some("Dunk Low".into()),
            sku: Some("DD1391-100".into()),
            id: Some("abc".into()),
            min_price: Some(90.0),
            max_price: Some(300.0),
            rank: Some(0),
            ..Default::default()
        };
        assert_eq!(product.display_title(), "Dunk Low");
        assert_eq!(product.identity_key(), "dd1391-100");
        assert_eq!(product.representative_price(), Some(90.0));
        assert_eq!(product.positive_rank(), None);
        assert_eq!(Product::default().display_title(), "Untitled");
    }
}
