//! Query normalization: caller parameters in, cache key and upstream parameters out.

use serde::Deserialize;

/// Parameters as a caller supplied them. Nothing here is trusted or trimmed yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuery {
    pub term: Option<String>,
    /// Alias of `term`, used by older links.
    pub q: Option<String>,
    pub sku: Option<String>,
    /// Alias of `sku`.
    #[serde(rename = "styleId")]
    pub style_id: Option<String>,
    /// Kept as text so `limit=20` and `limit= 20 ` normalize identically.
    pub limit: Option<String>,
}

impl RawQuery {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn sku(sku: impl Into<String>) -> Self {
        Self {
            sku: Some(sku.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.to_string());
        self
    }
}

/// Parameters sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamParams {
    /// The effective search term: the SKU when one was given, otherwise the free text.
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub key: String,
    pub upstream: UpstreamParams,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    InvalidQuery(String),
    #[error("Search term must be at least {min_len} characters")]
    QueryTooShort { min_len: usize },
}

/// Limits applied while normalizing.
#[derive(Debug, Clone, Copy)]
pub struct QueryPolicy {
    pub min_term_len: usize,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            min_term_len: 3,
            default_limit: 20,
            max_limit: 30,
        }
    }
}

impl QueryPolicy {
    pub fn normalize(&self, raw: &RawQuery) -> Result<NormalizedQuery, QueryError> {
        let sku = first_present(&[raw.sku.as_deref(), raw.style_id.as_deref()]);
        let term = first_present(&[raw.term.as_deref(), raw.q.as_deref()]);

        let (field, query) = match (sku, term) {
            (Some(sku), _) => ("sku", sku),
            (None, Some(term)) => {
                if term.chars().count() < self.min_term_len {
                    return Err(QueryError::QueryTooShort {
                        min_len: self.min_term_len,
                    });
                }
                ("term", term)
            }
            (None, None) => {
                return Err(QueryError::InvalidQuery("Provide ?term= or ?sku=".to_owned()));
            }
        };

        let limit = self.limit(raw.limit.as_deref())?;

        let key = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(field, &query.to_lowercase())
            .append_pair("limit", &limit.to_string())
            .finish();

        Ok(NormalizedQuery {
            key,
            upstream: UpstreamParams { query, limit },
        })
    }

    fn limit(&self, raw: Option<&str>) -> Result<u32, QueryError> {
        // A zero ceiling would make the clamp range empty.
        let max_limit = self.max_limit.max(1);
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(self.default_limit.clamp(1, max_limit));
        };
        // Anything numeric clamps; negative and oversized values included.
        let value: i64 = raw.parse().map_err(|_| {
            QueryError::InvalidQuery(format!("limit must be an integer, got '{raw}'"))
        })?;
        Ok(value.clamp(1, i64::from(max_limit)) as u32)
    }
}

/// First candidate that is non-blank after trimming, with inner whitespace collapsed.
fn first_present(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: RawQuery) -> Result<NormalizedQuery, QueryError> {
        QueryPolicy::default().normalize(&raw)
    }

    #[test]
    fn whitespace_case_and_limit_type_do_not_change_the_key() {
        let a = normalize(RawQuery::term("Air Jordan 11").with_limit(20)).unwrap();
        let b = normalize(RawQuery {
            term: Some(" air  jordan 11 ".into()),
            limit: Some("20".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.key, "term=air+jordan+11&limit=20");
    }

    #[test]
    fn missing_limit_uses_the_default() {
        let with_default = normalize(RawQuery::term("Air Jordan 11")).unwrap();
        let explicit = normalize(RawQuery::term("Air Jordan 11").with_limit(20)).unwrap();
        assert_eq!(with_default, explicit);
    }

    #[test]
    fn zero_ceiling_still_yields_a_limit_of_one() {
        let policy = QueryPolicy {
            max_limit: 0,
            ..QueryPolicy::default()
        };
        let defaulted = policy.normalize(&RawQuery::term("jordan")).unwrap();
        assert_eq!(defaulted.upstream.limit, 1);
        let explicit = policy.normalize(&RawQuery::term("jordan").with_limit(50)).unwrap();
        assert_eq!(explicit.upstream.limit, 1);
    }

    #[test]
    fn sku_takes_precedence_over_term() {
        let normalized = normalize(RawQuery {
            term: Some("foo".into()),
            sku: Some("CT8012-104".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(normalized.key, "sku=ct8012-104&limit=20");
        assert_eq!(
            normalized.upstream,
            UpstreamParams {
                query: "CT8012-104".into(),
                limit: 20
            }
        );
    }

    #[test]
    fn style_id_is_an_alias_for_sku_and_q_for_term() {
        let by_style = normalize(RawQuery {
            style_id: Some(" CT8012-104 ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_style, normalize(RawQuery::sku("CT8012-104")).unwrap());

        let by_q = normalize(RawQuery {
            q: Some("Samba OG".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_q, normalize(RawQuery::term("Samba OG")).unwrap());
    }

    #[test]
    fn blank_sku_falls_back_to_style_id_then_term() {
        let normalized = normalize(RawQuery {
            sku: Some("   ".into()),
            term: Some("Dunk Low".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(normalized.upstream.query, "Dunk Low");
    }

    #[test]
    fn short_term_is_rejected_unless_a_sku_is_present() {
        assert_eq!(
            normalize(RawQuery::term("ai")),
            Err(QueryError::QueryTooShort { min_len: 3 })
        );
        let with_sku = normalize(RawQuery {
            term: Some("ai".into()),
            sku: Some("CT8012-104".into()),
            ..Default::default()
        });
        assert!(with_sku.is_ok());
    }

    #[test]
    fn nothing_usable_is_invalid() {
        assert!(matches!(
            normalize(RawQuery::default()),
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(matches!(
            normalize(RawQuery::term("   ")),
            Err(QueryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn limit_is_clamped_and_validated() {
        assert_eq!(
            normalize(RawQuery::term("jordan").with_limit(50))
                .unwrap()
                .upstream
                .limit,
            30
        );
        assert_eq!(
            normalize(RawQuery::term("jordan").with_limit(0))
                .unwrap()
                .upstream
                .limit,
            1
        );
        let bad = normalize(RawQuery {
            term: Some("jordan".into()),
            limit: Some("lots".into()),
            ..Default::default()
        });
        assert!(matches!(bad, Err(QueryError::InvalidQuery(_))));
    }

    #[test]
    fn reserved_characters_cannot_forge_another_key() {
        let sneaky = normalize(RawQuery::term("yeezy&limit=5")).unwrap();
        let plain = normalize(RawQuery::term("yeezy").with_limit(5)).unwrap();
        assert_ne!(sneaky.key, plain.key);
    }
}
