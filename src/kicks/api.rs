//! HTTP client for the pricing API's product search endpoint.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};
use url::Url;

use crate::kicks::errors::UpstreamError;
use crate::kicks::models::SearchPayload;
use crate::search::{ProductSearch, UpstreamParams};
use crate::utils::fmt_duration;

const SEARCH_PATH: &str = "v3/stockx/products";

/// Longest slice of an error body kept as diagnostic detail.
const MAX_DETAIL_LEN: usize = 2048;

pub struct KicksApi {
    http: reqwest::Client,
    search_url: Url,
    api_key: Option<String>,
}

impl KicksApi {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url).context("Invalid KICKSDB_BASE_URL")?;
        // Keep any path prefix on the base when joining.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base
            .join(SEARCH_PATH)
            .context("Failed to build search URL")?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("drip/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            search_url,
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ProductSearch for KicksApi {
    async fn search(&self, params: &UpstreamParams) -> Result<SearchPayload, UpstreamError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(UpstreamError::MissingCredential);
        };

        let limit = params.limit.to_string();
        let start = Instant::now();
        let resp = self
            .http
            .get(self.search_url.clone())
            .query(&[("query", params.query.as_str()), ("limit", limit.as_str())])
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let mut detail = resp.text().await.unwrap_or_default();
            if detail.len() > MAX_DETAIL_LEN {
                let cut = (0..=MAX_DETAIL_LEN)
                    .rev()
                    .find(|i| detail.is_char_boundary(*i))
                    .unwrap_or(0);
                detail.truncate(cut);
            }
            warn!(
                status = status.as_u16(),
                query = %params.query,
                duration = fmt_duration(start.elapsed()),
                "upstream search failed"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body = resp.bytes().await?;
        let payload = SearchPayload::from_body(body)?;
        debug!(
            query = %params.query,
            limit = params.limit,
            items = payload.products.len(),
            duration = fmt_duration(start.elapsed()),
            "upstream search completed"
        );
        Ok(payload)
    }
}
