//! Coalescing TTL cache in front of the upstream product search.
//!
//! [`query`] turns caller parameters into a canonical key, [`store`] keeps
//! fresh payloads, and [`coalesce`] guarantees at most one upstream call per
//! key at a time.

pub mod coalesce;
pub mod query;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::kicks::{SearchPayload, UpstreamError};

pub use coalesce::{CoalescerStats, SearchCoalescer};
pub use query::{NormalizedQuery, QueryError, QueryPolicy, RawQuery, UpstreamParams};
pub use store::ResponseStore;

/// The upstream search endpoint, as seen by the cache.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, params: &UpstreamParams) -> Result<SearchPayload, UpstreamError>;
}

/// How a search result was obtained. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a fresh cache entry.
    Hit,
    /// This caller issued the upstream call.
    Miss,
    /// This caller waited on a call another caller had already issued.
    Coalesced,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Coalesced => "COALESCED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub payload: Arc<SearchPayload>,
    pub status: CacheStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("pricing API credential is not configured")]
    ConfigurationMissing,
    #[error(transparent)]
    Upstream(UpstreamError),
}

impl From<UpstreamError> for SearchError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential => SearchError::ConfigurationMissing,
            other => SearchError::Upstream(other),
        }
    }
}
