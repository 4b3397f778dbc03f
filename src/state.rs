//! Application state shared across handlers.

use serde::Serialize;
use std::time::Instant;
use ts_rs::TS;

use crate::search::SearchCoalescer;

/// Health status of a dependency.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ServiceStatus {
    Active,
    Disabled,
}

#[derive(Clone)]
pub struct AppState {
    /// The one coalescing cache every handler goes through.
    pub search: SearchCoalescer,
    /// Whether the pricing API credential is configured.
    pub upstream_configured: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(search: SearchCoalescer, upstream_configured: bool) -> Self {
        Self {
            search,
            upstream_configured,
            started_at: Instant::now(),
        }
    }

    pub fn upstream_status(&self) -> ServiceStatus {
        if self.upstream_configured {
            ServiceStatus::Active
        } else {
            ServiceStatus::Disabled
        }
    }
}
