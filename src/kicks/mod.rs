//! Client for the KicksDB pricing API (StockX product search).

pub mod api;
pub mod errors;
pub mod json;
pub mod models;

pub use api::KicksApi;
pub use errors::UpstreamError;
pub use models::{Product, SearchPayload};
