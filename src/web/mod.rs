//! HTTP API over the search cache and catalog logic.

pub mod error;
pub mod extract;
pub mod middleware;
pub mod products;
pub mod routes;
pub mod search;
pub mod status;

pub use routes::*;
