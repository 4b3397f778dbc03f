//! Shared setup for HTTP-level tests: an app wired to a mock pricing API.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use drip::app::App;
use drip::config::Config;
use figment::Figment;
use serde_json::Value;
use wiremock::MockServer;

pub const TEST_KEY: &str = "test-key";

pub fn config_for(server: &MockServer, key: Option<&str>) -> Config {
    let mut figment = Figment::new().merge(("kicksdb_base_url", server.uri()));
    if let Some(key) = key {
        figment = figment.merge(("kicksdb_key", key));
    }
    Config::from_figment(figment).unwrap()
}

/// Router backed by `server`, with the test credential configured.
pub fn app_for(server: &MockServer) -> Router {
    App::new(config_for(server, Some(TEST_KEY))).unwrap().router()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
