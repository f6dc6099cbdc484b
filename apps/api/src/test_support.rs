//! Shared harness for route tests: an in-memory app plus a one-shot
//! request helper, so every test runs hermetically.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::Store;

pub fn test_config() -> Config {
    Config {
        database_url: None,
        anthropic_api_key: "test-key".to_string(),
        port: 0,
        rust_log: "info".to_string(),
    }
}

pub fn test_state() -> AppState {
    AppState {
        store: Store::memory(),
        llm: LlmClient::new("test-key".to_string()),
        config: test_config(),
    }
}

pub fn test_router() -> (Router, AppState) {
    let state = test_state();
    (build_router(state.clone()), state)
}

/// Fires one request at the router and returns the status plus the parsed
/// JSON body (`Value::Null` for empty responses such as 204s).
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
