//! Common test utilities for jbatch-client integration tests
//!
//! This module provides helpers for standing up a mock JSON-RPC endpoint and
//! building the batch bodies the client is expected to send and receive.

#![allow(dead_code)]

use jbatch_client::{BatchClient, ClientBuilder};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::time::Duration;

/// Start a mock HTTP server
pub async fn mock_server() -> ServerGuard {
    mockito::Server::new_async().await
}

/// Client with a short time window and a large size limit
pub fn test_client(url: &str) -> BatchClient {
    test_client_with_limits(url, Duration::from_millis(20), 100)
}

/// Client with explicit batching limits
pub fn test_client_with_limits(url: &str, time_limit: Duration, size_limit: usize) -> BatchClient {
    ClientBuilder::new(url)
        .time_limit(time_limit)
        .size_limit(size_limit)
        .build()
        .expect("Failed to build client")
}

/// Mock a single batch exchange
///
/// Matches a POST to `/` whose body equals `requests` and answers with
/// `responses` as a JSON array.
pub async fn mock_batch(server: &mut ServerGuard, requests: Vec<Value>, responses: Vec<Value>) -> Mock {
    server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(Value::Array(requests)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(Value::Array(responses).to_string())
        .expect(1)
        .create_async()
        .await
}

/// Helper to build the request object the client puts on the wire
pub fn rpc_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

/// Helper to create a mock JSON-RPC response
pub fn mock_response(id: i64, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id
    })
}

/// Helper to create a mock JSON-RPC error response
pub fn mock_error_response(id: i64, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": {
            "code": code,
            "message": message
        },
        "id": id
    })
}
