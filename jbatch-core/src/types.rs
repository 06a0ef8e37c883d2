//! JSON-RPC 2.0 types as defined in the specification
//!
//! This module implements the data structures a batching client puts on and
//! takes off the wire (https://www.jsonrpc.org/specification):
//!
//! 1. **Request**: a call to a remote method that expects a response
//! 2. **Response**: the result of processing a request (success or error)
//!
//! A batch is simply a JSON array of requests, answered by a JSON array of
//! responses. No dedicated batch type exists here; the client owns the
//! ordering rules that make an array a batch.
//!
//! # Request IDs
//!
//! Request IDs are used to correlate requests with responses. The spec allows
//! string, number, or null IDs. The batching client always issues numeric IDs
//! from a per-client counter, but decodes whatever the server echoes back.

use crate::error::JsonRpcErrorData;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC 2.0 request ID
///
/// This enum uses `#[serde(untagged)]` to serialize directly as the inner value
/// without a type discriminator, matching the JSON-RPC 2.0 spec exactly.
///
/// The default is `Null`, which is what a response gets when the server omits
/// the `id` field entirely.
///
/// # Examples
///
/// ```rust
/// use jbatch_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier, used for all client-issued requests
    Number(i64),
    /// Null identifier
    #[default]
    Null,
}

impl fmt::Display for Id {
    /// Strings are quoted, numbers are displayed as-is, null is "null"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<u64> for Id {
    /// Note: This casts to i64, so values > i64::MAX will wrap around.
    fn from(n: u64) -> Self {
        Id::Number(n as i64)
    }
}

fn default_version() -> String {
    "2.0".to_string()
}

/// JSON-RPC 2.0 request message
///
/// According to JSON-RPC 2.0 spec, a request MUST contain `jsonrpc`,
/// `method` and `id`, and MAY contain `params`.
///
/// Ethereum JSON-RPC methods take positional parameters, so the batching
/// client always sets `params` to a JSON array (possibly empty). Use
/// [`JsonRpcRequest::positional`] for that shape.
///
/// # Examples
///
/// ```rust
/// use jbatch_core::{JsonRpcRequest, Id};
/// use serde_json::json;
///
/// let req = JsonRpcRequest::positional("eth_getBalance", vec![json!("0xabc"), json!("latest")], Id::Number(1));
/// assert_eq!(req.params, Some(json!(["0xabc", "latest"])));
///
/// let bare = JsonRpcRequest::new("web3_clientVersion", None, Id::Number(2));
/// assert_eq!(bare.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version - always "2.0" for this specification
    pub jsonrpc: String,
    /// Name of the remote method to invoke
    pub method: String,
    /// Optional parameters to pass to the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Unique identifier to correlate this request with its response
    pub id: Id,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Create a request with positional (array) parameters
    pub fn positional(method: impl Into<String>, params: Vec<serde_json::Value>, id: Id) -> Self {
        Self::new(method, Some(serde_json::Value::Array(params)), id)
    }
}

/// JSON-RPC 2.0 response message
///
/// A response contains either a result (success) or an error (failure).
///
/// # Lenient Decoding
///
/// Nodes in the wild are not always strict: some omit `jsonrpc`, some omit
/// `id` on errors, and a `null` result is legitimate (e.g. an unknown
/// transaction receipt). Both `jsonrpc` and `id` therefore default when
/// absent, and a `null` result decodes as `result: None`. Callers treat a
/// response without `error` as success with `result.unwrap_or(Value::Null)`.
///
/// # Examples
///
/// ```rust
/// use jbatch_core::{JsonRpcResponse, JsonRpcErrorData, Id};
/// use serde_json::json;
///
/// let success = JsonRpcResponse::success(json!("0x10"), Id::Number(1));
/// assert!(success.is_success());
///
/// let error = JsonRpcResponse::error(JsonRpcErrorData::new(-32000, "boom"), Id::Number(2));
/// assert!(error.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version - "2.0"
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// The result of the method invocation (present only on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error information (present only on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorData>,
    /// Request ID from the original request
    #[serde(default)]
    pub id: Id,
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC 2.0 response
    pub fn success(result: serde_json::Value, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error JSON-RPC 2.0 response
    pub fn error(error: JsonRpcErrorData, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// True when the response carries no `error` object
    ///
    /// A `null` result still counts as success.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// True when the response carries an `error` object
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into the caller-facing outcome
    ///
    /// `error` wins over `result` if a misbehaving server sends both.
    pub fn into_result(self) -> crate::Result<serde_json::Value> {
        match self.error {
            Some(error) => Err(crate::Error::JsonRpc(error)),
            None => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}
