//! Error types for jbatch
//!
//! This module provides error handling for batched JSON-RPC 2.0 calls.
//! It defines two main error types:
//!
//! - **Error**: Application-level errors seen by callers (uses thiserror)
//! - **JsonRpcErrorData**: Wire-format errors as defined in the JSON-RPC 2.0 spec
//!
//! # Error Taxonomy
//!
//! A batched call can fail in three distinct ways, and each one reaches the
//! caller through its own variant:
//!
//! - **Transport errors** (`Http`, `HttpStatus`, `Serialization`, or
//!   `InvalidResponse` for a body that is not an array): the whole HTTP call
//!   failed and every request in the batch receives a clone of the same error.
//! - **Server-reported errors** (`JsonRpc`): one element of the response array
//!   carried an `error` object. Only that request is rejected.
//! - **Missing responses** (`MissingResponse`): the server returned fewer
//!   elements than were requested. Only the unmatched requests are rejected.
//!
//! An array element that is not a response object is reported to its own
//! request as `InvalidResponse`, leaving its siblings untouched.
//!
//! # Spec-Compliant Error Codes
//!
//! JSON-RPC 2.0 defines standard error codes:
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (missing required fields)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000 to -32099`: Server error (implementation-defined)
//!
//! # Examples
//!
//! ```rust
//! use jbatch_core::{Error, JsonRpcErrorData};
//!
//! // A node rejected one call in a batch
//! let error = Error::JsonRpc(JsonRpcErrorData::new(-32000, "execution reverted"));
//! assert_eq!(error.rpc_code(), Some(-32000));
//! ```

use crate::types::Id;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for jbatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for jbatch operations
///
/// # Why Clone?
///
/// A failed HTTP call has to be reported to every request that travelled in
/// the failed batch. Each caller owns its own copy of the error, so the type
/// stores only owned, cloneable data (messages rather than source errors).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// JSON-RPC error object returned by the server
    ///
    /// Carries the server's `code`, `message` and optional `data` unchanged.
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] JsonRpcErrorData),

    /// Serialization or deserialization error
    ///
    /// Raised when a request cannot be encoded, or when the HTTP body of a
    /// batch response is not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP transport failure (connect, TLS, timeout, broken body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-2xx status code
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The response was valid JSON but not a usable JSON-RPC response
    ///
    /// At batch level this means the body was not an array; at element level
    /// it means one array entry was not a response object.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The server returned no element for this request
    ///
    /// Batches are demultiplexed by position, so a response array shorter
    /// than the request array leaves the trailing requests unanswered.
    #[error("No response for request {id}")]
    MissingResponse {
        /// Id of the request that went unanswered
        id: Id,
    },

    /// The request itself is malformed (e.g. empty method name)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Parameters could not be turned into a positional JSON array
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Client configuration rejected at build time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal client error
    ///
    /// Used when the client's own machinery fails, e.g. no Tokio runtime is
    /// available or a batch task was dropped before settling a request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The server's JSON-RPC error code, if this is a server-reported error
    pub fn rpc_code(&self) -> Option<i32> {
        match self {
            Error::JsonRpc(data) => Some(data.code),
            _ => None,
        }
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::JsonRpc(_) => "json_rpc",
            Error::Serialization(_) => "serialization",
            Error::Http(_) => "http",
            Error::HttpStatus(_) => "http_status",
            Error::InvalidResponse(_) => "invalid_response",
            Error::MissingResponse { .. } => "missing_response",
            Error::InvalidRequest(_) => "invalid_request",
            Error::InvalidParams(_) => "invalid_params",
            Error::InvalidConfig(_) => "invalid_config",
            Error::Internal(_) => "internal",
        }
    }
}

/// JSON-RPC 2.0 error data as defined in the specification
///
/// This structure represents the exact wire format for JSON-RPC errors.
/// It appears in the `error` field of a `JsonRpcResponse`.
///
/// # Spec Compliance
///
/// According to JSON-RPC 2.0 spec, error objects MUST contain:
/// - `code`: An integer error code
/// - `message`: A short description of the error
///
/// And MAY contain:
/// - `data`: Additional information about the error
///
/// Ethereum nodes commonly use `data` for revert payloads, so it is kept
/// verbatim.
///
/// # Examples
///
/// ```rust
/// use jbatch_core::JsonRpcErrorData;
/// use serde_json::json;
///
/// let error = JsonRpcErrorData::new(-32601, "Method not found");
/// assert_eq!(error.code, -32601);
///
/// let revert = JsonRpcErrorData::with_data(3, "execution reverted", json!("0x08c379a0"));
/// assert!(revert.data.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code indicating the error type
    ///
    /// Negative codes from -32768 to -32000 are reserved by the spec.
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Optional additional error information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcErrorData {
    /// Create a new JSON-RPC error with code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a new JSON-RPC error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl std::fmt::Display for JsonRpcErrorData {
    /// Formats as "[code] message", e.g. "[-32601] Method not found"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorData {}
