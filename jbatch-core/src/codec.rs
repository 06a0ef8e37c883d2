//! Codec for JSON-RPC batch serialization and deserialization
//!
//! This module turns an ordered list of requests into the JSON array that is
//! POSTed to a node, and turns the node's answer back into an ordered list of
//! per-request responses.
//!
//! # Positional Batches
//!
//! The batching client matches responses to requests **by position**, not by
//! `id`. The codec therefore never reorders anything: `encode_batch` writes
//! requests in slice order and `split_batch_response` returns array elements
//! in body order. Element-level decoding is kept separate
//! (`decode_batch_item`) so one malformed element does not poison its
//! siblings.
//!
//! # Error Handling
//!
//! - Encoding failures → `Error::Serialization`
//! - Body that is not JSON → `Error::Serialization`
//! - Body that is JSON but not an array → `Error::InvalidResponse`, or
//!   `Error::JsonRpc` when the node answered the whole batch with a single
//!   error object
//!
//! # Examples
//!
//! ```rust
//! use jbatch_core::{codec, JsonRpcRequest, Id};
//!
//! let batch = vec![
//!     JsonRpcRequest::positional("eth_blockNumber", vec![], Id::Number(1)),
//!     JsonRpcRequest::positional("eth_chainId", vec![], Id::Number(2)),
//! ];
//! let body = codec::encode_batch(&batch).unwrap();
//! assert!(body.starts_with('['));
//!
//! let items = codec::decode_batch_response(r#"[{"id":1,"result":"0x1"},{"id":2,"result":"0x5"}]"#).unwrap();
//! assert_eq!(items.len(), 2);
//! ```

use crate::error::{Error, JsonRpcErrorData, Result};
use crate::types::{JsonRpcRequest, JsonRpcResponse};
use serde::Serialize;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a batch of requests as a JSON array, preserving order
///
/// # Examples
///
/// ```rust
/// use jbatch_core::{codec, JsonRpcRequest, Id};
///
/// let batch = vec![JsonRpcRequest::positional("net_version", vec![], Id::Number(9))];
/// let json = codec::encode_batch(&batch).unwrap();
/// assert_eq!(json, r#"[{"jsonrpc":"2.0","method":"net_version","params":[],"id":9}]"#);
/// ```
pub fn encode_batch(requests: &[JsonRpcRequest]) -> Result<String> {
    encode(&requests)
}

/// Encode a batch of requests as a `serde_json::Value` array
pub fn batch_to_value(requests: &[JsonRpcRequest]) -> Result<serde_json::Value> {
    serde_json::to_value(requests).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a batch response body into its ordered elements
///
/// Parses `data` as JSON and hands it to [`split_batch_response`].
pub fn decode_batch_response(data: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| Error::Serialization(e.to_string()))?;
    split_batch_response(value)
}

/// Split an already-parsed batch response body into its ordered elements
///
/// A node that rejects a batch as a whole (e.g. "batch too large") replies
/// with a single error object instead of an array. That error is surfaced as
/// `Error::JsonRpc` so every caller in the batch sees the node's message.
pub fn split_batch_response(value: serde_json::Value) -> Result<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut object) => match object.remove("error") {
            Some(error) => {
                let data: JsonRpcErrorData = serde_json::from_value(error).map_err(|_| {
                    Error::InvalidResponse("malformed error object in batch response".to_string())
                })?;
                Err(Error::JsonRpc(data))
            }
            None => Err(Error::InvalidResponse(
                "expected a JSON array for a batch response".to_string(),
            )),
        },
        other => Err(Error::InvalidResponse(format!(
            "expected a JSON array for a batch response, got {}",
            json_kind(&other)
        ))),
    }
}

/// Decode one element of a batch response
///
/// Only objects are accepted. Missing `jsonrpc`/`id`/`result` fields are
/// tolerated (see [`JsonRpcResponse`]).
pub fn decode_batch_item(value: serde_json::Value) -> Result<JsonRpcResponse> {
    if !value.is_object() {
        return Err(Error::InvalidResponse(format!(
            "batch element is {}, expected an object",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
