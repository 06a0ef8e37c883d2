//! Core JSON-RPC 2.0 types and codec for jbatch
//!
//! This crate provides the foundational pieces shared by the batching client:
//!
//! - **Types**: JSON-RPC 2.0 requests, responses and ids
//! - **Codec**: Batch array encoding and positional response decoding
//! - **Error handling**: The error taxonomy callers see (transport, server, missing)
//! - **Observability**: OpenTelemetry integration for traces, metrics, and logs
//!
//! # Architecture
//!
//! The crate is transport-agnostic. It knows what a batch looks like on the
//! wire but not how it travels; `jbatch-client` adds the HTTP transport and
//! the batching machinery on top.
//!
//! # Example
//!
//! ```rust
//! use jbatch_core::{codec, Id, JsonRpcRequest};
//!
//! let batch = vec![
//!     JsonRpcRequest::positional("eth_blockNumber", vec![], Id::Number(1)),
//!     JsonRpcRequest::positional("eth_gasPrice", vec![], Id::Number(2)),
//! ];
//! let body = codec::encode_batch(&batch).unwrap();
//!
//! let items = codec::decode_batch_response(r#"[{"id":1,"result":"0x10"},{"id":2,"result":"0x3b9aca00"}]"#).unwrap();
//! let first = codec::decode_batch_item(items[0].clone()).unwrap();
//! assert_eq!(first.into_result().unwrap(), "0x10");
//! # let _ = body;
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, JsonRpcErrorData, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{Id, JsonRpcRequest, JsonRpcResponse};
