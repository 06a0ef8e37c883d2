//! jbatch - batched JSON-RPC 2.0 over HTTP
//!
//! This is the main convenience crate that re-exports all jbatch sub-crates.
//! Use this crate if you want a single dependency for the client and the
//! JSON-RPC types it speaks.
//!
//! # Architecture
//!
//! jbatch is organized into modular crates:
//!
//! - **jbatch-core**: Core types, batch codec, error handling, observability
//! - **jbatch-client**: Batching client with size/time flushing and HTTP transport
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jbatch::BatchClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BatchClient::builder("http://localhost:8545")
//!         .time_limit(Duration::from_millis(10))
//!         .build()?;
//!
//!     let (block, chain) = tokio::join!(
//!         client.send("eth_blockNumber", vec![]),
//!         client.send("eth_chainId", vec![]),
//!     );
//!     println!("block {} on chain {}", block?, chain?);
//!
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates
pub use jbatch_client as client;
pub use jbatch_core as core;

// Convenience re-exports of the most commonly used types
pub use jbatch_client::{BatchClient, BatchConfig, ClientBuilder, Network};
pub use jbatch_core::{Error, Result};
