//! Batching JSON-RPC 2.0 client over HTTP
//!
//! This crate turns many independent JSON-RPC calls into a few HTTP requests.
//! Calls issued within a short window are coalesced into one JSON-RPC batch
//! array, POSTed in a single round trip, and the index-aligned response array
//! is handed back to each caller individually.
//!
//! # Core Features
//!
//! - **Size and time batching**: flush at `size_limit` requests or after
//!   `time_limit`, whichever comes first
//! - **Positional demultiplexing**: response element `i` settles request `i`
//! - **Per-call errors**: one failing call never fails its siblings
//! - **Concurrent batches**: a new batch never waits for the previous one
//! - **Pluggable transport**: `reqwest` over HTTP by default
//! - **Observability**: OpenTelemetry metrics plus `tracing` spans and events
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jbatch_client::BatchClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BatchClient::new("http://localhost:8545")?;
//!
//!     // Three calls, one HTTP request
//!     let (block, gas, balance) = tokio::join!(
//!         client.send("eth_blockNumber", vec![]),
//!         client.send("eth_gasPrice", vec![]),
//!         client.send("eth_getBalance", vec![json!("0xabc"), json!("latest")]),
//!     );
//!     println!("{} {} {}", block?, gas?, balance?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Tuning
//!
//! ```rust,no_run
//! use jbatch_client::ClientBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> jbatch_core::Result<()> {
//! let client = ClientBuilder::new("http://localhost:8545")
//!     .time_limit(Duration::from_millis(10))
//!     .size_limit(100)
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod client_builder;
mod config;
mod dispatch;
mod metrics;
mod observer;
mod queue;
mod timer;
mod transport;

pub use client::BatchClient;
pub use client_builder::ClientBuilder;
pub use config::{BatchConfig, ConnectionInfo, Network, DEFAULT_SIZE_LIMIT, DEFAULT_TIME_LIMIT};
pub use metrics::{ClientMetrics, FlushTrigger};
pub use observer::BatchObserver;
pub use transport::{HttpTransport, Transport};
