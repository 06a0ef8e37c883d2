//! Debug hooks for batch tracing
//!
//! Implement [`BatchObserver`] to see every batch right before it leaves and
//! right after the transport answers, e.g. to log raw payloads or feed a
//! request inspector. Both methods default to no-ops.
//!
//! ```rust
//! use jbatch_client::BatchObserver;
//! use jbatch_core::JsonRpcRequest;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Counter(AtomicUsize);
//!
//! impl BatchObserver for Counter {
//!     fn on_batch_sent(&self, requests: &[JsonRpcRequest]) {
//!         self.0.fetch_add(requests.len(), Ordering::Relaxed);
//!     }
//! }
//! ```

use jbatch_core::{JsonRpcRequest, Result};

/// Observer notified around each batch's network call
///
/// Callbacks run on the dispatch task; keep them cheap and non-blocking.
pub trait BatchObserver: Send + Sync {
    /// Called with the full request array before it is sent
    fn on_batch_sent(&self, _requests: &[JsonRpcRequest]) {}

    /// Called with the request array and the raw transport outcome
    fn on_batch_response(
        &self,
        _requests: &[JsonRpcRequest],
        _response: &Result<serde_json::Value>,
    ) {
    }
}
