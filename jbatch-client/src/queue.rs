//! Pending request queue and batches
//!
//! Every call to `BatchClient::send` becomes a [`PendingRequest`]: the wire
//! request plus the oneshot sender that settles the caller's future. Requests
//! wait in the [`PendingQueue`] until a flush drains the whole queue into a
//! [`Batch`] in one step.
//!
//! # Request Lifecycle
//!
//! 1. **Create**: `send` assigns an id and opens a oneshot channel
//! 2. **Queue**: the request is appended to the live queue
//! 3. **Drain**: a flush moves the entire queue into a `Batch`
//! 4. **Dispatch**: the batch's requests are POSTed as one JSON array
//! 5. **Settle**: each sender is consumed exactly once, by position
//!
//! # Why Oneshot Channels?
//!
//! `oneshot::Sender::send` consumes the sender, so a request cannot be settled
//! twice. If the caller dropped its future the send simply fails and is
//! ignored.

use jbatch_core::{Error, JsonRpcRequest, Result};
use tokio::sync::oneshot;

/// Continuation of one caller's future
pub(crate) type Settle = oneshot::Sender<Result<serde_json::Value>>;

/// One caller's in-flight request
pub(crate) struct PendingRequest {
    pub(crate) request: JsonRpcRequest,
    pub(crate) tx: Settle,
}

impl PendingRequest {
    /// Create a pending request and the receiver its caller awaits
    pub(crate) fn new(
        request: JsonRpcRequest,
    ) -> (Self, oneshot::Receiver<Result<serde_json::Value>>) {
        let (tx, rx) = oneshot::channel();
        (Self { request, tx }, rx)
    }
}

/// Ordered buffer of requests not yet flushed
#[derive(Default)]
pub(crate) struct PendingQueue {
    items: Vec<PendingRequest>,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a request and return the new queue length
    pub(crate) fn push(&mut self, pending: PendingRequest) -> usize {
        self.items.push(pending);
        self.items.len()
    }

    /// Move every queued request into a batch, leaving the queue empty
    pub(crate) fn drain(&mut self) -> Batch {
        let items = std::mem::take(&mut self.items);
        let (requests, senders) = items
            .into_iter()
            .map(|pending| (pending.request, pending.tx))
            .unzip();
        Batch { requests, senders }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Requests detached from the queue by one flush
///
/// `requests[i]` and `senders[i]` always belong to the same caller; the
/// response array is matched against them by index.
pub(crate) struct Batch {
    requests: Vec<JsonRpcRequest>,
    senders: Vec<Settle>,
}

impl Batch {
    /// The wire payload, in queue order
    pub(crate) fn requests(&self) -> &[JsonRpcRequest] {
        &self.requests
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Split into index-aligned requests and continuations
    pub(crate) fn into_parts(self) -> (Vec<JsonRpcRequest>, Vec<Settle>) {
        (self.requests, self.senders)
    }

    /// Settle every request with the same error
    pub(crate) fn reject_all(self, error: Error) {
        for tx in self.senders {
            let _ = tx.send(Err(error.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jbatch_core::Id;

    fn pending(id: i64) -> (PendingRequest, oneshot::Receiver<Result<serde_json::Value>>) {
        PendingRequest::new(JsonRpcRequest::positional(
            "eth_blockNumber",
            vec![],
            Id::Number(id),
        ))
    }

    #[test]
    fn test_push_reports_length() {
        let mut queue = PendingQueue::new();
        assert!(queue.is_empty());

        assert_eq!(queue.push(pending(1).0), 1);
        assert_eq!(queue.push(pending(2).0), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_drain_preserves_order_and_empties_queue() {
        let mut queue = PendingQueue::new();
        for id in 1..=4 {
            queue.push(pending(id).0);
        }

        let batch = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(batch.len(), 4);

        let ids: Vec<Id> = batch.requests().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![Id::Number(1), Id::Number(2), Id::Number(3), Id::Number(4)]);

        // The next drain starts from scratch
        queue.push(pending(5).0);
        let next = queue.drain();
        assert_eq!(next.requests()[0].id, Id::Number(5));
    }

    #[test]
    fn test_drain_empty_queue() {
        let mut queue = PendingQueue::new();
        let batch = queue.drain();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_reject_all_settles_every_request() {
        let mut queue = PendingQueue::new();
        let mut receivers = Vec::new();
        for id in 1..=3 {
            let (p, rx) = pending(id);
            queue.push(p);
            receivers.push(rx);
        }

        queue.drain().reject_all(Error::HttpStatus(502));

        for rx in receivers {
            match rx.await.unwrap() {
                Err(Error::HttpStatus(502)) => {}
                other => panic!("Expected HttpStatus(502), got {:?}", other),
            }
        }
    }

    #[test]
    fn test_reject_all_tolerates_dropped_callers() {
        let mut queue = PendingQueue::new();
        let (p, rx) = pending(1);
        queue.push(p);
        drop(rx);

        // Must not panic
        queue.drain().reject_all(Error::Http("reset".to_string()));
    }
}
