//! Batch dispatcher
//!
//! Sends one drained [`Batch`] as a single transport call and settles every
//! request in it exactly once.
//!
//! # Positional Matching
//!
//! Response element `i` belongs to request `i`. Ids in the response are not
//! used for matching; a non-null id that disagrees with the request is only
//! logged.
//!
//! | response element `i`        | caller `i` receives            |
//! |-----------------------------|--------------------------------|
//! | object with `error`         | `Err(Error::JsonRpc(..))`      |
//! | object without `error`      | `Ok(result)` (`Null` if absent) |
//! | anything else               | `Err(Error::InvalidResponse)`  |
//! | absent (array too short)    | `Err(Error::MissingResponse)`  |
//!
//! If the transport call fails or the body is not an array, every request in
//! the batch receives a clone of that one error. Failed batches are not
//! retried.

use crate::metrics::{ClientMetrics, FlushTrigger};
use crate::observer::BatchObserver;
use crate::queue::Batch;
use crate::transport::Transport;
use jbatch_core::{codec, Error, Id, JsonRpcRequest, Result};
use std::sync::Arc;
use std::time::Instant;

/// Everything needed to put a batch on the wire
#[derive(Clone)]
pub(crate) struct Dispatcher {
    transport: Arc<dyn Transport>,
    observer: Option<Arc<dyn BatchObserver>>,
    metrics: Option<Arc<ClientMetrics>>,
}

impl Dispatcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        observer: Option<Arc<dyn BatchObserver>>,
        metrics: Option<Arc<ClientMetrics>>,
    ) -> Self {
        Self {
            transport,
            observer,
            metrics,
        }
    }

    pub(crate) fn url(&self) -> &str {
        self.transport.url()
    }

    /// Send `batch` and settle all of its requests
    pub(crate) async fn dispatch(&self, batch: Batch, trigger: FlushTrigger) {
        if batch.is_empty() {
            return;
        }

        let size = batch.len();
        if let Some(ref m) = self.metrics {
            m.record_batch(size as u64, trigger.as_str());
        }
        if let Some(ref observer) = self.observer {
            observer.on_batch_sent(batch.requests());
        }

        tracing::debug!(size, trigger = %trigger, "Dispatching batch");
        let start = Instant::now();
        let outcome = self.transport.send_batch(batch.requests()).await;
        let elapsed = start.elapsed().as_secs_f64();

        if let Some(ref observer) = self.observer {
            observer.on_batch_response(batch.requests(), &outcome);
        }

        let items = match outcome.and_then(codec::split_batch_response) {
            Ok(items) => items,
            Err(error) => {
                tracing::error!(size, error = %error, "Batch request failed");
                if let Some(ref m) = self.metrics {
                    m.record_batch_duration(elapsed, "error");
                    m.record_error(error.kind());
                    for request in batch.requests() {
                        m.record_request(&request.method, "error");
                    }
                }
                batch.reject_all(error);
                return;
            }
        };

        if let Some(ref m) = self.metrics {
            m.record_batch_duration(elapsed, "success");
        }
        if items.len() > size {
            tracing::warn!(
                expected = size,
                received = items.len(),
                "Ignoring surplus elements in batch response"
            );
        }

        let (requests, senders) = batch.into_parts();
        let mut items = items.into_iter();
        for (request, tx) in requests.into_iter().zip(senders) {
            let outcome = match items.next() {
                Some(item) => settle_item(&request, item),
                None => {
                    tracing::warn!(id = %request.id, method = %request.method, "No response element for request");
                    Err(Error::MissingResponse {
                        id: request.id.clone(),
                    })
                }
            };

            if let Some(ref m) = self.metrics {
                match &outcome {
                    Ok(_) => m.record_request(&request.method, "success"),
                    Err(e) => {
                        m.record_request(&request.method, "error");
                        m.record_error(e.kind());
                    }
                }
            }

            // The caller may have dropped its future
            let _ = tx.send(outcome);
        }
    }
}

/// Turn response element `item` into the outcome for `request`
fn settle_item(request: &JsonRpcRequest, item: serde_json::Value) -> Result<serde_json::Value> {
    let response = codec::decode_batch_item(item).map_err(|e| {
        tracing::warn!(id = %request.id, error = %e, "Malformed batch response element");
        e
    })?;

    if response.id != Id::Null && response.id != request.id {
        tracing::warn!(
            request_id = %request.id,
            response_id = %response.id,
            "Response id differs from request id at the same position"
        );
    }

    response.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{PendingQueue, PendingRequest};
    use crate::transport::mock::MockTransport;
    use jbatch_core::JsonRpcErrorData;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Receiver = oneshot::Receiver<Result<serde_json::Value>>;

    fn batch_of(methods: &[&str]) -> (Batch, Vec<Receiver>) {
        let mut queue = PendingQueue::new();
        let mut receivers = Vec::new();
        for (i, method) in methods.iter().enumerate() {
            let request = JsonRpcRequest::positional(*method, vec![], Id::Number(i as i64 + 1));
            let (pending, rx) = PendingRequest::new(request);
            queue.push(pending);
            receivers.push(rx);
        }
        (queue.drain(), receivers)
    }

    fn dispatcher(transport: Arc<MockTransport>) -> Dispatcher {
        Dispatcher::new(transport, None, None)
    }

    async fn outcomes(receivers: Vec<Receiver>) -> Vec<Result<serde_json::Value>> {
        let mut out = Vec::new();
        for rx in receivers {
            out.push(rx.await.expect("request was never settled"));
        }
        out
    }

    #[tokio::test]
    async fn test_results_follow_request_order() {
        let transport = Arc::new(MockTransport::echo());
        let (batch, receivers) = batch_of(&["a", "b", "c", "d"]);

        dispatcher(transport.clone())
            .dispatch(batch, FlushTrigger::Manual)
            .await;

        let results: Vec<serde_json::Value> = outcomes(receivers)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results, vec![json!("a#1"), json!("b#2"), json!("c#3"), json!("d#4")]);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_three_request_scenario() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([
                {"jsonrpc": "2.0", "id": 1, "result": "0x10"},
                {"jsonrpc": "2.0", "id": 2, "error": {"code": -32000, "message": "execution reverted"}},
                {"jsonrpc": "2.0", "id": 3, "result": "0x3b9aca00"}
            ]))
        }));
        let (batch, receivers) = batch_of(&["eth_blockNumber", "eth_call", "eth_gasPrice"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;
        let results = outcomes(receivers).await;

        assert_eq!(results[0].as_ref().unwrap(), &json!("0x10"));
        match &results[1] {
            Err(Error::JsonRpc(data)) => {
                assert_eq!(data.code, -32000);
                assert_eq!(data.message, "execution reverted");
            }
            other => panic!("Expected JsonRpc error, got {:?}", other),
        }
        assert_eq!(results[2].as_ref().unwrap(), &json!("0x3b9aca00"));
    }

    #[tokio::test]
    async fn test_error_data_is_preserved() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([{"id": 1, "error": {"code": 3, "message": "execution reverted", "data": "0x08c379a0"}}]))
        }));
        let (batch, receivers) = batch_of(&["eth_call"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Size).await;

        match outcomes(receivers).await.remove(0) {
            Err(Error::JsonRpc(data)) => assert_eq!(
                data,
                JsonRpcErrorData::with_data(3, "execution reverted", json!("0x08c379a0"))
            ),
            other => panic!("Expected JsonRpc error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_rejects_whole_batch() {
        let transport = Arc::new(MockTransport::new(|_| Err(Error::HttpStatus(503))));
        let (batch, receivers) = batch_of(&["a", "b", "c"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;

        for outcome in outcomes(receivers).await {
            assert!(matches!(outcome, Err(Error::HttpStatus(503))));
        }
    }

    #[tokio::test]
    async fn test_non_array_body_rejects_whole_batch() {
        let transport = Arc::new(MockTransport::new(|_| Ok(json!({"jsonrpc": "2.0", "result": "0x1"}))));
        let (batch, receivers) = batch_of(&["a", "b"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;

        for outcome in outcomes(receivers).await {
            assert!(matches!(outcome, Err(Error::InvalidResponse(_))));
        }
    }

    #[tokio::test]
    async fn test_batch_wide_error_object() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32005, "message": "limit exceeded"}}))
        }));
        let (batch, receivers) = batch_of(&["a", "b"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;

        for outcome in outcomes(receivers).await {
            assert_eq!(outcome.unwrap_err().rpc_code(), Some(-32005));
        }
    }

    #[tokio::test]
    async fn test_short_response_leaves_missing_requests() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([{"id": 1, "result": "first"}, {"id": 2, "result": "second"}]))
        }));
        let (batch, receivers) = batch_of(&["a", "b", "c"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;
        let results = outcomes(receivers).await;

        assert_eq!(results[0].as_ref().unwrap(), &json!("first"));
        assert_eq!(results[1].as_ref().unwrap(), &json!("second"));
        match &results[2] {
            Err(Error::MissingResponse { id }) => assert_eq!(id, &Id::Number(3)),
            other => panic!("Expected MissingResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_surplus_elements_are_ignored() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([{"id": 1, "result": 1}, {"id": 2, "result": 2}]))
        }));
        let (batch, receivers) = batch_of(&["only"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;

        assert_eq!(outcomes(receivers).await[0].as_ref().unwrap(), &json!(1));
    }

    #[tokio::test]
    async fn test_malformed_element_only_affects_its_request() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([{"id": 1, "result": "ok"}, "garbage", {"id": 3}]))
        }));
        let (batch, receivers) = batch_of(&["a", "b", "c"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;
        let results = outcomes(receivers).await;

        assert_eq!(results[0].as_ref().unwrap(), &json!("ok"));
        assert!(matches!(results[1], Err(Error::InvalidResponse(_))));
        // No result and no error resolves to null
        assert_eq!(results[2].as_ref().unwrap(), &serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_matching_ignores_response_ids() {
        let transport = Arc::new(MockTransport::new(|_| {
            Ok(json!([{"id": 99, "result": "x"}, {"id": 98, "result": "y"}]))
        }));
        let (batch, receivers) = batch_of(&["a", "b"]);

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;
        let results = outcomes(receivers).await;

        assert_eq!(results[0].as_ref().unwrap(), &json!("x"));
        assert_eq!(results[1].as_ref().unwrap(), &json!("y"));
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_block_siblings() {
        let transport = Arc::new(MockTransport::echo());
        let (batch, mut receivers) = batch_of(&["a", "b"]);
        drop(receivers.remove(0));

        dispatcher(transport).dispatch(batch, FlushTrigger::Time).await;

        assert_eq!(outcomes(receivers).await[0].as_ref().unwrap(), &json!("b#2"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_sent() {
        let transport = Arc::new(MockTransport::echo());
        let (batch, _) = batch_of(&[]);

        dispatcher(transport.clone())
            .dispatch(batch, FlushTrigger::Manual)
            .await;

        assert_eq!(transport.call_count(), 0);
    }

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<usize>>,
        answered: Mutex<Vec<bool>>,
    }

    impl BatchObserver for Recorder {
        fn on_batch_sent(&self, requests: &[JsonRpcRequest]) {
            self.sent.lock().unwrap().push(requests.len());
        }

        fn on_batch_response(&self, _requests: &[JsonRpcRequest], response: &Result<serde_json::Value>) {
            self.answered.lock().unwrap().push(response.is_ok());
        }
    }

    #[tokio::test]
    async fn test_observer_sees_request_and_response() {
        let recorder = Arc::new(Recorder::default());
        let transport = Arc::new(MockTransport::echo());
        let dispatcher = Dispatcher::new(
            transport,
            Some(recorder.clone()),
            Some(Arc::new(ClientMetrics::new("dispatch-test"))),
        );

        let (batch, receivers) = batch_of(&["a", "b", "c"]);
        dispatcher.dispatch(batch, FlushTrigger::Size).await;
        outcomes(receivers).await;

        assert_eq!(*recorder.sent.lock().unwrap(), vec![3]);
        assert_eq!(*recorder.answered.lock().unwrap(), vec![true]);
    }
}
