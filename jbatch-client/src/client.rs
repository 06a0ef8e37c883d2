//! Batching JSON-RPC client
//!
//! This module provides the main `BatchClient` type. Callers issue ordinary
//! one-at-a-time calls; the client coalesces calls made within a short window
//! into one HTTP POST carrying a JSON-RPC batch array and hands each caller
//! its own result.
//!
//! # Batching Rules
//!
//! 1. **Enqueue**: `send` assigns the next id and appends the request to the
//!    live queue before returning its future
//! 2. **Size flush**: the request that brings the queue to `size_limit`
//!    flushes it immediately
//! 3. **Time flush**: the first request queued after a flush arms a timer;
//!    when it fires, whatever is queued is flushed
//! 4. **Dispatch**: each flushed batch goes out on its own task, so a slow
//!    node never delays the next batch
//!
//! A flush always drains the entire queue and cancels the armed timer, so a
//! size flush never leaves a redundant timer flush behind. Requests queued
//! after a flush start a fresh batch.
//!
//! # Cloning
//!
//! `BatchClient` is cheaply cloneable using `Arc` internally. All clones
//! share the same queue, timer and id counter. Two clients built separately
//! share nothing.
//!
//! # Thread Safety
//!
//! The queue lives behind a short synchronous lock that is never held across
//! an await point, so `send` can be called from any task without blocking
//! the runtime.

use crate::client_builder::ClientBuilder;
use crate::config::{parse_quantity, BatchConfig, ConnectionInfo, Network};
use crate::dispatch::Dispatcher;
use crate::metrics::FlushTrigger;
use crate::queue::{Batch, PendingQueue, PendingRequest};
use crate::timer::FlushTimer;
use futures::future::{self, BoxFuture, FutureExt};
use jbatch_core::{Error, Id, JsonRpcRequest, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{oneshot, OnceCell};

/// Id counter, queue and timer, always mutated together
///
/// The counter lives under the same lock as the queue so ids increase with
/// queue position.
struct BatchState {
    next_id: u64,
    queue: PendingQueue,
    timer: FlushTimer,
}

struct Shared {
    config: BatchConfig,
    state: Mutex<BatchState>,
    dispatcher: Dispatcher,
    network: OnceCell<Network>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, BatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assign the next id, queue the request and flush or arm the timer
    fn enqueue(
        self: &Arc<Self>,
        handle: &Handle,
        method: String,
        params: Vec<serde_json::Value>,
    ) -> oneshot::Receiver<Result<serde_json::Value>> {
        let mut state = self.lock_state();
        let id = state.next_id;
        state.next_id += 1;
        tracing::debug!(id, method = %method, "Queueing request");

        let request = JsonRpcRequest::positional(method, params, Id::Number(id as i64));
        let (pending, rx) = PendingRequest::new(request);
        let len = state.queue.push(pending);

        if len >= self.config.size_limit {
            state.timer.cancel();
            let batch = state.queue.drain();
            drop(state);
            tracing::debug!(size = batch.len(), "Size limit reached, flushing");
            self.spawn_dispatch(handle, batch, FlushTrigger::Size);
            return rx;
        }

        if !state.timer.is_armed() {
            let epoch = state.timer.epoch();
            let delay = self.config.time_limit;
            let shared = Arc::clone(self);
            // The task cannot observe the timer before `arm` below because it
            // needs the lock we still hold.
            let task = handle.spawn(async move {
                tokio::time::sleep(delay).await;
                shared.flush_expired(epoch).await;
            });
            state.timer.arm(task.abort_handle());
        }
        rx
    }

    /// Timer callback; a stale epoch means another flush already ran
    async fn flush_expired(&self, epoch: u64) {
        let batch = {
            let mut state = self.lock_state();
            if !state.timer.is_current(epoch) {
                return;
            }
            state.timer.expire();
            state.queue.drain()
        };
        tracing::debug!(size = batch.len(), "Time limit reached, flushing");
        self.dispatcher.dispatch(batch, FlushTrigger::Time).await;
    }

    fn spawn_dispatch(&self, handle: &Handle, batch: Batch, trigger: FlushTrigger) {
        let dispatcher = self.dispatcher.clone();
        handle.spawn(async move {
            dispatcher.dispatch(batch, trigger).await;
        });
    }
}

/// Batching JSON-RPC client over HTTP
#[derive(Clone)]
pub struct BatchClient {
    shared: Arc<Shared>,
}

impl BatchClient {
    /// Create a client with default batching limits
    ///
    /// Shorthand for `ClientBuilder::new(connection).build()`.
    pub fn new(connection: impl Into<ConnectionInfo>) -> Result<Self> {
        ClientBuilder::new(connection).build()
    }

    /// Start configuring a client
    pub fn builder(connection: impl Into<ConnectionInfo>) -> ClientBuilder {
        ClientBuilder::new(connection)
    }

    pub(crate) fn from_parts(
        config: BatchConfig,
        dispatcher: Dispatcher,
        network: Option<Network>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(BatchState {
                    next_id: 1,
                    queue: PendingQueue::new(),
                    timer: FlushTimer::new(),
                }),
                dispatcher,
                network: OnceCell::new_with(network),
            }),
        }
    }

    /// Queue a call and return a future for its result
    ///
    /// The request is queued before this method returns, so calls made back
    /// to back land in the same batch even if their futures are polled
    /// later. Dropping the future does not remove the request from its
    /// batch; the result is discarded.
    ///
    /// Must be called within a Tokio runtime. Outside one, or for an empty
    /// method name, the returned future fails without queueing anything.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use jbatch_client::BatchClient;
    /// use serde_json::json;
    ///
    /// # async fn example() -> jbatch_core::Result<()> {
    /// let client = BatchClient::new("http://localhost:8545")?;
    ///
    /// // Both calls travel in one HTTP request
    /// let block = client.send("eth_blockNumber", vec![]);
    /// let balance = client.send("eth_getBalance", vec![json!("0xabc"), json!("latest")]);
    /// let (block, balance) = futures::join!(block, balance);
    /// # let _ = (block?, balance?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn send(
        &self,
        method: impl Into<String>,
        params: Vec<serde_json::Value>,
    ) -> BoxFuture<'static, Result<serde_json::Value>> {
        let method = method.into();
        if method.is_empty() {
            return future::ready(Err(Error::InvalidRequest(
                "method name must not be empty".to_string(),
            )))
            .boxed();
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                return future::ready(Err(Error::Internal(format!(
                    "no Tokio runtime available: {}",
                    e
                ))))
                .boxed()
            }
        };

        let rx = self.shared.enqueue(&handle, method, params);

        async move {
            rx.await.unwrap_or_else(|_| {
                Err(Error::Internal(
                    "batch dropped before settling request".to_string(),
                ))
            })
        }
        .boxed()
    }

    /// Send a call with serializable params and deserialize its result
    ///
    /// `params` must serialize to a JSON array; `()` and `None` send `[]`.
    /// The request is queued when the returned future is first polled.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use jbatch_client::BatchClient;
    ///
    /// # async fn example() -> jbatch_core::Result<()> {
    /// let client = BatchClient::new("http://localhost:8545")?;
    /// let balance: String = client.request("eth_getBalance", ("0xabc", "latest")).await?;
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip(self, params), fields(method = %method.as_ref()))]
    pub async fn request<P, R>(&self, method: impl Into<String> + AsRef<str>, params: P) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let params = match serde_json::to_value(params)
            .map_err(|e| Error::Serialization(e.to_string()))?
        {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => Vec::new(),
            other => {
                return Err(Error::InvalidParams(format!(
                    "params must be a JSON array, got {}",
                    other
                )))
            }
        };

        let result = self.send(method, params).await?;
        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Flush whatever is queued right now
    ///
    /// Cancels the armed timer. Does nothing if the queue is empty.
    pub fn flush(&self) {
        let batch = {
            let mut state = self.shared.lock_state();
            state.timer.cancel();
            if state.queue.is_empty() {
                return;
            }
            state.queue.drain()
        };

        match Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(size = batch.len(), "Manual flush");
                self.shared
                    .spawn_dispatch(&handle, batch, FlushTrigger::Manual);
            }
            Err(e) => batch.reject_all(Error::Internal(format!(
                "no Tokio runtime available: {}",
                e
            ))),
        }
    }

    /// Number of requests waiting for the next flush
    pub fn pending_count(&self) -> usize {
        self.shared.lock_state().queue.len()
    }

    /// The network this client talks to
    ///
    /// Returns the network given at build time. Otherwise `eth_chainId` is
    /// sent once (through the batcher) and the answer is cached for the
    /// lifetime of the client.
    pub async fn network(&self) -> Result<Network> {
        self.shared
            .network
            .get_or_try_init(|| async {
                let chain_id = self.send("eth_chainId", Vec::new()).await?;
                let network = Network::from_chain_id(parse_quantity(&chain_id)?);
                tracing::info!(name = %network.name, chain_id = network.chain_id, "Detected network");
                Ok::<_, Error>(network)
            })
            .await
            .cloned()
    }

    /// Batching limits in effect
    pub fn config(&self) -> &BatchConfig {
        &self.shared.config
    }

    /// Endpoint batches are sent to
    pub fn url(&self) -> &str {
        self.shared.dispatcher.url()
    }
}

impl std::fmt::Debug for BatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchClient")
            .field("url", &self.url())
            .field("config", &self.shared.config)
            .field("pending", &self.pending_count())
            .finish()
    }
}
