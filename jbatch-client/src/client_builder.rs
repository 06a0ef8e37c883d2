//! Client builder for batching limits, transport and observability
//!
//! The `ClientBuilder` provides a fluent API for configuring client behavior
//! before it is built. It allows you to:
//! - Tune `time_limit` and `size_limit`
//! - Add HTTP headers, basic auth and a request timeout
//! - Fix the network up front instead of detecting it
//! - Swap in a custom transport or attach a debug observer
//! - Configure observability (OpenTelemetry)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jbatch_client::{ClientBuilder, Network};
//! use std::time::Duration;
//!
//! # fn example() -> jbatch_core::Result<()> {
//! // Small, fast batches
//! let client = ClientBuilder::new("http://localhost:8545")
//!     .time_limit(Duration::from_millis(10))
//!     .size_limit(50)
//!     .build()?;
//!
//! // Authenticated endpoint with observability
//! let client2 = ClientBuilder::new("https://rpc.example.org")
//!     .header("x-api-key", "secret")
//!     .network(Network::from_chain_id(1))
//!     .with_default_observability()
//!     .service_name("my-client")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::config::{BatchConfig, ConnectionInfo, Network};
use crate::dispatch::Dispatcher;
use crate::observer::BatchObserver;
use crate::transport::{HttpTransport, Transport};
use crate::BatchClient;
use jbatch_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and creating a BatchClient
pub struct ClientBuilder {
    connection: ConnectionInfo,
    config: BatchConfig,
    network: Option<Network>,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn BatchObserver>>,
    observability_config: Option<jbatch_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new(connection: impl Into<ConnectionInfo>) -> Self {
        Self {
            connection: connection.into(),
            config: BatchConfig::default(),
            network: None,
            transport: None,
            observer: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Longest time a request waits before its batch is flushed
    pub fn time_limit(mut self, time_limit: Duration) -> Self {
        self.config.time_limit = time_limit;
        self
    }

    /// Number of queued requests that triggers an immediate flush
    pub fn size_limit(mut self, size_limit: usize) -> Self {
        self.config.size_limit = size_limit;
        self
    }

    /// Replace both batching limits at once
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this network instead of detecting it via `eth_chainId`
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Add a header to every batch request
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection = self.connection.with_header(name, value);
        self
    }

    /// Fail batch requests that take longer than `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connection = self.connection.with_timeout(timeout);
        self
    }

    /// Authenticate with HTTP basic auth
    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.connection = self.connection.with_basic_auth(user, password);
        self
    }

    /// Send batches through a custom transport instead of HTTP
    ///
    /// Connection options (headers, auth, timeout) are ignored when a custom
    /// transport is set.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Observe every batch before and after it is sent
    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: jbatch_core::ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(jbatch_core::ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client
    ///
    /// No network I/O happens here; the first batch opens the first
    /// connection.
    pub fn build(self) -> Result<BatchClient> {
        self.config.validate()?;

        // Initialize observability if configured
        let metrics = if let Some(mut config) = self.observability_config {
            // Override service name if provided
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jbatch_core::init_observability(config.clone()).map_err(|e| {
                Error::Internal(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(crate::ClientMetrics::new(&config.service_name)))
        } else {
            None
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.connection)?),
        };

        tracing::info!(
            url = %transport.url(),
            time_limit_ms = self.config.time_limit.as_millis() as u64,
            size_limit = self.config.size_limit,
            "Batch client ready"
        );

        let dispatcher = Dispatcher::new(transport, self.observer, metrics);
        Ok(BatchClient::from_parts(self.config, dispatcher, self.network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SIZE_LIMIT, DEFAULT_TIME_LIMIT};
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("http://localhost:8545");

        assert_eq!(builder.connection.url, "http://localhost:8545");
        assert_eq!(builder.config.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(builder.config.size_limit, DEFAULT_SIZE_LIMIT);
        assert!(builder.network.is_none());
        assert!(builder.transport.is_none());
        assert!(builder.observer.is_none());
        assert!(builder.observability_config.is_none());
        assert!(builder.service_name.is_none());
    }

    #[test]
    fn test_builder_limits() {
        let builder = ClientBuilder::new("http://localhost:8545")
            .time_limit(Duration::from_millis(5))
            .size_limit(7);

        assert_eq!(builder.config, BatchConfig::new(Duration::from_millis(5), 7));

        let replaced = builder.with_config(BatchConfig::default());
        assert_eq!(replaced.config, BatchConfig::default());
    }

    #[test]
    fn test_builder_connection_options() {
        let builder = ClientBuilder::new("https://rpc.example.org")
            .header("x-api-key", "abc")
            .timeout(Duration::from_secs(3))
            .basic_auth("user", None);

        assert_eq!(builder.connection.headers, vec![("x-api-key".to_string(), "abc".to_string())]);
        assert_eq!(builder.connection.timeout, Some(Duration::from_secs(3)));
        assert_eq!(builder.connection.basic_auth, Some(("user".to_string(), None)));
    }

    #[test]
    fn test_builder_observability_config() {
        let config = jbatch_core::ObservabilityConfig::new("test-client")
            .with_endpoint("http://localhost:4317")
            .with_log_level("debug");

        let builder = ClientBuilder::new("http://localhost:8545").with_observability(config);

        let obs_config = builder.observability_config.unwrap();
        assert_eq!(obs_config.service_name, "test-client");
        assert_eq!(obs_config.log_level, "debug");
    }

    #[test]
    fn test_builder_default_observability() {
        let builder = ClientBuilder::new("http://localhost:8545").with_default_observability();

        let obs_config = builder.observability_config.unwrap();
        assert_eq!(obs_config.service_name, "jbatch");
    }

    #[test]
    fn test_builder_service_name() {
        let builder = ClientBuilder::new("http://localhost:8545").service_name("my-service");

        assert_eq!(builder.service_name, Some("my-service".to_string()));
    }

    #[test]
    fn test_build_rejects_invalid_limits() {
        let result = ClientBuilder::new("http://localhost:8545").size_limit(0).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result = ClientBuilder::new("http://localhost:8545")
            .time_limit(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_build_rejects_invalid_url() {
        let result = ClientBuilder::new("localhost without scheme").build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_build_with_custom_transport() {
        let client = ClientBuilder::new("ignored")
            .with_transport(Arc::new(MockTransport::echo()))
            .size_limit(10)
            .build()
            .unwrap();

        assert_eq!(client.url(), "mock://");
        assert_eq!(client.config().size_limit, 10);
    }

    #[test]
    fn test_build_http_client() {
        let client = ClientBuilder::new("http://127.0.0.1:8545").build().unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:8545/");
        assert_eq!(client.pending_count(), 0);
    }
}
