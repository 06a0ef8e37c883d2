//! Client metrics definitions
//!
//! This module defines OpenTelemetry metrics for monitoring batching
//! behavior. Metrics are exported to the configured observability backend.
//!
//! # Metrics Collected
//!
//! - **requests_total**: Requests settled, by method and status (counter)
//! - **batches_total**: Batches flushed, by trigger (counter)
//! - **batch_size**: Requests per flushed batch (histogram)
//! - **batch_duration**: Network round trip per batch in seconds (histogram)
//! - **errors_total**: Errors encountered, by error type (counter)
//!
//! # Usage
//!
//! Metrics are automatically recorded when observability is enabled via
//! `ClientBuilder::with_observability()`.
//!
//! ```rust,no_run
//! use jbatch_client::ClientMetrics;
//!
//! let metrics = ClientMetrics::new("my-client");
//! metrics.record_batch(12, "time");
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// What caused a batch to be flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// The queue reached `size_limit`
    Size,
    /// `time_limit` elapsed since the first queued request
    Time,
    /// `BatchClient::flush` was called
    Manual,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Size => "size",
            FlushTrigger::Time => "time",
            FlushTrigger::Manual => "manual",
        }
    }
}

impl std::fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of requests settled
    pub requests_total: Counter<u64>,
    /// Total number of batches flushed
    pub batches_total: Counter<u64>,
    /// Batch size distribution
    pub batch_size: Histogram<u64>,
    /// Batch round trip in seconds
    pub batch_duration: Histogram<f64>,
    /// Total number of errors
    pub errors_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create a new ClientMetrics instance
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ClientMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("jbatch.client.requests.total")
                .with_description("Total number of requests settled")
                .build(),
            batches_total: meter
                .u64_counter("jbatch.client.batches.total")
                .with_description("Total number of batches flushed")
                .build(),
            batch_size: meter
                .u64_histogram("jbatch.client.batch.size")
                .with_description("Number of requests in each flushed batch")
                .build(),
            batch_duration: meter
                .f64_histogram("jbatch.client.batch.duration")
                .with_description("Batch round trip in seconds")
                .build(),
            errors_total: meter
                .u64_counter("jbatch.client.errors.total")
                .with_description("Total number of errors encountered")
                .build(),
        }
    }

    /// Record a flushed batch
    pub fn record_batch(&self, size: u64, trigger: &str) {
        let attributes = &[KeyValue::new("trigger", trigger.to_string())];
        self.batches_total.add(1, attributes);
        self.batch_size.record(size, attributes);
    }

    /// Record one settled request
    pub fn record_request(&self, method: &str, status: &str) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
    }

    /// Record how long a batch's network call took
    pub fn record_batch_duration(&self, duration_secs: f64, status: &str) {
        let attributes = &[KeyValue::new("status", status.to_string())];
        self.batch_duration.record(duration_secs, attributes);
    }

    /// Record an error
    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }
}
