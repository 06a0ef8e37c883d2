//! OpenTelemetry observability configuration and initialization
//!
//! A batching client is hard to debug from the outside: a slow call might be
//! waiting on the flush timer, riding in an oversized batch, or stuck behind a
//! slow node. This module wires `tracing` spans and events, plus the client's
//! OpenTelemetry metrics, into an OTLP collector so those cases can be told
//! apart.
//!
//! # Usage Pattern
//!
//! Initialize once at application startup, before building clients:
//!
//! ```rust,no_run
//! use jbatch_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("indexer")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("jbatch_client=debug,info");
//!
//!     jbatch_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... build clients, send requests ...
//!
//!     jbatch_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint
//! - `RUST_LOG`: Log filter directives (takes precedence over `log_level`)

use opentelemetry::{global, KeyValue};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Observability configuration for OpenTelemetry
///
/// # Defaults
///
/// - Service name: "jbatch"
/// - Service version: Current crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT` or "http://localhost:4317"
/// - Traces and metrics exported, local JSON logs enabled
/// - Log level: `$RUST_LOG` or "info"
/// - Metric export interval: 30 seconds
///
/// # Examples
///
/// ```rust
/// use jbatch_core::ObservabilityConfig;
/// use std::time::Duration;
///
/// let config = ObservabilityConfig::new("price-feed")
///     .with_endpoint("http://collector:4317")
///     .with_metrics_interval(Duration::from_secs(10))
///     .with_traces(false);
/// assert!(!config.enable_traces);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to every span, metric and log record
    pub service_name: String,
    /// Service version attached as a resource attribute
    pub service_version: String,
    /// gRPC endpoint of the OTLP collector
    pub otlp_endpoint: String,
    /// Export spans to the collector
    pub enable_traces: bool,
    /// Export metrics to the collector
    pub enable_metrics: bool,
    /// Emit structured JSON logs on stdout
    pub enable_logs: bool,
    /// Log filter directives, used when `RUST_LOG` is unset
    pub log_level: String,
    /// How often aggregated metrics are pushed
    pub metrics_interval: Duration,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "jbatch".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_interval: Duration::from_secs(30),
        }
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint (e.g. "http://collector:4317")
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log filter directives
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable local JSON logs
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    /// Set the metric export interval
    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Initialize OpenTelemetry with the given configuration
///
/// Sets up, in order:
///
/// 1. **Tracer provider** (if traces enabled): OTLP/gRPC batch span exporter
/// 2. **Meter provider** (if metrics enabled): periodic OTLP/gRPC reader,
///    registered globally so `ClientMetrics` can find it
/// 3. **Tracing subscriber**: `EnvFilter`, the OpenTelemetry layer and the
///    JSON fmt layer, depending on what is enabled
///
/// Call this **once**. A second call fails because the global subscriber is
/// already set.
pub fn init_observability(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "OpenTelemetry initialized"
    );

    Ok(())
}

/// Build the tracer provider, register it globally, and return a tracer for
/// the tracing-opentelemetry layer
fn init_tracer(
    config: &ObservabilityConfig,
) -> Result<opentelemetry_sdk::trace::Tracer, Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The tracer must be taken before the provider moves into the global slot
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

fn init_metrics(
    config: &ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(config.metrics_interval)
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });

    // Option<Layer> is itself a layer, so disabled pillars simply drop out
    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Gracefully shutdown OpenTelemetry providers
///
/// With the 0.30 SDK the providers flush on drop, so this only marks the end
/// of the telemetry lifecycle in the logs. It is safe to call repeatedly.
pub fn shutdown_observability() {
    tracing::info!("Shutting down OpenTelemetry");
    tracing::info!("OpenTelemetry shutdown complete");
}
