//! Client configuration: batching limits, endpoint and network
//!
//! - [`BatchConfig`]: how long a request may wait and how many requests a
//!   batch may hold. Serde-friendly so it can live in an application's config
//!   file next to the endpoint URL.
//! - [`ConnectionInfo`]: where batches are POSTed and with which headers.
//! - [`Network`]: the chain the endpoint serves, fixed at build time or
//!   detected once via `eth_chainId`.

use jbatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default flush delay for a partially filled batch
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_millis(50);

/// Default maximum number of requests per batch
pub const DEFAULT_SIZE_LIMIT: usize = 250;

/// Batching limits
///
/// A queued request is flushed when either limit is reached first:
/// `size_limit` requests are waiting, or `time_limit` has elapsed since the
/// first request of the batch was queued.
///
/// # Examples
///
/// ```rust
/// use jbatch_client::BatchConfig;
/// use std::time::Duration;
///
/// let config: BatchConfig = serde_json::from_str(r#"{"time_limit_ms": 10, "size_limit": 100}"#).unwrap();
/// assert_eq!(config.time_limit, Duration::from_millis(10));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Longest time a request waits before its batch is flushed
    #[serde(rename = "time_limit_ms", with = "millis", default = "default_time_limit")]
    pub time_limit: Duration,
    /// Number of queued requests that triggers an immediate flush
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,
}

fn default_time_limit() -> Duration {
    DEFAULT_TIME_LIMIT
}

fn default_size_limit() -> usize {
    DEFAULT_SIZE_LIMIT
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl BatchConfig {
    /// Create a config from explicit limits
    pub fn new(time_limit: Duration, size_limit: usize) -> Self {
        Self {
            time_limit,
            size_limit,
        }
    }

    /// Reject limits that would stall or never batch
    pub fn validate(&self) -> Result<()> {
        if self.time_limit.is_zero() {
            return Err(Error::InvalidConfig(
                "time_limit must be greater than zero".to_string(),
            ));
        }
        if self.size_limit == 0 {
            return Err(Error::InvalidConfig(
                "size_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Endpoint and HTTP options for the default transport
///
/// Anything that converts into a URL string converts into a
/// `ConnectionInfo` with default options.
///
/// ```rust
/// use jbatch_client::ConnectionInfo;
/// use std::time::Duration;
///
/// let info = ConnectionInfo::new("https://rpc.example.org")
///     .with_header("x-api-key", "secret")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(info.headers.len(), 1);
///
/// let plain: ConnectionInfo = "http://localhost:8545".into();
/// assert!(plain.allow_gzip);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// JSON-RPC endpoint URL
    pub url: String,
    /// Extra headers sent with every batch
    pub headers: Vec<(String, String)>,
    /// Per-call HTTP timeout (none by default)
    pub timeout: Option<Duration>,
    /// Username and optional password for HTTP basic auth
    pub basic_auth: Option<(String, Option<String>)>,
    /// Accept gzip-compressed responses
    pub allow_gzip: bool,
}

impl ConnectionInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
            basic_auth: None,
            allow_gzip: true,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some((user.into(), password));
        self
    }

    pub fn with_gzip(mut self, allow: bool) -> Self {
        self.allow_gzip = allow;
        self
    }
}

impl From<&str> for ConnectionInfo {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for ConnectionInfo {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&String> for ConnectionInfo {
    fn from(url: &String) -> Self {
        Self::new(url.clone())
    }
}

/// The chain served by an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    /// Human-readable chain name ("unknown" when not recognized)
    pub name: String,
    /// EIP-155 chain id
    pub chain_id: u64,
}

impl Network {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
        }
    }

    /// Build a network from a chain id, naming well-known chains
    ///
    /// ```rust
    /// use jbatch_client::Network;
    ///
    /// assert_eq!(Network::from_chain_id(1).name, "homestead");
    /// assert_eq!(Network::from_chain_id(999_999).name, "unknown");
    /// ```
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = match chain_id {
            1 => "homestead",
            5 => "goerli",
            10 => "optimism",
            56 => "bnb",
            100 => "gnosis",
            137 => "matic",
            250 => "fantom",
            8453 => "base",
            42161 => "arbitrum",
            43114 => "avalanche",
            80001 => "maticmum",
            11155111 => "sepolia",
            _ => "unknown",
        };
        Self::new(name, chain_id)
    }
}

/// Parse an Ethereum JSON-RPC quantity ("0x1a") into a `u64`
pub(crate) fn parse_quantity(value: &serde_json::Value) -> Result<u64> {
    let text = value.as_str().ok_or_else(|| {
        Error::InvalidResponse(format!("expected a hex quantity, got {}", value))
    })?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| Error::InvalidResponse(format!("quantity {:?} lacks 0x prefix", text)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidResponse(format!("invalid quantity {:?}: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_not_swapped() {
        let config = BatchConfig::default();
        assert_eq!(config.time_limit, Duration::from_millis(50));
        assert_eq!(config.size_limit, 250);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let zero_time = BatchConfig::new(Duration::ZERO, 10);
        assert!(matches!(zero_time.validate(), Err(Error::InvalidConfig(_))));

        let zero_size = BatchConfig::new(Duration::from_millis(10), 0);
        assert!(matches!(zero_size.validate(), Err(Error::InvalidConfig(_))));

        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_serde_uses_milliseconds() {
        let config = BatchConfig::new(Duration::from_millis(75), 20);
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value, json!({"time_limit_ms": 75, "size_limit": 20}));

        let partial: BatchConfig = serde_json::from_str(r#"{"size_limit": 5}"#).unwrap();
        assert_eq!(partial.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(partial.size_limit, 5);
    }

    #[test]
    fn test_connection_info_builders() {
        let info = ConnectionInfo::new("https://node")
            .with_header("authorization", "Bearer abc")
            .with_basic_auth("user", Some("pw".to_string()))
            .with_gzip(false);

        assert_eq!(info.url, "https://node");
        assert_eq!(info.headers[0].0, "authorization");
        assert_eq!(info.basic_auth, Some(("user".to_string(), Some("pw".to_string()))));
        assert!(!info.allow_gzip);
        assert!(info.timeout.is_none());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("0x1")).unwrap(), 1);
        assert_eq!(parse_quantity(&json!("0xaa36a7")).unwrap(), 11155111);
        assert!(parse_quantity(&json!("12")).is_err());
        assert!(parse_quantity(&json!(12)).is_err());
        assert!(parse_quantity(&json!("0xzz")).is_err());
    }

    #[test]
    fn test_known_networks() {
        assert_eq!(Network::from_chain_id(137), Network::new("matic", 137));
        assert_eq!(Network::from_chain_id(8453).name, "base");
    }
}
