//! Transport for batched JSON-RPC calls
//!
//! A [`Transport`] moves one batch (a JSON array of requests) to the node and
//! returns the parsed response body. It does not look inside the body; the
//! dispatcher owns positional demultiplexing.
//!
//! [`HttpTransport`] is the default: one HTTP POST per batch via `reqwest`.
//! Other transports (tests, proxies, alternative stacks) plug in through
//! `ClientBuilder::with_transport`.

use crate::config::ConnectionInfo;
use async_trait::async_trait;
use jbatch_core::{codec, Error, JsonRpcRequest, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

/// Carries a batch to the node and returns the response body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `requests` as one JSON array and return the decoded body
    ///
    /// Any error returned here is reported to every request of the batch.
    async fn send_batch(&self, requests: &[JsonRpcRequest]) -> Result<serde_json::Value>;

    /// Endpoint this transport talks to
    fn url(&self) -> &str;
}

/// HTTP POST transport built on `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    url: reqwest::Url,
    basic_auth: Option<(String, Option<String>)>,
}

impl HttpTransport {
    /// Build a transport from connection options
    ///
    /// Fails with `Error::InvalidConfig` if the URL or a header is malformed.
    pub fn new(info: &ConnectionInfo) -> Result<Self> {
        let url = reqwest::Url::parse(&info.url)
            .map_err(|e| Error::InvalidConfig(format!("invalid url {:?}: {}", info.url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &info.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidConfig(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidConfig(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::ClientBuilder::new()
            .gzip(info.allow_gzip)
            .default_headers(headers);
        if let Some(timeout) = info.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url,
            basic_auth: info.basic_auth.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_batch(&self, requests: &[JsonRpcRequest]) -> Result<serde_json::Value> {
        let body = codec::encode_batch(requests)?;

        let mut request = self.http_client.post(self.url.clone()).body(body);
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, password.as_ref());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(|e| Error::Http(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn url(&self) -> &str {
        self.url.as_str()
    }
}
