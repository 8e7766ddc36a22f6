//! GET client for the Frankfurter API with bounded retries.

use super::retry::{RetryPolicy, with_retry};
use super::transport::{ReqwestTransport, Transport};
use crate::core::error::{FxError, Result};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

pub const BASE_URL: &str = "https://api.frankfurter.app";

/// Sent as the `User-Agent` of every request.
pub const CLIENT_TAG: &str = concat!("fx-converter/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues GET requests relative to a base URL and decodes JSON bodies.
///
/// The transport (and with it the underlying connection pool) is created
/// once and reused for every call made through this client.
pub struct HttpClient<T = ReqwestTransport> {
    base_url: String,
    transport: T,
    policy: RetryPolicy,
    timeout: Duration,
}

impl HttpClient<ReqwestTransport> {
    /// Client for the public Frankfurter endpoint.
    pub fn frankfurter() -> Result<Self> {
        Self::new(BASE_URL)
    }

    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_connect_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Like [`HttpClient::new`], with its own bound on establishing a
    /// connection. Running out of it counts against the `connect` budget.
    pub fn new_with_connect_timeout(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        if connect_timeout.is_zero() {
            return Err(FxError::invalid("connect timeout must be positive"));
        }
        let transport =
            ReqwestTransport::new(CLIENT_TAG, connect_timeout).map_err(|e| FxError::Network {
                path: base_url.to_string(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_transport(base_url, transport))
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Default per-attempt timeout, used when [`HttpClient::get`] gets `None`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(FxError::invalid("timeout must be positive"));
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query.iter().map(|(k, v)| (*k, v.as_str())))
        };
        url.map_err(|e| FxError::invalid(format!("invalid URL {raw}: {e}")))
    }

    /// GETs `path` with `query` and returns the decoded JSON body.
    ///
    /// `timeout` applies to each attempt and must be positive.
    #[instrument(name = "FxGet", skip(self, query), fields(path = %path))]
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let timeout = timeout.unwrap_or(self.timeout);
        if timeout.is_zero() {
            return Err(FxError::invalid("timeout must be positive"));
        }
        let url = self.url(path, query)?;

        let response = with_retry(&self.policy, || self.transport.get(&url, timeout))
            .await
            .map_err(|e| FxError::Network {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        if !response.is_success() {
            debug!(status = response.status, "Request failed after retries");
            return Err(FxError::HttpStatus {
                status: response.status,
                path: path.to_string(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| FxError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
