//! Single-attempt GET primitive. Retries live in [`super::retry`].

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// What came back from one attempt.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header, when it holds a number of seconds.
    pub retry_after: Option<Duration>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that happen before a full response is read.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection was made but the response could not be read in time.
    #[error("read failed: {0}")]
    Read(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<RawResponse, TransportError>;
}

/// Transport over one shared `reqwest::Client`; its connection pool is
/// reused by every request.
///
/// Connecting is bounded by the client's `connect_timeout`. The `timeout` of
/// an attempt starts once that budget is over, so a stalled connect surfaces
/// as [`TransportError::Connect`] and a stalled response as
/// [`TransportError::Read`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            client,
            connect_timeout,
        })
    }

    /// Deadline for a whole attempt: the connect budget plus `timeout`.
    fn attempt_deadline(&self, timeout: Duration) -> Duration {
        self.connect_timeout.saturating_add(timeout)
    }
}

/// Anything raised while connecting, its timeout included, is a connect
/// failure. Everything after that is a read failure.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Read(err.to_string())
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<RawResponse, TransportError> {
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.attempt_deadline(timeout))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = response.bytes().await.map_err(classify)?.to_vec();

        debug!(status, bytes = body.len(), "Received response");
        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}
