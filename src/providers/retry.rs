use super::transport::{RawResponse, TransportError};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry budgets and backoff for idempotent GET requests.
///
/// Each retry spends one unit of `total` plus one unit of the budget for its
/// failure kind (`connect`, `read`, or none for a retryable status). Once a
/// budget is spent no further attempt is made, so `total` caps the number of
/// retries across mixed failure kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub total: u32,
    pub connect: u32,
    pub read: u32,
    /// Seconds; the n-th retry waits `backoff_factor * 2^(n-1)`.
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub status_forcelist: Vec<u16>,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: 3,
            connect: 3,
            read: 3,
            backoff_factor: 0.3,
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }
}

/// Statuses whose `Retry-After` header is honoured. Only consulted for
/// statuses that are retried, so 413 applies once it is in the forcelist.
const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Connect,
    Read,
    Status(u16),
}

impl RetryPolicy {
    /// A policy that never waits between attempts.
    pub fn without_backoff() -> Self {
        Self {
            backoff_factor: 0.0,
            respect_retry_after: false,
            ..Self::default()
        }
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Delay before the given retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry as i32 - 1);
        let capped = secs.min(self.backoff_max.as_secs_f64());
        Duration::from_nanos((capped * 1e9).round() as u64)
    }
}

/// Remaining budgets for one request.
struct Budget<'a> {
    policy: &'a RetryPolicy,
    total: u32,
    connect: u32,
    read: u32,
    retries: u32,
}

impl<'a> Budget<'a> {
    fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            total: policy.total,
            connect: policy.connect,
            read: policy.read,
            retries: 0,
        }
    }

    /// Spends budget for `failure`. Returns the wait before the next attempt,
    /// or `None` when a budget is exhausted.
    fn spend(&mut self, failure: Failure, retry_after: Option<Duration>) -> Option<Duration> {
        if self.total == 0 {
            return None;
        }
        match failure {
            Failure::Connect if self.connect == 0 => return None,
            Failure::Connect => self.connect -= 1,
            Failure::Read if self.read == 0 => return None,
            Failure::Read => self.read -= 1,
            Failure::Status(_) => {}
        }
        self.total -= 1;
        self.retries += 1;

        let honour_header = matches!(failure, Failure::Status(s) if RETRY_AFTER_STATUSES.contains(&s))
            && self.policy.respect_retry_after;
        match retry_after {
            Some(wait) if honour_header => Some(wait.min(self.policy.backoff_max)),
            _ => Some(self.policy.backoff(self.retries)),
        }
    }
}

/// Runs a single-attempt GET under `policy`.
///
/// Connection and read failures are retried until their budget runs out and
/// then returned as errors. Responses with a status in the policy's forcelist
/// are retried the same way; once the budget is spent the last response is
/// returned as-is so the caller can inspect its status.
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<RawResponse, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RawResponse, TransportError>>,
{
    let mut budget = Budget::new(policy);
    let mut attempt = 1;
    loop {
        let outcome = operation().await;
        let (failure, retry_after) = match &outcome {
            Ok(response) if policy.is_retryable_status(response.status) => {
                (Some(Failure::Status(response.status)), response.retry_after)
            }
            Ok(_) => (None, None),
            Err(TransportError::Connect(_)) => (Some(Failure::Connect), None),
            Err(TransportError::Read(_)) => (Some(Failure::Read), None),
        };
        let Some(failure) = failure else {
            return outcome;
        };

        let Some(delay) = budget.spend(failure, retry_after) else {
            debug!("Attempt {} failed with {:?}. Giving up.", attempt, failure);
            return outcome;
        };
        debug!(
            "Attempt {} failed with {:?}. Retrying in {:?}...",
            attempt, failure, delay
        );
        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}
