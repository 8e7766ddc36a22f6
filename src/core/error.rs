//! Error taxonomy for the exchange rate client.

use thiserror::Error;

/// Errors returned by the HTTP client and the rate resolver.
///
/// Every variant is surfaced to the caller as-is; nothing is retried or
/// swallowed above the transport's retry policy.
#[derive(Error, Debug)]
pub enum FxError {
    /// A required argument was missing or out of range.
    /// Raised before any request is made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection or read failures outlasted the retry budget.
    #[error("Network error for {path}: {message}")]
    Network { path: String, message: String },

    /// The service answered with a non-2xx status once retries were exhausted.
    #[error("HTTP error: {status} for {path}")]
    HttpStatus { status: u16, path: String },

    /// The response was successful but carried no rate for the target.
    #[error("Rate not found for {base} to {target}")]
    RateNotFound { base: String, target: String },

    /// A date was supplied in a shape that cannot be read as a date.
    #[error("Unsupported date input: {0}")]
    UnsupportedDateInput(String),

    /// A successful response did not have the expected JSON shape.
    #[error("Failed to parse JSON response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FxError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FxError>;
