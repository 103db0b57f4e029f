//! Error types for relay retrieval
//!
//! [`RelayError`] describes why a single strategy attempt failed; those are
//! logged and the chain moves on. [`FetchError`] is what callers of the
//! chain see.

use std::time::Duration;
use thiserror::Error;

/// User-facing message when no relay produced the page
pub const UNREACHABLE_MESSAGE: &str = "Unable to access this URL. The site may be blocking automated access or proxies. Please check the URL and try again.";

/// Failure of one relay attempt
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("request to {relay} failed: {source}")]
    Transport {
        relay: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{relay} returned status {status}")]
    HttpStatus { relay: String, status: u16 },

    #[error("{relay} returned an empty body")]
    EmptyBody { relay: String },

    #[error("{relay} returned a malformed envelope: {reason}")]
    MalformedEnvelope { relay: String, reason: String },

    #[error("{relay} did not answer within {timeout:?}")]
    Timeout { relay: String, timeout: Duration },

    #[error("{relay} has an invalid endpoint template '{template}'")]
    InvalidEndpoint { relay: String, template: String },
}

impl RelayError {
    pub fn relay(&self) -> &str {
        match self {
            Self::Transport { relay, .. }
            | Self::HttpStatus { relay, .. }
            | Self::EmptyBody { relay }
            | Self::MalformedEnvelope { relay, .. }
            | Self::Timeout { relay, .. }
            | Self::InvalidEndpoint { relay, .. } => relay,
        }
    }
}

/// Failure of the whole fetch chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Every relay failed or answered with an empty body
    #[error("{}", UNREACHABLE_MESSAGE)]
    AllStrategiesExhausted { attempted: usize },

    #[error("Page retrieval was cancelled")]
    Cancelled,
}
