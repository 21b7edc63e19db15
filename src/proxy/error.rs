//! Failures at the upstream boundary

use thiserror::Error;

/// Anything that goes wrong while issuing the outbound request or reading
/// its response. Every variant renders as the same 500 envelope.
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    #[error("failed to resolve path {path:?}: {source}")]
    Resolve {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl UpstreamFailure {
    pub fn is_timeout(&self) -> bool {
        match self {
            UpstreamFailure::Request(e) | UpstreamFailure::Body(e) => e.is_timeout(),
            UpstreamFailure::Resolve { .. } => false,
        }
    }
}
