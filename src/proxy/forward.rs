//! Request forwarding to the fixed upstream

use anyhow::{Context, Result};
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::envelope::{Envelope, InboundRequest};
use crate::proxy::error::UpstreamFailure;

/// Stateless forwarder bound to a single upstream base address.
///
/// Cloning is cheap: the underlying HTTP client shares its connection pool.
#[derive(Debug, Clone)]
pub struct ForwardingHandler {
    base_url: Url,
    client: reqwest::Client,
}

impl ForwardingHandler {
    /// Create a handler for `base_url`.
    ///
    /// No request timeout is set on the client; the invoking host bounds
    /// each invocation.
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build upstream HTTP client")?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    pub fn from_config(cfg: &UpstreamConfig) -> Result<Self> {
        Self::new(cfg.base_url()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Handle one invocation. Never fails: upstream errors are logged and
    /// rendered as the fixed 500 envelope.
    pub async fn handle(&self, request: &InboundRequest) -> Envelope {
        match self.forward(&request.path).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    path = %request.path,
                    base = %self.base_url,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Error fetching upstream"
                );
                Envelope::internal_error()
            }
        }
    }

    /// Issue exactly one GET for `path` and encode the full response body.
    pub async fn forward(&self, path: &str) -> Result<Envelope, UpstreamFailure> {
        let url = self.resolve(path)?;

        tracing::debug!(url = %url, "Forwarding request upstream");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(UpstreamFailure::Request)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(UpstreamFailure::Body)?;

        tracing::debug!(url = %url, status, bytes = body.len(), "Upstream responded");

        Ok(Envelope::encoded(status, &body))
    }

    /// Resolve `path` against the base address.
    ///
    /// Standard reference resolution applies, but the result always keeps the
    /// base's scheme and authority: a path that would escape to another origin
    /// (such as `//other.host/x`) is used verbatim as the path on the base.
    pub fn resolve(&self, path: &str) -> Result<Url, UpstreamFailure> {
        let joined = self
            .base_url
            .join(path)
            .map_err(|source| UpstreamFailure::Resolve {
                path: path.to_string(),
                source,
            })?;

        if joined.origin() == self.base_url.origin() {
            return Ok(joined);
        }

        let mut pinned = self.base_url.clone();
        pinned.set_path(path);
        pinned.set_query(None);
        pinned.set_fragment(None);
        Ok(pinned)
    }
}
