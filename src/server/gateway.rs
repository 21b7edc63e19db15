//! Function-URL style gateway in front of the forwarding handler

use anyhow::Result;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;
use crate::http::cors::CorsPolicy;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::proxy::{Envelope, ForwardingHandler, InboundRequest};

/// Shared by every connection. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Gateway {
    handler: ForwardingHandler,
    cors: CorsPolicy,
    invocation_timeout: Duration,
}

impl Gateway {
    pub fn new(handler: ForwardingHandler, cors: CorsPolicy, invocation_timeout: Duration) -> Self {
        Self {
            handler,
            cors,
            invocation_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            ForwardingHandler::from_config(&cfg.upstream)?,
            CorsPolicy::new(&cfg.cors),
            cfg.server.invocation_timeout(),
        ))
    }

    /// Run one invocation under the host time limit.
    ///
    /// `None` means the limit expired and the invocation was dropped.
    pub async fn invoke(&self, inbound: &InboundRequest) -> Option<Envelope> {
        match timeout(self.invocation_timeout, self.handler.handle(inbound)).await {
            Ok(envelope) => Some(envelope),
            Err(_) => {
                tracing::warn!(
                    path = %inbound.path,
                    base = %self.handler.base_url(),
                    limit_ms = self.invocation_timeout.as_millis() as u64,
                    "Invocation timed out"
                );
                None
            }
        }
    }

    /// Produce the response for one gateway request.
    pub async fn respond(&self, req: &Request) -> Response {
        if req.is_preflight() {
            tracing::debug!(path = %req.path, "CORS preflight");
            return self.cors.preflight(req);
        }

        let inbound = InboundRequest::from(req);
        let mut response = match self.invoke(&inbound).await {
            Some(envelope) => {
                tracing::info!(
                    method = req.method.as_str(),
                    path = %inbound.path,
                    status = envelope.status_code,
                    "Invocation complete"
                );
                Response::from_envelope(&envelope)
            }
            None => Response::bad_gateway(),
        };

        // HEAD keeps the Content-Length of the full body but sends no bytes
        if req.method == Method::HEAD {
            response.body.clear();
        }

        self.cors.apply(req, &mut response);
        response
    }
}
