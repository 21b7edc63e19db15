//! Forwarding proxy
//!
//! Maps an inbound path onto a fixed upstream base address, issues a single
//! GET, and wraps the result in a base64 response envelope.

pub mod envelope;
pub mod error;
pub mod forward;

pub use envelope::{Envelope, InboundRequest};
pub use error::UpstreamFailure;
pub use forward::ForwardingHandler;
