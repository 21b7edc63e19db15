//! coffee-proxy - single-upstream forwarding proxy
//!
//! Forwards each request path to a fixed upstream API and returns the body
//! as a base64 response envelope.

pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
