//! Minimal HTTP/1.1 front end.
//!
//! Plays the role of the function-URL endpoint: it parses client requests,
//! answers CORS preflights, hands everything else to the forwarding handler
//! and turns the returned envelope back into an HTTP response.
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Gateway invokes the handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod cors;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
