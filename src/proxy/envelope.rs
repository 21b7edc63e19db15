//! Inbound request and response envelope types
//!
//! The envelope is the JSON shape handed back to the invoking gateway:
//!
//! ```text
//! { "statusCode": 200, "body": "<base64>", "isBase64Encoded": true }
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::http::request::Request;

/// Body returned whenever the upstream call fails
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// The only part of an inbound request the handler consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub path: String,
}

impl InboundRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl From<&Request> for InboundRequest {
    /// Uses the raw path. Query string, headers and body are dropped.
    fn from(req: &Request) -> Self {
        let raw_path = req
            .path
            .split_once('?')
            .map_or(req.path.as_str(), |(path, _)| path);
        Self::new(raw_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl Envelope {
    /// Successful envelope carrying `bytes` as standard base64.
    pub fn encoded(status_code: u16, bytes: &[u8]) -> Self {
        Self {
            status_code,
            body: STANDARD.encode(bytes),
            is_base64_encoded: Some(true),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            body: INTERNAL_ERROR_BODY.to_string(),
            is_base64_encoded: None,
        }
    }

    pub fn is_base64_encoded(&self) -> bool {
        self.is_base64_encoded.unwrap_or(false)
    }

    /// Raw body bytes, undoing the base64 encoding when the flag is set.
    pub fn decoded_body(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_base64_encoded() {
            STANDARD.decode(&self.body)
        } else {
            Ok(self.body.as_bytes().to_vec())
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
