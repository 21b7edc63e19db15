use std::collections::HashMap;

use crate::proxy::envelope::Envelope;

/// Content type a function-URL gateway assumes when the envelope sets none
pub const ENVELOPE_CONTENT_TYPE: &str = "application/json";

/// HTTP status code.
///
/// Upstream statuses are passed through verbatim, so any value in
/// `100..=999` is representable; the common ones get named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    /// Returns `None` outside the three-digit range.
    pub fn from_u16(code: u16) -> Option<Self> {
        (100..=999).contains(&code).then_some(StatusCode(code))
    }

    /// ```
    /// # use coffee_proxy::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::BAD_GATEWAY.as_u16(), 502);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Standard reason phrase, or an empty string for unregistered codes.
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            413 => "Payload Too Large",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }
}

/// A response ready to be written to a gateway client.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .header("Content-Type", "text/plain")
///     .body(b"hi".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response, filling in Content-Length from the body.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    pub fn text(status: StatusCode, body: &str) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(body.as_bytes().to_vec())
            .build()
    }

    pub fn no_content() -> Self {
        ResponseBuilder::new(StatusCode::NO_CONTENT).build()
    }

    pub fn bad_request() -> Self {
        Self::text(StatusCode::BAD_REQUEST, "Bad Request")
    }

    pub fn payload_too_large() -> Self {
        Self::text(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
    }

    pub fn bad_gateway() -> Self {
        Self::text(StatusCode::BAD_GATEWAY, "Bad Gateway")
    }

    /// Translate a handler envelope into the response the gateway client sees.
    ///
    /// An envelope that cannot be rendered (out-of-range status, undecodable
    /// body) becomes a 502, the same as a gateway would answer for a broken
    /// function result.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        let Some(status) = StatusCode::from_u16(envelope.status_code) else {
            tracing::warn!(status = envelope.status_code, "Envelope status out of range");
            return Self::bad_gateway();
        };

        match envelope.decoded_body() {
            Ok(body) => ResponseBuilder::new(status)
                .header("Content-Type", ENVELOPE_CONTENT_TYPE)
                .body(body)
                .build(),
            Err(e) => {
                tracing::warn!(error = %e, "Envelope body is not valid base64");
                Self::bad_gateway()
            }
        }
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }
}
