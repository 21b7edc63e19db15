//! Cross-origin policy applied by the gateway

use crate::config::CorsConfig;
use crate::http::request::Request;
use crate::http::response::Response;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    max_age_secs: u64,
}

impl CorsPolicy {
    pub fn new(cfg: &CorsConfig) -> Self {
        Self {
            allowed_origins: cfg.allowed_origins.clone(),
            max_age_secs: cfg.max_age_secs,
        }
    }

    fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// The `Access-Control-Allow-Origin` value for `origin`, if it is allowed.
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allows_any() {
            return Some("*".to_string());
        }
        let origin = origin?;
        self.allowed_origins
            .iter()
            .find(|o| o.eq_ignore_ascii_case(origin))
            .map(|_| origin.to_string())
    }

    /// Answer a preflight request without invoking the handler.
    pub fn preflight(&self, req: &Request) -> Response {
        let mut response = Response::no_content();
        if let Some(origin) = self.allow_origin(req.origin()) {
            response.set_header("Access-Control-Allow-Origin", origin);
            response.set_header("Access-Control-Allow-Methods", ALLOWED_METHODS);
            response.set_header("Access-Control-Max-Age", self.max_age_secs.to_string());
            if let Some(headers) = req.header("Access-Control-Request-Headers") {
                response.set_header("Access-Control-Allow-Headers", headers);
            }
            if !self.allows_any() {
                response.set_header("Vary", "Origin");
            }
        }
        response
    }

    /// Decorate an ordinary response.
    pub fn apply(&self, req: &Request, response: &mut Response) {
        if let Some(origin) = self.allow_origin(req.origin()) {
            response.set_header("Access-Control-Allow-Origin", origin);
            if !self.allows_any() {
                response.set_header("Vary", "Origin");
            }
        }
    }
}
