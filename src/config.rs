//! Runtime configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file named by
//! the `CONFIG` environment variable, then individual environment overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_BASE_URL: &str = "https://coffee.alexflipnote.dev";
const DEFAULT_INVOCATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_MAX_AGE_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cors: CorsConfig,
    /// Deployment identifiers. Logged only, never consulted at runtime.
    #[serde(skip)]
    pub deployment: DeploymentTarget,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Host-side limit on a single invocation.
    pub invocation_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentTarget {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.to_string(),
            invocation_timeout_secs: DEFAULT_INVOCATION_TIMEOUT_SECS,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the optional `CONFIG` file and the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var("CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a YAML config file. Missing sections fall back to defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.server.listen_addr = addr;
        }
        if let Ok(base) = std::env::var("UPSTREAM_BASE_URL") {
            self.upstream.base_url = base;
        }
        if let Ok(secs) = std::env::var("INVOCATION_TIMEOUT_SECS") {
            self.server.invocation_timeout_secs = secs
                .parse()
                .context("INVOCATION_TIMEOUT_SECS must be a whole number of seconds")?;
        }

        self.deployment = DeploymentTarget {
            account: std::env::var("CDK_DEFAULT_ACCOUNT").ok(),
            region: std::env::var("CDK_DEFAULT_REGION").ok(),
        };
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.upstream.base_url()?;
        if self.server.invocation_timeout_secs == 0 {
            anyhow::bail!("Invocation timeout must be greater than zero");
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }
}

impl UpstreamConfig {
    /// The parsed base address every request is resolved against.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid upstream base URL {}", self.base_url))?;
        if url.host_str().is_none() {
            anyhow::bail!("Upstream base URL missing host: {}", self.base_url);
        }
        Ok(url)
    }
}
