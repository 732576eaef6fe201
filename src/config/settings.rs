//! Settings structures for Inquisitio-RS configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the search service, without trailing slash
    pub search_endpoint: String,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Settings pointing at the given endpoint, everything else default
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            search_endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (INQUISITIO_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("INQUISITIO_SEARCH_ENDPOINT") {
            self.search_endpoint = val;
        }
        if let Ok(val) = std::env::var("INQUISITIO_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }
        if let Ok(val) = std::env::var("INQUISITIO_VERIFY_SSL") {
            self.outgoing.verify_ssl = val.parse().unwrap_or(true);
        }
    }

    /// Check that the endpoint is usable as a request base
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint();
        if endpoint.is_empty() {
            return Err(Error::Config("search_endpoint is not set".to_string()));
        }
        Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("search_endpoint '{}': {}", endpoint, e)))?;
        let timeout = self.outgoing.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(Error::Config(format!(
                "outgoing.request_timeout must be a positive number of seconds, got {}",
                timeout
            )));
        }
        Ok(())
    }

    /// Endpoint with any trailing slashes removed
    pub fn endpoint(&self) -> &str {
        self.search_endpoint.trim().trim_end_matches('/')
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Max idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// User agent sent with every request
    pub useragent: String,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            useragent: format!("Inquisitio-RS/{}", crate::VERSION),
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
