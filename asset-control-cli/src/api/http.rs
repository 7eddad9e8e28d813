//! HTTP client configuration with builder pattern
//!
//! Every outbound call gets a bounded connect and request timeout. Nothing is
//! retried: a failed call is reported to the user as-is.

use log::warn;
use std::time::Duration;

/// Timeouts and TLS settings shared by the three external clients
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Skip certificate verification. Only ever applied to the forecast client.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            user_agent: format!("asset-control/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Create a new builder for HttpConfig
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::new()
    }

    /// Client with full certificate verification
    pub fn client(&self) -> reqwest::Result<reqwest::Client> {
        self.base_builder().build()
    }

    /// Client for the forecast endpoint, honouring `accept_invalid_certs`
    pub fn forecast_client(&self) -> reqwest::Result<reqwest::Client> {
        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the forecast endpoint");
        }
        self.base_builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
    }

    fn base_builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(self.user_agent.clone())
    }
}

/// Builder for HttpConfig
#[derive(Debug)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HttpConfig::default(),
        }
    }

    /// Set the TCP/TLS connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the whole-request timeout (connect + send + read body)
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> HttpConfig {
        self.config
    }
}

impl Default for HttpConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the query string so tokens embedded in URLs never reach logs
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?***", base),
        None => url.to_string(),
    }
}

/// Describe a transport failure, calling out timeouts explicitly.
/// The request URL is redacted: reqwest's own text carries the query string.
pub fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "request timed out".to_string();
    }

    let mut text = err.to_string();
    if let Some(url) = err.url() {
        text = text.replace(url.as_str(), &redact_url(url.as_str()));
    }
    if err.is_connect() {
        format!("connection failed: {}", text)
    } else {
        text
    }
}
