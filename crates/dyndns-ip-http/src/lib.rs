// # HTTP IP Resolver
//
// This crate provides the HTTP-based external IP resolver for the dyndns
// system.
//
// ## Architecture
//
// Fetches the host's public IP from an external plain-text service (e.g.
// api.ipify.org, icanhazip.com) with a bounded timeout. The response body is
// trimmed of surrounding whitespace and returned verbatim: the engine
// compares it textually against record data, so no IP syntax validation is
// performed here.

use dyndns_core::config::IpSourceConfig;
use dyndns_core::traits::IpResolver;
use dyndns_core::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Well-known plain-text IP services usable as `DDNS_IP_URL`
pub const KNOWN_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

/// HTTP-based external IP resolver
pub struct HttpIpResolver {
    /// URL of the plain-text IP service
    url: String,

    /// HTTP client (carries the request timeout)
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the IP from (e.g., "https://api.ipify.org")
    /// - `timeout`: Bound on the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a resolver from the IP source configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }
}

/// Extract the IP value from a discovery service's response body
///
/// Surrounding whitespace is insignificant; everything else is returned
/// verbatim, with no IP syntax validation.
fn ip_from_body(body: &str) -> String {
    body.trim().to_string()
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "IP lookup returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read IP lookup response: {}", e)))?;

        let ip = ip_from_body(&body);
        debug!("resolved external IP {} via {}", ip, self.url);
        Ok(ip)
    }
}
