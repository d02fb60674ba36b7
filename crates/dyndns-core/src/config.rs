//! Configuration types for the dyndns system
//!
//! This module defines all configuration structures used throughout the
//! crate. Configuration is built once at startup, validated, and then passed
//! by reference into the engine; there is no ambient global state.

use serde::{Deserialize, Serialize};

/// Main dyndns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// External IP discovery configuration
    pub ip_source: IpSourceConfig,

    /// DNS zones to manage
    pub domains: Vec<DomainConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Validate the configuration
    ///
    /// Every violation is a fatal [`crate::Error::Config`]; the daemon must
    /// exit with a non-zero status before any scheduling begins.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.ip_source.validate()?;

        if self.domains.is_empty() {
            return Err(crate::Error::config("no domains configured"));
        }

        for domain in &self.domains {
            domain.validate()?;
        }

        self.engine.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token for the provider API
    pub api_token: String,
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("provider API token cannot be empty"));
        }
        Ok(())
    }
}

/// External IP discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// URL of the plain-text "what is my IP" endpoint
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_ip_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP source URL cannot be empty"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "IP source URL must use http or https: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP source timeout must be > 0"));
        }
        Ok(())
    }
}

/// One managed DNS zone: its apex plus the subdomain record names to keep in
/// sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Zone name (e.g., "example.com")
    pub domain: String,

    /// Subdomain record names within the zone (the apex `@` is always
    /// implied and never listed here)
    #[serde(default)]
    pub subdomains: Vec<String>,
}

impl DomainConfig {
    /// Create a new domain configuration
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomains: Vec::new(),
        }
    }

    /// Set the subdomain record names
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the zone configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain)?;
        for sub in &self.subdomains {
            validate_label(sub).map_err(|e| {
                crate::Error::config(format!("subdomain of '{}': {}", self.domain, e))
            })?;
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between reconciliation passes (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events will be dropped (with a warning log).
    /// This prevents unbounded memory growth if the receiver falls behind.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("reconcile interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    600
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_ip_timeout_secs() -> u64 {
    10
}

/// Validate that a string is a plausible DNS domain name
///
/// This implements basic domain name validation per RFC 1035. It is not
/// comprehensive but catches common configuration mistakes before the daemon
/// starts issuing API calls with them.
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("domain name cannot be empty"));
    }

    // RFC 1035: 253 chars max for the full name
    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "domain name too long: {} chars (max 253): {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(label)
            .map_err(|e| crate::Error::config(format!("domain '{}': {}", domain, e)))?;
    }

    Ok(())
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("empty label".to_string());
    }

    if label.len() > 63 {
        return Err(format!(
            "label too long: {} chars (max 63): '{}'",
            label.len(),
            label
        ));
    }

    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(format!(
            "label contains invalid characters: '{}' (alphanumeric and hyphen only)",
            label
        ));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("label cannot start or end with hyphen: '{}'", label));
    }

    Ok(())
}
