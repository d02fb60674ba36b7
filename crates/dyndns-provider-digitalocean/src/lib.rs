// # DigitalOcean DNS Record Client
//
// This crate provides the DigitalOcean implementation of the dyndns
// `RecordClient` trait.
//
// ## Scope
//
// - One HTTP request per trait call; no retry, backoff or caching (all
//   coordination is owned by the engine)
// - Listing parses the `domain_records` envelope; the `links` and `meta`
//   envelope fields are carried as opaque JSON and never interpreted
// - Updating pushes `{"data": ...}` and reports the provider's response
//   body verbatim; success is the absence of a transport failure
//
// ## Security
//
// The API token never appears in logs; the Debug implementation redacts it.
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - List records: GET `/v2/domains/{domain}/records`
// - Update record: PUT `/v2/domains/{domain}/records/{id}`

use async_trait::async_trait;
use dyndns_core::traits::{DnsRecord, RecordClient};
use dyndns_core::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Response envelope for the record listing endpoint
///
/// `links` (pagination) and `meta` are provider metadata the core logic
/// never interprets; they are kept as untyped JSON.
#[derive(Debug, serde::Deserialize)]
struct RecordsEnvelope {
    domain_records: Vec<DnsRecord>,

    #[serde(default)]
    links: Value,

    #[serde(default)]
    meta: Value,
}

/// DigitalOcean DNS record client
pub struct DigitalOceanClient {
    /// Bearer token for the DigitalOcean API
    api_token: String,

    /// API base URL (overridable for tests)
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// The Debug implementation intentionally does not expose the API token
impl std::fmt::Debug for DigitalOceanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanClient")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DigitalOceanClient {
    /// Create a new DigitalOcean record client
    ///
    /// # Parameters
    ///
    /// - `api_token`: DigitalOcean personal access token with write scope
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the token is empty.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(api_token, DIGITALOCEAN_API_BASE)
    }

    /// Create a client against a non-default API base URL
    ///
    /// Used by tests to point the client at a local stand-in server.
    pub fn with_api_base(api_token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/records", self.api_base, domain)
    }

    fn record_url(&self, domain: &str, record_id: i64) -> String {
        format!("{}/domains/{}/records/{}", self.api_base, domain, record_id)
    }
}

#[async_trait]
impl RecordClient for DigitalOceanClient {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(self.records_url(domain))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::api(format!("listing records for {}: {}", domain, e)))?;

        if !response.status().is_success() {
            return Err(Error::api(format!(
                "listing records for {}: HTTP {}",
                domain,
                response.status()
            )));
        }

        let envelope = response
            .json::<RecordsEnvelope>()
            .await
            .map_err(|e| Error::api(format!("parsing record list for {}: {}", domain, e)))?;

        debug!(
            "listed {} record(s) for {} (links: {}, meta: {})",
            envelope.domain_records.len(),
            domain,
            envelope.links,
            envelope.meta
        );

        Ok(envelope.domain_records)
    }

    async fn update_record(&self, domain: &str, record_id: i64, data: &str) -> Result<()> {
        let response = self
            .client
            .put(self.record_url(domain, record_id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await
            .map_err(|e| {
                Error::api(format!("updating record {} of {}: {}", record_id, domain, e))
            })?;

        // The provider's response is reported, not parsed: success is the
        // absence of a transport failure
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::api(format!(
                    "reading update response for record {} of {}: {}",
                    record_id, domain, e
                ))
            })?;

        info!("{}", body.trim_end());
        Ok(())
    }
}
