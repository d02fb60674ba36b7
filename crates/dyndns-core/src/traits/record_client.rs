// # Record Client Trait
//
// Defines the interface for listing and updating DNS records via a
// provider's HTTP API.
//
// ## Implementations
//
// - DigitalOcean: `dyndns-provider-digitalocean` crate

use async_trait::async_trait;
use serde::Deserialize;

/// A single DNS record as reported by the provider
///
/// Records are point-in-time snapshots: the engine fetches them fresh every
/// reconciliation cycle and never mutates one locally. An update is always
/// pushed through [`RecordClient::update_record`], never written back into
/// the in-memory copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record id, unique within a zone
    pub id: i64,

    /// Record type (e.g., "A", "AAAA", "CNAME")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record name ("@" for the zone apex)
    pub name: String,

    /// Record value (an IP address for A records)
    pub data: String,

    /// Priority (SRV/MX records; `null` otherwise)
    #[serde(default)]
    pub priority: Option<i64>,

    /// Port (SRV records; `null` otherwise)
    #[serde(default)]
    pub port: Option<i64>,

    /// Weight (SRV records; `null` otherwise)
    #[serde(default)]
    pub weight: Option<i64>,
}

/// Trait for DNS provider record clients
///
/// Implementations must be thread-safe and usable across async tasks. A
/// client is stateless and single-shot: one API call per invocation, no
/// retry logic (the engine's next tick is the retry), no caching of records
/// between calls.
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// List all DNS records for a zone
    ///
    /// # Parameters
    ///
    /// - `domain`: The zone name (e.g., "example.com")
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: Every record in the zone
    /// - `Err(Error::Api)`: Transport failure or unparseable response
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Overwrite the data value of a single record
    ///
    /// The provider's response body is reported (logged) but not parsed;
    /// success is determined solely by the absence of a transport failure.
    ///
    /// # Parameters
    ///
    /// - `domain`: The zone name
    /// - `record_id`: The provider-assigned record id
    /// - `data`: The new record value
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The update request completed
    /// - `Err(Error::Api)`: Transport failure
    async fn update_record(
        &self,
        domain: &str,
        record_id: i64,
        data: &str,
    ) -> Result<(), crate::Error>;
}
