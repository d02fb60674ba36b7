// # IP Resolver Trait
//
// Defines the interface for discovering the host's current public IP.
//
// ## Implementations
//
// - HTTP-based: `dyndns-ip-http` crate (external "what is my IP" service)

use async_trait::async_trait;

/// Trait for external IP discovery implementations
///
/// Implementations must be thread-safe and usable across async tasks. They
/// are observers only: a resolver performs exactly one lookup per call,
/// keeps no state between calls, and never decides whether a DNS update is
/// needed (that is owned by the engine).
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the host's current public IP address
    ///
    /// The returned value is the discovery service's response, trimmed of
    /// surrounding whitespace and otherwise verbatim. No IP syntax
    /// validation is performed; the engine compares it textually against
    /// record data.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current public IP as reported by the service
    /// - `Err(Error::Network)`: Transport failure or unreadable body
    async fn resolve(&self) -> Result<String, crate::Error>;
}
