// # dyndns-core
//
// Core library for the dyndns reconciliation daemon.
//
// ## Architecture Overview
//
// This library provides the provider-independent half of a dynamic DNS
// updater:
// - **IpResolver**: Trait for discovering the host's current public IP
// - **RecordClient**: Trait for listing and updating DNS records via a
//   provider API
// - **DdnsEngine**: Periodic reconciliation loop that compares fetched
//   records against the resolved IP and pushes updates for drifted records
//
// ## Design Principles
//
// 1. **Stateless cycles**: every reconciliation pass works from a freshly
//    resolved IP and a freshly listed record set; nothing is cached between
//    ticks, so in-memory and provider state can never drift apart for longer
//    than one polling interval
// 2. **Failure containment**: a failed cycle is logged and abandoned; the
//    next tick is the retry. The engine itself never terminates on a
//    network or API error
// 3. **Library-first**: the engine is driven through trait objects and a
//    test-controllable shutdown channel, so the whole loop can run under a
//    paused clock in tests

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, DomainConfig, EngineConfig, IpSourceConfig, ProviderConfig};
pub use engine::{DdnsEngine, EngineEvent};
pub use error::{Error, Result};
pub use traits::{DnsRecord, IpResolver, RecordClient};
