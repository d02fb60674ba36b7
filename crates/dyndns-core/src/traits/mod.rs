//! Core traits for the dyndns system
//!
//! This module defines the abstract interfaces that all implementations must
//! follow.
//!
//! - [`IpResolver`]: Discover the host's current public IP
//! - [`RecordClient`]: List and update DNS records via a provider API

pub mod ip_resolver;
pub mod record_client;

pub use ip_resolver::IpResolver;
pub use record_client::{DnsRecord, RecordClient};
