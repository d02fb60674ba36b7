//! Test doubles and common utilities for the reconciliation contract tests
//!
//! The doubles expose shared atomic counters so a test can keep a handle for
//! assertions while a twin (created via `sharing_state_with`) is boxed into
//! the engine.

use dyndns_core::config::{DdnsConfig, DomainConfig, EngineConfig, IpSourceConfig, ProviderConfig};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsRecord, IpResolver, RecordClient};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An IP resolver returning a scripted value (or a scripted failure)
pub struct MockIpResolver {
    /// Ok(ip) or Err(message); message becomes an `Error::Network`
    result: Arc<Mutex<std::result::Result<String, String>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockIpResolver {
    pub fn new(ip: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Ok(ip.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Err(message.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the scripted IP between cycles
    #[allow(dead_code)]
    pub fn set_ip(&self, ip: &str) {
        *self.result.lock().unwrap() = Ok(ip.to_string());
    }

    /// Number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a twin sharing state and counters with an existing resolver
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            result: Arc::clone(&other.result),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for MockIpResolver {
    async fn resolve(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &*self.result.lock().unwrap() {
            Ok(ip) => Ok(ip.clone()),
            Err(msg) => Err(Error::network(msg.clone())),
        }
    }
}

/// A record client backed by an in-memory zone
///
/// Successful updates are applied to the stored records, so a second
/// reconciliation cycle sees the provider state the first one produced.
pub struct MockRecordClient {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    fail_listing: Arc<AtomicBool>,
    failing_update_ids: Arc<Mutex<HashSet<i64>>>,
    list_call_count: Arc<AtomicUsize>,
    update_calls: Arc<Mutex<Vec<(String, i64, String)>>>,
}

impl MockRecordClient {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            fail_listing: Arc::new(AtomicBool::new(false)),
            failing_update_ids: Arc::new(Mutex::new(HashSet::new())),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every list_records() call fail
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Make update_record() fail for one record id
    pub fn fail_update_for(&self, record_id: i64) {
        self.failing_update_ids.lock().unwrap().insert(record_id);
    }

    /// Number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Number of update_record() calls issued (including failed ones)
    pub fn update_call_count(&self) -> usize {
        self.update_calls.lock().unwrap().len()
    }

    /// All update_record() calls as (domain, record_id, data)
    pub fn update_calls(&self) -> Vec<(String, i64, String)> {
        self.update_calls.lock().unwrap().clone()
    }

    /// Current provider-side records
    #[allow(dead_code)]
    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Create a twin sharing state and counters with an existing client
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            fail_listing: Arc::clone(&other.fail_listing),
            failing_update_ids: Arc::clone(&other.failing_update_ids),
            list_call_count: Arc::clone(&other.list_call_count),
            update_calls: Arc::clone(&other.update_calls),
        }
    }
}

#[async_trait::async_trait]
impl RecordClient for MockRecordClient {
    async fn list_records(&self, _domain: &str) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::api("listing failed"));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn update_record(&self, domain: &str, record_id: i64, data: &str) -> Result<()> {
        self.update_calls
            .lock()
            .unwrap()
            .push((domain.to_string(), record_id, data.to_string()));

        if self.failing_update_ids.lock().unwrap().contains(&record_id) {
            return Err(Error::api(format!("update failed for record {}", record_id)));
        }

        for record in self.records.lock().unwrap().iter_mut() {
            if record.id == record_id {
                record.data = data.to_string();
            }
        }
        Ok(())
    }
}

/// Build an A record snapshot
pub fn a_record(id: i64, name: &str, data: &str) -> DnsRecord {
    DnsRecord {
        id,
        record_type: "A".to_string(),
        name: name.to_string(),
        data: data.to_string(),
        priority: None,
        port: None,
        weight: None,
    }
}

/// Build a CNAME record snapshot
pub fn cname_record(id: i64, name: &str, data: &str) -> DnsRecord {
    DnsRecord {
        record_type: "CNAME".to_string(),
        ..a_record(id, name, data)
    }
}

/// Run the engine long enough for its immediate first pass plus
/// `passes - 1` interval ticks, then shut it down
///
/// Callers run under a paused tokio clock, so the default 600 s interval
/// elapses instantly and deterministically.
pub async fn run_passes(engine: dyndns_core::DdnsEngine, passes: u32) {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // The first tick fires as soon as the loop starts
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    for _ in 1..passes {
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
    }

    shutdown_tx.send(()).expect("engine is still running");
    handle
        .await
        .expect("engine task completes")
        .expect("engine shuts down cleanly");
}

/// Drain everything currently buffered on the event channel
pub fn drain_events(
    rx: &mut tokio::sync::mpsc::Receiver<dyndns_core::EngineEvent>,
) -> Vec<dyndns_core::EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Minimal configuration for one zone
pub fn config_for(domain: &str, subdomains: &[&str]) -> DdnsConfig {
    config_for_zones(vec![
        DomainConfig::new(domain).with_subdomains(subdomains.iter().copied()),
    ])
}

/// Minimal configuration for several zones
pub fn config_for_zones(domains: Vec<DomainConfig>) -> DdnsConfig {
    DdnsConfig {
        provider: ProviderConfig {
            api_token: "test-token".to_string(),
        },
        ip_source: IpSourceConfig {
            url: "https://ip.test.invalid".to_string(),
            timeout_secs: 10,
        },
        domains,
        engine: EngineConfig::default(),
    }
}
