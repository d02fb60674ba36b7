//! Core reconciliation engine
//!
//! The DdnsEngine is responsible for:
//! - Running one reconciliation pass over all configured zones per tick
//! - Resolving the current external IP via IpResolver
//! - Listing and updating DNS records via RecordClient
//!
//! ## Cycle Flow
//!
//! For each configured zone, per tick:
//!
//! 1. Resolve the current external IP (failure aborts the zone's cycle
//!    before any record is listed)
//! 2. List the zone's DNS records (failure aborts the zone's cycle)
//! 3. For every record and every candidate name (`@` plus each configured
//!    subdomain): a record matches when `type == "A"` and its name equals
//!    the candidate. Every match is reported with its current data
//! 4. A matching record whose data differs from the resolved IP gets one
//!    update call. A failed update is reported and does not abort sibling
//!    updates
//!
//! No state survives a cycle: records and the external IP are fetched fresh
//! every time, so the only possible drift between memory and provider is the
//! polling interval itself.

use crate::config::{DdnsConfig, DomainConfig};
use crate::error::Result;
use crate::traits::{DnsRecord, IpResolver, RecordClient};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Record name denoting the zone apex
pub const APEX: &str = "@";

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        domains_count: usize,
    },

    /// External IP resolved for a zone's cycle
    IpResolved {
        domain: String,
        ip: String,
    },

    /// A matching A record was observed (reported regardless of whether an
    /// update follows)
    RecordObserved {
        domain: String,
        name: String,
        data: String,
    },

    /// A drifted record was updated
    RecordUpdated {
        domain: String,
        record_id: i64,
        data: String,
    },

    /// An individual record update failed (siblings continue)
    UpdateFailed {
        domain: String,
        record_id: i64,
        error: String,
    },

    /// A zone's cycle was abandoned before any update decision
    CycleAborted {
        domain: String,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core reconciliation engine
///
/// The engine owns the periodic schedule and the per-zone reconciliation
/// logic. It runs until shut down and treats every network or API failure as
/// transient: the affected zone's cycle is abandoned and retried on the next
/// tick.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`] (validates the configuration)
/// 2. Start with [`DdnsEngine::run()`], or
///    [`DdnsEngine::run_with_shutdown()`] for a test-controlled lifetime
/// 3. The engine loops until a shutdown signal is received
///
/// ## Scheduling
///
/// A single task drives all zones sequentially, so each zone's
/// list-then-update sequence is ordered relative to itself and at most one
/// reconciliation pass is in flight. Missed ticks are delayed, not bursted.
pub struct DdnsEngine {
    /// External IP discovery
    resolver: Box<dyn IpResolver>,

    /// DNS provider record client
    client: Box<dyn RecordClient>,

    /// Zones to reconcile each tick
    domains: Vec<DomainConfig>,

    /// Interval between reconciliation passes
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new reconciliation engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: IP resolver implementation
    /// - `client`: Record client implementation
    /// - `config`: dyndns configuration (validated here)
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        client: Box<dyn RecordClient>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            resolver,
            client,
            domains: config.domains,
            interval: Duration::from_secs(config.engine.interval_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine until a SIGINT/ctrl-c is received
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine with a controlled shutdown signal
    ///
    /// Tests pass a oneshot receiver to bound the number of ticks
    /// deterministically; the daemon wires the receiver to SIGTERM/SIGINT.
    /// [`DdnsEngine::run()`] is the ctrl-c-only convenience form.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            domains_count: self.domains.len(),
        });
        info!(
            "starting reconciliation loop: {} zone(s), every {:?}",
            self.domains.len(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        // A slow cycle must not cause a burst of catch-up ticks
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for the provided shutdown signal
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }

                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        info!("engine stopped");
        Ok(())
    }

    /// Run one reconciliation pass over all configured zones
    async fn run_cycle(&self) {
        for domain in &self.domains {
            self.reconcile_domain(domain).await;
        }
    }

    /// Reconcile one zone: resolve the IP, list its records, update drifted
    /// matches
    ///
    /// Never returns an error past its own boundary: all failures are
    /// logged, emitted as events, and abort further work for this zone only.
    async fn reconcile_domain(&self, config: &DomainConfig) {
        let external_ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("failed to resolve external IP for {}: {}", config.domain, e);
                self.emit_event(EngineEvent::CycleAborted {
                    domain: config.domain.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        info!("external IP: {}", external_ip);
        self.emit_event(EngineEvent::IpResolved {
            domain: config.domain.clone(),
            ip: external_ip.clone(),
        });

        let records = match self.client.list_records(&config.domain).await {
            Ok(records) => records,
            Err(e) => {
                error!("failed to list records for {}: {}", config.domain, e);
                self.emit_event(EngineEvent::CycleAborted {
                    domain: config.domain.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        debug!("fetched {} record(s) for {}", records.len(), config.domain);

        for record in &records {
            self.check_record(config, record, APEX, &external_ip).await;
            for subdomain in &config.subdomains {
                self.check_record(config, record, subdomain, &external_ip)
                    .await;
            }
        }
    }

    /// Evaluate one record against one candidate name
    ///
    /// A match is reported unconditionally; an update is issued only when
    /// the record's data differs from the resolved IP. The same logical name
    /// may legitimately appear on several records; each match is handled
    /// independently.
    async fn check_record(
        &self,
        config: &DomainConfig,
        record: &DnsRecord,
        candidate: &str,
        external_ip: &str,
    ) {
        if record.record_type != "A" || record.name != candidate {
            return;
        }

        info!("{} {}", record.name, record.data);
        self.emit_event(EngineEvent::RecordObserved {
            domain: config.domain.clone(),
            name: record.name.clone(),
            data: record.data.clone(),
        });

        if record.data == external_ip {
            return;
        }

        match self
            .client
            .update_record(&config.domain, record.id, external_ip)
            .await
        {
            Ok(()) => {
                info!(
                    "updated {} record {} (id {}): {} -> {}",
                    config.domain, record.name, record.id, record.data, external_ip
                );
                self.emit_event(EngineEvent::RecordUpdated {
                    domain: config.domain.clone(),
                    record_id: record.id,
                    data: external_ip.to_string(),
                });
            }
            Err(e) => {
                // Sibling records still get their turn
                error!(
                    "failed to update {} record {} (id {}): {}",
                    config.domain, record.name, record.id, e
                );
                self.emit_event(EngineEvent::UpdateFailed {
                    domain: config.domain.clone(),
                    record_id: record.id,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging a warning if the channel is full. Dropping is
        // preferable to blocking the reconciliation loop on a slow receiver.
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}
