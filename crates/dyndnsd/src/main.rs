// # dyndnsd - dynamic DNS reconciliation daemon
//
// The dyndnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the tokio runtime
// 3. Wiring the HTTP IP resolver and the DigitalOcean record client into
//    the reconciliation engine
// 4. Running the engine until SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DDNS_API_TOKEN`: DigitalOcean API token (required)
// - `DDNS_DOMAINS`: zones to manage (required); `;`-separated entries of the
//   form `domain[:sub1,sub2,...]`, e.g. `example.com:www,blog;other.org`
// - `DDNS_IP_URL`: plain-text IP discovery endpoint
//   (default: https://api.ipify.org)
// - `DDNS_INTERVAL_SECS`: seconds between reconciliation passes
//   (default: 600)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_API_TOKEN=dop_v1_...
// export DDNS_DOMAINS="example.com:www,blog"
//
// dyndnsd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use dyndns_core::config::{
    DdnsConfig, DomainConfig, EngineConfig, IpSourceConfig, ProviderConfig,
};
use dyndns_core::engine::DdnsEngine;
use dyndns_ip_http::HttpIpResolver;
use dyndns_provider_digitalocean::DigitalOceanClient;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Default plain-text IP discovery endpoint
const DEFAULT_IP_URL: &str = "https://api.ipify.org";

/// Default seconds between reconciliation passes
const DEFAULT_INTERVAL_SECS: u64 = 600;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration as read from the environment
struct AppConfig {
    api_token: String,
    domains: Vec<DomainConfig>,
    ip_url: String,
    interval_secs: u64,
    log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let api_token = env::var("DDNS_API_TOKEN").map_err(|_| {
            anyhow::anyhow!(
                "DDNS_API_TOKEN is required. \
                Set it via: export DDNS_API_TOKEN=your_token"
            )
        })?;

        let domains_raw = env::var("DDNS_DOMAINS").map_err(|_| {
            anyhow::anyhow!(
                "DDNS_DOMAINS is required. \
                Set it via: export DDNS_DOMAINS=\"example.com:www,blog\""
            )
        })?;

        Ok(Self {
            api_token,
            domains: parse_domains(&domains_raw)?,
            ip_url: env::var("DDNS_IP_URL").unwrap_or_else(|_| DEFAULT_IP_URL.to_string()),
            interval_secs: match env::var("DDNS_INTERVAL_SECS") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("DDNS_INTERVAL_SECS is not a number: {}", raw))?,
                Err(_) => DEFAULT_INTERVAL_SECS,
            },
            log_level: env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate daemon-level settings and assemble the engine configuration
    ///
    /// Core invariants (non-empty token and domains, well-formed names) are
    /// enforced by [`DdnsConfig::validate`]; the checks here cover the
    /// daemon's own knobs.
    fn into_ddns_config(self) -> Result<(DdnsConfig, Level)> {
        if !(10..=86400).contains(&self.interval_secs) {
            anyhow::bail!(
                "DDNS_INTERVAL_SECS must be between 10 and 86400 seconds. Got: {}",
                self.interval_secs
            );
        }

        let log_level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let config = DdnsConfig {
            provider: ProviderConfig {
                api_token: self.api_token,
            },
            ip_source: IpSourceConfig {
                url: self.ip_url,
                timeout_secs: 10,
            },
            domains: self.domains,
            engine: EngineConfig {
                interval_secs: self.interval_secs,
                ..EngineConfig::default()
            },
        };

        config.validate()?;

        Ok((config, log_level))
    }
}

/// Parse the `DDNS_DOMAINS` value into zone configurations
///
/// Entries are `;`-separated; each entry is `domain[:sub1,sub2,...]`.
/// Whitespace around entries and names is ignored; empty entries are
/// rejected rather than skipped so a typo does not silently drop a zone.
fn parse_domains(raw: &str) -> Result<Vec<DomainConfig>> {
    let mut domains = Vec::new();

    for entry in raw.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            anyhow::bail!("DDNS_DOMAINS contains an empty entry: {:?}", raw);
        }

        let (domain, subs) = match entry.split_once(':') {
            Some((domain, subs)) => (domain.trim(), Some(subs)),
            None => (entry, None),
        };

        if domain.is_empty() {
            anyhow::bail!("DDNS_DOMAINS entry has an empty domain: {:?}", entry);
        }

        let mut config = DomainConfig::new(domain);
        if let Some(subs) = subs {
            let subdomains: Vec<String> = subs
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if subdomains.is_empty() {
                anyhow::bail!(
                    "DDNS_DOMAINS entry '{}' declares subdomains but lists none",
                    entry
                );
            }
            config = config.with_subdomains(subdomains);
        }

        domains.push(config);
    }

    if domains.is_empty() {
        anyhow::bail!("DDNS_DOMAINS must contain at least one zone");
    }

    Ok(domains)
}

fn main() -> ExitCode {
    // Load and validate configuration before anything else; a broken
    // environment must fail fast with a descriptive message
    let app_config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let (config, log_level) = match app_config.into_ddns_config() {
        Ok(validated) => validated,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("starting dyndnsd");
    info!("managing {} zone(s)", config.domains.len());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("daemon error: {}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    let resolver = HttpIpResolver::from_config(&config.ip_source)?;
    let client = DigitalOceanClient::new(&config.provider.api_token)?;

    for domain in &config.domains {
        info!(
            "zone {}: apex plus {} subdomain(s)",
            domain.domain,
            domain.subdomains.len()
        );
    }

    let (engine, mut event_rx) = DdnsEngine::new(Box::new(resolver), Box::new(client), config)?;

    // Drain engine events so the bounded channel never fills; the engine
    // already logs everything of interest at info/error level
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "engine event");
        }
    });

    // Tie engine shutdown to OS signals
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let signal_name = wait_for_shutdown().await;
        info!("received {}", signal_name);
        let _ = shutdown_tx.send(());
    });

    engine.run_with_shutdown(Some(shutdown_rx)).await?;

    info!("shut down cleanly");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> &'static str {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to install SIGTERM handler: {}", e);
            // Fall back to ctrl-c only
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    }
}

/// Wait for ctrl-c (fallback for non-Unix platforms)
#[cfg(not(unix))]
async fn wait_for_shutdown() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
