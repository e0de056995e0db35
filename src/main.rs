//! Service health monitor.
//!
//! Periodically probes a configured set of services, raises and clears
//! incident alerts on consecutive-failure streaks, and serves the latest
//! result per service over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!   config/ ──▶ lifecycle::startup ──▶ health::HealthMonitor (background task)
//!                                          │  sweep: probe → tracker → store
//!                                          ▼
//!                                     health::ResultsStore
//!                                          ▲
//!   HTTP client ──▶ http::HttpServer ──────┘  (read-only snapshot)
//!
//!   observability: tracing logs + Prometheus metrics
//!   lifecycle: SIGINT/SIGTERM → Shutdown → monitor and server exit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use service_monitor::config::{load_config, validation::ValidationError, ConfigError, MonitorConfig};
use service_monitor::health::ResultsStore;
use service_monitor::http::HttpServer;
use service_monitor::lifecycle::{signals, startup, Shutdown};
use service_monitor::observability::{logging, metrics};

const DEFAULT_SERVICES_FILE: &str = "services.json";
const MONITOR_STOP_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "service-monitor", version)]
#[command(about = "Probe services, alert on failure streaks, serve the latest results")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of service descriptors
    #[arg(short, long, env = "CONFIG_FILE_PATH")]
    services: Option<PathBuf>,

    /// Seconds between two sweeps
    #[arg(short, long, env = "MONITOR_INTERVAL_SECONDS")]
    interval: Option<u64>,

    /// Query server bind address
    #[arg(short, long, env = "MONITOR_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(interval) = args.interval {
        if interval == 0 {
            return Err(ConfigError::Validation(vec![ValidationError::ZeroInterval]).into());
        }
        config.monitor.interval_secs = interval;
    }
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        interval_secs = config.monitor.interval_secs,
        threshold = config.monitor.alert_threshold,
        probe_mode = ?config.probe.mode,
        "service-monitor starting"
    );

    let services_file = args
        .services
        .or_else(|| config.monitor.services_file.as_ref().map(PathBuf::from))
        .or_else(|| config.services.is_empty().then(|| PathBuf::from(DEFAULT_SERVICES_FILE)));
    let services = startup::resolve_services(&config, services_file.as_deref());

    let metrics_handle = if config.observability.metrics_enabled {
        metrics::init_metrics()
    } else {
        None
    };

    let store = ResultsStore::new();
    let shutdown = Shutdown::new();

    let monitor_task = if services.is_empty() {
        tracing::warn!("No services configured. Monitoring functionality is disabled.");
        None
    } else {
        tracing::info!(services = services.len(), "Loaded services, starting health monitor");
        let monitor = startup::build_monitor(&config, services, store.clone());
        Some(tokio::spawn(monitor.run(shutdown.subscribe())))
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, store, metrics_handle);

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let signal = signals::wait_for_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        signal_shutdown.trigger();
    });

    server.run(listener, shutdown.signalled()).await?;

    if let Some(task) = monitor_task {
        tracing::info!("Waiting for health monitor to stop");
        if tokio::time::timeout(MONITOR_STOP_GRACE, task).await.is_err() {
            tracing::warn!("Health monitor did not stop in time");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
