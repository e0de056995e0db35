//! Monitor loop and query API running together.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sdk_rust::MonitorClient;
use service_monitor::config::{MonitorConfig, ServiceDescriptor};
use service_monitor::health::{AlertEvent, ResultsStore};
use service_monitor::http::HttpServer;
use service_monitor::lifecycle::{startup, Shutdown};
use tokio::net::TcpListener;

mod common;

use common::Reply;

async fn start_server(store: ResultsStore, shutdown: &Shutdown) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&MonitorConfig::default(), store, None);
    let signalled = shutdown.signalled();

    tokio::spawn(async move {
        let _ = server.run(listener, signalled).await;
    });

    format!("http://{}", addr)
}

fn fast_config(threshold: u32) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.monitor.interval_secs = 1;
    config.monitor.alert_threshold = threshold;
    config.probe.timeout_secs = 1;
    config
}

#[tokio::test]
async fn test_fault_on_one_service_leaves_others_updated() {
    let healthy = common::start_fixed_service(200, Some("1.0.0")).await;
    let failing = common::start_fixed_service(503, None).await;

    let services = vec![
        ServiceDescriptor::new("healthy", healthy.to_string()).with_expected_version("1.0.0"),
        ServiceDescriptor::new("tls-only", "https://127.0.0.1:1/health"),
        ServiceDescriptor::new("failing", failing.to_string()),
    ];

    let store = ResultsStore::new();
    let mut monitor = startup::build_monitor(&fast_config(3), services, store.clone());

    let report = monitor.sweep().await;
    assert_eq!(report.checked, vec!["healthy", "failing"]);
    assert_eq!(report.faults, vec!["tls-only"]);

    let shutdown = Shutdown::new();
    let client = MonitorClient::new(&start_server(store, &shutdown).await);

    let results = client.latest_health().await.unwrap().expect("results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].service_name, "failing");
    assert!(!results[0].is_available);
    assert_eq!(results[1].service_name, "healthy");
    assert!(results[1].is_available);
    assert!(results[1].version_match);

    assert!(client.service_health("tls-only").await.unwrap().is_none());
    shutdown.trigger();
}

#[tokio::test]
async fn test_incident_raised_and_cleared_by_running_monitor() {
    // Fails the first three probes, then recovers.
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let flaky = common::start_programmable_service(move || {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 3 {
                Reply::status(503)
            } else {
                Reply::status(200)
            }
        }
    })
    .await;

    let store = ResultsStore::new();
    let monitor = startup::build_monitor(
        &fast_config(3),
        vec![ServiceDescriptor::new("flaky", flaky.to_string())],
        store.clone(),
    );
    let mut alerts = monitor.subscribe_alerts();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(monitor.run(shutdown.subscribe()));

    let critical = tokio::time::timeout(Duration::from_secs(10), alerts.recv())
        .await
        .expect("no critical alert")
        .unwrap();
    assert_eq!(
        critical,
        AlertEvent::Critical {
            service: "flaky".into(),
            failures: 3,
            status_code: 503
        }
    );

    let recovery = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .expect("no recovery alert")
        .unwrap();
    assert_eq!(
        recovery,
        AlertEvent::Recovery {
            service: "flaky".into(),
            failures: 3
        }
    );
    assert!(store.get("flaky").unwrap().is_available());

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_no_services_means_no_data() {
    let store = ResultsStore::new();
    let mut monitor = startup::build_monitor(&fast_config(3), Vec::new(), store.clone());
    let report = monitor.sweep().await;
    assert!(report.checked.is_empty());

    let shutdown = Shutdown::new();
    let client = MonitorClient::new(&start_server(store, &shutdown).await);

    assert!(client.latest_health().await.unwrap().is_none());
    let status = client.status().await.unwrap();
    assert_eq!(status.status, "operational");
    assert_eq!(status.services_reporting, 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_repeated_queries_are_identical_between_sweeps() {
    let addr = common::start_fixed_service(200, None).await;
    let store = ResultsStore::new();
    let mut monitor = startup::build_monitor(
        &fast_config(3),
        vec![ServiceDescriptor::new("api", addr.to_string())],
        store.clone(),
    );
    monitor.sweep().await;

    let shutdown = Shutdown::new();
    let client = MonitorClient::new(&start_server(store, &shutdown).await);

    let first = client.latest_health().await.unwrap();
    let second = client.latest_health().await.unwrap();
    assert_eq!(first, second);

    shutdown.trigger();
}
