//! The monitor loop.
//!
//! # Responsibilities
//! - Sweep every configured service in order, then sleep a fixed interval
//! - Feed each result to the failure tracker and the results store
//! - Emit one check record per service and alert events on transitions
//! - Contain probe faults to the descriptor that raised them

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::ServiceDescriptor;
use crate::health::prober::Prober;
use crate::health::result::HealthResult;
use crate::health::store::ResultsStore;
use crate::health::tracker::{AlertEvent, FailureTracker};
use crate::observability::metrics;

const ALERT_CHANNEL_CAPACITY: usize = 256;

/// What a single sweep did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    /// Services whose result was recorded, in sweep order.
    pub checked: Vec<String>,
    /// Services skipped because the probe itself failed.
    pub faults: Vec<String>,
    /// Alert events raised during the sweep, in order.
    pub alerts: Vec<AlertEvent>,
}

/// Periodically probes all services and records the outcome.
pub struct HealthMonitor {
    services: Vec<ServiceDescriptor>,
    prober: Arc<dyn Prober>,
    tracker: FailureTracker,
    store: ResultsStore,
    interval: Duration,
    alerts: broadcast::Sender<AlertEvent>,
}

impl HealthMonitor {
    pub fn new(
        services: Vec<ServiceDescriptor>,
        prober: Arc<dyn Prober>,
        store: ResultsStore,
        interval: Duration,
        alert_threshold: u32,
    ) -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

        Self {
            services,
            prober,
            tracker: FailureTracker::new(alert_threshold),
            store,
            interval,
            alerts,
        }
    }

    /// A read handle on the store this monitor writes to.
    pub fn store(&self) -> ResultsStore {
        self.store.clone()
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    /// Receive every alert event raised after this call.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<AlertEvent> {
        self.alerts.subscribe()
    }

    /// Sweep, sleep, repeat until shutdown is signalled.
    ///
    /// Shutdown is observed between sweeps; a sweep in progress completes.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            services = self.services.len(),
            interval = ?self.interval,
            threshold = self.tracker.threshold(),
            "Health monitor starting"
        );

        loop {
            let report = self.sweep().await;
            tracing::debug!(
                checked = report.checked.len(),
                faults = report.faults.len(),
                alerts = report.alerts.len(),
                "Sweep complete"
            );

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Check every service once, in configuration order.
    pub async fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();

        for service in &self.services {
            let outcome = AssertUnwindSafe(self.prober.probe(service))
                .catch_unwind()
                .await;

            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::error!(
                        service = %service.name,
                        address = %service.address,
                        error = %e,
                        "Error checking service, skipping this sweep"
                    );
                    metrics::record_fault(&service.name);
                    report.faults.push(service.name.clone());
                    continue;
                }
                Err(panic) => {
                    tracing::error!(
                        service = %service.name,
                        address = %service.address,
                        panic = %panic_message(panic.as_ref()),
                        "Probe panicked, skipping this sweep"
                    );
                    metrics::record_fault(&service.name);
                    report.faults.push(service.name.clone());
                    continue;
                }
            };

            if let Some(event) = self.tracker.observe(&result) {
                log_alert(&event);
                metrics::record_alert(&event);
                let _ = self.alerts.send(event.clone());
                report.alerts.push(event);
            }

            metrics::record_check(&result, self.tracker.consecutive_failures(&service.name));
            log_check(&result);

            self.store.put(result);
            report.checked.push(service.name.clone());
        }

        report
    }
}

fn log_check(result: &HealthResult) {
    tracing::info!(
        service = %result.service_name(),
        status = result.status_code(),
        latency_ms = result.latency_ms(),
        available = result.is_available(),
        version_match = result.version_match(),
        "Checked service"
    );
}

fn log_alert(event: &AlertEvent) {
    match event {
        AlertEvent::Critical {
            service,
            failures,
            status_code,
        } => tracing::error!(
            service = %service,
            failures,
            status = status_code,
            "CRITICAL INCIDENT: {} has failed {} consecutive times, immediate attention required",
            service,
            failures
        ),
        AlertEvent::Continuing { service, failures } => tracing::error!(
            service = %service,
            failures,
            "Continuing incident: {} still down",
            service
        ),
        AlertEvent::Recovery { service, failures } => tracing::warn!(
            service = %service,
            failures,
            "RECOVERY: {} recovered after {} consecutive failures",
            service,
            failures
        ),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::prober::ProbeError;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    enum Step {
        Status(u16),
        Fault,
        Panic,
    }

    /// Replays a scripted sequence of outcomes per service; healthy once exhausted.
    #[derive(Default)]
    struct ScriptedProber {
        scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    }

    impl ScriptedProber {
        fn with(self, service: &str, steps: Vec<Step>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(service.to_string(), steps.into());
            self
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, service: &ServiceDescriptor) -> Result<HealthResult, ProbeError> {
            let step = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&service.name)
                .and_then(|steps| steps.pop_front())
                .unwrap_or(Step::Status(200));

            match step {
                Step::Status(code) => Ok(HealthResult::new(service, code, 1.0, None)),
                Step::Fault => Err(ProbeError::UnsupportedScheme("gopher".into())),
                Step::Panic => panic!("probe defect for {}", service.name),
            }
        }
    }

    fn services(names: &[&str]) -> Vec<ServiceDescriptor> {
        names
            .iter()
            .map(|n| ServiceDescriptor::new(*n, "127.0.0.1:1"))
            .collect()
    }

    fn monitor(names: &[&str], prober: ScriptedProber) -> HealthMonitor {
        HealthMonitor::new(
            services(names),
            Arc::new(prober),
            ResultsStore::new(),
            Duration::from_millis(10),
            3,
        )
    }

    #[tokio::test]
    async fn test_sweep_records_every_service_in_order() {
        let mut monitor = monitor(&["c", "a", "b"], ScriptedProber::default());
        let report = monitor.sweep().await;

        assert_eq!(report.checked, vec!["c", "a", "b"]);
        assert!(report.faults.is_empty());
        assert_eq!(monitor.store().len(), 3);
    }

    #[tokio::test]
    async fn test_incident_alerts_across_sweeps() {
        let prober = ScriptedProber::default().with(
            "api",
            vec![
                Step::Status(503),
                Step::Status(503),
                Step::Status(503),
                Step::Status(500),
                Step::Status(502),
                Step::Status(200),
            ],
        );
        let mut monitor = monitor(&["api"], prober);
        let mut alerts = monitor.subscribe_alerts();

        let mut kinds = Vec::new();
        for _ in 0..7 {
            let report = monitor.sweep().await;
            kinds.push(report.alerts.first().map(|e| e.kind()));
        }

        assert_eq!(
            kinds,
            vec![
                None,
                None,
                Some("critical"),
                Some("continuing"),
                Some("continuing"),
                Some("recovery"),
                None,
            ]
        );

        let first = alerts.recv().await.unwrap();
        assert_eq!(
            first,
            AlertEvent::Critical {
                service: "api".into(),
                failures: 3,
                status_code: 503
            }
        );
    }

    #[tokio::test]
    async fn test_fault_skips_only_the_faulty_service() {
        let prober = ScriptedProber::default()
            .with("b", vec![Step::Fault])
            .with("c", vec![Step::Status(503)]);
        let mut monitor = monitor(&["a", "b", "c"], prober);

        let report = monitor.sweep().await;
        assert_eq!(report.checked, vec!["a", "c"]);
        assert_eq!(report.faults, vec!["b"]);

        let store = monitor.store();
        assert!(store.get("a").unwrap().is_available());
        assert!(store.get("b").is_none());
        assert!(!store.get("c").unwrap().is_available());
        assert_eq!(monitor.tracker().consecutive_failures("b"), 0);
    }

    #[tokio::test]
    async fn test_panicking_probe_does_not_abort_sweep() {
        let prober = ScriptedProber::default().with("b", vec![Step::Panic]);
        let mut monitor = monitor(&["a", "b", "c"], prober);

        let report = monitor.sweep().await;
        assert_eq!(report.checked, vec!["a", "c"]);
        assert_eq!(report.faults, vec!["b"]);

        // The next sweep probes it normally again.
        let report = monitor.sweep().await;
        assert_eq!(report.checked, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fault_does_not_reset_streak() {
        let prober = ScriptedProber::default().with(
            "api",
            vec![Step::Status(503), Step::Status(503), Step::Fault, Step::Status(503)],
        );
        let mut monitor = monitor(&["api"], prober);

        for _ in 0..3 {
            assert!(monitor.sweep().await.alerts.is_empty());
        }
        assert_eq!(monitor.tracker().consecutive_failures("api"), 2);

        let report = monitor.sweep().await;
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].kind(), "critical");
    }

    #[tokio::test]
    async fn test_empty_service_set_writes_nothing() {
        let mut monitor = monitor(&[], ScriptedProber::default());
        let report = monitor.sweep().await;

        assert_eq!(report, SweepReport::default());
        assert!(monitor.store().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let monitor = monitor(&["a"], ScriptedProber::default());
        let store = monitor.store();
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(monitor.run(rx));
        time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
        assert!(store.get("a").is_some());
    }

    struct CountingProber(std::sync::atomic::AtomicUsize);

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, service: &ServiceDescriptor) -> Result<HealthResult, ProbeError> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(HealthResult::new(service, 200, 1.0, None))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_full_interval_between_sweeps() {
        use std::sync::atomic::Ordering;

        let prober = Arc::new(CountingProber(Default::default()));
        let monitor = HealthMonitor::new(
            services(&["a"]),
            prober.clone(),
            ResultsStore::new(),
            Duration::from_secs(60),
            3,
        );
        let (_tx, rx) = broadcast::channel(1);
        tokio::spawn(monitor.run(rx));

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(prober.0.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(58)).await;
        assert_eq!(prober.0.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(prober.0.load(Ordering::SeqCst), 2);
    }
}
