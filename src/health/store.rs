//! Latest-result store shared between the monitor loop and the query API.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::health::result::HealthResult;

type Snapshot = HashMap<String, HealthResult>;

/// Most recent result per service.
///
/// The map is immutable behind an `ArcSwap`: a write builds the next map and
/// swaps it in, so readers always see a complete snapshot and never wait on
/// the writer. Cloning the store shares the same underlying map.
#[derive(Clone, Default)]
pub struct ResultsStore {
    inner: Arc<ArcSwap<Snapshot>>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `result.service_name()`.
    pub fn put(&self, result: HealthResult) {
        self.inner.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.insert(result.service_name().to_string(), result.clone());
            next
        });
    }

    /// All current results, sorted by service name.
    pub fn get_all(&self) -> Vec<HealthResult> {
        let snapshot = self.inner.load();
        let mut results: Vec<HealthResult> = snapshot.values().cloned().collect();
        results.sort_by(|a, b| a.service_name().cmp(b.service_name()));
        results
    }

    pub fn get(&self, service: &str) -> Option<HealthResult> {
        self.inner.load().get(service).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// True until the first check has completed.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}
