// Snapshot refresh engine: owns the counter set, detects topology drift,
// retries transient refresh failures, folds readings into the snapshot.

mod fields;

use crate::counters::{Counter, CounterError, CounterProvider, CounterSet, ProcessLister, names};
use crate::models::ServerSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum time between topology drift checks. Process and counter-instance
/// enumeration is expensive next to a plain refresh, and topology changes
/// are infrequent; refreshes themselves are never throttled.
pub const DRIFT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Guarded refresh attempts before the final unguarded one.
const REFRESH_ATTEMPTS: usize = 5;

/// Settle time between a vanished-instance failure and the rebuild.
const RETRY_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("snapshot deadline exceeded")]
    DeadlineExceeded,
    #[error(transparent)]
    Counter(#[from] CounterError),
}

/// Aggregates host performance counters into a [`ServerSnapshot`].
///
/// Counter subscriptions are built lazily on first use and rebuilt when the
/// host's process topology drifts (checked at most once per drift interval).
/// Every call refreshes all counters and rewrites the snapshot wholesale, so
/// a returned snapshot always reflects a single counter-set generation.
pub struct SnapshotAggregator {
    provider: Arc<dyn CounterProvider>,
    processes: Arc<dyn ProcessLister>,
    drift_check_interval: Duration,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    counters: Option<CounterSet>,
    /// Sorted worker-process ids captured by the last initialize; also the
    /// source of the snapshot's process count.
    worker_pids: Vec<u32>,
    /// Sorted all-process ids captured by the last initialize.
    all_pids: Vec<u32>,
    server_counter_count: usize,
    last_calculation: Option<Instant>,
    snapshot: ServerSnapshot,
}

impl SnapshotAggregator {
    pub fn new(provider: Arc<dyn CounterProvider>, processes: Arc<dyn ProcessLister>) -> Self {
        Self::with_drift_interval(provider, processes, DRIFT_CHECK_INTERVAL)
    }

    pub fn with_drift_interval(
        provider: Arc<dyn CounterProvider>,
        processes: Arc<dyn ProcessLister>,
        drift_check_interval: Duration,
    ) -> Self {
        Self {
            provider,
            processes,
            drift_check_interval,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Refreshes all counters and returns the updated snapshot.
    ///
    /// Transient vanished-instance failures are absorbed by bounded retry;
    /// only non-recoverable provider errors (or the final retry's failure)
    /// surface. Concurrent callers are serialized.
    pub async fn get_snapshot(&self) -> Result<ServerSnapshot, MonitorError> {
        self.get_snapshot_with_deadline(None).await
    }

    /// As [`get_snapshot`](Self::get_snapshot), aborting before the next
    /// retry once `deadline` passes. An in-flight refresh always completes.
    pub async fn get_snapshot_with_deadline(
        &self,
        deadline: Option<Instant>,
    ) -> Result<ServerSnapshot, MonitorError> {
        let mut inner = self.inner.lock().await;
        self.calculate(&mut inner, deadline).await?;
        Ok(inner.snapshot.clone())
    }

    async fn calculate(&self, inner: &mut Inner, deadline: Option<Instant>) -> Result<(), MonitorError> {
        if inner.counters.is_none() {
            self.initialize(inner).await?;
        } else if inner
            .last_calculation
            .is_some_and(|t| t.elapsed() >= self.drift_check_interval)
            && self.has_changed(inner).await?
        {
            tracing::debug!(operation = "calculate", "host topology drifted; rebuilding");
            self.reset(inner).await?;
        }

        if inner.counters.as_ref().is_some_and(|set| !set.is_empty()) {
            self.query(inner, deadline).await?;
        }

        let mut snapshot = ServerSnapshot::default();
        if let Some(set) = &inner.counters {
            for counter in set.counters() {
                fields::accumulate(&mut snapshot, counter);
            }
        }
        snapshot.process_count = inner.worker_pids.len() as i64;
        snapshot.timestamp = now_millis();
        inner.snapshot = snapshot;
        inner.last_calculation = Some(Instant::now());
        Ok(())
    }

    /// Captures the process topology and builds the counter membership:
    /// memory and cache singletons, one counter group per worker process,
    /// and the per-site / per-worker-process server counters.
    async fn initialize(&self, inner: &mut Inner) -> Result<(), CounterError> {
        let mut worker_pids = self.processes.web_server_process_ids().await?;
        worker_pids.sort_unstable();
        let mut all_pids = self.processes.all_process_ids().await?;
        all_pids.sort_unstable();

        let server_counters = self.resolve_server_counters().await?;
        let server_counter_count = server_counters.len();

        let mut members = self.provider.singleton_counters(names::MEMORY).await?;
        members.extend(self.provider.singleton_counters(names::CACHE).await?);
        members.extend(self.provider.process_counters(&worker_pids).await?);
        members.extend(server_counters);

        tracing::debug!(
            operation = "initialize",
            counters = members.len(),
            worker_processes = worker_pids.len(),
            "counter set built"
        );
        inner.counters = Some(CounterSet::new(Arc::clone(&self.provider), members));
        inner.worker_pids = worker_pids;
        inner.all_pids = all_pids;
        inner.server_counter_count = server_counter_count;
        Ok(())
    }

    /// Cheap drift check. Process-id comparison is two-stage: a changed
    /// full-process set only counts when the worker set changed too, so
    /// short-lived unrelated processes never trigger a rebuild. The
    /// server-counter cardinality is compared independently, since a site
    /// can appear or disappear without any process change.
    async fn has_changed(&self, inner: &Inner) -> Result<bool, CounterError> {
        let mut all_pids = self.processes.all_process_ids().await?;
        all_pids.sort_unstable();
        if all_pids != inner.all_pids {
            let mut worker_pids = self.processes.web_server_process_ids().await?;
            worker_pids.sort_unstable();
            if worker_pids != inner.worker_pids {
                return Ok(true);
            }
        }

        let server_counter_count = self.resolve_server_counters().await?.len();
        Ok(server_counter_count != inner.server_counter_count)
    }

    async fn resolve_server_counters(&self) -> Result<Vec<Counter>, CounterError> {
        let mut counters = Vec::new();
        for category in [names::SITE, names::WORKER_PROCESS] {
            for instance in self.provider.instances(category).await? {
                counters.extend(self.provider.counters(category, &instance).await?);
            }
        }
        Ok(counters)
    }

    /// Drops the current counter set, then rebuilds from scratch. A failed
    /// initialize leaves no half-built set referenced.
    async fn reset(&self, inner: &mut Inner) -> Result<(), CounterError> {
        inner.counters = None;
        self.initialize(inner).await
    }

    /// Refresh with bounded retry. A vanished-instance failure means some
    /// counter lost a race against process or site churn: wait briefly,
    /// rebuild, try again. After the guarded attempts one final unguarded
    /// refresh runs; its failure reaches the caller and signals a
    /// non-transient problem.
    async fn query(&self, inner: &mut Inner, deadline: Option<Instant>) -> Result<(), MonitorError> {
        for attempt in 1..=REFRESH_ATTEMPTS {
            let Some(set) = inner.counters.as_mut() else {
                return Ok(());
            };
            match set.refresh().await {
                Ok(()) => return Ok(()),
                Err(CounterError::NotFound(counter)) => {
                    tracing::debug!(
                        operation = "query",
                        attempt,
                        counter = %counter,
                        "counter vanished during refresh; rebuilding"
                    );
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(MonitorError::DeadlineExceeded);
                    }
                    tokio::time::sleep(RETRY_DELAY).await;
                    self.reset(inner).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        match inner.counters.as_mut() {
            Some(set) => Ok(set.refresh().await?),
            None => Ok(()),
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
