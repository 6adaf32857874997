// Background snapshot poller: samples the aggregator on a fixed cadence and
// broadcasts each snapshot to WebSocket subscribers.

use crate::models::ServerSnapshot;
use crate::monitor::SnapshotAggregator;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use tokio::sync::{broadcast, oneshot};
use tokio::time::{Duration, Instant, interval};

/// Rate limit for "no receivers" logging (avoid logging every tick when no one is on /ws/snapshot)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Aggregator, channel, and shutdown for the worker.
pub struct WorkerDeps {
    pub aggregator: Arc<SnapshotAggregator>,
    pub tx: broadcast::Sender<ServerSnapshot>,
    pub ws_connections: Arc<AtomicUsize>,
    pub snapshots_collected_total: Arc<AtomicU64>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        aggregator,
        tx,
        ws_connections,
        snapshots_collected_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_no_receivers_warn: Option<Instant> = None;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let snapshot = match aggregator.get_snapshot().await {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "get_snapshot",
                                "snapshot refresh failed"
                            );
                            continue;
                        }
                    };
                    snapshots_collected_total.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

                    if tx.send(snapshot).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_snapshot_clients =
                            ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                        snapshots_collected_total =
                            snapshots_collected_total.load(std::sync::atomic::Ordering::Relaxed),
                        "app stats"
                    );
                }
            }
        }
    })
}
