// Aggregated server snapshot model

use serde::{Deserialize, Serialize};

/// Point-in-time health snapshot of the web server host.
///
/// Every field is rewritten wholesale on each successful aggregation pass,
/// so a value set always comes from a single counter-set generation.
/// Multi-instance counters (per site, per worker process) are summed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSnapshot {
    /// Wall-clock milliseconds of the aggregation pass.
    pub timestamp: u64,

    // Site traffic
    pub bytes_sent_sec: i64,
    pub bytes_recv_sec: i64,
    pub connection_attempts_sec: i64,
    pub total_connection_attempts: i64,
    pub requests_sec: i64,
    pub total_requests: i64,

    // Worker process requests
    pub active_requests: i64,
    pub percent_500: i64,

    // Worker process resources (summed across all worker processes)
    pub percent_cpu_time: i64,
    pub handle_count: i64,
    pub private_bytes: i64,
    pub thread_count: i64,
    pub private_working_set: i64,
    pub working_set: i64,
    pub io_read_sec: i64,
    pub io_write_sec: i64,
    pub page_faults_sec: i64,

    // System memory
    pub available_memory: i64,

    // File cache
    pub file_cache_memory_usage: i64,
    pub current_files_cached: i64,
    pub total_files_cached: i64,
    pub file_cache_hits: i64,
    pub file_cache_misses: i64,

    // URI cache
    pub current_uris_cached: i64,
    pub total_uris_cached: i64,
    pub uri_cache_hits: i64,
    pub uri_cache_misses: i64,

    // Output cache
    pub output_cache_current_items: i64,
    pub output_cache_current_memory_usage: i64,
    pub output_cache_total_hits: i64,
    pub output_cache_total_misses: i64,

    /// Worker processes recorded at the most recent counter-set build.
    pub process_count: i64,
}
