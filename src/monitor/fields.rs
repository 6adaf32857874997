// Pure fold of counter readings into snapshot fields.
// Orchestration (refresh, rebuild, retry) stays in monitor::mod.

use crate::counters::{Counter, names};
use crate::models::ServerSnapshot;

/// Folds one counter reading into the snapshot.
///
/// Values are additive across instances: per-site and per-worker-process
/// counters (including a `_Total` instance, if published) sum into the same
/// field. Unmapped (category, name) pairs are ignored.
pub fn accumulate(snapshot: &mut ServerSnapshot, counter: &Counter) {
    if let Some(field) = target(snapshot, counter.category(), counter.name()) {
        *field += counter.value();
    }
}

/// The (category, counter name) -> field mapping table.
/// The two method-request counters fan into one field, for both the
/// per-second and the cumulative variant.
fn target<'a>(
    snapshot: &'a mut ServerSnapshot,
    category: &str,
    name: &str,
) -> Option<&'a mut i64> {
    use names::*;
    Some(match (category, name) {
        (SITE, BYTES_SENT_SEC) => &mut snapshot.bytes_sent_sec,
        (SITE, BYTES_RECV_SEC) => &mut snapshot.bytes_recv_sec,
        (SITE, CONNECTION_ATTEMPTS_SEC) => &mut snapshot.connection_attempts_sec,
        (SITE, TOTAL_CONNECTION_ATTEMPTS) => &mut snapshot.total_connection_attempts,
        (SITE, TOTAL_METHOD_REQUESTS_SEC) | (SITE, TOTAL_OTHER_METHOD_REQUESTS_SEC) => {
            &mut snapshot.requests_sec
        }
        (SITE, TOTAL_METHOD_REQUESTS) | (SITE, TOTAL_OTHER_METHOD_REQUESTS) => {
            &mut snapshot.total_requests
        }

        (WORKER_PROCESS, ACTIVE_REQUESTS) => &mut snapshot.active_requests,
        (WORKER_PROCESS, PERCENT_500) => &mut snapshot.percent_500,

        (PROCESS, PERCENT_CPU) => &mut snapshot.percent_cpu_time,
        (PROCESS, HANDLE_COUNT) => &mut snapshot.handle_count,
        (PROCESS, PRIVATE_BYTES) => &mut snapshot.private_bytes,
        (PROCESS, THREAD_COUNT) => &mut snapshot.thread_count,
        (PROCESS, PRIVATE_WORKING_SET) => &mut snapshot.private_working_set,
        (PROCESS, WORKING_SET) => &mut snapshot.working_set,
        (PROCESS, IO_READ_SEC) => &mut snapshot.io_read_sec,
        (PROCESS, IO_WRITE_SEC) => &mut snapshot.io_write_sec,
        (PROCESS, PAGE_FAULTS_SEC) => &mut snapshot.page_faults_sec,

        (MEMORY, AVAILABLE_BYTES) => &mut snapshot.available_memory,

        (CACHE, FILE_CACHE_MEMORY_USAGE) => &mut snapshot.file_cache_memory_usage,
        (CACHE, CURRENT_FILES_CACHED) => &mut snapshot.current_files_cached,
        (CACHE, TOTAL_FILES_CACHED) => &mut snapshot.total_files_cached,
        (CACHE, FILE_CACHE_HITS) => &mut snapshot.file_cache_hits,
        (CACHE, FILE_CACHE_MISSES) => &mut snapshot.file_cache_misses,
        (CACHE, CURRENT_URIS_CACHED) => &mut snapshot.current_uris_cached,
        (CACHE, TOTAL_URIS_CACHED) => &mut snapshot.total_uris_cached,
        (CACHE, URI_CACHE_HITS) => &mut snapshot.uri_cache_hits,
        (CACHE, URI_CACHE_MISSES) => &mut snapshot.uri_cache_misses,
        (CACHE, OUTPUT_CACHE_CURRENT_ITEMS) => &mut snapshot.output_cache_current_items,
        (CACHE, OUTPUT_CACHE_CURRENT_MEMORY_USAGE) => {
            &mut snapshot.output_cache_current_memory_usage
        }
        (CACHE, OUTPUT_CACHE_TOTAL_HITS) => &mut snapshot.output_cache_total_hits,
        (CACHE, OUTPUT_CACHE_TOTAL_MISSES) => &mut snapshot.output_cache_total_misses,

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(category: &str, name: &str, instance: &str, value: i64) -> Counter {
        Counter::with_value(category, name, Some(instance.to_string()), value)
    }

    #[test]
    fn sums_across_instances() {
        let mut snapshot = ServerSnapshot::default();
        for value in [10, 20, 7] {
            accumulate(
                &mut snapshot,
                &counter(names::PROCESS, names::HANDLE_COUNT, "worker", value),
            );
        }
        assert_eq!(snapshot.handle_count, 37);
    }

    #[test]
    fn method_request_counters_fan_into_one_field() {
        let mut snapshot = ServerSnapshot::default();
        accumulate(
            &mut snapshot,
            &counter(names::SITE, names::TOTAL_METHOD_REQUESTS_SEC, "site-a", 5),
        );
        accumulate(
            &mut snapshot,
            &counter(
                names::SITE,
                names::TOTAL_OTHER_METHOD_REQUESTS_SEC,
                "site-a",
                2,
            ),
        );
        assert_eq!(snapshot.requests_sec, 7);
    }

    #[test]
    fn total_instance_sums_like_any_other() {
        let mut snapshot = ServerSnapshot::default();
        accumulate(
            &mut snapshot,
            &counter(names::SITE, names::CONNECTION_ATTEMPTS_SEC, "site-a", 3),
        );
        accumulate(
            &mut snapshot,
            &counter(
                names::SITE,
                names::CONNECTION_ATTEMPTS_SEC,
                names::TOTAL_INSTANCE,
                3,
            ),
        );
        assert_eq!(snapshot.connection_attempts_sec, 6);
    }

    #[test]
    fn unmapped_pairs_are_ignored() {
        let mut snapshot = ServerSnapshot::default();
        accumulate(&mut snapshot, &counter(names::SITE, "Unknown Counter", "x", 99));
        accumulate(&mut snapshot, &counter("Unknown Category", names::BYTES_SENT_SEC, "x", 99));
        assert_eq!(snapshot, ServerSnapshot::default());
    }
}
