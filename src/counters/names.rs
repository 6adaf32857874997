// Counter namespace: categories, counter names, aggregate instance

/// Per-site traffic counters (multi-instance, one per site).
pub const SITE: &str = "Site";
/// Per-worker-process request counters (multi-instance).
pub const WORKER_PROCESS: &str = "Worker Process";
/// Per-process resource counters (multi-instance, one per OS process).
pub const PROCESS: &str = "Process";
/// System memory counters (singleton).
pub const MEMORY: &str = "Memory";
/// Content cache counters (singleton).
pub const CACHE: &str = "Cache";

/// Aggregate instance published by multi-instance categories.
pub const TOTAL_INSTANCE: &str = "_Total";

// Site
pub const BYTES_RECV_SEC: &str = "Bytes Received/sec";
pub const BYTES_SENT_SEC: &str = "Bytes Sent/sec";
pub const CONNECTION_ATTEMPTS_SEC: &str = "Connection Attempts/sec";
pub const TOTAL_CONNECTION_ATTEMPTS: &str = "Total Connection Attempts";
pub const TOTAL_METHOD_REQUESTS_SEC: &str = "Total Method Requests/sec";
pub const TOTAL_OTHER_METHOD_REQUESTS_SEC: &str = "Total Other Method Requests/sec";
pub const TOTAL_METHOD_REQUESTS: &str = "Total Method Requests";
pub const TOTAL_OTHER_METHOD_REQUESTS: &str = "Total Other Method Requests";

// Worker Process
pub const ACTIVE_REQUESTS: &str = "Active Requests";
pub const PERCENT_500: &str = "% 500 HTTP Response Sent";

// Process
pub const PERCENT_CPU: &str = "% Processor Time";
pub const HANDLE_COUNT: &str = "Handle Count";
pub const PRIVATE_BYTES: &str = "Private Bytes";
pub const THREAD_COUNT: &str = "Thread Count";
pub const PRIVATE_WORKING_SET: &str = "Working Set - Private";
pub const WORKING_SET: &str = "Working Set";
pub const IO_READ_SEC: &str = "IO Read Bytes/sec";
pub const IO_WRITE_SEC: &str = "IO Write Bytes/sec";
pub const PAGE_FAULTS_SEC: &str = "Page Faults/sec";

// Memory
pub const AVAILABLE_BYTES: &str = "Available Bytes";

// Cache
pub const FILE_CACHE_MEMORY_USAGE: &str = "Current File Cache Memory Usage";
pub const CURRENT_FILES_CACHED: &str = "Current Files Cached";
pub const TOTAL_FILES_CACHED: &str = "Total Files Cached";
pub const FILE_CACHE_HITS: &str = "File Cache Hits";
pub const FILE_CACHE_MISSES: &str = "File Cache Misses";
pub const CURRENT_URIS_CACHED: &str = "Current URIs Cached";
pub const TOTAL_URIS_CACHED: &str = "Total URIs Cached";
pub const URI_CACHE_HITS: &str = "URI Cache Hits";
pub const URI_CACHE_MISSES: &str = "URI Cache Misses";
pub const OUTPUT_CACHE_CURRENT_ITEMS: &str = "Output Cache Current Items";
pub const OUTPUT_CACHE_CURRENT_MEMORY_USAGE: &str = "Output Cache Current Memory Usage";
pub const OUTPUT_CACHE_TOTAL_HITS: &str = "Output Cache Total Hits";
pub const OUTPUT_CACHE_TOTAL_MISSES: &str = "Output Cache Total Misses";
