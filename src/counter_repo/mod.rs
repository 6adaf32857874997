// Host-backed counter provider via sysinfo

use crate::counters::{Counter, CounterError, CounterProvider, ProcessLister, names};
use crate::models::SystemInfo;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::instrument;

/// Per-process counters this host can read through sysinfo. Handle count,
/// private working set and page-fault rates are not exposed there, so those
/// counters are simply not resolved.
const PROCESS_COUNTERS: &[&str] = &[
    names::PERCENT_CPU,
    names::THREAD_COUNT,
    names::WORKING_SET,
    names::PRIVATE_BYTES,
    names::IO_READ_SEC,
    names::IO_WRITE_SEC,
];

const SITE_COUNTERS: &[&str] = &[
    names::BYTES_RECV_SEC,
    names::BYTES_SENT_SEC,
    names::CONNECTION_ATTEMPTS_SEC,
    names::TOTAL_CONNECTION_ATTEMPTS,
    names::TOTAL_METHOD_REQUESTS_SEC,
    names::TOTAL_OTHER_METHOD_REQUESTS_SEC,
    names::TOTAL_METHOD_REQUESTS,
    names::TOTAL_OTHER_METHOD_REQUESTS,
];

const WORKER_PROCESS_COUNTERS: &[&str] = &[names::ACTIVE_REQUESTS, names::PERCENT_500];

/// Counter provider and process lister backed by the live host.
///
/// Worker processes are classified by process name. The server-scoped
/// categories (Site, Worker Process, Cache) resolve to no instances when the
/// web server publishes no counters on this platform; the engine then
/// aggregates process and memory counters only.
pub struct CounterRepo {
    sys: Arc<Mutex<System>>,
    worker_process_name: String,
    last_read: Arc<Mutex<Option<Instant>>>,
}

impl CounterRepo {
    pub fn new(worker_process_name: impl Into<String>) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            worker_process_name: worker_process_name.into(),
            last_read: Arc::new(Mutex::new(None)),
        }
    }

    #[instrument(skip(self), fields(repo = "counter", operation = "get_system_info"))]
    pub async fn get_system_info(&self) -> anyhow::Result<SystemInfo> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            Ok(SystemInfo {
                os_family: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
                os_version: System::os_version().unwrap_or_default(),
                host_name: System::host_name().unwrap_or_default(),
                processor_name: sys
                    .cpus()
                    .first()
                    .map(|c| c.brand().to_string())
                    .unwrap_or_else(|| "Unknown".into()),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    fn lock_sys(sys: &Mutex<System>) -> Result<std::sync::MutexGuard<'_, System>, CounterError> {
        sys.lock()
            .map_err(|e| CounterError::Provider(format!("sysinfo lock poisoned: {}", e)))
    }

    async fn list_pids(&self, worker_only: bool) -> Result<Vec<u32>, CounterError> {
        let sys = self.sys.clone();
        let name = worker_only.then(|| self.worker_process_name.clone());
        tokio::task::spawn_blocking(move || {
            let mut sys = Self::lock_sys(&sys)?;
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let pids = sys
                .processes()
                .iter()
                .filter(|(_, p)| match &name {
                    Some(n) => p.name().to_string_lossy() == n.as_str(),
                    None => true,
                })
                .map(|(pid, _)| pid.as_u32())
                .collect();
            Ok(pids)
        })
        .await
        .map_err(|e| CounterError::Provider(format!("sysinfo task join: {}", e)))?
    }
}

#[async_trait]
impl ProcessLister for CounterRepo {
    async fn all_process_ids(&self) -> Result<Vec<u32>, CounterError> {
        self.list_pids(false).await
    }

    async fn web_server_process_ids(&self) -> Result<Vec<u32>, CounterError> {
        self.list_pids(true).await
    }
}

#[async_trait]
impl CounterProvider for CounterRepo {
    async fn instances(&self, _category: &str) -> Result<Vec<String>, CounterError> {
        // No web server counter namespace on this host.
        Ok(Vec::new())
    }

    async fn counters(
        &self,
        category: &str,
        instance: &str,
    ) -> Result<Vec<Counter>, CounterError> {
        let counter_names: &[&str] = match category {
            names::SITE => SITE_COUNTERS,
            names::WORKER_PROCESS => WORKER_PROCESS_COUNTERS,
            _ => &[],
        };
        Ok(counter_names
            .iter()
            .map(|name| Counter::new(category, *name, Some(instance.to_string())))
            .collect())
    }

    async fn singleton_counters(&self, category: &str) -> Result<Vec<Counter>, CounterError> {
        match category {
            names::MEMORY => Ok(vec![Counter::new(
                names::MEMORY,
                names::AVAILABLE_BYTES,
                None,
            )]),
            _ => Ok(Vec::new()),
        }
    }

    async fn process_counters(&self, pids: &[u32]) -> Result<Vec<Counter>, CounterError> {
        let mut counters = Vec::with_capacity(pids.len() * PROCESS_COUNTERS.len());
        for pid in pids {
            for name in PROCESS_COUNTERS {
                counters.push(Counter::new(
                    names::PROCESS,
                    *name,
                    Some(pid.to_string()),
                ));
            }
        }
        Ok(counters)
    }

    async fn read_values(&self, counters: &[Counter]) -> Result<Vec<i64>, CounterError> {
        let sys = self.sys.clone();
        let last_read = self.last_read.clone();
        let counters = counters.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut sys = Self::lock_sys(&sys)?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);

            let now = Instant::now();
            let elapsed_secs = {
                let mut guard = last_read
                    .lock()
                    .map_err(|e| CounterError::Provider(format!("baseline lock poisoned: {}", e)))?;
                let elapsed = guard.map(|t| now.duration_since(t).as_secs_f64());
                *guard = Some(now);
                elapsed
            };

            let mut values = Vec::with_capacity(counters.len());
            for counter in &counters {
                values.push(read_one(&sys, counter, elapsed_secs)?);
            }
            Ok(values)
        })
        .await
        .map_err(|e| CounterError::Provider(format!("sysinfo task join: {}", e)))?
    }
}

fn read_one(
    sys: &System,
    counter: &Counter,
    elapsed_secs: Option<f64>,
) -> Result<i64, CounterError> {
    match (counter.category(), counter.name()) {
        (names::MEMORY, names::AVAILABLE_BYTES) => Ok(sys.available_memory() as i64),
        (names::PROCESS, name) => {
            let instance = counter.instance().unwrap_or_default();
            let pid: u32 = instance.parse().map_err(|_| {
                CounterError::Provider(format!("bad process instance: {:?}", instance))
            })?;
            let process = sys.process(Pid::from_u32(pid)).ok_or_else(|| {
                CounterError::NotFound(format!("{}/{} ({})", names::PROCESS, name, instance))
            })?;
            let value = match name {
                names::PERCENT_CPU => process.cpu_usage().round() as i64,
                names::THREAD_COUNT => (1 + process.tasks().map(|t| t.len()).unwrap_or(0)) as i64,
                names::WORKING_SET => process.memory() as i64,
                names::PRIVATE_BYTES => process.virtual_memory() as i64,
                names::IO_READ_SEC => rate(process.disk_usage().read_bytes, elapsed_secs),
                names::IO_WRITE_SEC => rate(process.disk_usage().written_bytes, elapsed_secs),
                other => {
                    return Err(CounterError::Provider(format!(
                        "unreadable process counter: {}",
                        other
                    )));
                }
            };
            Ok(value)
        }
        (category, name) => Err(CounterError::Provider(format!(
            "unreadable counter: {}/{}",
            category, name
        ))),
    }
}

/// Bytes accumulated since the previous read, as a per-second rate.
/// The first read has no baseline and reports zero.
fn rate(bytes_since_last: u64, elapsed_secs: Option<f64>) -> i64 {
    match elapsed_secs {
        Some(secs) if secs > 0.0 => (bytes_since_last as f64 / secs) as i64,
        _ => 0,
    }
}
