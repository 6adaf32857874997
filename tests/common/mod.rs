// Shared test helpers: a scriptable in-memory counter host.

use async_trait::async_trait;
use servermon::counters::{Counter, CounterError, CounterProvider, ProcessLister, names};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub type CounterKey = (String, String, Option<String>);

pub fn key(category: &str, name: &str, instance: Option<&str>) -> CounterKey {
    (
        category.to_string(),
        name.to_string(),
        instance.map(str::to_string),
    )
}

/// How `read_values` behaves on the next calls.
#[derive(Default)]
pub struct FailMode {
    /// Fail this many reads with the vanished-instance condition, then succeed.
    pub not_found_remaining: usize,
    /// Fail every read with the vanished-instance condition.
    pub always_not_found: bool,
    /// Fail every read with a non-retryable provider error.
    pub fatal: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub all_pids: Vec<u32>,
    pub worker_pids: Vec<u32>,
    /// The counter namespace and current values; keys double as the resolvable topology.
    pub values: BTreeMap<CounterKey, i64>,
    pub fail: FailMode,
}

/// In-memory counter provider + process lister. The `values` map is the
/// topology: resolution enumerates its keys, reads look values up, and
/// removing a key simulates an instance vanishing.
#[derive(Default)]
pub struct MockHost {
    pub state: Mutex<MockState>,
    /// `read_values` invocations (one per CounterSet refresh attempt).
    pub read_calls: AtomicUsize,
    /// `process_counters` invocations (one per initialize, so resets count here).
    pub build_calls: AtomicUsize,
}

impl MockHost {
    pub fn new(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessLister for MockHost {
    async fn all_process_ids(&self) -> Result<Vec<u32>, CounterError> {
        Ok(self.state.lock().unwrap().all_pids.clone())
    }

    async fn web_server_process_ids(&self) -> Result<Vec<u32>, CounterError> {
        Ok(self.state.lock().unwrap().worker_pids.clone())
    }
}

#[async_trait]
impl CounterProvider for MockHost {
    async fn instances(&self, category: &str) -> Result<Vec<String>, CounterError> {
        let state = self.state.lock().unwrap();
        let mut instances: Vec<String> = state
            .values
            .keys()
            .filter(|(c, _, i)| c == category && i.is_some())
            .filter_map(|(_, _, i)| i.clone())
            .collect();
        instances.sort();
        instances.dedup();
        Ok(instances)
    }

    async fn counters(
        &self,
        category: &str,
        instance: &str,
    ) -> Result<Vec<Counter>, CounterError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .values
            .keys()
            .filter(|(c, _, i)| c == category && i.as_deref() == Some(instance))
            .map(|(c, n, i)| Counter::new(c.clone(), n.clone(), i.clone()))
            .collect())
    }

    async fn singleton_counters(&self, category: &str) -> Result<Vec<Counter>, CounterError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .values
            .keys()
            .filter(|(c, _, i)| c == category && i.is_none())
            .map(|(c, n, i)| Counter::new(c.clone(), n.clone(), i.clone()))
            .collect())
    }

    async fn process_counters(&self, pids: &[u32]) -> Result<Vec<Counter>, CounterError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut counters = Vec::new();
        for pid in pids {
            let instance = pid.to_string();
            counters.extend(
                state
                    .values
                    .keys()
                    .filter(|(c, _, i)| {
                        c == names::PROCESS && i.as_deref() == Some(instance.as_str())
                    })
                    .map(|(c, n, i)| Counter::new(c.clone(), n.clone(), i.clone())),
            );
        }
        Ok(counters)
    }

    async fn read_values(&self, counters: &[Counter]) -> Result<Vec<i64>, CounterError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fail.fatal {
            return Err(CounterError::Provider(message.clone()));
        }
        if state.fail.always_not_found {
            return Err(CounterError::NotFound("scripted".into()));
        }
        if state.fail.not_found_remaining > 0 {
            state.fail.not_found_remaining -= 1;
            return Err(CounterError::NotFound("scripted".into()));
        }
        counters
            .iter()
            .map(|c| {
                let k = key(c.category(), c.name(), c.instance());
                state
                    .values
                    .get(&k)
                    .copied()
                    .ok_or_else(|| CounterError::NotFound(format!("{:?}", k)))
            })
            .collect()
    }
}
