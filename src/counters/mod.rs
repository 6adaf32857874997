// Abstract counter surface: handles, provider traits, refreshable sets

pub mod names;

use async_trait::async_trait;
use std::sync::Arc;

/// Errors from the counter subsystem. `NotFound` is the only retryable case:
/// the instance a counter was bound to vanished between resolution and read.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("counter instance not found: {0}")]
    NotFound(String),
    #[error("counter provider error: {0}")]
    Provider(String),
}

/// A readable metric handle identified by (category, name, instance).
/// `instance` is `None` for singleton categories; multi-instance categories
/// may also publish a `_Total` aggregate instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    category: String,
    name: String,
    instance: Option<String>,
    value: i64,
}

impl Counter {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        instance: Option<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            instance,
            value: 0,
        }
    }

    /// A handle carrying a known value, for providers that resolve and read
    /// in one step and for tests.
    pub fn with_value(
        category: impl Into<String>,
        name: impl Into<String>,
        instance: Option<String>,
        value: i64,
    ) -> Self {
        Self {
            value,
            ..Self::new(category, name, instance)
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Value from the last successful refresh.
    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Enumerates and resolves counters, and reads current values for a batch.
///
/// `read_values` must return one value per input counter, in order, or fail
/// the whole batch: `NotFound` when some counter's backing instance no longer
/// exists, `Provider` for anything non-retryable (permissions, subsystem
/// unavailable).
#[async_trait]
pub trait CounterProvider: Send + Sync {
    async fn instances(&self, category: &str) -> Result<Vec<String>, CounterError>;

    async fn counters(&self, category: &str, instance: &str)
    -> Result<Vec<Counter>, CounterError>;

    async fn singleton_counters(&self, category: &str) -> Result<Vec<Counter>, CounterError>;

    /// Resolves per-process counters for each of the given process ids.
    async fn process_counters(&self, pids: &[u32]) -> Result<Vec<Counter>, CounterError>;

    async fn read_values(&self, counters: &[Counter]) -> Result<Vec<i64>, CounterError>;
}

/// Enumerates host processes. Fails only on unrecoverable enumeration errors.
#[async_trait]
pub trait ProcessLister: Send + Sync {
    async fn all_process_ids(&self) -> Result<Vec<u32>, CounterError>;

    /// Process ids currently classified as web server worker processes.
    async fn web_server_process_ids(&self) -> Result<Vec<u32>, CounterError>;
}

/// Fixed-membership collection of counters refreshed together.
///
/// A refresh is all-or-nothing: values are committed only when the provider
/// read every member, so a failed refresh leaves the previous values intact.
pub struct CounterSet {
    provider: Arc<dyn CounterProvider>,
    counters: Vec<Counter>,
}

impl CounterSet {
    pub fn new(provider: Arc<dyn CounterProvider>, counters: Vec<Counter>) -> Self {
        Self { provider, counters }
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub async fn refresh(&mut self) -> Result<(), CounterError> {
        if self.counters.is_empty() {
            return Ok(());
        }
        let values = self.provider.read_values(&self.counters).await?;
        if values.len() != self.counters.len() {
            return Err(CounterError::Provider(format!(
                "provider returned {} values for {} counters",
                values.len(),
                self.counters.len()
            )));
        }
        for (counter, value) in self.counters.iter_mut().zip(values) {
            counter.value = value;
        }
        Ok(())
    }
}
