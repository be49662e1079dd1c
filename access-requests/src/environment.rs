//! Injected dependencies for the requests reducer.

use access_core::environment::{Clock, IdGenerator, SystemClock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default prefix of generated request ids
pub const DEFAULT_ID_PREFIX: &str = "req-";

/// Default counter value; the first generated id is one past it
pub const DEFAULT_ID_START: u64 = 10_000;

/// Environment dependencies for the requests reducer and its store
#[derive(Clone)]
pub struct RequestsEnvironment {
    /// Clock for submission and resolution timestamps
    pub clock: Arc<dyn Clock>,
    /// Generator for new request ids
    pub ids: Arc<dyn IdGenerator>,
}

impl RequestsEnvironment {
    /// Creates a new environment
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    /// System clock and `req-10001`-style ids
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(SequentialRequestIds::default()))
    }
}

impl std::fmt::Debug for RequestsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestsEnvironment")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

/// Short sequential ids: `req-10001`, `req-10002`, ...
#[derive(Debug)]
pub struct SequentialRequestIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialRequestIds {
    /// Ids `{prefix}{start + 1}`, `{prefix}{start + 2}`, ...
    #[must_use]
    pub fn new(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(start),
        }
    }
}

impl Default for SequentialRequestIds {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX, DEFAULT_ID_START)
    }
}

impl IdGenerator for SequentialRequestIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{n}", self.prefix)
    }
}

/// Random ids: `{prefix}{uuid-v4}`
#[derive(Debug, Clone)]
pub struct UuidRequestIds {
    prefix: String,
}

impl UuidRequestIds {
    /// Creates a generator with the given prefix
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidRequestIds {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator for UuidRequestIds {
    fn next_id(&self) -> String {
        format!("{}{}", self.prefix, uuid::Uuid::new_v4())
    }
}
