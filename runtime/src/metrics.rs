//! Prometheus metrics for observability and monitoring.
//!
//! Store-level metric names live here together with the recorder used by
//! binaries to expose them. Domain crates register their own descriptions
//! next to the code that records them.
//!
//! # Example
//!
//! ```rust,no_run
//! use access_runtime::metrics::PrometheusRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = PrometheusRecorder::install()?;
//!
//! // ... run the application ...
//!
//! println!("{}", recorder.render());
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Actions run by reducers, including those fed back by effects
pub const STORE_ACTIONS_PROCESSED: &str = "store_actions_processed_total";

/// Snapshots published by `Store::send` / `Store::send_all`
pub const STORE_SNAPSHOTS_PUBLISHED: &str = "store_snapshots_published_total";

/// Batches discarded because of a reducer feedback loop
pub const STORE_FEEDBACK_LIMIT_EXCEEDED: &str = "store_feedback_limit_exceeded_total";

/// Observers currently subscribed to a store
pub const STORE_OBSERVERS: &str = "store_observers";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Prometheus recorder without an HTTP listener.
///
/// Installs the global recorder and renders the exposition format on demand,
/// which is all an in-process library needs.
pub struct PrometheusRecorder {
    handle: PrometheusHandle,
}

impl PrometheusRecorder {
    /// Install the global Prometheus recorder and register metric descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Install`] if a global recorder is already
    /// installed (only one may exist per process).
    pub fn install() -> Result<Self, MetricsError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        register_metrics();
        tracing::info!("Prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Render current metrics in Prometheus format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Register store metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        STORE_ACTIONS_PROCESSED,
        "Total number of actions processed by store reducers"
    );
    describe_counter!(
        STORE_SNAPSHOTS_PUBLISHED,
        "Total number of state snapshots published"
    );
    describe_counter!(
        STORE_FEEDBACK_LIMIT_EXCEEDED,
        "Total number of batches discarded by the feedback bound"
    );
    describe_gauge!(STORE_OBSERVERS, "Observers currently subscribed to a store");
}
