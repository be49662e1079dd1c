//! # Access Runtime
//!
//! Runtime implementation for the access-request workflow.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the current state snapshot, runs the reducer, executes
//!   feedback effects and notifies observers
//! - **Snapshots**: Every `send` publishes a fresh `Arc<S>`; readers holding
//!   an older snapshot keep seeing it unchanged
//! - **Observers**: Callbacks invoked once per published snapshot
//!
//! Everything runs synchronously on the caller's thread. Mutation requires
//! `&mut Store`, so writes are serialized by ownership rather than by locks.
//!
//! ## Example
//!
//! ```ignore
//! use access_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use access_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;

/// Metric names and Prometheus recorder
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The reducer kept feeding actions back past the configured bound
        ///
        /// The batch is discarded and the previous snapshot stays current.
        /// This indicates a reducer that dispatches itself in a cycle.
        #[error("Feedback limit of {limit} actions exceeded in a single send")]
        FeedbackLimitExceeded {
            /// Configured `StoreConfig::max_feedback_actions`
            limit: usize,
        },
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use access_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_max_feedback_actions(64);
/// assert_eq!(config.max_feedback_actions, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of actions fed back by effects within one `send`
    pub max_feedback_actions: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(max_feedback_actions: usize) -> Self {
        Self {
            max_feedback_actions,
        }
    }

    /// Set the feedback bound
    #[must_use]
    pub const fn with_max_feedback_actions(mut self, max: usize) -> Self {
        self.max_feedback_actions = max;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_feedback_actions: 1024,
        }
    }
}

/// Handle returned by [`store::Store::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with the new state and its version after every publish
pub type Observer<S> = Box<dyn FnMut(&S, u64) + Send>;

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Effect, Observer, Reducer, StoreConfig, StoreError, SubscriptionId, VecDeque};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (an immutable `Arc<S>` snapshot, replaced on every send)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Feedback effects (`Effect::Dispatch`), drained before publishing
    /// 5. Observers, notified once per published snapshot
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut store = Store::new(
    ///     RequestsState::default(),
    ///     RequestsReducer::new(),
    ///     RequestsEnvironment::production(),
    /// );
    ///
    /// store.send(RequestsAction::UpdateRequestStatus {
    ///     request_id,
    ///     status: ItemStatus::Approved,
    ///     approved_at: None,
    /// })?;
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        snapshot: Arc<S>,
        version: u64,
        reducer: R,
        environment: E,
        config: StoreConfig,
        observers: Vec<(SubscriptionId, Observer<S>)>,
        next_subscription: u64,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: Clone,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`]. The initial snapshot has version 0.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with a custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            Self {
                snapshot: Arc::new(initial_state),
                version: 0,
                reducer,
                environment,
                config,
                observers: Vec::new(),
                next_subscription: 0,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer, drains any feedback effects, then publishes the
        /// resulting state as a new snapshot and notifies observers.
        ///
        /// # Returns
        ///
        /// The version of the newly published snapshot.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if the reducer feeds
        /// back more actions than the configured bound. Nothing is published
        /// in that case.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub fn send(&mut self, action: A) -> Result<u64, StoreError> {
            self.send_all(std::iter::once(action))
        }

        /// Send a batch of actions, publishing a single snapshot for all of them
        ///
        /// Either every action (and every action fed back by effects) is
        /// applied and one snapshot is published, or the batch is discarded.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if effects feed back
        /// more actions than the configured bound.
        pub fn send_all<I>(&mut self, actions: I) -> Result<u64, StoreError>
        where
            I: IntoIterator<Item = A>,
        {
            let mut queue: VecDeque<A> = actions.into_iter().collect();
            let submitted = queue.len();
            let limit = self.config.max_feedback_actions;

            let mut working = S::clone(&self.snapshot);
            let mut processed = 0_usize;

            while let Some(action) = queue.pop_front() {
                processed += 1;
                if processed > submitted.saturating_add(limit) {
                    tracing::error!(limit, submitted, "Reducer feedback limit exceeded, batch discarded");
                    metrics::counter!(super::metrics::STORE_FEEDBACK_LIMIT_EXCEEDED).increment(1);
                    return Err(StoreError::FeedbackLimitExceeded { limit });
                }

                let effects = self.reducer.reduce(&mut working, action, &self.environment);
                for effect in effects {
                    enqueue(effect, &mut queue);
                }
            }

            metrics::counter!(super::metrics::STORE_ACTIONS_PROCESSED).increment(processed as u64);
            Ok(self.publish(working))
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let request_count = store.state(|s| s.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.snapshot)
        }

        /// The current snapshot
        ///
        /// Cheap to clone and never mutated; a later `send` replaces the
        /// store's snapshot without touching this one.
        #[must_use]
        pub fn snapshot(&self) -> Arc<S> {
            Arc::clone(&self.snapshot)
        }

        /// Version of the current snapshot, incremented on every publish
        #[must_use]
        pub const fn version(&self) -> u64 {
            self.version
        }

        /// Injected dependencies
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Active configuration
        #[must_use]
        pub const fn config(&self) -> StoreConfig {
            self.config
        }

        /// Register an observer called after every published snapshot
        pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
        where
            F: FnMut(&S, u64) + Send + 'static,
        {
            let id = SubscriptionId(self.next_subscription);
            self.next_subscription += 1;
            self.observers.push((id, Box::new(observer)));
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!(super::metrics::STORE_OBSERVERS).set(self.observers.len() as f64);
            id
        }

        /// Remove an observer; returns `false` if it was not registered
        pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
            let before = self.observers.len();
            self.observers.retain(|(existing, _)| *existing != id);
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!(super::metrics::STORE_OBSERVERS).set(self.observers.len() as f64);
            self.observers.len() != before
        }

        fn publish(&mut self, state: S) -> u64 {
            self.snapshot = Arc::new(state);
            self.version += 1;
            metrics::counter!(super::metrics::STORE_SNAPSHOTS_PUBLISHED).increment(1);
            tracing::trace!(version = self.version, observers = self.observers.len(), "Snapshot published");

            for (_, observer) in &mut self.observers {
                observer(&self.snapshot, self.version);
            }
            self.version
        }
    }

    fn enqueue<A>(effect: Effect<A>, queue: &mut VecDeque<A>) {
        match effect {
            Effect::None => {},
            Effect::Sequential(effects) => {
                for effect in effects {
                    enqueue(effect, queue);
                }
            },
            Effect::Dispatch(action) => queue.push_back(*action),
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use access_core::{smallvec, SmallVec};
    use std::sync::Mutex;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct TallyState {
        total: i64,
        log: Vec<i64>,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        Add(i64),
        /// Adds each amount through feedback
        Spread(Vec<i64>),
        /// Dispatches itself forever
        Loop,
    }

    #[derive(Clone)]
    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = TallyState;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TallyAction::Add(amount) => {
                    state.total += amount;
                    state.log.push(amount);
                    SmallVec::new()
                },
                TallyAction::Spread(amounts) => smallvec![Effect::chain(
                    amounts.into_iter().map(|a| Effect::dispatch(TallyAction::Add(a))).collect()
                )],
                TallyAction::Loop => smallvec![Effect::dispatch(TallyAction::Loop)],
            }
        }
    }

    fn store() -> Store<TallyState, TallyAction, (), TallyReducer> {
        Store::new(TallyState::default(), TallyReducer, ())
    }

    #[test]
    fn send_publishes_new_version() {
        let mut store = store();
        assert_eq!(store.version(), 0);

        assert_eq!(store.send(TallyAction::Add(3)), Ok(1));
        assert_eq!(store.send(TallyAction::Add(4)), Ok(2));
        assert_eq!(store.state(|s| s.total), 7);
    }

    #[test]
    fn old_snapshots_are_not_mutated() {
        let mut store = store();
        store.send(TallyAction::Add(1)).ok();
        let before = store.snapshot();

        store.send(TallyAction::Add(10)).ok();

        assert_eq!(before.total, 1);
        assert_eq!(store.snapshot().total, 11);
    }

    #[test]
    fn feedback_effects_run_in_order_before_publish() {
        let mut store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |state, version| {
            if let Ok(mut seen) = sink.lock() {
                seen.push((state.log.clone(), version));
            }
        });

        store.send(TallyAction::Spread(vec![1, 2, 3])).ok();

        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![(vec![1, 2, 3], 1)]);
    }

    #[test]
    fn send_all_publishes_once() {
        let mut store = store();
        let version = store.send_all(vec![TallyAction::Add(1), TallyAction::Add(2)]);
        assert_eq!(version, Ok(1));
        assert_eq!(store.state(|s| s.log.clone()), vec![1, 2]);
    }

    #[test]
    fn feedback_loop_is_bounded_and_discarded() {
        let mut store = Store::with_config(
            TallyState::default(),
            TallyReducer,
            (),
            StoreConfig::new(8),
        );
        store.send(TallyAction::Add(5)).ok();

        let result = store.send_all(vec![TallyAction::Add(1), TallyAction::Loop]);

        assert_eq!(store.config(), StoreConfig::new(8));
        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded { limit: 8 }));
        assert_eq!(store.version(), 1);
        assert_eq!(store.state(|s| s.total), 5);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = store();
        let calls = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_, _| {
            if let Ok(mut calls) = counter.lock() {
                *calls += 1;
            }
        });

        store.send(TallyAction::Add(1)).ok();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.send(TallyAction::Add(1)).ok();

        assert_eq!(calls.lock().map(|c| *c).unwrap_or_default(), 1);
    }
}
