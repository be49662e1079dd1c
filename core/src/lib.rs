//! # Access Core
//!
//! Core traits and types for the access-request workflow.
//!
//! This crate provides the fundamental abstractions the request store is built
//! on: a pure reducer that folds actions into state, effect descriptions the
//! reducer hands back to the runtime, and the environment traits through which
//! time and identifiers are injected.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (the ordered request collection)
//! - **Action**: All possible inputs to a reducer (submissions, status updates)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Follow-up work described as a value, executed by the runtime
//! - **Environment**: Injected dependencies via traits (`Clock`, `IdGenerator`)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden mutation)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use access_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for RequestsReducer {
//!     type State = RequestsState;
//!     type Action = RequestsAction;
//!     type Environment = RequestsEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut RequestsState,
//!         action: RequestsAction,
//!         env: &RequestsEnvironment,
//!     ) -> SmallVec<[Effect<RequestsAction>; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for RequestsReducer {
    ///     type State = RequestsState;
    ///     type Action = RequestsAction;
    ///     type Environment = RequestsEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut RequestsState,
    ///         action: RequestsAction,
    ///         env: &RequestsEnvironment,
    ///     ) -> SmallVec<[Effect<RequestsAction>; 4]> {
    ///         match action {
    ///             RequestsAction::SubmitRequest { request_id, items } => {
    ///                 // Business logic here
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce zero or one effect, so the result is a
        /// `SmallVec` that stays on the stack in the common case.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Follow-up work descriptions
///
/// Effects are values (not execution). The runtime interprets them after the
/// reducer returns, within the same `send` call.
pub mod effect {
    /// Effect type - describes follow-up work to be executed by the runtime
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after another, in order
        Sequential(Vec<Effect<Action>>),

        /// Feed an action back into the reducer before the snapshot is published
        Dispatch(Box<Action>),
    }

    // Manual Debug implementation to keep the boxed action readable
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Dispatch(action) => {
                    f.debug_tuple("Effect::Dispatch").field(action).finish()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Feed `action` back into the reducer
        #[must_use]
        pub fn dispatch(action: Action) -> Effect<Action> {
            Effect::Dispatch(Box::new(action))
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Sequential(effects) => effects.iter().all(Effect::is_none),
                Effect::Dispatch(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic inputs (current time, fresh identifiers) are
/// abstracted behind traits and injected via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use access_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Identifier generator - abstracts id minting for testability
    ///
    /// Implementations must never hand out the same id twice during their
    /// lifetime. Generation takes `&self`; implementations keep their own
    /// counters behind atomics.
    pub trait IdGenerator: Send + Sync {
        /// Mint a fresh identifier
        fn next_id(&self) -> String;
    }
}
