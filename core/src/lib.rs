//! # Bookshelf Core
//!
//! Core traits and types for the bookshelf client state layer.
//!
//! The state layer is a single store composed of slices. Each slice is a
//! reducer over its own state fragment; asynchronous work (HTTP calls,
//! preference persistence, debounce timers) is described as [`Effect`]
//! values and executed by the runtime.
//!
//! ## Core Concepts
//!
//! - **State**: The state fragment owned by one slice
//! - **Action**: Every input a slice reacts to (user intents and async results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (gateway, preference store, clock)
//! - **Selector**: Derived, optionally memoized, reads of state
//!
//! ## Example
//!
//! ```
//! use bookshelf_core::{Effect, Reducer, SmallVec, smallvec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct QueryState {
//!     query: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum QueryAction {
//!     Typed(String),
//! }
//!
//! struct QueryReducer;
//!
//! impl Reducer for QueryReducer {
//!     type State = QueryState;
//!     type Action = QueryAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut QueryState,
//!         action: QueryAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<QueryAction>; 4]> {
//!         match action {
//!             QueryAction::Typed(query) => state.query = query,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = QueryState::default();
//! let _ = QueryReducer.reduce(&mut state, QueryAction::Typed("dune".into()), &());
//! assert_eq!(state.query, "dune");
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition utilities
pub mod composition;

/// Declarative macros for effect construction
pub mod effect_macros;

/// Memoized selectors
pub mod selector;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They never perform I/O themselves; anything asynchronous is returned as an
/// [`Effect`](crate::effect::Effect).
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state fragment this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
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
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime. Most actions produce zero or
        /// one effect, so the result is stack-allocated up to four entries.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), composable, and cancellable by id.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    /// Identifier for a cancellable effect
    ///
    /// Starting a cancellable effect with an id that is already running cancels
    /// the running one first, which is what makes debouncing work.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The id's name
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Boxed future produced by [`Effect::Future`]
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (debounce timers)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(EffectFuture<Action>),

        /// Run `effect` under `id`, cancelling any effect already running under it
        Cancellable {
            /// Cancellation key
            id: EffectId,
            /// The wrapped effect
            effect: Box<Effect<Action>>,
        },

        /// Cancel the effect running under this id, if any
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Make this effect cancellable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }

    impl<Action> Effect<Action>
    where
        Action: Send + 'static,
    {
        /// Transform the actions this effect produces
        ///
        /// Used to lift a slice's effects into the root action type.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            B: Send + 'static,
            F: Fn(Action) -> B + Send + Sync + 'static,
        {
            self.map_shared(Arc::new(f))
        }

        fn map_shared<B>(self, f: Arc<dyn Fn(Action) -> B + Send + Sync>) -> Effect<B>
        where
            B: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(|a| f(a)) }))
                },
                Effect::Cancellable { id, effect } => Effect::Cancellable {
                    id,
                    effect: Box::new(effect.map_shared(f)),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use effect::{Effect, EffectId};
pub use reducer::Reducer;

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Child {
        Loaded(u32),
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[tokio::test]
    async fn map_lifts_future_output() {
        let effect: Effect<Child> = Effect::Future(Box::pin(async { Some(Child::Loaded(7)) }));
        let Effect::Future(fut) = effect.map(Parent::Child) else {
            unreachable!("map preserves the variant");
        };
        assert_eq!(fut.await, Some(Parent::Child(Child::Loaded(7))));
    }

    #[test]
    fn map_lifts_nested_delay() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(600),
            action: Box::new(Child::Loaded(1)),
        }
        .cancellable(EffectId::new("search"));

        match effect.map(Parent::Child) {
            Effect::Cancellable { id, effect } => {
                assert_eq!(id.as_str(), "search");
                match *effect {
                    Effect::Delay { duration, action } => {
                        assert_eq!(duration, Duration::from_millis(600));
                        assert_eq!(*action, Parent::Child(Child::Loaded(1)));
                    },
                    other => unreachable!("unexpected effect {other:?}"),
                }
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn cancel_survives_map() {
        let effect: Effect<Child> = Effect::Cancel(EffectId::new("search"));
        assert!(matches!(effect.map(Parent::Child), Effect::Cancel(id) if id.as_str() == "search"));
    }
}
