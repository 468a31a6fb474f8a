//! # Bookshelf Runtime
//!
//! Runtime implementation for the bookshelf client state layer.
//!
//! This crate provides the [`Store`]: the single process-wide state container
//! with one dispatch entry point. It runs the reducer under a write lock,
//! executes the returned effects on the tokio runtime, and feeds actions
//! produced by effects back into the reducer.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, reducer, and environment; `send` is the only way to mutate state
//! - **Effect Executor**: Runs effect descriptions and dispatches the actions they produce
//! - **Cancellation registry**: Tracks cancellable effects by [`EffectId`] (debounce, teardown)
//! - **Action broadcast**: Observers see every action produced by an effect
//!
//! ## Example
//!
//! ```ignore
//! use bookshelf_runtime::Store;
//!
//! let store = Store::new(AppState::default(), app_reducer(), environment);
//!
//! // Send an action
//! store.send(AppAction::Details(DetailsAction::Fetch { id })).await?;
//!
//! // Read state
//! let status = store.state(|s| s.details.book.status).await;
//! ```

use bookshelf_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A task join error occurred while waiting on an effect
        ///
        /// This typically means a spawned task panicked.
        #[error("Task failed during effect execution: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store behavior
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Default timeout used by [`Store::shutdown_default`]
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of that
/// action to finish. An effect that produces an action counts as finished
/// once that action has been reduced.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counters on drop
///
/// Runs on normal completion, on panic, and when a cancellable task is aborted.
struct EffectGuard {
    tracking: EffectTracking,
    pending: Arc<AtomicUsize>,
}

impl EffectGuard {
    fn new(tracking: EffectTracking, pending: Arc<AtomicUsize>) -> Self {
        tracking.increment();
        pending.fetch_add(1, Ordering::SeqCst);
        Self { tracking, pending }
    }
}

impl Drop for EffectGuard {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.tracking.decrement();
    }
}

/// Internal: running cancellable effects, keyed by id
#[derive(Default)]
struct Cancellations {
    next_generation: AtomicU64,
    running: Mutex<HashMap<EffectId, (u64, tokio::task::AbortHandle)>>,
}

impl Cancellations {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EffectId, (u64, tokio::task::AbortHandle)>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn cancel(&self, id: EffectId) -> bool {
        self.lock().remove(&id).is_some_and(|(_, handle)| {
            handle.abort();
            true
        })
    }

    fn cancel_all(&self) -> usize {
        let mut running = self.lock();
        let count = running.len();
        for (_, (_, handle)) in running.drain() {
            handle.abort();
        }
        count
    }

    fn finish(&self, id: EffectId, generation: u64) {
        let mut running = self.lock();
        if running.get(&id).is_some_and(|(g, _)| *g == generation) {
            running.remove(&id);
        }
    }

    fn is_running(&self, id: EffectId) -> bool {
        self.lock().contains_key(&id)
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicUsize, Cancellations, Duration, Effect, EffectGuard, EffectHandle,
        EffectId, EffectTracking, Ordering, Reducer, RwLock, StoreConfig, StoreError,
    };
    use std::future::Future;
    use std::pin::Pin;
    use tokio::sync::broadcast;

    type RunFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer is the only writer)
    /// 2. Reducer (slice logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Arc<Cancellations>,
        config: StoreConfig,
        /// Action broadcast channel for observing actions produced by effects.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(Cancellations::default()),
                config,
                action_broadcast,
            }
        }

        /// The environment this store injects into its reducer
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Whether a cancellable effect is currently running under `id`
        #[must_use]
        pub fn is_running(&self, id: EffectId) -> bool {
            self.cancellations.is_running(id)
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Starts the returned effects
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Concurrent `send()` calls serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!(?action, "Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, then waits for
        /// the first effect-produced action matching `predicate`.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid race condition
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged, {} actions skipped", skipped);
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.search.results.data.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Cancel the effect running under `id`, if any
        ///
        /// Returns whether something was cancelled.
        pub fn cancel(&self, id: EffectId) -> bool {
            let cancelled = self.cancellations.cancel(id);
            if cancelled {
                tracing::debug!(effect_id = %id, "Cancelled effect");
                metrics::counter!("store.effects.cancelled").increment(1);
            }
            cancelled
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, cancels pending cancellable effects (debounce
        /// timers), and waits for the remaining effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let cancelled = self.cancellations.cancel_all();
            if cancelled > 0 {
                tracing::debug!(cancelled, "Cancelled pending effects");
            }

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout: {} effects still running", pending);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Shut down using the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_default(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Start an effect
        ///
        /// `None` and `Cancel` are handled inline; everything else
        /// runs in its own task that holds an [`EffectGuard`].
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Cancel(id) => {
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(id);
                },
                Effect::Cancellable { id, effect } => {
                    metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                    self.spawn_cancellable(id, *effect, tracking);
                },
                effect => {
                    let guard = EffectGuard::new(tracking.clone(), Arc::clone(&self.pending_effects));
                    let run = self.run(effect, tracking.clone());
                    tokio::spawn(async move {
                        let _guard = guard;
                        run.await;
                    });
                },
            }
        }

        /// Spawn `effect` under `id`, aborting whatever was running under it
        fn spawn_cancellable(&self, id: EffectId, effect: Effect<A>, tracking: &EffectTracking) {
            let guard = EffectGuard::new(tracking.clone(), Arc::clone(&self.pending_effects));
            let run = self.run(effect, tracking.clone());
            let cancellations = Arc::clone(&self.cancellations);
            let generation = cancellations.next_generation.fetch_add(1, Ordering::Relaxed);

            // Held across spawn so the task's `finish` cannot run before registration.
            let mut running = cancellations.lock();

            let task = tokio::spawn({
                let cancellations = Arc::clone(&cancellations);
                async move {
                    let _guard = guard;
                    run.await;
                    cancellations.finish(id, generation);
                }
            });

            if let Some((_, previous)) = running.insert(id, (generation, task.abort_handle())) {
                tracing::trace!(effect_id = %id, "Replacing running cancellable effect");
                previous.abort();
            }
        }

        /// Build the future that executes `effect` to completion
        fn run(&self, effect: Effect<A>, tracking: EffectTracking) -> RunFuture {
            let store = self.clone();

            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            store.feedback(action).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                        tokio::time::sleep(duration).await;
                        store.feedback(*action).await;
                    },
                    Effect::Cancellable { id, effect } => {
                        store.spawn_cancellable(id, *effect, &tracking);
                    },
                    Effect::Cancel(id) => {
                        store.cancel(id);
                    },
                }
            })
        }

        /// Reduce an effect-produced action, then broadcast it
        ///
        /// Observers woken by the broadcast see the state the action produced.
        async fn feedback(&self, action: A) {
            if let Err(error) = self.send(action.clone()).await {
                tracing::debug!(%error, "Dropped effect-produced action");
                return;
            }
            let _ = self.action_broadcast.send(action);
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                config: self.config.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookshelf_core::{SmallVec, smallvec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        ProduceEffect,
        ProduceDelayed,
        ProduceSeveral,
        Debounced,
        CancelDebounced,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    const DEBOUNCE: EffectId = EffectId::new("debounce");

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::Future(Box::pin(async { Some(TestAction::Increment) }))]
                },
                TestAction::ProduceDelayed => smallvec![Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(TestAction::Increment),
                }],
                TestAction::ProduceSeveral => smallvec![
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                ],
                TestAction::Debounced => smallvec![
                    Effect::Delay {
                        duration: Duration::from_millis(50),
                        action: Box::new(TestAction::Increment),
                    }
                    .cancellable(DEBOUNCE)
                ],
                TestAction::CancelDebounced => smallvec![Effect::Cancel(DEBOUNCE)],
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = store();
        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_future_feedback() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_delay_feedback() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceDelayed).await.unwrap();
        assert_eq!(handle.pending(), 1);
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_several_effects() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceSeveral).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test]
    async fn test_cancellable_replaces_previous() {
        let store = store();
        let mut first = store.send(TestAction::Debounced).await.unwrap();
        let mut second = store.send(TestAction::Debounced).await.unwrap();
        let mut third = store.send(TestAction::Debounced).await.unwrap();

        first.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        second.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        third.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 1, "only the last timer fires");
        assert!(!store.is_running(DEBOUNCE));
    }

    #[tokio::test]
    async fn test_cancel_effect() {
        let store = store();
        let mut pending = store.send(TestAction::Debounced).await.unwrap();
        assert!(store.is_running(DEBOUNCE));

        let _ = store.send(TestAction::CancelDebounced).await.unwrap();
        pending.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_send_and_wait_for() {
        let store = store();
        let action = store
            .send_and_wait_for(
                TestAction::ProduceDelayed,
                |a| matches!(a, TestAction::Increment),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(action, TestAction::Increment);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = store();
        let _ = store.send(TestAction::Debounced).await.unwrap();
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            store.send(TestAction::Increment).await,
            Err(StoreError::ShutdownInProgress)
        ));
        assert_eq!(store.state(|s| s.value).await, 0, "pending debounce was torn down");
    }

    #[tokio::test]
    async fn test_completed_handle() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(10)).await.unwrap();
        assert_eq!(handle.pending(), 0);
    }
}
