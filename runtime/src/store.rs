//! The Store - owner of the state tree.
//!
//! The Store manages:
//! 1. The current state snapshot (an `Arc<S>`, replaced wholesale per dispatch)
//! 2. The root reducer
//! 3. The middleware chain wrapping dispatch
//! 4. Subscribers, notified synchronously after each reduction
//! 5. The store-lifetime execution scope used by thunks
//!
//! State only changes when a plain action reaches the reducer at the end of
//! the middleware chain. Reductions are serialized by a write lock held only
//! around the reducer call; middlewares and listeners run without any store
//! lock held, so they are free to dispatch again.
//!
//! Each reduction bumps a version number under the same write lock. Listener
//! calls from dispatches on different threads can interleave; the version is
//! what tells a newer snapshot from an older one.

use crate::middleware::{Next, SharedMiddleware, StoreEnhancer};
use crate::scope::ExecutionScope;
use crate::selection::{Selected, Selection};
use crate::subscription::{ListenerRegistry, Subscription};
use crate::thunk::{DispatchResult, Dispatchable, Dispatched, Thunk};
use crate::{StoreConfig, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};
use tidy_redux_core::composition::BoxedReducer;
use tidy_redux_core::reducer::Reducer;
use tokio::sync::watch;

/// Current snapshot and the number of reductions that produced it.
struct Versioned<S> {
    version: u64,
    state: Arc<S>,
}

struct StoreInner<S, A, E> {
    state: RwLock<Versioned<S>>,
    reducer: BoxedReducer<S, A>,
    middlewares: Vec<SharedMiddleware<S, A, E>>,
    listeners: Arc<ListenerRegistry<S>>,
    scope: ExecutionScope,
    config: StoreConfig,
    shutdown: AtomicBool,
}

/// The Store - single owner of the application state
///
/// Cloning a store is cheap; all clones share the same state.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Plain action type
/// - `E`: Extra argument type handed to thunks (defaults to `()`)
///
/// # Example
///
/// ```
/// use tidy_redux_core::reducer_fn;
/// use tidy_redux_runtime::{create_store, Store};
///
/// let store: Store<Vec<String>, String> = create_store(
///     reducer_fn(|items: &Vec<String>, item: &String| {
///         let mut next = items.clone();
///         next.push(item.clone());
///         next
///     }),
///     Vec::new(),
///     None,
/// );
///
/// let subscription = store.subscribe(|items| println!("{} items", items.len()));
/// store.dispatch("buy milk".to_string())?;
/// assert_eq!(store.get_state().len(), 1);
/// subscription.unsubscribe();
/// # Ok::<(), tidy_redux_runtime::StoreError>(())
/// ```
pub struct Store<S, A, E = ()> {
    inner: Arc<StoreInner<S, A, E>>,
}

impl<S, A, E> Clone for Store<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Create a store from a reducer, an initial state and an optional enhancer.
///
/// Uses [`StoreConfig::default`]; see [`Store::with_config`] to customise.
pub fn create_store<S, A, E, R>(
    reducer: R,
    initial_state: S,
    enhancer: Option<StoreEnhancer<S, A, E>>,
) -> Store<S, A, E>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
{
    Store::with_config(reducer, initial_state, enhancer, StoreConfig::default())
}

impl<S, A, E> Store<S, A, E>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with custom configuration
    ///
    /// # Arguments
    ///
    /// - `reducer`: The root reducer
    /// - `initial_state`: The starting snapshot
    /// - `enhancer`: Middleware chain built with `apply_middleware`
    /// - `config`: Name and shutdown behaviour
    #[must_use]
    pub fn with_config<R>(
        reducer: R,
        initial_state: S,
        enhancer: Option<StoreEnhancer<S, A, E>>,
        config: StoreConfig,
    ) -> Self
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    {
        let middlewares = enhancer.map(|e| e.middlewares).unwrap_or_default();

        tracing::debug!(
            store = %config.name,
            middlewares = middlewares.len(),
            "Creating store"
        );

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Versioned {
                    version: 0,
                    state: Arc::new(initial_state),
                }),
                reducer: Box::new(reducer),
                middlewares,
                listeners: Arc::new(ListenerRegistry::new()),
                scope: ExecutionScope::new(config.name.clone()),
                config,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Dispatch a plain action
    ///
    /// The action runs through the middleware chain and, unless a middleware
    /// intercepts it, through the reducer. Subscribers are notified before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Returns any error raised by a middleware.
    pub fn dispatch(&self, action: A) -> DispatchResult<A> {
        self.dispatch_any(Dispatchable::Action(action))
    }

    /// Dispatch a thunk
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidDispatch`] if no thunk middleware is installed
    /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
    pub fn dispatch_thunk(&self, thunk: Thunk<S, A, E>) -> DispatchResult<A> {
        self.dispatch_any(Dispatchable::Thunk(thunk))
    }

    /// Dispatch any dispatchable value from the top of the middleware chain
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`] for thunks once shutdown started
    /// - [`StoreError::InvalidDispatch`] if a thunk reaches the reducer
    /// - Any error raised by a middleware or thunk
    #[tracing::instrument(skip_all, name = "store_dispatch", fields(store = %self.inner.config.name))]
    pub fn dispatch_any(&self, action: Dispatchable<S, A, E>) -> DispatchResult<A> {
        if action.is_thunk() && self.is_shutting_down() {
            tracing::warn!("Rejected thunk: store is shutting down");
            ::metrics::counter!(crate::metrics::DISPATCH_REJECTED).increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        ::metrics::counter!(crate::metrics::DISPATCH_TOTAL).increment(1);
        tracing::trace!(middlewares = self.inner.middlewares.len(), "Dispatching");

        Next::new(self, &self.inner.middlewares).run(action)
    }

    /// Base dispatch: run the reducer, swap the snapshot, notify listeners.
    pub(crate) fn reduce_and_notify(&self, action: Dispatchable<S, A, E>) -> DispatchResult<A> {
        let action = match action {
            Dispatchable::Action(action) => action,
            Dispatchable::Thunk(thunk) => {
                tracing::error!(thunk = thunk.name(), "Thunk reached the reducer");
                return Err(StoreError::InvalidDispatch(format!(
                    "thunk `{}` reached the reducer; install ThunkMiddleware to dispatch thunks",
                    thunk.name()
                )));
            },
        };

        let (version, next_state) = {
            let mut current = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            let start = Instant::now();
            let next_state = Arc::new(self.inner.reducer.reduce(&current.state, &action));
            ::metrics::histogram!(crate::metrics::REDUCER_DURATION)
                .record(start.elapsed().as_secs_f64());

            current.version += 1;
            current.state = Arc::clone(&next_state);
            (current.version, next_state)
        };
        tracing::trace!(version, "Reducer completed");

        let notified = self.inner.listeners.notify(&next_state, version);
        ::metrics::counter!(crate::metrics::LISTENERS_NOTIFIED).increment(notified as u64);
        tracing::trace!(listeners = notified, "Listeners notified");

        Ok(Dispatched::Reduced(action))
    }

    /// Current state snapshot
    ///
    /// The snapshot is immutable; later dispatches replace the store's
    /// snapshot without touching this one.
    #[must_use]
    pub fn get_state(&self) -> Arc<S> {
        self.snapshot().1
    }

    /// Current snapshot with its version, read under one lock
    fn snapshot(&self) -> (u64, Arc<S>) {
        let current = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        (current.version, Arc::clone(&current.state))
    }

    /// Number of reductions applied so far
    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot().0
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let count = store.state(|s| s.todos.len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.get_state())
    }

    /// Register a listener called after every completed reduction
    ///
    /// Listeners run synchronously on the dispatching thread, in subscription
    /// order, with the snapshot produced by that dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<S>
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .register(move |state: &S, _version| listener(state))
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Track one slice of the state
    ///
    /// The selection is updated only when `selector` yields a value different
    /// from the previous one, and never goes back to an older snapshot when
    /// dispatches on several threads notify out of order. Dropping it
    /// unsubscribes.
    pub fn select<T, F>(&self, selector: F) -> Selection<S, T>
    where
        T: PartialEq + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let (version, state) = self.snapshot();
        let (sender, receiver) = watch::channel(Selected::new(version, selector(&state)));
        let sender = Arc::new(sender);

        let selector = Arc::new(selector);
        let listener_sender = Arc::clone(&sender);
        let listener_selector = Arc::clone(&selector);
        let subscription = self.inner.listeners.register(move |state: &S, version| {
            listener_sender
                .send_if_modified(|current| current.advance(version, listener_selector(state)));
        });

        // A reduction between the first read and registering the listener
        // would otherwise be missed.
        let (version, state) = self.snapshot();
        sender.send_if_modified(|current| current.advance(version, selector(&state)));

        Selection::new(receiver, subscription)
    }

    /// A weak dispatch handle, as handed to thunks
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<S, A, E> {
        Dispatcher {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The scope bound to this store's lifetime
    #[must_use]
    pub fn scope(&self) -> ExecutionScope {
        self.inner.scope.clone()
    }

    /// Store configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Returns true once shutdown has started
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (new thunks are rejected, plain actions
    ///    still reduce so in-flight work can land its results)
    /// 2. Waits for tasks in the store scope to finish (with timeout)
    /// 3. Cancels the store scope
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if tasks were still running
    /// when the timeout expired; those tasks are cancelled.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!(store = %self.inner.config.name, "Initiating graceful shutdown");
        self.inner.shutdown.store(true, Ordering::Release);

        let scope = &self.inner.scope;
        let drained = tokio::time::timeout(timeout, scope.idle()).await;
        let pending = scope.active_tasks();
        scope.cancel();

        if drained.is_ok() {
            tracing::info!(store = %self.inner.config.name, "All scoped tasks completed, shutdown successful");
            Ok(())
        } else {
            tracing::error!(
                store = %self.inner.config.name,
                pending_tasks = pending,
                "Shutdown timeout: {} tasks still running", pending
            );
            Err(StoreError::ShutdownTimeout(pending))
        }
    }
}

impl<S, A, E> std::fmt::Debug for Store<S, A, E>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field(
                "state",
                &self.inner.state.read().unwrap_or_else(PoisonError::into_inner).state,
            )
            .field("middlewares", &self.inner.middlewares.len())
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Weak dispatch handle.
///
/// Thunks and their spawned tasks dispatch through a `Dispatcher` so they
/// never keep the store alive on their own.
pub struct Dispatcher<S, A, E = ()> {
    inner: Weak<StoreInner<S, A, E>>,
}

impl<S, A, E> Clone for Dispatcher<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, A, E> Dispatcher<S, A, E>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Upgrade to a full store handle
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn store(&self) -> Result<Store<S, A, E>, StoreError> {
        self.inner
            .upgrade()
            .map(|inner| Store { inner })
            .ok_or(StoreError::StoreDropped)
    }

    /// Dispatch a plain action from the top of the chain
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone, or any
    /// error raised by the chain.
    pub fn dispatch(&self, action: A) -> DispatchResult<A> {
        self.store()?.dispatch(action)
    }

    /// Dispatch a thunk from the top of the chain
    ///
    /// # Errors
    ///
    /// Same as [`Store::dispatch_thunk`], plus [`StoreError::StoreDropped`].
    pub fn dispatch_thunk(&self, thunk: Thunk<S, A, E>) -> DispatchResult<A> {
        self.store()?.dispatch_thunk(thunk)
    }

    /// Current state snapshot
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn get_state(&self) -> Result<Arc<S>, StoreError> {
        Ok(self.store()?.get_state())
    }

    /// The store-lifetime scope
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn scope(&self) -> Result<ExecutionScope, StoreError> {
        Ok(self.store()?.scope())
    }
}

impl<S, A, E> std::fmt::Debug for Dispatcher<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::middleware::apply_middleware;
    use crate::scope::TaskExit;
    use crate::thunk::ThunkMiddleware;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tidy_redux_core::reducer_fn;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestState {
        value: i32,
        label: String,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        Decrement,
        Relabel(String),
        NoOp,
    }

    fn test_reducer() -> impl Reducer<State = TestState, Action = TestAction> + Send + Sync {
        reducer_fn(|state: &TestState, action: &TestAction| match action {
            TestAction::Increment => TestState {
                value: state.value + 1,
                ..state.clone()
            },
            TestAction::Decrement => TestState {
                value: state.value - 1,
                ..state.clone()
            },
            TestAction::Relabel(label) => TestState {
                label: label.clone(),
                ..state.clone()
            },
            TestAction::NoOp => state.clone(),
        })
    }

    fn test_store() -> Store<TestState, TestAction> {
        create_store(test_reducer(), TestState::default(), None)
    }

    fn thunk_store() -> Store<TestState, TestAction> {
        let thunks: SharedMiddleware<TestState, TestAction> = Arc::new(ThunkMiddleware::new());
        create_store(
            test_reducer(),
            TestState::default(),
            Some(apply_middleware(vec![thunks])),
        )
    }

    #[test]
    fn test_store_creation() {
        let store = test_store();
        assert_eq!(store.state(|s| s.value), 0);
        assert_eq!(store.config().name, "store");
    }

    #[test]
    fn test_dispatch_returns_action() {
        let store = test_store();

        let result = store.dispatch(TestAction::Increment).unwrap();

        assert!(matches!(result.into_action(), Some(TestAction::Increment)));
        assert_eq!(store.state(|s| s.value), 1);
    }

    #[test]
    fn test_multiple_actions() {
        let store = test_store();

        store.dispatch(TestAction::Increment).unwrap();
        store.dispatch(TestAction::Increment).unwrap();
        store.dispatch(TestAction::Decrement).unwrap();

        assert_eq!(store.state(|s| s.value), 1);
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let store = test_store();
        let before = store.get_state();

        store.dispatch(TestAction::Increment).unwrap();

        assert_eq!(before.value, 0);
        assert_eq!(store.get_state().value, 1);
        assert!(!Arc::ptr_eq(&before, &store.get_state()));
    }

    #[test]
    fn test_noop_action_keeps_equal_state() {
        let store = test_store();
        store.dispatch(TestAction::Relabel("x".to_string())).unwrap();
        let before = store.get_state();

        store.dispatch(TestAction::NoOp).unwrap();

        assert_eq!(*before, *store.get_state());
    }

    #[test]
    fn test_subscribers_notified_in_order_with_new_state() {
        let store = test_store();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = store.subscribe(move |s: &TestState| first.lock().unwrap().push(("first", s.value)));
        let second = Arc::clone(&seen);
        let _b = store.subscribe(move |s: &TestState| second.lock().unwrap().push(("second", s.value)));

        store.dispatch(TestAction::Increment).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = test_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.dispatch(TestAction::Increment).unwrap();
        assert!(subscription.unsubscribe());
        store.dispatch(TestAction::Increment).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_dispatch_without_deadlock() {
        let store = test_store();
        let dispatcher = store.dispatcher();

        let _subscription = store.subscribe(move |s: &TestState| {
            if s.value == 1 && s.label.is_empty() {
                dispatcher.dispatch(TestAction::Relabel("one".to_string())).unwrap();
            }
        });

        store.dispatch(TestAction::Increment).unwrap();

        assert_eq!(*store.get_state(), TestState {
            value: 1,
            label: "one".to_string(),
        });
    }

    #[test]
    fn test_thunk_without_middleware_is_invalid() {
        let store = test_store();

        let result = store.dispatch_thunk(Thunk::new("orphan", |_ctx| Ok(Dispatched::Handled)));

        match result {
            Err(StoreError::InvalidDispatch(message)) => assert!(message.contains("orphan")),
            other => unreachable!("expected InvalidDispatch, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatcher_after_store_dropped() {
        let store = test_store();
        let dispatcher = store.dispatcher();
        drop(store);

        assert!(matches!(
            dispatcher.dispatch(TestAction::Increment),
            Err(StoreError::StoreDropped)
        ));
        assert!(matches!(dispatcher.get_state(), Err(StoreError::StoreDropped)));
    }

    #[test]
    fn test_selection_tracks_only_its_slice() {
        let store = test_store();
        let selection = store.select(|s: &TestState| s.label.clone());
        assert_eq!(selection.get(), "");

        store.dispatch(TestAction::Increment).unwrap();
        assert!(!selection.has_changed());

        store.dispatch(TestAction::Relabel("new".to_string())).unwrap();
        assert!(selection.has_changed());
        assert_eq!(selection.get(), "new");
        assert_eq!(selection.with(String::len), 3);
    }

    #[test]
    fn test_dropping_selection_unsubscribes() {
        let store = test_store();
        let selection = store.select(|s: &TestState| s.value);
        assert_eq!(store.listener_count(), 1);

        drop(selection);

        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_selection_changed_yields_new_value() {
        let store = test_store();
        let mut selection = store.select(|s: &TestState| s.value);

        let background = store.clone();
        tokio::spawn(async move {
            background.dispatch(TestAction::Increment).unwrap();
        });

        assert_eq!(selection.changed().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_scoped_tasks() {
        let store = thunk_store();

        store
            .dispatch_thunk(Thunk::new("slow_increment", |ctx| {
                let dispatcher = ctx.dispatcher().clone();
                let task = ctx.store_scope()?.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    let _ = dispatcher.dispatch(TestAction::Increment);
                })?;
                Ok(Dispatched::Task(task))
            }))
            .unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value), 1);
        assert!(store.scope().is_cancelled());
        assert!(matches!(
            store.dispatch_thunk(Thunk::new("late", |_ctx| Ok(Dispatched::Handled))),
            Err(StoreError::ShutdownInProgress)
        ));
        assert!(store.dispatch(TestAction::Decrement).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_timeout_cancels_tasks() {
        let store = thunk_store();

        let task = store
            .dispatch_thunk(Thunk::new("never_done", |ctx| {
                let dispatcher = ctx.dispatcher().clone();
                let task = ctx.store_scope()?.spawn(async move {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    let _ = dispatcher.dispatch(TestAction::Increment);
                })?;
                Ok(Dispatched::Task(task))
            }))
            .unwrap()
            .into_task()
            .unwrap();

        let result = store.shutdown(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
        assert_eq!(task.wait().await.unwrap(), TaskExit::Cancelled);
        assert_eq!(store.state(|s| s.value), 0);
    }

    #[test]
    fn test_custom_config() {
        let store: Store<TestState, TestAction> = Store::with_config(
            test_reducer(),
            TestState::default(),
            None,
            StoreConfig::default().with_name("custom"),
        );

        assert_eq!(store.config().name, "custom");
        assert_eq!(store.scope().name(), "custom");
    }
}
