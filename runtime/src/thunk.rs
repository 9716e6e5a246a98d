//! Dispatchable values, thunks and the thunk middleware.
//!
//! A store accepts two kinds of values: plain actions, which end up in the
//! reducer, and thunks, which are callables run by [`ThunkMiddleware`]
//! instead of being reduced. The split is a sum type, so the choice is made
//! at compile time rather than by inspecting values at runtime.
//!
//! A thunk receives a [`ThunkContext`] giving it a dispatcher, read access to
//! the state and the middleware's extra argument. It typically spawns work
//! into an [`ExecutionScope`] and dispatches a plain action once that work is
//! done.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tidy_redux_core::reducer_fn;
//! use tidy_redux_runtime::{
//!     apply_middleware, create_store, Dispatched, Middleware, Store, Thunk, ThunkMiddleware,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tidy_redux_runtime::StoreError> {
//! let thunks: Arc<dyn Middleware<u32, u32, u32>> =
//!     Arc::new(ThunkMiddleware::with_extra_argument(10));
//!
//! let store: Store<u32, u32, u32> = create_store(
//!     reducer_fn(|sum: &u32, n: &u32| sum + n),
//!     0,
//!     Some(apply_middleware(vec![thunks])),
//! );
//!
//! let add_extra_later = Thunk::new("add_extra_later", |ctx| {
//!     let bonus = *ctx.extra();
//!     let dispatcher = ctx.dispatcher().clone();
//!     let task = ctx.store_scope()?.spawn(async move {
//!         let _ = dispatcher.dispatch(bonus);
//!     })?;
//!     Ok(Dispatched::Task(task))
//! });
//!
//! let task = store.dispatch_thunk(add_extra_later)?.into_task();
//! if let Some(task) = task {
//!     task.wait().await?;
//! }
//! assert_eq!(*store.get_state(), 10);
//! # Ok(())
//! # }
//! ```

use crate::StoreError;
use crate::middleware::{Middleware, Next};
use crate::scope::{ExecutionScope, TaskHandle};
use crate::store::{Dispatcher, Store};
use std::sync::Arc;

/// Result of dispatching a value through a store.
pub type DispatchResult<A> = Result<Dispatched<A>, StoreError>;

/// What happened to a dispatched value.
pub enum Dispatched<A> {
    /// The plain action reached the reducer; it is handed back to the caller
    Reduced(A),

    /// A thunk spawned scoped async work
    Task(TaskHandle),

    /// A middleware or thunk consumed the value without spawning work
    Handled,
}

impl<A> Dispatched<A> {
    /// The reduced action, if the value reached the reducer
    #[must_use]
    pub fn into_action(self) -> Option<A> {
        match self {
            Self::Reduced(action) => Some(action),
            Self::Task(_) | Self::Handled => None,
        }
    }

    /// The spawned task, if a thunk started async work
    #[must_use]
    pub fn into_task(self) -> Option<TaskHandle> {
        match self {
            Self::Task(task) => Some(task),
            Self::Reduced(_) | Self::Handled => None,
        }
    }

    /// Returns true if the value reached the reducer
    #[must_use]
    pub const fn is_reduced(&self) -> bool {
        matches!(self, Self::Reduced(_))
    }
}

impl<A> std::fmt::Debug for Dispatched<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reduced(action) => f.debug_tuple("Dispatched::Reduced").field(action).finish(),
            Self::Task(task) => f.debug_tuple("Dispatched::Task").field(task).finish(),
            Self::Handled => write!(f, "Dispatched::Handled"),
        }
    }
}

type ThunkBody<S, A, E> = Box<dyn FnOnce(ThunkContext<S, A, E>) -> DispatchResult<A> + Send>;

/// A dispatched callable run by [`ThunkMiddleware`] instead of the reducer.
pub struct Thunk<S, A, E = ()> {
    name: &'static str,
    body: ThunkBody<S, A, E>,
}

impl<S, A, E> Thunk<S, A, E> {
    /// Create a thunk with a diagnostic name
    pub fn new<F>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(ThunkContext<S, A, E>) -> DispatchResult<A> + Send + 'static,
    {
        Self {
            name,
            body: Box::new(body),
        }
    }

    /// Diagnostic name of this thunk
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the thunk body
    ///
    /// # Errors
    ///
    /// Returns whatever the thunk body returns.
    pub fn run(self, context: ThunkContext<S, A, E>) -> DispatchResult<A> {
        (self.body)(context)
    }
}

impl<S, A, E> std::fmt::Debug for Thunk<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thunk")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A value accepted by `Store::dispatch_any`.
pub enum Dispatchable<S, A, E = ()> {
    /// A plain action, destined for the reducer
    Action(A),

    /// A thunk, destined for the thunk middleware
    Thunk(Thunk<S, A, E>),
}

impl<S, A, E> Dispatchable<S, A, E> {
    /// Returns true if this is a thunk
    #[must_use]
    pub const fn is_thunk(&self) -> bool {
        matches!(self, Self::Thunk(_))
    }

    /// Borrow the plain action, if any
    #[must_use]
    pub const fn as_action(&self) -> Option<&A> {
        match self {
            Self::Action(action) => Some(action),
            Self::Thunk(_) => None,
        }
    }
}

impl<S, A, E> From<Thunk<S, A, E>> for Dispatchable<S, A, E> {
    fn from(thunk: Thunk<S, A, E>) -> Self {
        Self::Thunk(thunk)
    }
}

impl<S, A, E> std::fmt::Debug for Dispatchable<S, A, E>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Dispatchable::Action").field(action).finish(),
            Self::Thunk(thunk) => f.debug_tuple("Dispatchable::Thunk").field(thunk).finish(),
        }
    }
}

/// Everything a thunk may use: dispatch, state access and the extra argument.
pub struct ThunkContext<S, A, E = ()> {
    dispatcher: Dispatcher<S, A, E>,
    extra: E,
}

impl<S, A, E> ThunkContext<S, A, E>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Create a context from a dispatcher and an extra argument
    #[must_use]
    pub const fn new(dispatcher: Dispatcher<S, A, E>, extra: E) -> Self {
        Self { dispatcher, extra }
    }

    /// The store dispatcher; clone it to dispatch from spawned work
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<S, A, E> {
        &self.dispatcher
    }

    /// The extra argument configured on the thunk middleware
    #[must_use]
    pub const fn extra(&self) -> &E {
        &self.extra
    }

    /// Dispatch a plain action through the full middleware chain
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone, or any
    /// error raised by the chain.
    pub fn dispatch(&self, action: A) -> DispatchResult<A> {
        self.dispatcher.dispatch(action)
    }

    /// Current state snapshot
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn get_state(&self) -> Result<Arc<S>, StoreError> {
        self.dispatcher.get_state()
    }

    /// The scope bound to the store's lifetime
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn store_scope(&self) -> Result<ExecutionScope, StoreError> {
        self.dispatcher.scope()
    }

    /// Split the context into its dispatcher and extra argument
    #[must_use]
    pub fn into_parts(self) -> (Dispatcher<S, A, E>, E) {
        (self.dispatcher, self.extra)
    }
}

/// Middleware running [`Dispatchable::Thunk`] values.
///
/// Thunks are invoked with a [`ThunkContext`] built from the store's
/// dispatcher and a clone of the extra argument. Plain actions are forwarded
/// unchanged.
#[derive(Debug, Clone)]
pub struct ThunkMiddleware<E = ()> {
    extra: E,
}

impl ThunkMiddleware<()> {
    /// Thunk middleware without an extra argument
    #[must_use]
    pub const fn new() -> Self {
        Self { extra: () }
    }
}

impl Default for ThunkMiddleware<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ThunkMiddleware<E> {
    /// Thunk middleware handing `extra` to every thunk it runs
    #[must_use]
    pub const fn with_extra_argument(extra: E) -> Self {
        Self { extra }
    }
}

impl<S, A, E> Middleware<S, A, E> for ThunkMiddleware<E>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn handle(
        &self,
        store: &Store<S, A, E>,
        action: Dispatchable<S, A, E>,
        next: Next<'_, S, A, E>,
    ) -> DispatchResult<A> {
        match action {
            Dispatchable::Thunk(thunk) => {
                tracing::debug!(thunk = thunk.name(), "Running thunk");
                ::metrics::counter!(crate::metrics::THUNKS_EXECUTED).increment(1);
                thunk.run(ThunkContext::new(store.dispatcher(), self.extra.clone()))
            },
            action @ Dispatchable::Action(_) => next.run(action),
        }
    }
}
