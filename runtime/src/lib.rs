//! # Tidy Redux Runtime
//!
//! Runtime implementation for the Tidy Redux state container.
//!
//! This crate provides the Store that owns the state tree and everything that
//! wraps its dispatch function.
//!
//! ## Core Components
//!
//! - **Store**: Holds the current snapshot, runs the reducer, notifies subscribers
//! - **Middleware chain**: Ordered interceptors wrapping dispatch
//! - **Thunks**: Dispatchable callables that perform async work and dispatch later
//! - **Execution scopes**: Cancellable task scopes bounding thunk continuations
//! - **Logger middleware**: Diagnostic observer of every dispatched action
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tidy_redux_core::reducer_fn;
//! use tidy_redux_runtime::{apply_middleware, create_store, LoggerMiddleware, Middleware};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! #[derive(Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! impl tidy_redux_core::action::ActionName for CounterAction {
//!     fn action_name(&self) -> &'static str {
//!         "Increment"
//!     }
//! }
//!
//! let logger: Arc<dyn Middleware<Counter, CounterAction>> = Arc::new(LoggerMiddleware::new());
//!
//! let store = create_store(
//!     reducer_fn(|state: &Counter, _: &CounterAction| Counter { count: state.count + 1 }),
//!     Counter::default(),
//!     Some(apply_middleware(vec![logger])),
//! );
//!
//! store.dispatch(CounterAction::Increment)?;
//! assert_eq!(store.state(|s| s.count), 1);
//! # Ok::<(), tidy_redux_runtime::StoreError>(())
//! ```

/// Logger middleware recording every dispatched action
pub mod logger;

/// Metric names and descriptions
pub mod metrics;

/// Middleware trait and chain composition
pub mod middleware;

/// Cancellable execution scopes for async continuations
pub mod scope;

/// Derived, change-tracked views of store state
pub mod selection;

/// The Store runtime
pub mod store;

/// Listener registry and subscription handles
pub mod subscription;

/// Dispatchable values, thunks and the thunk middleware
pub mod thunk;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// A value that cannot be reduced reached the base dispatch
        ///
        /// Thunks must be intercepted by a thunk middleware before they reach
        /// the reducer. This is reported synchronously to the caller of
        /// `dispatch` and is not recovered.
        #[error("Invalid dispatch argument: {0}")]
        InvalidDispatch(String),

        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `dispatch()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for scoped tasks to complete
        ///
        /// The remaining tasks were cancelled.
        #[error("Shutdown timed out with {0} tasks still running")]
        ShutdownTimeout(usize),

        /// The store behind a dispatcher has been dropped
        #[error("Store has been dropped")]
        StoreDropped,

        /// Async work was spawned outside of a tokio runtime
        #[error("No tokio runtime available to spawn scoped work")]
        NoRuntime,

        /// Work was spawned into a scope that has already been cancelled
        #[error("Execution scope `{0}` is cancelled")]
        ScopeCancelled(String),

        /// A scoped task failed to join
        ///
        /// This typically means the task panicked.
        #[error("Scoped task failed: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),
    }
}

pub use error::StoreError;

use std::time::Duration;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tidy_redux_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_name("todos")
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.name, "todos");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name attached to tracing spans and the store-lifetime scope
    pub name: String,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// # Arguments
    ///
    /// - `name`: Name used in logs and for the store scope
    /// - `default_shutdown_timeout`: Default timeout for shutdown operations
    #[must_use]
    pub fn new(name: impl Into<String>, default_shutdown_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            default_shutdown_timeout,
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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
            name: "store".to_string(),
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

pub use logger::LoggerMiddleware;
pub use middleware::{Middleware, Next, StoreEnhancer, apply_middleware};
pub use scope::{ExecutionScope, TaskExit, TaskHandle};
pub use selection::Selection;
pub use store::{Dispatcher, Store, create_store};
pub use subscription::Subscription;
pub use thunk::{DispatchResult, Dispatchable, Dispatched, Thunk, ThunkContext, ThunkMiddleware};
