//! # Tidy Redux Testing
//!
//! Testing utilities and helpers for Tidy Redux stores and reducers.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for pure reducers
//! - Recording mocks for listeners and middleware
//! - A tracing setup that writes through the test harness, and one that
//!   captures log lines for assertions
//!
//! ## Example
//!
//! ```
//! use tidy_redux_core::reducer_fn;
//! use tidy_redux_runtime::{create_store, Store};
//! use tidy_redux_testing::mocks::RecordingListener;
//!
//! let store: Store<u32, u32> = create_store(reducer_fn(|a: &u32, b: &u32| a + b), 0, None);
//! let listener = RecordingListener::new();
//! let _subscription = listener.attach(&store);
//!
//! store.dispatch(2)?;
//! store.dispatch(3)?;
//!
//! assert_eq!(listener.snapshots(), vec![2, 5]);
//! # Ok::<(), tidy_redux_runtime::StoreError>(())
//! ```

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};


/// Mock implementations for testing.
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};
    use tidy_redux_core::action::ActionName;
    use tidy_redux_runtime::{DispatchResult, Dispatchable, Middleware, Next, Store, Subscription};

    /// Listener that keeps every state snapshot it is notified with
    ///
    /// Clones share the same recording.
    #[derive(Debug)]
    pub struct RecordingListener<S> {
        snapshots: Arc<Mutex<Vec<S>>>,
    }

    impl<S> Clone for RecordingListener<S> {
        fn clone(&self) -> Self {
            Self {
                snapshots: Arc::clone(&self.snapshots),
            }
        }
    }

    impl<S> Default for RecordingListener<S> {
        fn default() -> Self {
            Self {
                snapshots: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl<S> RecordingListener<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        /// Create an empty recording
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Subscribe this listener to `store`
        pub fn attach<A, E>(&self, store: &Store<S, A, E>) -> Subscription<S>
        where
            A: Send + 'static,
            E: Send + Sync + 'static,
        {
            let snapshots = Arc::clone(&self.snapshots);
            store.subscribe(move |state: &S| {
                snapshots
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(state.clone());
            })
        }

        /// Number of notifications received
        #[must_use]
        pub fn count(&self) -> usize {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Every snapshot received, oldest first
        #[must_use]
        pub fn snapshots(&self) -> Vec<S> {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// The most recent snapshot
        #[must_use]
        pub fn last(&self) -> Option<S> {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }
    }

    /// Middleware that records the name of every value it sees, then forwards it
    ///
    /// Plain actions are recorded by [`ActionName`], thunks as `thunk:<name>`.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMiddleware {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingMiddleware {
        /// Create an empty recording
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Names recorded so far, in dispatch order
        #[must_use]
        pub fn seen(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// How many times a value with this name was seen
        #[must_use]
        pub fn count_of(&self, name: &str) -> usize {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|seen| *seen == name)
                .count()
        }
    }

    impl<S, A, E> Middleware<S, A, E> for RecordingMiddleware
    where
        S: Send + Sync + 'static,
        A: ActionName + Send + 'static,
        E: Send + Sync + 'static,
    {
        fn handle(
            &self,
            _store: &Store<S, A, E>,
            action: Dispatchable<S, A, E>,
            next: Next<'_, S, A, E>,
        ) -> DispatchResult<A> {
            let name = match &action {
                Dispatchable::Action(inner) => inner.action_name().to_string(),
                Dispatchable::Thunk(thunk) => format!("thunk:{}", thunk.name()),
            };
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(name);

            next.run(action)
        }
    }
}

/// Install a thread-local subscriber writing through the test harness
///
/// Honours `RUST_LOG`, defaulting to `debug`. The subscriber stays active
/// until the returned guard is dropped.
#[must_use = "tracing output stops when the guard is dropped"]
pub fn init_test_tracing() -> DefaultGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer());

    tracing::subscriber::set_default(subscriber)
}

/// Log output captured by [`capture_logs`]
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Everything logged so far, without ANSI colours
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Captured lines containing `needle`
    #[must_use]
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install a thread-local subscriber that records every event at `debug`
/// and above into a [`CapturedLogs`] buffer
#[must_use = "logs are captured only while the guard is alive"]
pub fn capture_logs() -> (DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

    (tracing::subscriber::set_default(subscriber), logs)
}

// Re-export commonly used items
pub use mocks::{RecordingListener, RecordingMiddleware};
pub use reducer_test::ReducerTest;
