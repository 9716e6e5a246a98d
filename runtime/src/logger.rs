//! Logger middleware.
//!
//! Records every dispatched value and the state it produced through
//! `tracing`. It never changes what reaches the reducer.

use crate::middleware::{Middleware, Next};
use crate::store::Store;
use crate::thunk::{DispatchResult, Dispatchable};
use std::fmt::Debug;
use tidy_redux_core::action::ActionName;

/// Middleware that logs each action and the resulting state.
///
/// Actions are logged at `info` with their name and `Debug` form, states at
/// `debug`. Thunks are logged by name only. Install it first in the chain to
/// see every dispatched value, including requests that other middlewares
/// intercept.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tidy_redux_runtime::{LoggerMiddleware, Middleware};
///
/// # #[derive(Debug)] struct Action;
/// # impl tidy_redux_core::action::ActionName for Action {
/// #     fn action_name(&self) -> &'static str { "Action" }
/// # }
/// let logger: Arc<dyn Middleware<u64, Action>> = Arc::new(LoggerMiddleware::without_state());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggerMiddleware {
    log_state: bool,
}

impl LoggerMiddleware {
    /// Log actions and state snapshots
    #[must_use]
    pub const fn new() -> Self {
        Self { log_state: true }
    }

    /// Log actions only; use for large state trees
    #[must_use]
    pub const fn without_state() -> Self {
        Self { log_state: false }
    }

    /// Returns true if state snapshots are logged
    #[must_use]
    pub const fn logs_state(&self) -> bool {
        self.log_state
    }
}

impl Default for LoggerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A, E> Middleware<S, A, E> for LoggerMiddleware
where
    S: Debug + Send + Sync + 'static,
    A: Debug + ActionName + Send + 'static,
    E: Send + Sync + 'static,
{
    fn handle(
        &self,
        store: &Store<S, A, E>,
        action: Dispatchable<S, A, E>,
        next: Next<'_, S, A, E>,
    ) -> DispatchResult<A> {
        match &action {
            Dispatchable::Action(inner) => {
                tracing::info!(
                    action = inner.action_name(),
                    is_async = inner.is_async(),
                    payload = ?inner,
                    "DISPATCH action"
                );
            },
            Dispatchable::Thunk(thunk) => {
                tracing::info!(thunk = thunk.name(), "DISPATCH thunk");
            },
        }

        if self.log_state {
            tracing::debug!(state = ?store.get_state(), "previous state");
        }

        let result = next.run(action);

        match &result {
            Ok(_) if self.log_state => {
                tracing::debug!(state = ?store.get_state(), "next state");
            },
            Ok(_) => {},
            Err(error) => tracing::warn!(%error, "Dispatch failed"),
        }

        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::middleware::{SharedMiddleware, apply_middleware};
    use crate::store::create_store;
    use crate::thunk::{Dispatched, Thunk};
    use std::sync::Arc;
    use tidy_redux_core::reducer_fn;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Add(i64),
        Reset,
    }

    impl ActionName for Op {
        fn action_name(&self) -> &'static str {
            match self {
                Self::Add(_) => "Add",
                Self::Reset => "Reset",
            }
        }
    }

    fn logged_store(logger: LoggerMiddleware) -> Store<i64, Op> {
        let logger: SharedMiddleware<i64, Op> = Arc::new(logger);
        create_store(
            reducer_fn(|total: &i64, op: &Op| match op {
                Op::Add(n) => total + n,
                Op::Reset => 0,
            }),
            0,
            Some(apply_middleware(vec![logger])),
        )
    }

    #[test]
    fn test_logger_forwards_actions() {
        let store = logged_store(LoggerMiddleware::new());

        store.dispatch(Op::Add(4)).unwrap();
        store.dispatch(Op::Add(3)).unwrap();
        let result = store.dispatch(Op::Reset).unwrap();

        assert!(result.is_reduced());
        assert_eq!(*store.get_state(), 0);
    }

    #[test]
    fn test_logger_without_state_has_no_effect_on_state() {
        let logger = LoggerMiddleware::without_state();
        assert!(!logger.logs_state());
        let store = logged_store(logger);

        store.dispatch(Op::Add(10)).unwrap();

        assert_eq!(*store.get_state(), 10);
    }

    #[test]
    fn test_logger_propagates_errors() {
        let store = logged_store(LoggerMiddleware::default());

        let result = store.dispatch_thunk(Thunk::new("unhandled", |_ctx| Ok(Dispatched::Handled)));

        assert!(matches!(result, Err(StoreError::InvalidDispatch(_))));
    }
}
