//! Middleware pipeline wrapping the store's dispatch function.
//!
//! A middleware sees every dispatched value before the reducer does. It can
//! observe it, transform it, swallow it, or hand it to the rest of the chain
//! through [`Next::run`]. The first middleware in the list sees the value
//! first and wraps every following link, down to the base dispatch that runs
//! the reducer.
//!
//! `Next` is consumed by `run`, so a middleware can forward a value at most
//! once. Not calling it suppresses the reducer for that value.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tidy_redux_core::reducer_fn;
//! use tidy_redux_runtime::{
//!     apply_middleware, create_store, DispatchResult, Dispatchable, Middleware, Next, Store,
//! };
//!
//! /// Drops every odd number before it reaches the reducer.
//! struct EvenOnly;
//!
//! impl Middleware<i64, i64> for EvenOnly {
//!     fn handle(
//!         &self,
//!         _store: &Store<i64, i64>,
//!         action: Dispatchable<i64, i64>,
//!         next: Next<'_, i64, i64>,
//!     ) -> DispatchResult<i64> {
//!         match action {
//!             Dispatchable::Action(n) if n % 2 != 0 => {
//!                 Ok(tidy_redux_runtime::Dispatched::Handled)
//!             }
//!             other => next.run(other),
//!         }
//!     }
//! }
//!
//! let even_only: Arc<dyn Middleware<i64, i64>> = Arc::new(EvenOnly);
//! let store: Store<i64, i64> = create_store(
//!     reducer_fn(|sum: &i64, n: &i64| sum + n),
//!     0,
//!     Some(apply_middleware(vec![even_only])),
//! );
//!
//! store.dispatch(2)?;
//! store.dispatch(3)?;
//! store.dispatch(4)?;
//! assert_eq!(*store.get_state(), 6);
//! # Ok::<(), tidy_redux_runtime::StoreError>(())
//! ```

use crate::store::Store;
use crate::thunk::{DispatchResult, Dispatchable};
use std::sync::Arc;

/// An interceptor wrapping the store's dispatch function.
///
/// # Type Parameters
///
/// - `S`: State type of the store
/// - `A`: Plain action type of the store
/// - `E`: Extra argument handed to thunks
pub trait Middleware<S, A, E = ()>: Send + Sync {
    /// Handle one dispatched value.
    ///
    /// `store` dispatches from the top of the chain again, `next` continues
    /// with the following link.
    ///
    /// # Errors
    ///
    /// Implementations propagate errors from the rest of the chain and may
    /// return their own.
    fn handle(
        &self,
        store: &Store<S, A, E>,
        action: Dispatchable<S, A, E>,
        next: Next<'_, S, A, E>,
    ) -> DispatchResult<A>;
}

/// Shared middleware trait object.
pub type SharedMiddleware<S, A, E = ()> = Arc<dyn Middleware<S, A, E>>;

/// The remainder of the middleware chain.
///
/// Handed to each middleware; consuming it with [`Next::run`] passes the
/// value on to the next middleware, or to the reducer after the last one.
pub struct Next<'a, S, A, E = ()> {
    store: &'a Store<S, A, E>,
    remaining: &'a [SharedMiddleware<S, A, E>],
}

impl<'a, S, A, E> Next<'a, S, A, E>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) const fn new(
        store: &'a Store<S, A, E>,
        remaining: &'a [SharedMiddleware<S, A, E>],
    ) -> Self {
        Self { store, remaining }
    }

    /// Number of middlewares still ahead of the reducer
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Forward a value to the rest of the chain.
    ///
    /// # Errors
    ///
    /// Returns whatever the remaining middlewares or the base dispatch return,
    /// e.g. [`StoreError::InvalidDispatch`](crate::StoreError::InvalidDispatch)
    /// when a thunk reaches the reducer.
    pub fn run(self, action: Dispatchable<S, A, E>) -> DispatchResult<A> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                middleware.handle(self.store, action, Next::new(self.store, rest))
            },
            None => self.store.reduce_and_notify(action),
        }
    }
}

/// Middleware configuration applied when the store is created.
///
/// Built with [`apply_middleware`].
pub struct StoreEnhancer<S, A, E = ()> {
    pub(crate) middlewares: Vec<SharedMiddleware<S, A, E>>,
}

impl<S, A, E> StoreEnhancer<S, A, E> {
    /// Append one more middleware, closest to the reducer
    #[must_use]
    pub fn with(mut self, middleware: SharedMiddleware<S, A, E>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Number of middlewares in this enhancer
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns true if the enhancer holds no middleware
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

/// Build a [`StoreEnhancer`] from an ordered list of middlewares.
///
/// The first middleware sees every value first and wraps all the others.
#[must_use]
pub fn apply_middleware<S, A, E>(middlewares: Vec<SharedMiddleware<S, A, E>>) -> StoreEnhancer<S, A, E> {
    StoreEnhancer { middlewares }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::create_store;
    use crate::thunk::Dispatched;
    use crate::StoreError;
    use std::sync::Mutex;
    use tidy_redux_core::reducer_fn;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tag {
        name: &'static str,
        trace: Trace,
    }

    impl Middleware<Vec<i32>, i32> for Tag {
        fn handle(
            &self,
            _store: &Store<Vec<i32>, i32>,
            action: Dispatchable<Vec<i32>, i32>,
            next: Next<'_, Vec<i32>, i32>,
        ) -> DispatchResult<i32> {
            self.trace.lock().unwrap().push(format!("{} before", self.name));
            let result = next.run(action);
            self.trace.lock().unwrap().push(format!("{} after", self.name));
            result
        }
    }

    struct Swallow;

    impl Middleware<Vec<i32>, i32> for Swallow {
        fn handle(
            &self,
            _store: &Store<Vec<i32>, i32>,
            _action: Dispatchable<Vec<i32>, i32>,
            _next: Next<'_, Vec<i32>, i32>,
        ) -> DispatchResult<i32> {
            Ok(Dispatched::Handled)
        }
    }

    struct Doubler;

    impl Middleware<Vec<i32>, i32> for Doubler {
        fn handle(
            &self,
            _store: &Store<Vec<i32>, i32>,
            action: Dispatchable<Vec<i32>, i32>,
            next: Next<'_, Vec<i32>, i32>,
        ) -> DispatchResult<i32> {
            match action {
                Dispatchable::Action(n) => next.run(Dispatchable::Action(n * 2)),
                other => next.run(other),
            }
        }
    }

    fn push_reducer() -> impl tidy_redux_core::Reducer<State = Vec<i32>, Action = i32> + Send + Sync {
        reducer_fn(|items: &Vec<i32>, n: &i32| {
            let mut next = items.clone();
            next.push(*n);
            next
        })
    }

    #[test]
    fn test_leftmost_middleware_wraps_the_rest() {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let store = create_store(
            push_reducer(),
            Vec::new(),
            Some(apply_middleware(vec![
                Arc::new(Tag {
                    name: "outer",
                    trace: Arc::clone(&trace),
                }) as SharedMiddleware<Vec<i32>, i32>,
                Arc::new(Tag {
                    name: "inner",
                    trace: Arc::clone(&trace),
                }),
            ])),
        );

        store.dispatch(1).unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["outer before", "inner before", "inner after", "outer after"]
        );
        assert_eq!(*store.get_state(), vec![1]);
    }

    #[test]
    fn test_skipping_next_suppresses_reducer() {
        let store = create_store(
            push_reducer(),
            Vec::new(),
            Some(apply_middleware(vec![Arc::new(Swallow) as SharedMiddleware<Vec<i32>, i32>])),
        );

        let result = store.dispatch(1).unwrap();

        assert!(matches!(result, Dispatched::Handled));
        assert!(store.get_state().is_empty());
    }

    #[test]
    fn test_middleware_can_transform_actions() {
        let store = create_store(
            push_reducer(),
            Vec::new(),
            Some(apply_middleware(vec![Arc::new(Doubler) as SharedMiddleware<Vec<i32>, i32>])),
        );

        let result = store.dispatch(21).unwrap();

        assert_eq!(result.into_action(), Some(42));
        assert_eq!(*store.get_state(), vec![42]);
    }

    #[test]
    fn test_enhancer_with_appends_innermost() {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let enhancer = apply_middleware(vec![Arc::new(Tag {
            name: "first",
            trace: Arc::clone(&trace),
        }) as SharedMiddleware<Vec<i32>, i32>])
        .with(Arc::new(Tag {
            name: "second",
            trace: Arc::clone(&trace),
        }));
        assert_eq!(enhancer.len(), 2);

        let store = create_store(push_reducer(), Vec::new(), Some(enhancer));
        store.dispatch(5).unwrap();

        assert_eq!(trace.lock().unwrap()[0], "first before");
        assert_eq!(trace.lock().unwrap()[1], "second before");
    }

    #[test]
    fn test_no_middleware_rejects_thunks() {
        let store: Store<Vec<i32>, i32> = create_store(push_reducer(), Vec::new(), None);

        let result = store.dispatch_thunk(crate::Thunk::new("orphan", |_ctx| Ok(Dispatched::Handled)));

        assert!(matches!(result, Err(StoreError::InvalidDispatch(_))));
        assert!(store.get_state().is_empty());
    }
}
