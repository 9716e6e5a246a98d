//! # Tidy Redux Core
//!
//! Core traits and combinators for the Tidy Redux state container.
//!
//! This crate holds the pure half of the architecture: nothing in here
//! performs I/O, spawns tasks or owns state. The runtime crate builds the
//! store, the middleware chain and thunk support on top of these types.
//!
//! ## Core Concepts
//!
//! - **State**: An immutable snapshot of application data
//! - **Action**: An immutable record describing an intended state change
//! - **Reducer**: Pure function `(&State, &Action) → State`
//! - **Composition**: Root reducers are assembled from slice reducers
//!
//! ## Architecture Principles
//!
//! - Single state tree, replaced wholesale on every dispatch
//! - Unidirectional data flow
//! - Reducers are total functions over the action set (unknown actions are no-ops)
//!
//! ## Example
//!
//! ```
//! use tidy_redux_core::reducer::Reducer;
//! use tidy_redux_core::reducer_fn;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! let reducer = reducer_fn(|state: &Counter, action: &CounterAction| match action {
//!     CounterAction::Increment => Counter { count: state.count + 1 },
//!     CounterAction::Decrement => Counter { count: state.count - 1 },
//! });
//!
//! let next = reducer.reduce(&Counter::default(), &CounterAction::Increment);
//! assert_eq!(next.count, 1);
//! ```

pub mod composition;

/// Action module - naming helpers for actions
///
/// Actions themselves are plain enums owned by the application. The only
/// behaviour the framework asks of them is a stable, human readable name
/// for diagnostics (see the logger middleware in the runtime crate).
pub mod action {
    /// Provides a static name for an action value.
    ///
    /// Usually derived with `#[derive(Action)]` from `tidy-redux-macros`,
    /// which returns the variant name.
    ///
    /// # Example
    ///
    /// ```
    /// use tidy_redux_core::action::ActionName;
    ///
    /// enum PingAction {
    ///     Ping,
    /// }
    ///
    /// impl ActionName for PingAction {
    ///     fn action_name(&self) -> &'static str {
    ///         match self {
    ///             Self::Ping => "Ping",
    ///         }
    ///     }
    /// }
    ///
    /// assert_eq!(PingAction::Ping.action_name(), "Ping");
    /// assert!(!PingAction::Ping.is_async());
    /// ```
    pub trait ActionName {
        /// The name of this action, typically the enum variant name
        fn action_name(&self) -> &'static str;

        /// Returns true if this action requests async work
        ///
        /// Such actions are meant to be turned into thunks by a middleware
        /// and never reach the reducer.
        fn is_async(&self) -> bool {
            false
        }
    }
}

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(&State, &Action) → State`
///
/// They take the previous snapshot by reference and return a brand new
/// snapshot. They never mutate their input, never perform I/O and are
/// deterministic given their inputs.
pub mod reducer {
    use std::marker::PhantomData;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state (or state slice) this reducer produces
    /// - `Action`: The action type this reducer processes
    ///
    /// # Example
    ///
    /// ```
    /// use tidy_redux_core::reducer::Reducer;
    ///
    /// struct FlagReducer;
    ///
    /// enum FlagAction {
    ///     Set(bool),
    ///     Ignored,
    /// }
    ///
    /// impl Reducer for FlagReducer {
    ///     type State = bool;
    ///     type Action = FlagAction;
    ///
    ///     fn reduce(&self, state: &bool, action: &FlagAction) -> bool {
    ///         match action {
    ///             FlagAction::Set(value) => *value,
    ///             FlagAction::Ignored => *state,
    ///         }
    ///     }
    /// }
    ///
    /// assert!(FlagReducer.reduce(&false, &FlagAction::Set(true)));
    /// assert!(!FlagReducer.reduce(&false, &FlagAction::Ignored));
    /// ```
    pub trait Reducer {
        /// The state type this reducer produces
        type State;

        /// The action type this reducer processes
        type Action;

        /// Reduce an action into the next state snapshot
        ///
        /// Actions the reducer does not handle must return a state equal
        /// to the input.
        fn reduce(&self, state: &Self::State, action: &Self::Action) -> Self::State;
    }

    /// A reducer backed by a plain function or closure.
    ///
    /// Created by [`reducer_fn`].
    pub struct FnReducer<S, A, F>
    where
        F: Fn(&S, &A) -> S,
    {
        f: F,
        _phantom: PhantomData<fn(&S, &A) -> S>,
    }

    impl<S, A, F> Reducer for FnReducer<S, A, F>
    where
        F: Fn(&S, &A) -> S,
    {
        type State = S;
        type Action = A;

        fn reduce(&self, state: &S, action: &A) -> S {
            (self.f)(state, action)
        }
    }

    /// Adapts a function `(&S, &A) -> S` into a [`Reducer`].
    #[must_use]
    pub const fn reducer_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
    where
        F: Fn(&S, &A) -> S,
    {
        FnReducer {
            f,
            _phantom: PhantomData,
        }
    }
}

pub use composition::{combine_reducers, scope_reducer};
pub use reducer::{Reducer, reducer_fn};
