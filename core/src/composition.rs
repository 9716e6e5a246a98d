//! Building a root reducer out of smaller ones
//!
//! Two combinators cover the common shapes:
//! - **`combine_reducers`**: Run multiple reducers over the same state, in order
//! - **`scope_reducer`**: Focus a slice reducer on one key of a larger state
//!
//! A root reducer is usually a `combine_reducers` of several
//! `scope_reducer`s, one per state slice.
//!
//! # Examples
//!
//! ```
//! use tidy_redux_core::{combine_reducers, reducer_fn, scope_reducer, Reducer};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct AppState {
//!     count: i32,
//!     name: String,
//! }
//!
//! enum AppAction {
//!     Increment,
//!     Rename(String),
//! }
//!
//! let count = scope_reducer(
//!     reducer_fn(|count: &i32, action: &AppAction| match action {
//!         AppAction::Increment => count + 1,
//!         AppAction::Rename(_) => *count,
//!     }),
//!     |state: &AppState| &state.count,
//!     |state: &AppState, count| AppState { count, ..state.clone() },
//! );
//!
//! let name = scope_reducer(
//!     reducer_fn(|name: &String, action: &AppAction| match action {
//!         AppAction::Rename(new_name) => new_name.clone(),
//!         AppAction::Increment => name.clone(),
//!     }),
//!     |state: &AppState| &state.name,
//!     |state: &AppState, name| AppState { name, ..state.clone() },
//! );
//!
//! let root = combine_reducers(vec![Box::new(count), Box::new(name)]);
//!
//! let state = root.reduce(&AppState::default(), &AppAction::Increment);
//! let state = root.reduce(&state, &AppAction::Rename("Alice".to_string()));
//! assert_eq!(state, AppState { count: 1, name: "Alice".to_string() });
//! ```

use crate::reducer::Reducer;
use std::marker::PhantomData;

/// Boxed reducer trait object accepted by [`combine_reducers`].
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// Runs several reducers over the same state, each seeing the previous one's output.
///
/// Each reducer runs in sequence; the snapshot produced by one reducer is the
/// input of the next. With no reducers the input snapshot is cloned.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
#[must_use]
pub fn combine_reducers<S, A>(reducers: Vec<BoxedReducer<S, A>>) -> CombinedReducer<S, A>
where
    S: Clone,
{
    CombinedReducer { reducers }
}

/// Reducers applied one after another.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A> {
    reducers: Vec<BoxedReducer<S, A>>,
}

impl<S, A> CombinedReducer<S, A> {
    /// Number of reducers combined
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns true if no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A> Reducer for CombinedReducer<S, A>
where
    S: Clone,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &S, action: &A) -> S {
        let mut reducers = self.reducers.iter();

        let Some(first) = reducers.next() else {
            return state.clone();
        };

        reducers.fold(first.reduce(state, action), |next, reducer| {
            reducer.reduce(&next, action)
        })
    }
}

/// Scopes a reducer to operate on a slice of a larger state.
///
/// `get` borrows the slice out of the parent, `set` builds a new parent from
/// the previous parent and the new slice.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `Sub`: The slice type
/// - `A`: The action type
/// - `R`: The slice reducer
///
/// # Examples
///
/// ```
/// use tidy_redux_core::{reducer_fn, scope_reducer, Reducer};
///
/// #[derive(Clone, Default)]
/// struct Parent {
///     items: Vec<u32>,
///     label: String,
/// }
///
/// let scoped = scope_reducer(
///     reducer_fn(|items: &Vec<u32>, item: &u32| {
///         let mut next = items.clone();
///         next.push(*item);
///         next
///     }),
///     |parent: &Parent| &parent.items,
///     |parent: &Parent, items| Parent { items, ..parent.clone() },
/// );
///
/// let parent = Parent { items: vec![1], label: "kept".to_string() };
/// let next = scoped.reduce(&parent, &2);
/// assert_eq!(next.items, vec![1, 2]);
/// assert_eq!(next.label, "kept");
/// ```
pub fn scope_reducer<S, Sub, A, R>(
    reducer: R,
    get_state: fn(&S) -> &Sub,
    set_state: fn(&S, Sub) -> S,
) -> ScopedReducer<S, Sub, A, R>
where
    R: Reducer<State = Sub, Action = A>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: PhantomData,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, Sub, A, R>
where
    R: Reducer<State = Sub, Action = A>,
{
    reducer: R,
    get_state: fn(&S) -> &Sub,
    set_state: fn(&S, Sub) -> S,
    _phantom: PhantomData<fn(&A)>,
}

impl<S, Sub, A, R> Reducer for ScopedReducer<S, Sub, A, R>
where
    R: Reducer<State = Sub, Action = A>,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &S, action: &A) -> S {
        let slice = self.reducer.reduce((self.get_state)(state), action);
        (self.set_state)(state, slice)
    }
}
