//! Middleware turning async to-do requests into network thunks.

use crate::thunks::{TodoEnvironment, fetch_for};
use crate::types::{AppAction, AppState};
use tidy_redux_core::action::ActionName;
use tidy_redux_runtime::{DispatchResult, Dispatchable, Middleware, Next, Store};

/// Intercepts actions marked `#[async_action]` on [`AppAction`]
///
/// Each request is replaced by the matching fetch thunk, dispatched from the
/// top of the chain so the thunk middleware runs it. The request itself never
/// reaches the reducer. Every other value is forwarded unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncTodoMiddleware;

impl Middleware<AppState, AppAction, TodoEnvironment> for AsyncTodoMiddleware {
    fn handle(
        &self,
        store: &Store<AppState, AppAction, TodoEnvironment>,
        action: Dispatchable<AppState, AppAction, TodoEnvironment>,
        next: Next<'_, AppState, AppAction, TodoEnvironment>,
    ) -> DispatchResult<AppAction> {
        match action {
            Dispatchable::Action(request) if request.is_async() => match fetch_for(request) {
                Ok(thunk) => store.dispatch_thunk(thunk),
                Err(request) => {
                    tracing::warn!(action = request.action_name(), "No fetch for async request");
                    next.run(Dispatchable::Action(request))
                },
            },
            other => next.run(other),
        }
    }
}
