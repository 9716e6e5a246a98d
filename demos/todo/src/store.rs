//! Store wiring for the to-do application.

use crate::middleware::AsyncTodoMiddleware;
use crate::reducer::root_reducer;
use crate::thunks::TodoEnvironment;
use crate::types::{AppAction, AppState};
use std::sync::Arc;
use tidy_redux_runtime::middleware::SharedMiddleware;
use tidy_redux_runtime::{LoggerMiddleware, Store, StoreConfig, ThunkMiddleware, apply_middleware};

/// The to-do store
pub type AppStore = Store<AppState, AppAction, TodoEnvironment>;

/// Create the to-do store with the default configuration
///
/// Middleware order: logger, thunks, async requests. Async requests are
/// re-dispatched as thunks from the top, so the logger sees the request, the
/// thunk it became and the action the fetch finally dispatches.
#[must_use]
pub fn create_app_store(env: TodoEnvironment) -> AppStore {
    create_app_store_with_config(env, StoreConfig::default().with_name("todo"))
}

/// Create the to-do store with a custom configuration
#[must_use]
pub fn create_app_store_with_config(env: TodoEnvironment, config: StoreConfig) -> AppStore {
    let middlewares: Vec<SharedMiddleware<AppState, AppAction, TodoEnvironment>> = vec![
        Arc::new(LoggerMiddleware::new()),
        Arc::new(ThunkMiddleware::with_extra_argument(env)),
        Arc::new(AsyncTodoMiddleware),
    ];

    Store::with_config(
        root_reducer(),
        AppState::default(),
        Some(apply_middleware(middlewares)),
        config,
    )
}
