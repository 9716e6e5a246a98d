//! To-do list demo on a Tidy Redux store.
//!
//! It demonstrates:
//!
//! - Pure slice reducers combined into a root reducer
//! - A middleware chain: thunks, async requests, logging
//! - Network thunks whose continuations are bounded by an execution scope
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use todo::{create_app_store, AppAction, MockRepo, TodoEnvironment};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = create_app_store(TodoEnvironment::new(Arc::new(MockRepo::new())));
//!
//! store.dispatch(AppAction::add("Buy milk"))?;
//!
//! let fetch = store.dispatch(AppAction::AddTodoAsyncWithStoreScope {
//!     text: "Read mail".to_string(),
//!     completed: false,
//!     delay: Duration::from_millis(10),
//! })?;
//! if let Some(task) = fetch.into_task() {
//!     task.wait().await?;
//! }
//!
//! assert_eq!(store.state(|s| s.todos.len()), 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod middleware;
pub mod reducer;
pub mod repo;
pub mod store;
pub mod thunks;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{ConfigError, TodoConfig};
pub use middleware::AsyncTodoMiddleware;
pub use reducer::root_reducer;
pub use repo::{AppRepo, MockRepo, RepoError};
pub use store::{AppStore, create_app_store, create_app_store_with_config};
pub use thunks::{AppThunk, TodoEnvironment};
pub use types::{AppAction, AppState, Todo, VisibilityFilter};
