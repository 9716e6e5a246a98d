//! To-do demo binary
//!
//! Walks through synchronous actions, a fetch in the store scope, and a
//! fetch whose caller-owned scope is torn down before it completes.

use anyhow::Context;
use std::sync::Arc;
use todo::{AppAction, MockRepo, TodoConfig, TodoEnvironment, VisibilityFilter, create_app_store, view};
use tidy_redux_runtime::ExecutionScope;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TodoConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .with_context(|| format!("invalid log filter `{}`", config.log_filter))?,
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tidy_redux_runtime::metrics::register_metrics();

    println!("=== Todo Example: Tidy Redux ===\n");

    let env = TodoEnvironment::new(Arc::new(MockRepo::new()));
    let store = create_app_store(env);

    let renders = store.subscribe(|state| print!("{}", view::TodoList(state)));

    println!(">>> Adding todos");
    store.dispatch(AppAction::add("Buy milk"))?;
    store.dispatch(AppAction::add("Write documentation"))?;

    println!("\n>>> Toggling 'Buy milk'");
    store.dispatch(AppAction::ToggleTodo { index: 0 })?;

    println!("\n>>> Fetching a todo in the store scope");
    let store_fetch = store
        .dispatch(AppAction::AddTodoAsyncWithStoreScope {
            text: "Fetched in store scope".to_string(),
            completed: false,
            delay: config.fetch_delay,
        })?
        .into_task();

    println!("\n>>> Fetching a todo in a screen scope, then closing the screen");
    let screen = ExecutionScope::new("screen");
    let screen_fetch = store
        .dispatch(AppAction::AddTodoAsyncWithSuppliedScope {
            text: "Never arrives".to_string(),
            completed: true,
            delay: config.fetch_delay,
            scope: screen.clone(),
        })?
        .into_task();
    screen.cancel();

    if let Some(task) = screen_fetch {
        let exit = task.wait().await?;
        println!("Screen fetch ended: {exit:?}");
    }
    if let Some(task) = store_fetch {
        let exit = task.wait().await?;
        println!("Store fetch ended: {exit:?}");
    }

    println!("\n>>> Showing active todos");
    store.dispatch(AppAction::SetVisibilityFilter {
        filter: VisibilityFilter::ShowActive,
    })?;

    renders.unsubscribe();
    store.shutdown(config.shutdown_timeout).await?;

    println!("\n=== Final state ===");
    println!("{}", view::to_json(&store.get_state())?);

    Ok(())
}
