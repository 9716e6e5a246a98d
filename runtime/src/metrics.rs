//! Metric names emitted by the store runtime.
//!
//! Metrics go through the `metrics` facade; without an installed recorder
//! they are no-ops. Applications that install a recorder should call
//! [`register_metrics`] once so the exporter has descriptions and units.
//!
//! # Example
//!
//! ```
//! use tidy_redux_runtime::metrics;
//!
//! metrics::register_metrics();
//! assert!(metrics::ALL.contains(&metrics::DISPATCH_TOTAL));
//! ```

use metrics::{Unit, describe_counter, describe_histogram};

/// Values dispatched from the top of the middleware chain
pub const DISPATCH_TOTAL: &str = "store.dispatch.total";

/// Thunks rejected because the store is shutting down
pub const DISPATCH_REJECTED: &str = "store.dispatch.rejected";

/// Time spent inside the root reducer
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Listener invocations after reductions
pub const LISTENERS_NOTIFIED: &str = "store.listeners.notified";

/// Thunks run by the thunk middleware
pub const THUNKS_EXECUTED: &str = "store.thunks.executed";

/// Tasks spawned into execution scopes
pub const TASKS_SPAWNED: &str = "store.tasks.spawned";

/// Scoped tasks stopped by scope cancellation
pub const TASKS_CANCELLED: &str = "store.tasks.cancelled";

/// Every metric name above
pub const ALL: [&str; 7] = [
    DISPATCH_TOTAL,
    DISPATCH_REJECTED,
    REDUCER_DURATION,
    LISTENERS_NOTIFIED,
    THUNKS_EXECUTED,
    TASKS_SPAWNED,
    TASKS_CANCELLED,
];

/// Register all metric descriptions.
pub fn register_metrics() {
    // Dispatch
    describe_counter!(
        DISPATCH_TOTAL,
        Unit::Count,
        "Total number of values dispatched into the store"
    );
    describe_counter!(
        DISPATCH_REJECTED,
        Unit::Count,
        "Total number of thunks rejected during shutdown"
    );

    // Reducer
    describe_histogram!(
        REDUCER_DURATION,
        Unit::Seconds,
        "Time taken by the root reducer per action"
    );
    describe_counter!(
        LISTENERS_NOTIFIED,
        Unit::Count,
        "Total number of listener invocations"
    );

    // Async work
    describe_counter!(THUNKS_EXECUTED, Unit::Count, "Total number of thunks executed");
    describe_counter!(
        TASKS_SPAWNED,
        Unit::Count,
        "Total number of tasks spawned into execution scopes"
    );
    describe_counter!(
        TASKS_CANCELLED,
        Unit::Count,
        "Total number of scoped tasks cancelled before completion"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_without_recorder_is_noop() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_metric_names_are_namespaced_and_unique() {
        for name in ALL {
            assert!(name.starts_with("store."), "{name} is not namespaced");
        }

        let mut names = ALL.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
