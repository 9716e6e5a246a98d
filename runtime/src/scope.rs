//! Cancellable execution scopes for async continuations.
//!
//! Every task a thunk starts runs inside an [`ExecutionScope`]. The scope
//! bounds the task: cancelling the scope (or dropping every handle to it)
//! stops the task at its next await point, so a pending dispatch never lands
//! after its owner is gone.
//!
//! Two kinds of scope exist in practice: the store-lifetime scope returned by
//! `Store::scope`, cancelled by `Store::shutdown` or when the store is
//! dropped, and narrower scopes created by callers for one piece of UI or one
//! request.

use crate::StoreError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a scoped task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// The future ran to completion
    Completed,

    /// The scope was cancelled (or the task aborted) before the future finished
    Cancelled,
}

/// A named, cancellable scope for spawned work.
///
/// Clones share the same scope. Dropping the last clone cancels the tasks
/// still running in it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tidy_redux_runtime::{ExecutionScope, TaskExit};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tidy_redux_runtime::StoreError> {
/// let scope = ExecutionScope::new("screen");
/// let task = scope.spawn(async {
///     tokio::time::sleep(Duration::from_secs(60)).await;
/// })?;
///
/// scope.cancel();
/// assert_eq!(task.wait().await?, TaskExit::Cancelled);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ExecutionScope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    name: String,
    cancelled: watch::Sender<bool>,
    active: Arc<AtomicUsize>,
}

/// Decrements the scope's active task count when a task ends, however it ends.
struct ActiveTaskGuard(Arc<AtomicUsize>);

impl Drop for ActiveTaskGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExecutionScope {
    /// Create a new, live scope
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let (cancelled, _) = watch::channel(false);

        Self {
            inner: Arc::new(ScopeInner {
                name: name.into(),
                cancelled,
                active: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    /// Name of this scope
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of tasks currently running in this scope
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Returns true once the scope has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
    }

    /// Cancel every task in this scope and refuse new ones
    pub fn cancel(&self) {
        let was_cancelled = self.inner.cancelled.send_replace(true);
        if !was_cancelled {
            tracing::debug!(
                scope = %self.inner.name,
                active_tasks = self.active_tasks(),
                "Execution scope cancelled"
            );
        }
    }

    /// Spawn a future bounded by this scope
    ///
    /// The future runs on the current tokio runtime until it completes or
    /// the scope is cancelled, whichever comes first.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ScopeCancelled`] if the scope was already cancelled
    /// - [`StoreError::NoRuntime`] if called outside a tokio runtime
    pub fn spawn<F>(&self, future: F) -> Result<TaskHandle, StoreError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_cancelled() {
            return Err(StoreError::ScopeCancelled(self.inner.name.clone()));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;

        let cancelled = self.inner.cancelled.subscribe();
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveTaskGuard(Arc::clone(&self.inner.active));
        let scope = self.inner.name.clone();

        let join = runtime.spawn(async move {
            let _guard = guard;

            tokio::select! {
                biased;
                () = wait_for_cancel(cancelled) => {
                    tracing::debug!(scope = %scope, "Scoped task cancelled");
                    ::metrics::counter!(crate::metrics::TASKS_CANCELLED).increment(1);
                    TaskExit::Cancelled
                }
                () = future => TaskExit::Completed,
            }
        });

        ::metrics::counter!(crate::metrics::TASKS_SPAWNED).increment(1);
        tracing::trace!(scope = %self.inner.name, "Spawned scoped task");

        Ok(TaskHandle {
            join,
            scope: self.inner.name.clone(),
        })
    }

    /// Wait until no task is running in this scope
    pub async fn idle(&self) {
        let poll_interval = std::time::Duration::from_millis(10);
        while self.active_tasks() > 0 {
            tokio::time::sleep(poll_interval).await;
        }
    }
}

impl std::fmt::Debug for ExecutionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionScope")
            .field("name", &self.inner.name)
            .field("cancelled", &self.is_cancelled())
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

/// Resolves once the scope is cancelled or every scope handle is dropped.
async fn wait_for_cancel(mut cancelled: watch::Receiver<bool>) {
    loop {
        if *cancelled.borrow_and_update() {
            return;
        }
        if cancelled.changed().await.is_err() {
            return;
        }
    }
}

/// Handle to one task spawned into an [`ExecutionScope`].
///
/// Dropping the handle detaches the task; it keeps running under its scope.
pub struct TaskHandle {
    join: JoinHandle<TaskExit>,
    scope: String,
}

impl TaskHandle {
    /// Name of the scope the task runs in
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns true if the task has ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel this task only
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Wait for the task to end
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if the task panicked.
    pub async fn wait(self) -> Result<TaskExit, StoreError> {
        match self.join.await {
            Ok(exit) => Ok(exit),
            Err(error) if error.is_cancelled() => Ok(TaskExit::Cancelled),
            Err(error) => Err(StoreError::TaskJoinError(error)),
        }
    }

    /// Wait for several tasks, returning their results in order
    pub async fn join_all(handles: Vec<Self>) -> Vec<Result<TaskExit, StoreError>> {
        futures::future::join_all(handles.into_iter().map(Self::wait)).await
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("scope", &self.scope)
            .field("finished", &self.join.is_finished())
            .finish()
    }
}
