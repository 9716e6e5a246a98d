//! Remote to-do repository.
//!
//! [`AppRepo`] is the seam where a real application would perform I/O. The
//! demo only ships [`MockRepo`], which simulates latency with a timer.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by an [`AppRepo`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// The remote could not be reached
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of remotely fetched to-do items
///
/// # Dyn Compatibility
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so the repository can be
/// shared as `Arc<dyn AppRepo>` between thunks.
pub trait AppRepo: Send + Sync {
    /// Simulate fetching one item, taking `delay`
    ///
    /// Returns `Ok(true)` when the item was fetched.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError`] when the remote cannot be reached.
    fn get_todo(&self, delay: Duration) -> Pin<Box<dyn Future<Output = Result<bool, RepoError>> + Send + '_>>;
}

/// In-process repository that sleeps for the requested delay
///
/// Succeeds by default; [`MockRepo::unavailable`] builds one that always
/// fails after the delay.
#[derive(Debug, Default)]
pub struct MockRepo {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockRepo {
    /// A repository whose fetches always succeed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose fetches always fail with `reason`
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches started so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AppRepo for MockRepo {
    fn get_todo(&self, delay: Duration) -> Pin<Box<dyn Future<Output = Result<bool, RepoError>> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(delay_ms = delay.as_millis(), "Mock fetch started");

            tokio::time::sleep(delay).await;

            match &self.failure {
                Some(reason) => Err(RepoError::Unavailable(reason.clone())),
                None => Ok(true),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_repo_succeeds_after_delay() {
        let repo = MockRepo::new();
        let start = tokio::time::Instant::now();

        let fetched = repo.get_todo(Duration::from_millis(250)).await.unwrap();

        assert!(fetched);
        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(repo.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_repo_fails() {
        let repo = MockRepo::unavailable("offline");

        let result = repo.get_todo(Duration::from_millis(5)).await;

        assert_eq!(result, Err(RepoError::Unavailable("offline".to_string())));
        assert_eq!(result.unwrap_err().to_string(), "repository unavailable: offline");
    }
}
