//! Deadline Wrapper
//!
//! Races an arbitrary future against a millisecond deadline. The future's
//! output wins if it settles first; otherwise the caller gets a
//! [`TimeoutError`] naming the operation and the deadline.
//!
//! The deadline is a `tokio::time::Sleep` owned by the returned future, so
//! it is released on both paths. When the deadline wins, the wrapped future
//! is dropped and its eventual outcome is never observed.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Label used when the caller does not name the operation
pub const DEFAULT_LABEL: &str = "operation";

/// The deadline elapsed before the wrapped operation settled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{label} timed out after {ms}ms")]
pub struct TimeoutError {
    /// Name of the operation that timed out
    pub label: String,
    /// Deadline in milliseconds
    pub ms: u64,
}

impl TimeoutError {
    pub fn new(label: impl Into<String>, ms: u64) -> Self {
        Self {
            label: label.into(),
            ms,
        }
    }
}

/// Run `op` with a deadline of `ms` milliseconds.
///
/// ```rust,no_run
/// use organiser::timeout::with_timeout;
///
/// # async fn demo() {
/// let value = with_timeout(async { 42 }, 500, Some("answer")).await;
/// assert_eq!(value, Ok(42));
/// # }
/// ```
pub async fn with_timeout<F>(op: F, ms: u64, label: Option<&str>) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    let label = label.unwrap_or(DEFAULT_LABEL);

    match tokio::time::timeout(Duration::from_millis(ms), op).await {
        Ok(output) => Ok(output),
        Err(_) => {
            tracing::warn!(label = %label, deadline_ms = ms, "Deadline elapsed before operation settled");
            Err(TimeoutError::new(label, ms))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::time::{sleep, Instant};

    /// Counts how often the runtime polls the wrapped task
    struct PollCounter {
        inner: Pin<Box<dyn Future<Output = ()> + Send>>,
        polls: Arc<AtomicUsize>,
    }

    impl Future for PollCounter {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.inner.as_mut().poll(cx)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_when_operation_wins() {
        let start = Instant::now();

        let result = with_timeout(
            async {
                sleep(Duration::from_millis(10)).await;
                "done"
            },
            1000,
            Some("fast"),
        )
        .await;

        assert_eq!(result, Ok("done"));
        // Returned as soon as the operation settled, not at the deadline
        assert_eq!(start.elapsed(), Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_when_deadline_wins() {
        let start = Instant::now();

        let result = with_timeout(sleep(Duration::from_secs(60)), 250, Some("profile fetch")).await;

        let err = result.unwrap_err();
        assert_eq!(err, TimeoutError::new("profile fetch", 250));
        assert_eq!(err.to_string(), "profile fetch timed out after 250ms");
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_label() {
        let err = with_timeout(std::future::pending::<()>(), 5, None)
            .await
            .unwrap_err();
        assert_eq!(err.label, DEFAULT_LABEL);
        assert_eq!(err.to_string(), "operation timed out after 5ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_losing_operation_is_dropped() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = with_timeout(
            async move {
                sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
            },
            20,
            Some("slow"),
        )
        .await;
        assert!(result.is_err());

        // Well past both timers: nothing left to fire
        sleep(Duration::from_secs(5)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_are_independent() {
        for i in 0..3u64 {
            let value = with_timeout(async move { i * 2 }, 10, Some("seq")).await;
            assert_eq!(value, Ok(i * 2));
        }

        let start = Instant::now();
        let err = with_timeout(std::future::pending::<u8>(), 30, Some("seq"))
            .await
            .unwrap_err();
        assert_eq!(err.ms, 30);
        // Earlier deadlines did not linger and fire into this call
        assert_eq!(start.elapsed(), Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_released_after_operation_wins() {
        let polls = Arc::new(AtomicUsize::new(0));
        let settled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&settled);

        // After settling, the task parks forever; only a leftover deadline could wake it
        let task = tokio::spawn(PollCounter {
            inner: Box::pin(async move {
                let result = with_timeout(sleep(Duration::from_millis(10)), 1000, Some("sentinel")).await;
                assert!(result.is_ok());
                flag.store(true, Ordering::SeqCst);
                std::future::pending::<()>().await;
            }),
            polls: Arc::clone(&polls),
        });

        sleep(Duration::from_millis(20)).await;
        assert!(settled.load(Ordering::SeqCst));
        let settled_polls = polls.load(Ordering::SeqCst);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(polls.load(Ordering::SeqCst), settled_polls);

        task.abort();
    }
}
