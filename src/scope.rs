//! View Scopes
//!
//! A [`ViewScope`] is the lifetime of a view: a dashboard check, a page load.
//! Every async step a view performs runs through [`ViewScope::run`]; once the
//! scope is cancelled, in-flight steps are dropped at their next await point
//! and their results are discarded, so a superseded operation can never
//! redirect or update state for a view that is gone.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation handle shared by everything a view spawns
#[derive(Debug, Clone)]
pub struct ViewScope {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    /// Create a live scope
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Cancel the scope. Idempotent.
    pub fn cancel(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("View scope cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the scope is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `fut` inside the scope.
    ///
    /// Returns `None` if the scope was cancelled before or while `fut` ran.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => {
                if self.is_cancelled() {
                    None
                } else {
                    Some(output)
                }
            }
        }
    }

    /// Guard that cancels the scope when dropped
    pub fn guard(&self) -> ScopeGuard {
        ScopeGuard {
            scope: self.clone(),
        }
    }
}

/// Cancels its scope on drop, tying the scope to an owner's lifetime
#[derive(Debug)]
pub struct ScopeGuard {
    scope: ViewScope,
}

impl ScopeGuard {
    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_run_live_scope() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 7 }).await, Some(7));
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_cancelled_scope() {
        let scope = ViewScope::new();
        scope.cancel();
        scope.cancel();
        assert!(scope.is_cancelled());
        assert_eq!(scope.run(async { 7 }).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_running() {
        let scope = ViewScope::new();
        let canceller = scope.clone();

        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = scope
            .run(async {
                sleep(Duration::from_secs(1)).await;
                "late"
            })
            .await;

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_guard_cancels_on_drop() {
        let scope = ViewScope::new();
        {
            let guard = scope.guard();
            assert!(!guard.scope().is_cancelled());
        }
        assert!(scope.is_cancelled());
        // Resolves immediately once cancelled
        scope.cancelled().await;
    }
}
