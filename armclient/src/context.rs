//! Request-scoped cancellation for Resource Manager calls
//!
//! A Context carries a cancellation flag and an optional deadline. Child
//! contexts created with [`Context::with_timeout`] observe their parent's
//! cancellation, but cancelling a child leaves the parent untouched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    cancel_tx: watch::Sender<bool>,
    parent: Option<Context>,
}

impl Context {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                cancel_tx,
                parent: None,
            }),
        }
    }

    /// Derives a child context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (cancel_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                cancel_tx,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Earliest deadline along the parent chain.
    pub fn deadline(&self) -> Option<Instant> {
        let parent = self.inner.parent.as_ref().and_then(|p| p.deadline());
        match (self.inner.deadline, parent) {
            (Some(own), Some(parent)) => Some(own.min(parent)),
            (own, parent) => own.or(parent),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if *self.inner.cancel_tx.borrow() {
            return Some(ContextError::Cancelled);
        }
        if let Some(deadline) = self.inner.deadline {
            if Instant::now() >= deadline {
                return Some(ContextError::DeadlineExceeded);
            }
        }
        self.inner.parent.as_ref().and_then(|p| p.err())
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub fn cancelled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut rx = self.inner.cancel_tx.subscribe();
            let deadline = self.inner.deadline;
            let parent = self.inner.parent.as_ref();

            tokio::select! {
                _ = rx.wait_for(|cancelled| *cancelled) => {}
                _ = async {
                    match deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {}
                _ = async {
                    match parent {
                        Some(parent) => parent.cancelled().await,
                        None => std::future::pending::<()>().await,
                    }
                } => {}
            }
        })
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
