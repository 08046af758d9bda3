//! Async runtime adapter (§4.6): a thin seam between the session manager and the concrete
//! async executor, so the reader-task loop is written once against a trait rather than
//! directly against `tokio`.
//!
//! `Runtime` uses native async-fn-in-traits rather than `#[async_trait]` (the crate's
//! `rust-version` comfortably postdates AFIT stabilization). Its `spawn`/`bounded_channel`
//! methods are generic over the spawned future's/channel's item type, which makes the trait
//! *not* object-safe — `Arc<dyn Runtime>` cannot exist. [`crate::session::SessionManager`] is
//! generic over `R: Runtime` instead and is handed an `Arc<R>`; see `DESIGN.md` for why this
//! departs from the illustrative `Arc<dyn Runtime>` sketch.

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A spawned task's handle, wrapping [`tokio::task::JoinHandle`].
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Request cancellation of the underlying task.
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Wait for the task to finish, returning `None` if it was aborted or panicked.
    pub async fn join(self) -> Option<T> {
        self.inner.await.ok()
    }
}

/// The sending half of a bounded channel (§4.6), wrapping [`tokio::sync::mpsc::Sender`].
pub struct BoundedSender<T> {
    inner: mpsc::Sender<T>,
}

impl<T> Clone for BoundedSender<T> {
    fn clone(&self) -> Self {
        BoundedSender {
            inner: self.inner.clone(),
        }
    }
}

impl<T> BoundedSender<T> {
    /// Attempt to enqueue `value` without waiting; `Err(value)` is returned when the channel
    /// is full or the receiver has been dropped, handing the value back to the caller so a
    /// drop-and-count policy (§4.5 backpressure) can be applied without cloning.
    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.inner.try_send(value).map_err(|e| match e {
            mpsc::error::TrySendError::Full(v) => v,
            mpsc::error::TrySendError::Closed(v) => v,
        })
    }
}

/// The receiving half of a bounded channel.
pub struct BoundedReceiver<T> {
    inner: mpsc::Receiver<T>,
}

impl<T> BoundedReceiver<T> {
    /// Await the next value; `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.inner.recv().await
    }

    /// Non-blocking poll for the next value.
    pub fn try_recv(&mut self) -> Option<T> {
        self.inner.try_recv().ok()
    }
}

/// The seam between [`crate::session::SessionManager`] and a concrete async executor.
///
/// Deliberately not object-safe (`spawn`/`bounded_channel` are generic); callers depend on a
/// concrete `R: Runtime`, typically [`TokioRuntime`].
pub trait Runtime: Send + Sync + 'static {
    /// Spawn `future` as an independent task, returning a handle that can be awaited or
    /// aborted.
    fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;

    /// Yield once to the executor, letting other ready tasks make progress.
    fn yield_now(&self) -> impl Future<Output = ()> + Send;

    /// Suspend the current task for `duration`.
    fn sleep(&self, duration: std::time::Duration) -> impl Future<Output = ()> + Send;

    /// Create a bounded MPSC channel of the given capacity (§4.5 backpressure: the session
    /// manager's event channel is created with `capacity = 1024`).
    fn bounded_channel<T: Send + 'static>(
        &self,
        capacity: usize,
    ) -> (BoundedSender<T>, BoundedReceiver<T>);
}

/// The production [`Runtime`] implementation, backed by a `tokio` multi-thread executor.
#[derive(Debug, Clone, Default)]
pub struct TokioRuntime;

impl TokioRuntime {
    pub fn new() -> Self {
        TokioRuntime
    }
}

impl Runtime for TokioRuntime {
    fn spawn<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        TaskHandle {
            inner: tokio::spawn(future),
        }
    }

    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }

    async fn sleep(&self, duration: std::time::Duration) {
        tokio::time::sleep(duration).await;
    }

    fn bounded_channel<T: Send + 'static>(
        &self,
        capacity: usize,
    ) -> (BoundedSender<T>, BoundedReceiver<T>) {
        let (tx, rx) = mpsc::channel(capacity);
        (BoundedSender { inner: tx }, BoundedReceiver { inner: rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_runs_future_to_completion() {
        let runtime = TokioRuntime::new();
        let handle = runtime.spawn(async { 7 + 35 });
        assert_eq!(handle.join().await, Some(42));
    }

    #[tokio::test]
    async fn test_bounded_channel_respects_capacity() {
        let runtime = TokioRuntime::new();
        let (tx, mut rx) = runtime.bounded_channel::<u32>(1);
        assert!(tx.try_send(1).is_ok());
        assert_eq!(tx.try_send(2), Err(2));
        assert_eq!(rx.try_recv(), Some(1));
    }

    #[tokio::test]
    async fn test_abort_stops_task() {
        let runtime = TokioRuntime::new();
        let handle = runtime.spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            1
        });
        handle.abort();
        assert_eq!(handle.join().await, None);
    }
}
