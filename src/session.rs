//! Session manager (§4.5): owns a set of [`crate::pty::PtySession`]s, each driven by a
//! background reader task that turns PTY output into a bounded event stream the caller drains
//! at its own pace.
//!
//! Grounded on `Tonksthebear-trybotster/cli/src/agent/pty/events.rs`'s `PtyEvent` tagged union
//! and `cli/src/hub/workers.rs`'s cooperative-cancellation worker-thread pattern, adapted from
//! `std::thread`/`std::sync::mpsc` to [`crate::runtime::Runtime`]'s task/channel seam so the
//! same manager runs over any `Runtime` impl, not just a bare OS thread.

use crate::error::SessionManagerError;
use crate::pty::{ExitStatus, PollExit, PtyConfig, PtySession};
use crate::runtime::{BoundedReceiver, BoundedSender, Runtime, TaskHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Capacity of each session's event channel (§4.5 backpressure).
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Interval the reader task sleeps for between empty polls, avoiding a busy spin while still
/// reacting to output promptly.
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(5);

/// Opaque handle identifying one managed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

/// An event surfaced from a managed session's reader task (§3). Named distinctly from
/// [`crate::event::Event`], which describes UI input rather than PTY activity.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Data(Vec<u8>),
    Exit(ExitStatus),
}

/// Cumulative counters for a managed session (§3 `Metrics`).
#[derive(Debug, Default)]
pub struct Metrics {
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
    pub dropped_bytes: AtomicU64,
    pub exits: AtomicU64,
}

impl Metrics {
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            dropped_bytes: self.dropped_bytes.load(Ordering::Relaxed),
            exits: self.exits.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time, non-atomic copy of [`Metrics`] suitable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub dropped_bytes: u64,
    pub exits: u64,
}

struct SessionEntry<R: Runtime> {
    pty: Arc<Mutex<PtySession>>,
    metrics: Arc<Metrics>,
    receiver: BoundedReceiver<SessionEvent>,
    reader_task: Option<TaskHandle<()>>,
    stopped: Arc<std::sync::atomic::AtomicBool>,
    _marker: std::marker::PhantomData<R>,
}

/// Owns and drives a set of PTY sessions on top of a [`Runtime`].
pub struct SessionManager<R: Runtime> {
    runtime: Arc<R>,
    sessions: HashMap<SessionHandle, SessionEntry<R>>,
    next_id: u64,
    /// Round-robin cursor for [`Self::try_next_event`] so no single session can starve the
    /// others when several have data ready in the same tick.
    poll_cursor: usize,
}

impl<R: Runtime> SessionManager<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        SessionManager {
            runtime,
            sessions: HashMap::new(),
            next_id: 0,
            poll_cursor: 0,
        }
    }

    /// Spawn a PTY session and a reader task that forwards its output as [`SessionEvent`]s.
    pub fn spawn(&mut self, config: &PtyConfig) -> Result<SessionHandle, SessionManagerError> {
        let pty = PtySession::spawn(config)?;
        let pty = Arc::new(Mutex::new(pty));
        let metrics = Arc::new(Metrics::default());
        let stopped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let (tx, rx) = self.runtime.bounded_channel(EVENT_CHANNEL_CAPACITY);

        let reader_task = self.runtime.spawn(reader_loop(
            Arc::clone(&self.runtime),
            Arc::clone(&pty),
            Arc::clone(&metrics),
            Arc::clone(&stopped),
            tx,
        ));

        let handle = SessionHandle(self.next_id);
        self.next_id += 1;
        self.sessions.insert(
            handle,
            SessionEntry {
                pty,
                metrics,
                receiver: rx,
                reader_task: Some(reader_task),
                stopped,
                _marker: std::marker::PhantomData,
            },
        );
        Ok(handle)
    }

    /// Write `data` to the session's PTY master.
    pub fn write(&self, handle: SessionHandle, data: &[u8]) -> Result<usize, SessionManagerError> {
        let entry = self
            .sessions
            .get(&handle)
            .ok_or(crate::error::SessionError::UnknownSession)?;
        if entry.stopped.load(Ordering::Relaxed) {
            return Err(crate::error::SessionError::NotRunning.into());
        }
        let mut pty = entry.pty.lock().expect("pty mutex poisoned");
        let n = pty.write(data)?;
        entry
            .metrics
            .bytes_written
            .fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }

    /// Resize the session's PTY.
    pub fn resize(
        &self,
        handle: SessionHandle,
        cols: u16,
        rows: u16,
    ) -> Result<(), SessionManagerError> {
        let entry = self
            .sessions
            .get(&handle)
            .ok_or(crate::error::SessionError::UnknownSession)?;
        if entry.stopped.load(Ordering::Relaxed) {
            return Err(crate::error::SessionError::NotRunning.into());
        }
        let pty = entry.pty.lock().expect("pty mutex poisoned");
        Ok(pty.resize(cols, rows)?)
    }

    /// Drain one ready event across all sessions, round-robin. Returns `None` if no session has
    /// an event queued right now.
    pub fn try_next_event(&mut self) -> Option<(SessionHandle, SessionEvent)> {
        if self.sessions.is_empty() {
            return None;
        }
        let handles: Vec<SessionHandle> = self.sessions.keys().copied().collect();
        let n = handles.len();
        for offset in 0..n {
            let idx = (self.poll_cursor + offset) % n;
            let handle = handles[idx];
            if let Some(entry) = self.sessions.get_mut(&handle) {
                if let Some(event) = entry.receiver.try_recv() {
                    self.poll_cursor = (idx + 1) % n;
                    return Some((handle, event));
                }
            }
        }
        None
    }

    /// Flip `running` to false, cancel and await the reader task, deinit the PTY, and drain
    /// the channel of any queued `Data` payloads (§4.5). Idempotent: a session already stopped
    /// returns `Ok(())` without re-running the teardown. The handle remains valid afterward —
    /// `metrics` still answers, but `write`/`resize` now return `NotRunning`; `release` removes
    /// the handle entirely.
    pub async fn stop(&mut self, handle: SessionHandle) -> Result<(), SessionManagerError> {
        let entry = self
            .sessions
            .get_mut(&handle)
            .ok_or(crate::error::SessionError::UnknownSession)?;
        if entry.stopped.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        if let Some(task) = entry.reader_task.take() {
            task.abort();
            task.join().await;
        }
        entry.pty.lock().expect("pty mutex poisoned").deinit();
        while entry.receiver.try_recv().is_some() {}
        Ok(())
    }

    /// Stop (if not already stopped) and remove a session, tearing down its PTY.
    pub async fn release(&mut self, handle: SessionHandle) -> Result<(), SessionManagerError> {
        self.stop(handle).await?;
        self.sessions.remove(&handle);
        Ok(())
    }

    /// Block (asynchronously) until the session's child process has exited.
    pub async fn wait_for_exit(
        &self,
        handle: SessionHandle,
    ) -> Result<ExitStatus, SessionManagerError> {
        let pty = {
            let entry = self
                .sessions
                .get(&handle)
                .ok_or(crate::error::SessionError::UnknownSession)?;
            Arc::clone(&entry.pty)
        };
        loop {
            {
                let mut guard = pty.lock().expect("pty mutex poisoned");
                match guard.poll_exit()? {
                    PollExit::Exited(c) => return Ok(ExitStatus::Exited(c)),
                    PollExit::Signal(s) => return Ok(ExitStatus::Signal(s)),
                    PollExit::StillRunning => {}
                }
            }
            self.runtime.sleep(POLL_INTERVAL).await;
        }
    }

    /// A snapshot of the session's cumulative counters.
    pub fn metrics(&self, handle: SessionHandle) -> Result<MetricsSnapshot, SessionManagerError> {
        let entry = self
            .sessions
            .get(&handle)
            .ok_or(crate::error::SessionError::UnknownSession)?;
        Ok(entry.metrics.snapshot())
    }

    /// Acknowledge that a previously drained event has been consumed. Rust's ownership model
    /// already moves the event out of the channel on `try_next_event`, so there is no pooled
    /// buffer to return; this exists for API parity with the drain/acknowledge cycle other
    /// session-event designs require, and is a deliberate no-op here.
    pub fn recycle_event(&self, _event: SessionEvent) {}
}

async fn reader_loop<R: Runtime>(
    runtime: Arc<R>,
    pty: Arc<Mutex<PtySession>>,
    metrics: Arc<Metrics>,
    stopped: Arc<std::sync::atomic::AtomicBool>,
    tx: BoundedSender<SessionEvent>,
) {
    let mut buf = [0u8; 4096];
    loop {
        if stopped.load(Ordering::Relaxed) {
            return;
        }

        let (n, exit) = {
            let mut guard = pty.lock().expect("pty mutex poisoned");
            let n = guard.read(&mut buf).unwrap_or(0);
            let exit = if n == 0 {
                match guard.poll_exit() {
                    Ok(PollExit::StillRunning) | Err(_) => None,
                    Ok(PollExit::Exited(c)) => Some(ExitStatus::Exited(c)),
                    Ok(PollExit::Signal(s)) => Some(ExitStatus::Signal(s)),
                }
            } else {
                None
            };
            (n, exit)
        };

        if n > 0 {
            let chunk = buf[..n].to_vec();
            let chunk_len = chunk.len() as u64;
            if tx.try_send(SessionEvent::Data(chunk)).is_err() {
                log::warn!("session event channel full, dropping {chunk_len} bytes");
                metrics.dropped_bytes.fetch_add(chunk_len, Ordering::Relaxed);
            } else {
                metrics.bytes_read.fetch_add(chunk_len, Ordering::Relaxed);
            }
            continue;
        }

        if let Some(status) = exit {
            log::info!("session exited: {status:?}");
            metrics.exits.fetch_add(1, Ordering::Relaxed);
            let _ = tx.try_send(SessionEvent::Exit(status));
            return;
        }

        runtime.sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::TokioRuntime;

    #[tokio::test]
    async fn test_unknown_handle_errors() {
        let manager: SessionManager<TokioRuntime> = SessionManager::new(Arc::new(TokioRuntime::new()));
        assert!(matches!(
            manager.metrics(SessionHandle(0)),
            Err(SessionManagerError::Session(crate::error::SessionError::UnknownSession))
        ));
    }

    #[tokio::test]
    async fn test_try_next_event_empty_when_no_sessions() {
        let mut manager: SessionManager<TokioRuntime> =
            SessionManager::new(Arc::new(TokioRuntime::new()));
        assert!(manager.try_next_event().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_echo_and_drain_events() {
        let runtime = Arc::new(TokioRuntime::new());
        let mut manager: SessionManager<TokioRuntime> = SessionManager::new(Arc::clone(&runtime));
        let config = PtyConfig::new(["/bin/sh", "-c", "printf ghost"]).size(80, 24);
        let handle = manager.spawn(&config).expect("spawn should succeed");

        let mut collected = Vec::new();
        let mut exited = false;
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline && !exited {
            match manager.try_next_event() {
                Some((h, SessionEvent::Data(bytes))) => {
                    assert_eq!(h, handle);
                    collected.extend_from_slice(&bytes);
                }
                Some((h, SessionEvent::Exit(_))) => {
                    assert_eq!(h, handle);
                    exited = true;
                }
                None => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        }

        assert!(String::from_utf8_lossy(&collected).contains("ghost"));
        assert!(exited);
        manager.release(handle).await.expect("release should succeed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_operations_after_stop_return_not_running() {
        let runtime = Arc::new(TokioRuntime::new());
        let mut manager: SessionManager<TokioRuntime> = SessionManager::new(Arc::clone(&runtime));
        let config = PtyConfig::new(["/bin/sh", "-c", "cat"]).size(80, 24);
        let handle = manager.spawn(&config).expect("spawn should succeed");

        manager.stop(handle).await.expect("stop should succeed");

        assert!(matches!(
            manager.write(handle, b"hi"),
            Err(SessionManagerError::Session(crate::error::SessionError::NotRunning))
        ));
        assert!(matches!(
            manager.resize(handle, 10, 10),
            Err(SessionManagerError::Session(crate::error::SessionError::NotRunning))
        ));

        // idempotent: stopping an already-stopped session is a no-op, not an error.
        manager.stop(handle).await.expect("double stop should be a no-op");
        manager.release(handle).await.expect("release should succeed");
    }
}
