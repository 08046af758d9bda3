//! Cross-platform pseudo-terminal lifecycle (§4.4): spawn a child process attached to a PTY
//! and expose the uniform `spawn/read/write/resize/poll_exit/wait/deinit` contract.
//!
//! Grounded on `Tonksthebear-trybotster/cli/src/agent/pty/mod.rs` and
//! `Tonksthebear-trybotster/cli/src/agent/spawn.rs`, which wrap `portable_pty` behind a typed
//! `PtySession`. Rather than hand-rolling `openpty`/`forkpty`/`ConPTY` syscalls per platform
//! (§4.4's POSIX/Windows paths describe exactly what `portable_pty` already implements), this
//! module is a thin wrapper around `portable_pty::{PtySystem, MasterPty, Child}` presenting
//! this crate's own error taxonomy and non-blocking `read` contract (§9.1 resolution: the
//! syscall-level description is not re-implemented, the wrapping pattern is).
//!
//! Non-blocking `read` is obtained the same way the teacher's reader threads are structured:
//! a dedicated OS thread performs blocking reads against the PTY's reader half and forwards
//! chunks through a `std::sync::mpsc` channel; `PtySession::read` is a non-blocking `try_recv`
//! against that channel, returning `Ok(0)` whenever no data is queued yet — exactly the
//! `EWOULDBLOCK`-returns-zero semantics §4.4 describes, without needing raw fd manipulation.

use crate::error::PtyError;
use portable_pty::{native_pty_system, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Spawn-time configuration for a PTY session (§3 `PtyConfig`).
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub argv: Vec<String>,
    pub env: Vec<String>,
    pub cwd: Option<String>,
    pub cols: u16,
    pub rows: u16,
    pub clear_env: bool,
    pub echo: bool,
}

impl PtyConfig {
    /// Start building a config for the given command and arguments.
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PtyConfig {
            argv: argv.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            cwd: None,
            cols: 80,
            rows: 24,
            clear_env: false,
            echo: true,
        }
    }

    pub fn env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    pub fn clear_env(mut self, clear: bool) -> Self {
        self.clear_env = clear;
        self
    }

    /// Validate the invariants from §3: `argv` non-empty, every `env` entry contains `=`.
    /// Windows ignores environment plumbing entirely (§4.4, §9.1 resolution 1): a non-empty
    /// `env` or `clear_env=true` on that target is rejected rather than silently dropped.
    fn validate(&self) -> Result<(), PtyError> {
        if self.argv.is_empty() {
            return Err(PtyError::EmptyCommand);
        }
        for entry in &self.env {
            if !entry.contains('=') {
                return Err(PtyError::InvalidEnvironmentEntry(entry.clone()));
            }
        }
        if cfg!(windows) && (!self.env.is_empty() || self.clear_env) {
            return Err(PtyError::UnsupportedPlatform);
        }
        Ok(())
    }
}

/// Outcome of a non-blocking exit check (§4.4 `poll_exit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    StillRunning,
    Exited(u8),
    Signal(u8),
}

/// The final outcome of a blocking `wait` (§8 invariant 8: `Exited(c)` with `0 <= c <= 255`,
/// or `Signal(s)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Exited(u8),
    Signal(u8),
}

/// Interpret `portable_pty`'s raw exit code using the POSIX shell convention this crate
/// targets (§6 "low 8 bits of wait status"): codes above 128 are treated as `128 + signal`.
fn interpret_exit_code(code: u32) -> ExitStatus {
    let byte = (code & 0xff) as u8;
    if byte >= 128 {
        ExitStatus::Signal(byte - 128)
    } else {
        ExitStatus::Exited(byte)
    }
}

/// A spawned child process attached to a pseudo-terminal master (§3 `PtySession`).
///
/// Lifecycle: `spawn -> (read/write/resize)* -> (wait | poll_exit) -> deinit`. `deinit` is
/// idempotent (§3 "double-deinit is a no-op") and also runs on `Drop`.
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
    rx: Receiver<Vec<u8>>,
    reader_thread: Option<thread::JoinHandle<()>>,
    deinited: bool,
    /// Bytes from a previously-received chunk that didn't fit in the caller's buffer on the
    /// last `read` call, carried over so the next call can hand them out instead of dropping
    /// them.
    pending: Vec<u8>,
}

impl PtySession {
    /// Open a PTY, spawn `config.argv[0]` inside it, and start the background reader thread.
    pub fn spawn(config: &PtyConfig) -> Result<Self, PtyError> {
        config.validate()?;

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: config.rows,
                cols: config.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::OpenPtyFailed(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&config.argv[0]);
        for arg in &config.argv[1..] {
            cmd.arg(arg);
        }
        if let Some(cwd) = &config.cwd {
            cmd.cwd(cwd);
        }
        if config.clear_env {
            cmd.env_clear();
        }
        for entry in &config.env {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to obtain pty writer: {e}")))?;
        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::SpawnFailed(format!("failed to clone pty reader: {e}")))?;

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || read_loop(reader, tx));

        log::debug!("spawned pty session: argv={:?}", config.argv);

        Ok(PtySession {
            master: pair.master,
            writer,
            child,
            rx,
            reader_thread: Some(reader_thread),
            deinited: false,
            pending: Vec::new(),
        })
    }

    /// Drain up to `buf.len()` bytes already queued by the reader thread. Returns `Ok(0)`
    /// both when no data is queued yet (the `EWOULDBLOCK` case) and when the reader thread
    /// has exited (the caller distinguishes the two via [`Self::poll_exit`], per §4.5 step 2).
    /// A chunk larger than `buf` is only partially copied out; the remainder is held in
    /// `pending` and returned on the next call rather than dropped.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, PtyError> {
        if self.pending.is_empty() {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending = chunk,
                Err(TryRecvError::Empty) => return Ok(0),
                Err(TryRecvError::Disconnected) => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    /// Write `data`, retrying on `EINTR`; returns the number of bytes actually accepted by a
    /// single underlying write call (§4.4 "write retries on EINTR, returns partial count").
    pub fn write(&mut self, data: &[u8]) -> Result<usize, PtyError> {
        loop {
            match self.writer.write(data) {
                Ok(n) => {
                    let _ = self.writer.flush();
                    return Ok(n);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(PtyError::WriteFailed(e.to_string())),
            }
        }
    }

    /// Resize the PTY (`TIOCSWINSZ` on POSIX, `ResizePseudoConsole` on Windows, both behind
    /// `portable_pty`).
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::ResizeFailed(e.to_string()))
    }

    /// Non-blocking exit check.
    pub fn poll_exit(&mut self) -> Result<PollExit, PtyError> {
        match self
            .child
            .try_wait()
            .map_err(|e| PtyError::WaitPidError(e.to_string()))?
        {
            None => Ok(PollExit::StillRunning),
            Some(status) => Ok(match interpret_exit_code(status.exit_code()) {
                ExitStatus::Exited(c) => PollExit::Exited(c),
                ExitStatus::Signal(s) => PollExit::Signal(s),
            }),
        }
    }

    /// Block until the child exits.
    pub fn wait(&mut self) -> Result<ExitStatus, PtyError> {
        let status = self
            .child
            .wait()
            .map_err(|e| PtyError::WaitPidError(e.to_string()))?;
        Ok(interpret_exit_code(status.exit_code()))
    }

    /// Close the master descriptor and reap the child. Idempotent (§3 "double-deinit is a
    /// no-op").
    pub fn deinit(&mut self) {
        if self.deinited {
            return;
        }
        self.deinited = true;
        log::debug!("tearing down pty session");
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.deinit();
    }
}

fn read_loop(mut reader: Box<dyn Read + Send>, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("pty reader thread exiting on read error: {e}");
                break;
            }
        }
    }
    log::debug!("pty reader thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_argv_rejected() {
        let config = PtyConfig::new(Vec::<String>::new());
        assert!(matches!(
            PtySession::spawn(&config),
            Err(PtyError::EmptyCommand)
        ));
    }

    #[test]
    fn test_malformed_env_entry_rejected() {
        let config = PtyConfig::new(["/bin/sh"]).env("NOTANASSIGNMENT");
        assert!(matches!(
            PtySession::spawn(&config),
            Err(PtyError::InvalidEnvironmentEntry(_))
        ));
    }

    #[test]
    fn test_interpret_exit_code_normal() {
        assert_eq!(interpret_exit_code(0), ExitStatus::Exited(0));
        assert_eq!(interpret_exit_code(42), ExitStatus::Exited(42));
    }

    #[test]
    fn test_interpret_exit_code_signal() {
        assert_eq!(interpret_exit_code(128 + 9), ExitStatus::Signal(9));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_carries_over_oversized_chunk() {
        let config = PtyConfig::new(["/bin/sh", "-c", "printf '0123456789'"]).size(80, 24);
        let mut session = PtySession::spawn(&config).expect("spawn should succeed");

        let mut collected = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !String::from_utf8_lossy(&collected).contains("0123456789") {
            let mut buf = [0u8; 4];
            let n = session.read(&mut buf).expect("read should not error");
            collected.extend_from_slice(&buf[..n]);
            if n == 0 {
                assert!(std::time::Instant::now() < deadline, "timed out waiting for output");
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
        assert_eq!(collected, b"0123456789");
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_echo_and_read() {
        let config = PtyConfig::new(["/bin/sh", "-c", "printf phantom"]).size(80, 24);
        let mut session = PtySession::spawn(&config).expect("spawn should succeed");

        let mut collected = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let mut buf = [0u8; 256];
            let n = session.read(&mut buf).expect("read should not error");
            if n > 0 {
                collected.extend_from_slice(&buf[..n]);
            }
            if String::from_utf8_lossy(&collected).contains("phantom") {
                break;
            }
            if std::time::Instant::now() > deadline {
                break;
            }
            if n == 0 {
                if !matches!(session.poll_exit(), Ok(PollExit::StillRunning)) {
                    continue;
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
        assert!(String::from_utf8_lossy(&collected).contains("phantom"));

        let status = session.wait().expect("wait should succeed");
        assert_eq!(status, ExitStatus::Exited(0));
    }
}
