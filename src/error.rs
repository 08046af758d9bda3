//! Error taxonomy for the crate (§7). Every public fallible operation in the core returns one
//! of these `thiserror` enums rather than `anyhow::Error`; `anyhow` stays at the edges (demo
//! shells, the widget layer this crate does not implement).

use thiserror::Error;

/// Errors from [`crate::buffer::CellBuffer`] operations.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("position ({x}, {y}) is out of bounds for a buffer of size {width}x{height}")]
    OutOfBounds {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    #[error("invalid UTF-8 while iterating grapheme clusters: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors from the layout/constraint solver (§4.3.1).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("no Required constraint exists, or the normal-equations matrix is singular")]
    Underdetermined,
    #[error("conflicting Required constraints: residual exceeds tolerance")]
    Overdetermined,
    #[error("an inequality's slack variable solved negative beyond tolerance")]
    NegativeSlack,
    #[error("numerically singular normal-equations system")]
    SingularSystem,
    #[error("constraint strength or weight must be positive")]
    InvalidWeight,
    #[error("unsupported constraint relation")]
    UnsupportedRelation,
}

/// Errors from [`crate::render::Renderer`].
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("invalid renderer size: {0}x{1}")]
    InvalidSize(u16, u16),
    #[error("GPU rendering backend is not available in this build")]
    GpuBackendUnavailable,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from the PTY abstraction (§4.4).
#[derive(Debug, Error)]
pub enum PtyError {
    #[error("argv must contain at least one element")]
    EmptyCommand,
    #[error("environment entry {0:?} does not contain '='")]
    InvalidEnvironmentEntry(String),
    #[error("failed to spawn child process: {0}")]
    SpawnFailed(String),
    #[error("failed to open pseudo-terminal: {0}")]
    OpenPtyFailed(String),
    #[error("fork failed: {0}")]
    ForkFailed(String),
    #[error("exec failed: {0}")]
    ExecFailed(String),
    #[error("failed to set initial window size: {0}")]
    SetWindowSizeFailed(String),
    #[error("failed to resize pseudo-terminal: {0}")]
    ResizeFailed(String),
    #[error("read from pseudo-terminal failed: {0}")]
    ReadFailed(String),
    #[error("write to pseudo-terminal failed: {0}")]
    WriteFailed(String),
    #[error("waiting on child process failed: {0}")]
    WaitPidError(String),
    #[error("operation unsupported on this platform")]
    UnsupportedPlatform,
}

/// Errors from the session manager (§4.5).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session registered for this handle")]
    UnknownSession,
    #[error("session is already running")]
    AlreadyRunning,
    #[error("session is not running")]
    NotRunning,
}

/// Allocation failure, surfaced only from pathological `CellBuffer` sizes.
#[derive(Debug, Error)]
#[error("failed to allocate a buffer of {width}x{height} cells")]
pub struct AllocError {
    pub width: u16,
    pub height: u16,
}

/// Errors from [`crate::session::SessionManager`] operations that may fail at either the
/// session-bookkeeping layer or the underlying PTY layer.
#[derive(Debug, Error)]
pub enum SessionManagerError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Pty(#[from] PtyError),
}
