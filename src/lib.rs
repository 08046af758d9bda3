//! mkui - a constraint-layout, cell-buffer rendering core for building terminal UIs over
//! managed PTY sessions.
//!
//! - A weighted-least-squares constraint solver driving a node-tree layout builder, plus the
//!   flex/grid/absolute helpers built on top of it
//! - A double-buffered cell grid with dirty-region tracking and grapheme interning
//! - A renderer that merges dirty regions and diffs SGR state before writing to a terminal
//! - A cross-platform pseudo-terminal abstraction and an async session manager built over it
//! - A raw-mode terminal guard with panic-safe restoration

pub mod buffer;
pub mod color;
pub mod error;
pub mod event;
pub mod geometry;
pub mod guard;
pub mod layout;
pub mod pty;
pub mod render;
pub mod runtime;
pub mod session;
pub mod style;
pub mod terminal;
pub mod width;

pub use buffer::{Cell, CellBuffer};
pub use color::Color;
pub use error::{
    AllocError, BufferError, LayoutError, PtyError, RendererError, SessionError,
    SessionManagerError,
};
pub use event::{Event, EventHandler, EventPoller, FrameTimer, Key, MouseButton, MouseEvent};
pub use geometry::{Point, Rect, Size};
pub use guard::TerminalModeGuard;
pub use layout::{
    absolute_layout, split_column, split_row, AbsoluteItem, AlignCross, AlignMain, ConstraintSpace,
    Dimension, FlexContainer, FlexDirection, FlexItem, GridContainer, GridPlacement,
    LayoutBuilder, NodeHandle, Relation, ResolvedLayout, Solution, Strength, Variable,
};
pub use pty::{ExitStatus, PollExit, PtyConfig, PtySession};
pub use render::{BackendPreference, Renderer, RendererOptions, Stats};
pub use runtime::{BoundedReceiver, BoundedSender, Runtime, TaskHandle, TokioRuntime};
pub use session::{Metrics, MetricsSnapshot, SessionEvent, SessionHandle, SessionManager};
pub use style::{Attrs, Style};
pub use terminal::{TerminalCapabilities, TerminalContext, TerminalGeometry, TmuxPaneInfo};
