//! Rendering pipeline (§4.2): owns a [`crate::buffer::CellBuffer`], merges its dirty
//! rectangles, and writes the minimal escape-sequence diff to an output sink.
//!
//! Grounded on the teacher's own `Renderer` (buffered writer over stdout, alt-screen
//! enter/exit, a `flush`-style frame boundary) generalized from a single accumulating
//! [`crate::geometry::Rect`] to the distilled spec's list-of-rects dirty tracking, which now
//! lives in [`crate::buffer::CellBuffer`] itself; this module owns only the merge pass and the
//! write sink. `Renderer::headless()` resolves a dangling call the teacher's own
//! `component.rs` test made against a same-named constructor that never existed on the old
//! `Renderer` — here it is a real constructor over `Vec<u8>`.

use crate::buffer::{CellBuffer, SgrState};
use crate::error::{AllocError, RendererError};
use crate::geometry::Rect;
use std::io::{self, BufWriter, Write};

/// Default buffer capacity for write batching.
const WRITE_BUFFER_CAPACITY: usize = 16 * 1024;

/// Selects which rendering backend a [`Renderer`] targets (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    #[default]
    Cpu,
    Auto,
    Gpu,
}

/// Construction-time options for a [`Renderer`] (§3 `RendererOptions`).
#[derive(Debug, Clone, Copy)]
pub struct RendererOptions {
    /// Merge overlapping/adjacent dirty rectangles into fewer, larger writes before emitting
    /// them (§4.2 merge algorithm). Disabling this emits each dirty rect independently, which
    /// can be useful for deterministic test assertions on emitted region count.
    pub merge_dirty_regions: bool,
    pub cursor_visible: bool,
    pub backend_preference: BackendPreference,
}

impl Default for RendererOptions {
    fn default() -> Self {
        RendererOptions {
            merge_dirty_regions: true,
            cursor_visible: true,
            backend_preference: BackendPreference::Cpu,
        }
    }
}

/// Per-renderer counters (§3 `Stats`, §4.2): running totals alongside the most recent frame's
/// figures and the running max across all frames so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames: u64,
    pub dirty_regions_emitted: u64,
    pub cells_covered: u64,
    pub last_frame_ns: u64,
    pub resize_count: u64,
    /// Merged dirty-region count emitted by the most recent `flush`.
    pub last_dirty_regions: u64,
    /// Cells covered (`rect.w * rect.h` summed over merged rects) by the most recent `flush`.
    pub last_cells_covered: u64,
    pub max_dirty_regions: u64,
    pub max_cells_covered: u64,
}

/// Owns a [`CellBuffer`] and writes its dirty regions to `W` each frame.
///
/// Generic over the output sink so the same merge/emit logic drives both a live terminal
/// (`Renderer::stdout`) and an in-memory buffer for tests (`Renderer::headless`).
pub struct Renderer<W: Write> {
    buffer: CellBuffer,
    writer: W,
    options: RendererOptions,
    stats: Stats,
    first_frame: bool,
}

impl Renderer<BufWriter<io::Stdout>> {
    /// A renderer writing to a buffered handle on the process's stdout.
    pub fn stdout(width: u16, height: u16, options: RendererOptions) -> Result<Self, RendererError> {
        Renderer::with_writer(
            width,
            height,
            BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, io::stdout()),
            options,
        )
    }
}

impl Renderer<Vec<u8>> {
    /// A renderer writing into an in-memory byte sink, for tests and snapshot assertions —
    /// never touches a real terminal.
    pub fn headless(width: u16, height: u16, options: RendererOptions) -> Result<Self, RendererError> {
        Renderer::with_writer(width, height, Vec::new(), options)
    }

    /// The bytes written so far by [`Self::flush`], without consuming the renderer.
    pub fn written(&self) -> &[u8] {
        &self.writer
    }
}

impl<W: Write> Renderer<W> {
    fn with_writer(width: u16, height: u16, writer: W, options: RendererOptions) -> Result<Self, RendererError> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidSize(width, height));
        }
        if matches!(options.backend_preference, BackendPreference::Gpu) {
            return Err(RendererError::GpuBackendUnavailable);
        }
        let buffer = CellBuffer::new(width, height).map_err(|AllocError { width, height }| {
            RendererError::InvalidSize(width, height)
        })?;
        Ok(Renderer {
            buffer,
            writer,
            options,
            stats: Stats::default(),
            first_frame: true,
        })
    }

    /// Mutable access to the owned cell buffer, for widgets to draw into before [`Self::flush`].
    pub fn buffer_mut(&mut self) -> &mut CellBuffer {
        &mut self.buffer
    }

    pub fn buffer(&self) -> &CellBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Resize the underlying buffer, forcing the next [`Self::flush`] to repaint the whole
    /// surface (§4.2: resize always forces a full redraw, independent of `merge_dirty_regions`).
    pub fn resize(&mut self, width: u16, height: u16) -> Result<(), RendererError> {
        self.buffer
            .resize(width, height)
            .map_err(|AllocError { width, height }| RendererError::InvalidSize(width, height))?;
        self.stats.resize_count += 1;
        self.first_frame = true;
        Ok(())
    }

    /// Merge, emit, and clear the buffer's accumulated dirty regions, updating [`Stats`].
    ///
    /// The first frame after construction or a resize always repaints the full surface (§4.2
    /// first-frame policy), regardless of what the buffer's writes happened to mark dirty. If
    /// an I/O error occurs partway through emitting merged regions, the dirty list is **not**
    /// rolled back (§9.1 resolution 2): the caller sees the error and a subsequent `flush`
    /// will simply re-emit whatever is still marked dirty, which may already include regions
    /// that made it to the wire before the failure.
    pub fn flush(&mut self) -> Result<(), RendererError> {
        let started = std::time::Instant::now();

        if self.first_frame {
            let full = Rect::new(0, 0, self.buffer.size().width, self.buffer.size().height);
            self.buffer.mark_dirty(full);
            self.first_frame = false;
        }

        let regions = self.buffer.dirty_regions().to_vec();
        self.buffer.clear_dirty();
        let merged = if self.options.merge_dirty_regions {
            merge_regions(regions)
        } else {
            regions
        };

        let mut state = SgrState::default();
        let mut frame_cells = 0u64;
        for rect in &merged {
            self.buffer.emit_region(&mut self.writer, *rect, &mut state)?;
            frame_cells += rect.area() as u64;
        }
        if !merged.is_empty() {
            write!(self.writer, "\x1b[0m")?;
        }

        let (cx, cy) = self.buffer.cursor_position();
        let visible = self.buffer.cursor_visible() && self.options.cursor_visible;
        crate::buffer::emit_cursor(&mut self.writer, cx, cy, visible)?;

        self.writer.flush()?;

        let frame_regions = merged.len() as u64;
        self.stats.frames += 1;
        self.stats.dirty_regions_emitted += frame_regions;
        self.stats.cells_covered += frame_cells;
        self.stats.last_dirty_regions = frame_regions;
        self.stats.last_cells_covered = frame_cells;
        self.stats.max_dirty_regions = self.stats.max_dirty_regions.max(frame_regions);
        self.stats.max_cells_covered = self.stats.max_cells_covered.max(frame_cells);
        self.stats.last_frame_ns = started.elapsed().as_nanos() as u64;
        Ok(())
    }
}

/// Merge overlapping or touching rectangles into fewer, larger ones (§4.2 merge algorithm).
/// O(n²) in the number of dirty rects — deliberately simple, since a single frame's dirty list
/// is expected to stay small relative to the surface it covers.
fn merge_regions(regions: Vec<Rect>) -> Vec<Rect> {
    let mut merged: Vec<Rect> = regions.into_iter().filter(|r| !r.is_empty()).collect();
    loop {
        let mut did_merge = false;
        'scan: for i in 0..merged.len() {
            for j in (i + 1)..merged.len() {
                if merged[i].touches(&merged[j]) {
                    merged[i] = merged[i].union(&merged[j]);
                    merged.remove(j);
                    did_merge = true;
                    break 'scan;
                }
            }
        }
        if !did_merge {
            break;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn test_rejects_zero_size() {
        let result = Renderer::headless(0, 10, RendererOptions::default());
        assert!(matches!(result, Err(RendererError::InvalidSize(0, 10))));
    }

    #[test]
    fn test_gpu_backend_unavailable() {
        let opts = RendererOptions {
            backend_preference: BackendPreference::Gpu,
            ..Default::default()
        };
        let result = Renderer::headless(10, 10, opts);
        assert!(matches!(result, Err(RendererError::GpuBackendUnavailable)));
    }

    #[test]
    fn test_first_frame_emits_full_surface() {
        let mut renderer = Renderer::headless(4, 2, RendererOptions::default()).unwrap();
        renderer.flush().unwrap();
        assert_eq!(renderer.stats().frames, 1);
        assert_eq!(renderer.stats().dirty_regions_emitted, 1);
        assert_eq!(renderer.stats().cells_covered, 8);
        assert_eq!(renderer.stats().last_dirty_regions, 1);
        assert_eq!(renderer.stats().last_cells_covered, 8);
        assert_eq!(renderer.stats().max_dirty_regions, 1);
        assert_eq!(renderer.stats().max_cells_covered, 8);
    }

    #[test]
    fn test_resize_forces_full_redraw_next_frame() {
        let mut renderer = Renderer::headless(4, 2, RendererOptions::default()).unwrap();
        renderer.flush().unwrap();
        renderer.resize(6, 3).unwrap();
        renderer.flush().unwrap();
        assert_eq!(renderer.stats().resize_count, 1);
        assert_eq!(renderer.stats().cells_covered, 8 + 18);
        assert_eq!(renderer.stats().last_dirty_regions, 1);
        assert_eq!(renderer.stats().last_cells_covered, 18);
        assert_eq!(renderer.stats().max_cells_covered, 18);
    }

    #[test]
    fn test_merge_combines_adjacent_writes() {
        let mut renderer = Renderer::headless(10, 1, RendererOptions::default()).unwrap();
        renderer.flush().unwrap();
        renderer
            .buffer_mut()
            .write_text(0, 0, "ab", Style::default())
            .unwrap();
        renderer
            .buffer_mut()
            .write_text(2, 0, "cd", Style::default())
            .unwrap();
        renderer.flush().unwrap();
        assert_eq!(renderer.stats().last_dirty_regions, 1);
        assert_eq!(renderer.stats().last_cells_covered, 4);
    }

    #[test]
    fn test_disabling_merge_emits_each_region_independently() {
        let opts = RendererOptions {
            merge_dirty_regions: false,
            ..Default::default()
        };
        let mut renderer = Renderer::headless(10, 1, opts).unwrap();
        renderer.flush().unwrap();
        renderer
            .buffer_mut()
            .write_text(0, 0, "ab", Style::default())
            .unwrap();
        renderer
            .buffer_mut()
            .write_text(2, 0, "cd", Style::default())
            .unwrap();
        renderer.flush().unwrap();
        assert_eq!(renderer.stats().last_dirty_regions, 2);
        assert_eq!(renderer.stats().last_cells_covered, 4);
    }

    #[test]
    fn test_cursor_hidden_when_options_say_so() {
        let opts = RendererOptions {
            cursor_visible: false,
            ..Default::default()
        };
        let mut renderer = Renderer::headless(4, 2, opts).unwrap();
        renderer.flush().unwrap();
        assert!(!renderer.written().is_empty());
    }
}
