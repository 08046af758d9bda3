//! Double-buffered cell grid with dirty-region tracking (§3, §4.1).
//!
//! Grounded on `mkui::render::DirtyRegion` (single accumulating rectangle) generalized to a
//! list of per-write rectangles as the distilled spec requires, and on the general
//! row-major terminal grid shape common across this pack's terminal-emulator crates
//! (`other_examples/.../rust_pixel__rust-pixel-src-render-buffer.rs`,
//! `other_examples/.../cursive__cursive-core-src-buffer.rs`).

use crate::error::{AllocError, BufferError};
use crate::geometry::{Rect, Size};
use crate::style::Style;
use crate::width;
use std::collections::HashMap;
use std::io::{self, Write};

/// The 128 one-byte ASCII strings, indexed by byte value, so the ASCII fast path in
/// [`GraphemeRef`] can hand back a borrowed `&'static str` with no per-access allocation.
const ASCII_BYTES: [u8; 128] = {
    let mut t = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        t[i] = i as u8;
        i += 1;
    }
    t
};

fn ascii_str(b: u8) -> &'static str {
    std::str::from_utf8(&ASCII_BYTES[b as usize..=b as usize]).expect("ASCII byte is valid UTF-8")
}

/// How a cell's grapheme text is stored. ASCII single-byte clusters bypass the intern table
/// entirely (§3 "ASCII fast-paths bypass interning"); everything else is interned once per
/// distinct cluster and referenced by a small integer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphemeRef {
    Space,
    Ascii(u8),
    Interned(u32),
    /// The second half of a double-width cell. Never written to independently (§3 invariant).
    Continuation,
}

/// An interned-grapheme cache, owned by one [`CellBuffer`].
#[derive(Debug, Default)]
struct GraphemeCache {
    strings: Vec<Box<str>>,
    index: HashMap<Box<str>, u32>,
}

impl GraphemeCache {
    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.index.get(s) {
            return id;
        }
        let id = self.strings.len() as u32;
        let boxed: Box<str> = s.into();
        self.index.insert(boxed.clone(), id);
        self.strings.push(boxed);
        id
    }

    fn get(&self, id: u32) -> &str {
        &self.strings[id as usize]
    }

    fn make_ref(&mut self, cluster: &str) -> GraphemeRef {
        if cluster == " " {
            return GraphemeRef::Space;
        }
        let bytes = cluster.as_bytes();
        if bytes.len() == 1 && bytes[0].is_ascii() {
            return GraphemeRef::Ascii(bytes[0]);
        }
        GraphemeRef::Interned(self.intern(cluster))
    }
}

/// One terminal character cell: a grapheme, a style, and its display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    grapheme: GraphemeRef,
    pub style: Style,
    /// 1 for a normal cell, 2 for the left half of a double-width cluster, 0 for a
    /// continuation sentinel (the right half of a double-width cluster).
    pub width: u8,
}

impl Cell {
    /// The default cell: a space, default style, width 1.
    pub fn space(style: Style) -> Self {
        Cell {
            grapheme: GraphemeRef::Space,
            style,
            width: 1,
        }
    }

    fn continuation(style: Style) -> Self {
        Cell {
            grapheme: GraphemeRef::Continuation,
            style,
            width: 0,
        }
    }

    fn is_continuation(&self) -> bool {
        matches!(self.grapheme, GraphemeRef::Continuation)
    }

    /// This cell's grapheme text, borrowed from the cache (or the static ASCII table) — never
    /// allocated per access.
    fn text<'a>(&self, cache: &'a GraphemeCache) -> &'a str {
        match self.grapheme {
            GraphemeRef::Space => " ",
            GraphemeRef::Ascii(b) => ascii_str(b),
            GraphemeRef::Interned(id) => cache.get(id),
            GraphemeRef::Continuation => "",
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::space(Style::default())
    }
}

/// Cursor position and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    x: u16,
    y: u16,
    visible: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            x: 0,
            y: 0,
            visible: true,
        }
    }
}

/// A double-buffered, row-major grid of [`Cell`]s with dirty-region tracking (§3, §4.1).
#[derive(Debug)]
pub struct CellBuffer {
    size: Size,
    cells: Vec<Cell>,
    cursor: Cursor,
    dirty: Vec<Rect>,
    grapheme_cache: GraphemeCache,
}

impl CellBuffer {
    /// Allocate a new buffer of `width x height` cells, all initialized to the default cell.
    pub fn new(width: u16, height: u16) -> Result<Self, AllocError> {
        let area = (width as usize)
            .checked_mul(height as usize)
            .ok_or(AllocError { width, height })?;
        Ok(CellBuffer {
            size: Size::new(width, height),
            cells: vec![Cell::default(); area],
            cursor: Cursor::default(),
            dirty: Vec::new(),
            grapheme_cache: GraphemeCache::default(),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.size.width as usize + x as usize
    }

    /// Borrow a single cell, if in bounds.
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.size.width && y < self.size.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The grapheme text at `(x, y)`, if in bounds. Empty string for a continuation cell.
    pub fn cell_text(&self, x: u16, y: u16) -> Option<&str> {
        self.cell(x, y).map(|c| c.text(&self.grapheme_cache))
    }

    fn bounds_check(&self, x: u16, y: u16) -> Result<(), BufferError> {
        if x < self.size.width && y < self.size.height {
            Ok(())
        } else {
            Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            })
        }
    }

    fn push_dirty(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.dirty.push(rect);
        }
    }

    /// Explicitly mark a rectangle as needing redraw, beyond what an individual write call
    /// already records (§4.1 "the caller may batch with an explicit mark_dirty(rect)").
    pub fn mark_dirty(&mut self, rect: Rect) {
        self.push_dirty(rect);
    }

    /// Current accumulated dirty rectangles, in write order.
    pub fn dirty_regions(&self) -> &[Rect] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Write `text` starting at `(x, y)`, one row. Returns the number of terminal columns
    /// actually written (§8 invariant 1). Stops at the right edge; a double-width cluster
    /// that would straddle the edge is replaced by a single space column (§9.1 resolution 3).
    pub fn write_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> Result<u16, BufferError> {
        if y >= self.size.height {
            return Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        let mut col = x;
        let mut written: u16 = 0;
        for span in width::clusters(text) {
            if col >= self.size.width {
                break;
            }
            let w = span.width.max(1);
            if w == 2 && col + 1 >= self.size.width {
                let idx = self.index(col, y);
                self.cells[idx] = Cell::space(style);
                col += 1;
                written += 1;
                continue;
            }
            let grapheme = self.grapheme_cache.make_ref(span.text);
            let idx = self.index(col, y);
            self.cells[idx] = Cell {
                grapheme,
                style,
                width: w,
            };
            if w == 2 {
                let cont = self.index(col + 1, y);
                self.cells[cont] = Cell::continuation(style);
            }
            col += w as u16;
            written += w as u16;
        }
        if written > 0 {
            self.push_dirty(Rect::new(x, y, written, 1));
        }
        Ok(written)
    }

    /// Fill every cell in `rect` with a single repeated grapheme (typically a space).
    pub fn fill(&mut self, rect: Rect, text: &str, style: Style) -> Result<(), BufferError> {
        if rect.right() > self.size.width || rect.bottom() > self.size.height {
            return Err(BufferError::OutOfBounds {
                x: rect.x,
                y: rect.y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        let w = width::cluster_width(text).max(1);
        let grapheme = self.grapheme_cache.make_ref(text);
        for y in rect.y..rect.bottom() {
            let mut x = rect.x;
            while x < rect.right() {
                let idx = self.index(x, y);
                if w == 2 && x + 1 < rect.right() {
                    self.cells[idx] = Cell {
                        grapheme,
                        style,
                        width: 2,
                    };
                    let cont = self.index(x + 1, y);
                    self.cells[cont] = Cell::continuation(style);
                    x += 2;
                } else {
                    self.cells[idx] = Cell {
                        grapheme,
                        style,
                        width: 1,
                    };
                    x += 1;
                }
            }
        }
        self.push_dirty(rect);
        Ok(())
    }

    /// Reset every cell to the default (space, default style) and mark the whole buffer dirty.
    pub fn clear(&mut self) {
        let full = Rect::new(0, 0, self.size.width, self.size.height);
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
        self.push_dirty(full);
    }

    /// Reset a sub-rectangle to the default cell.
    pub fn clear_region(&mut self, rect: Rect) -> Result<(), BufferError> {
        self.fill(rect, " ", Style::default())
    }

    /// Reallocate to `new_width x new_height`, preserving the intersection of old and new
    /// content and marking the entire new surface dirty (§3 invariant c).
    pub fn resize(&mut self, new_width: u16, new_height: u16) -> Result<(), AllocError> {
        let area = (new_width as usize)
            .checked_mul(new_height as usize)
            .ok_or(AllocError {
                width: new_width,
                height: new_height,
            })?;
        let mut new_cells = vec![Cell::default(); area];
        let copy_w = self.size.width.min(new_width);
        let copy_h = self.size.height.min(new_height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                let old_idx = y as usize * self.size.width as usize + x as usize;
                let new_idx = y as usize * new_width as usize + x as usize;
                new_cells[new_idx] = self.cells[old_idx];
            }
        }
        self.size = Size::new(new_width, new_height);
        self.cells = new_cells;
        self.cursor.x = self.cursor.x.min(new_width.saturating_sub(1));
        self.cursor.y = self.cursor.y.min(new_height.saturating_sub(1));
        self.dirty.clear();
        self.push_dirty(Rect::new(0, 0, new_width, new_height));
        Ok(())
    }

    /// Move the cursor, bounds-checked (§3 invariant b).
    pub fn set_cursor(&mut self, x: u16, y: u16, visible: bool) -> Result<(), BufferError> {
        self.bounds_check(x, y)?;
        self.cursor = Cursor { x, y, visible };
        Ok(())
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    /// Emit escape sequences for every dirty rectangle (unmerged — see
    /// [`crate::render::Renderer::flush`] for the merged variant) followed by the cursor
    /// position and visibility sequences, then clears the dirty list.
    pub fn render<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let mut state = SgrState::default();
        let dirty = std::mem::take(&mut self.dirty);
        for rect in &dirty {
            self.emit_region(writer, *rect, &mut state)?;
        }
        if !state.is_default() {
            write!(writer, "\x1b[0m")?;
        }
        emit_cursor(writer, self.cursor.x, self.cursor.y, self.cursor.visible)?;
        Ok(())
    }

    /// Emit one rectangle's worth of cells (used directly by [`Self::render`] and by
    /// [`crate::render::Renderer`] for merged regions).
    pub(crate) fn emit_region<W: Write>(
        &self,
        writer: &mut W,
        rect: Rect,
        state: &mut SgrState,
    ) -> io::Result<()> {
        let clipped = rect.clamp_to(&Rect::new(0, 0, self.size.width, self.size.height));
        if clipped.is_empty() {
            return Ok(());
        }
        for y in clipped.y..clipped.bottom() {
            write!(writer, "\x1b[{};{}H", y + 1, clipped.x + 1)?;
            let mut x = clipped.x;
            while x < clipped.right() {
                let idx = self.index(x, y);
                let cell = &self.cells[idx];
                if cell.is_continuation() {
                    x += 1;
                    continue;
                }
                state.apply(writer, cell.style)?;
                write!(writer, "{}", cell.text(&self.grapheme_cache))?;
                x += cell.width.max(1) as u16;
            }
        }
        Ok(())
    }
}

/// Tracks the most recently emitted [`Style`] so [`CellBuffer::emit_region`] only writes an
/// SGR sequence when the style actually changes (§4.1).
#[derive(Debug, Default)]
pub(crate) struct SgrState {
    last: Option<Style>,
}

impl SgrState {
    fn is_default(&self) -> bool {
        self.last.is_none()
    }

    fn apply<W: Write>(&mut self, writer: &mut W, style: Style) -> io::Result<()> {
        if self.last == Some(style) {
            return Ok(());
        }
        write!(writer, "\x1b[0m")?;
        if style.attrs.contains(crate::style::Attrs::BOLD) {
            write!(writer, "\x1b[1m")?;
        }
        if style.attrs.contains(crate::style::Attrs::DIM) {
            write!(writer, "\x1b[2m")?;
        }
        if style.attrs.contains(crate::style::Attrs::ITALIC) {
            write!(writer, "\x1b[3m")?;
        }
        if style.attrs.contains(crate::style::Attrs::UNDERLINE) {
            write!(writer, "\x1b[4m")?;
        }
        if style.attrs.contains(crate::style::Attrs::BLINK) {
            write!(writer, "\x1b[5m")?;
        }
        if style.attrs.contains(crate::style::Attrs::REVERSE) {
            write!(writer, "\x1b[7m")?;
        }
        if style.attrs.contains(crate::style::Attrs::STRIKETHROUGH) {
            write!(writer, "\x1b[9m")?;
        }
        if let Some(fg) = style.fg {
            write!(writer, "{}", fg.fg_sgr())?;
        }
        if let Some(bg) = style.bg {
            write!(writer, "{}", bg.bg_sgr())?;
        }
        self.last = Some(style);
        Ok(())
    }
}

pub(crate) fn emit_cursor<W: Write>(writer: &mut W, x: u16, y: u16, visible: bool) -> io::Result<()> {
    write!(writer, "\x1b[{};{}H", y + 1, x + 1)?;
    if visible {
        write!(writer, "\x1b[?25h")?;
    } else {
        write!(writer, "\x1b[?25l")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_write_text_roundtrip() {
        let mut buf = CellBuffer::new(4, 1).unwrap();
        let n = buf.write_text(0, 0, "Hi", Style::default()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(buf.cell_text(0, 0), Some("H"));
        assert_eq!(buf.cell_text(1, 0), Some("i"));
    }

    #[test]
    fn test_write_text_truncates_at_right_edge() {
        let mut buf = CellBuffer::new(3, 1).unwrap();
        let n = buf.write_text(0, 0, "Hello", Style::default()).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_double_width_at_edge_becomes_space() {
        let mut buf = CellBuffer::new(1, 1).unwrap();
        let n = buf.write_text(0, 0, "\u{4e2d}", Style::default()).unwrap();
        assert_eq!(n, 1);
        assert_eq!(buf.cell_text(0, 0), Some(" "));
    }

    #[test]
    fn test_dirty_union_covers_change() {
        let mut buf = CellBuffer::new(10, 3).unwrap();
        buf.write_text(0, 0, "AB", Style::default()).unwrap();
        buf.write_text(2, 0, "CD", Style::default()).unwrap();
        assert_eq!(buf.dirty_regions().len(), 2);
    }

    #[test]
    fn test_resize_preserves_intersection_and_marks_all_dirty() {
        let mut buf = CellBuffer::new(4, 2).unwrap();
        buf.write_text(0, 0, "Hi", Style::default()).unwrap();
        buf.clear_dirty();
        buf.resize(6, 4).unwrap();
        assert_eq!(buf.cell_text(0, 0), Some("H"));
        assert_eq!(buf.dirty_regions().len(), 1);
        assert_eq!(buf.dirty_regions()[0], Rect::new(0, 0, 6, 4));
    }

    #[test]
    fn test_cursor_bounds_check() {
        let mut buf = CellBuffer::new(4, 4).unwrap();
        assert!(buf.set_cursor(3, 3, true).is_ok());
        assert!(buf.set_cursor(4, 0, true).is_err());
    }

    #[test]
    fn test_render_emits_text_and_cursor_sequence() {
        let mut buf = CellBuffer::new(4, 1).unwrap();
        buf.write_text(0, 0, "Hi", Style::default()).unwrap();
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("Hi"));
        assert!(s.contains("\x1b[1;1H"));
        assert!(s.ends_with("\x1b[?25h"));
    }

    #[test]
    fn test_sgr_emitted_only_on_style_change() {
        let mut buf = CellBuffer::new(4, 1).unwrap();
        let red = Style::new().fg(Color::rgb(255, 0, 0));
        buf.write_text(0, 0, "AB", red).unwrap();
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s.matches("38;2;255;0;0").count(), 1);
    }
}
