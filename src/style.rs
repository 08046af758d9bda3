//! Cell style: foreground/background color plus text attributes, and the SGR
//! attribute bits the renderer needs to diff between two styles.

use crate::color::Color;

bitflags::bitflags! {
    /// Text attribute flags, one bit per SGR code this crate emits (§6):
    /// bold=1, italic=3, underline=4, blink=5, reverse=7, strikethrough=9. `DIM` maps to SGR 2
    /// and is carried for parity with terminals that distinguish "dim" from plain unset-bold.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attrs: u8 {
        const BOLD          = 0b0000_0001;
        const DIM            = 0b0000_0010;
        const ITALIC         = 0b0000_0100;
        const UNDERLINE      = 0b0000_1000;
        const BLINK          = 0b0001_0000;
        const REVERSE        = 0b0010_0000;
        const STRIKETHROUGH  = 0b0100_0000;
    }
}

/// A cell's visual style: optional foreground/background color and attribute flags.
///
/// `Style` is `Copy` so every `Cell` can carry one by value without an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
}

impl Style {
    /// The default style: no color override, no attributes.
    pub fn new() -> Self {
        Style::default()
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.set_attr(Attrs::BOLD, on)
    }

    pub fn dim(mut self, on: bool) -> Self {
        self.set_attr(Attrs::DIM, on)
    }

    pub fn italic(mut self, on: bool) -> Self {
        self.set_attr(Attrs::ITALIC, on)
    }

    pub fn underline(mut self, on: bool) -> Self {
        self.set_attr(Attrs::UNDERLINE, on)
    }

    pub fn blink(mut self, on: bool) -> Self {
        self.set_attr(Attrs::BLINK, on)
    }

    pub fn reverse(mut self, on: bool) -> Self {
        self.set_attr(Attrs::REVERSE, on)
    }

    pub fn strikethrough(mut self, on: bool) -> Self {
        self.set_attr(Attrs::STRIKETHROUGH, on)
    }

    fn set_attr(mut self, bit: Attrs, on: bool) -> Self {
        self.attrs.set(bit, on);
        self
    }

    /// Merge `other` over `self`: any property `other` sets explicitly overrides `self`'s,
    /// attributes are unioned. Used when a child's style augments an inherited one.
    pub fn merge(mut self, other: &Style) -> Self {
        if other.fg.is_some() {
            self.fg = other.fg;
        }
        if other.bg.is_some() {
            self.bg = other.bg;
        }
        self.attrs |= other.attrs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_builder() {
        let s = Style::new().bold(true).underline(true);
        assert!(s.attrs.contains(Attrs::BOLD));
        assert!(s.attrs.contains(Attrs::UNDERLINE));
        assert!(!s.attrs.contains(Attrs::ITALIC));
    }

    #[test]
    fn test_style_merge_overrides_color_unions_attrs() {
        let base = Style::new().fg(Color::white()).bold(true);
        let patch = Style::new().bg(Color::black()).italic(true);
        let merged = base.merge(&patch);
        assert_eq!(merged.fg, Some(Color::white()));
        assert_eq!(merged.bg, Some(Color::black()));
        assert!(merged.attrs.contains(Attrs::BOLD));
        assert!(merged.attrs.contains(Attrs::ITALIC));
    }

    #[test]
    fn test_style_equality_for_sgr_diffing() {
        let a = Style::new().fg(Color::white());
        let b = Style::new().fg(Color::white());
        let c = Style::new().fg(Color::black());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
