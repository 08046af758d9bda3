//! A fixed/flex-ratio single-pass layout, kept as a low-level fast path alongside the
//! constraint-based [`super::flex::FlexContainer`] (§4.3.4). This is the teacher's original
//! flex layout, unchanged in algorithm: no solver, no alignment passes, just a direct
//! proportional split — useful when a caller wants a `row`/`column` split without paying for
//! a constraint solve.

use crate::geometry::Rect;

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

/// Alignment options for flex containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Center,
    End,
    Stretch,
}

/// Size constraint for flex children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// Fixed size in cells.
    Fixed(u16),
    /// Proportional size (flex grow factor).
    Flex(u16),
    /// Size based on content (not implemented; acts as `Flex(1)`).
    Auto,
}

/// Flex container layout calculator.
#[derive(Debug, Clone)]
pub struct FlexLayout {
    direction: FlexDirection,
    gap: u16,
    padding: u16,
    align: Alignment,
}

impl FlexLayout {
    pub fn new(direction: FlexDirection) -> Self {
        FlexLayout {
            direction,
            gap: 0,
            padding: 0,
            align: Alignment::Stretch,
        }
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Calculate child rectangles for given container and sizes.
    pub fn layout(&self, container: Rect, sizes: &[Size]) -> Vec<Rect> {
        if sizes.is_empty() {
            return Vec::new();
        }

        let inner = container.inner(self.padding);
        let flex_unit_size = self.flex_unit_size(&inner, sizes);

        let mut rects = Vec::with_capacity(sizes.len());
        let mut offset = 0u16;

        for size in sizes {
            let child_main_size = match size {
                Size::Fixed(s) => *s,
                Size::Flex(f) => flex_unit_size.saturating_mul(*f),
                Size::Auto => flex_unit_size,
            };

            let rect = self.child_rect(&inner, offset, child_main_size);
            rects.push(rect);
            offset = offset.saturating_add(child_main_size).saturating_add(self.gap);
        }

        rects
    }

    fn flex_unit_size(&self, inner: &Rect, sizes: &[Size]) -> u16 {
        let main_size = match self.direction {
            FlexDirection::Row => inner.width,
            FlexDirection::Column => inner.height,
        };

        let total_gap = self.gap.saturating_mul(sizes.len().saturating_sub(1) as u16);
        let available = main_size.saturating_sub(total_gap);

        let mut fixed_space = 0u16;
        let mut flex_units = 0u16;

        for size in sizes {
            match size {
                Size::Fixed(s) => fixed_space = fixed_space.saturating_add(*s),
                Size::Flex(f) => flex_units = flex_units.saturating_add(*f),
                Size::Auto => flex_units = flex_units.saturating_add(1),
            }
        }

        let flex_space = available.saturating_sub(fixed_space);
        if flex_units > 0 {
            flex_space / flex_units
        } else {
            0
        }
    }

    fn child_rect(&self, inner: &Rect, offset: u16, child_main_size: u16) -> Rect {
        match self.direction {
            FlexDirection::Row => {
                let x = inner.x.saturating_add(offset);
                let y = self.calculate_cross_offset(inner.y, inner.height, inner.height);
                Rect::new(x, y, child_main_size, inner.height)
            }
            FlexDirection::Column => {
                let x = self.calculate_cross_offset(inner.x, inner.width, inner.width);
                let y = inner.y.saturating_add(offset);
                Rect::new(x, y, inner.width, child_main_size)
            }
        }
    }

    fn calculate_cross_offset(&self, base: u16, container_size: u16, child_size: u16) -> u16 {
        match self.align {
            Alignment::Start => base,
            Alignment::Center => base.saturating_add((container_size.saturating_sub(child_size)) / 2),
            Alignment::End => base.saturating_add(container_size.saturating_sub(child_size)),
            Alignment::Stretch => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_layout_row() {
        let container = Rect::new(0, 0, 100, 10);
        let layout = FlexLayout::new(FlexDirection::Row);

        let sizes = vec![Size::Fixed(20), Size::Flex(1), Size::Fixed(20)];
        let rects = layout.layout(container, &sizes);

        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].width, 20);
        assert_eq!(rects[1].width, 60);
        assert_eq!(rects[2].width, 20);
    }

    #[test]
    fn test_flex_layout_column_with_gap() {
        let container = Rect::new(0, 0, 80, 24);
        let layout = FlexLayout::new(FlexDirection::Column).gap(1);

        let sizes = vec![Size::Fixed(3), Size::Flex(1), Size::Fixed(1)];
        let rects = layout.layout(container, &sizes);

        assert_eq!(rects[0].height, 3);
        assert_eq!(rects[1].height, 18);
        assert_eq!(rects[2].height, 1);

        assert_eq!(rects[0].y, 0);
        assert_eq!(rects[1].y, 4);
        assert_eq!(rects[2].y, 23);
    }
}
