//! Ratatui-style flex container, composed on top of [`super::builder::LayoutBuilder`] (§4.3.3).
//!
//! Grounded on the teacher's original `FlexLayout` (kept as [`super::legacy`]) generalized from
//! a single fixed/flex-ratio pass into the full basis/grow/shrink/alignment model the
//! specification calls for; the weighted-chain technique (building a row/column call out of
//! items interleaved with gap placeholders) is new here but reuses `LayoutBuilder::row`'s
//! closure constraint to get exact, rounding-consistent pixel placement for free.

use super::builder::LayoutBuilder;
use super::dimension::Dimension;
use crate::error::LayoutError;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMain {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignCross {
    Start,
    Center,
    End,
    Stretch,
}

/// One item's contribution to a [`FlexContainer`] layout.
#[derive(Debug, Clone, Copy)]
pub struct FlexItem {
    pub basis: Dimension,
    pub grow: f64,
    pub shrink: f64,
    pub align_self: Option<AlignCross>,
}

impl FlexItem {
    pub fn new(basis: Dimension) -> Self {
        FlexItem {
            basis,
            grow: 0.0,
            shrink: 0.0,
            align_self: None,
        }
    }

    pub fn grow(mut self, grow: f64) -> Self {
        self.grow = grow;
        self
    }

    pub fn shrink(mut self, shrink: f64) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn align_self(mut self, align: AlignCross) -> Self {
        self.align_self = Some(align);
        self
    }
}

/// A flex container: direction, inter-item gap, and main/cross alignment.
#[derive(Debug, Clone, Copy)]
pub struct FlexContainer {
    pub direction: FlexDirection,
    pub gap: u16,
    pub align_main: AlignMain,
    pub align_cross: AlignCross,
}

impl FlexContainer {
    pub fn new(direction: FlexDirection) -> Self {
        FlexContainer {
            direction,
            gap: 0,
            align_main: AlignMain::Start,
            align_cross: AlignCross::Stretch,
        }
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn align_main(mut self, align: AlignMain) -> Self {
        self.align_main = align;
        self
    }

    pub fn align_cross(mut self, align: AlignCross) -> Self {
        self.align_cross = align;
        self
    }

    /// Resolve `items` into rects within `area`, clamped so no result ever lies outside it.
    pub fn layout(&self, area: Rect, items: &[FlexItem]) -> Result<Vec<Rect>, LayoutError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let (extent, cross_extent) = match self.direction {
            FlexDirection::Row => (area.width, area.height),
            FlexDirection::Column => (area.height, area.width),
        };

        let main_sizes = resolve_main_sizes(extent, self.gap, items);
        let content_len = main_sizes.iter().map(|&s| s as u32).sum::<u32>()
            + self.gap as u32 * items.len().saturating_sub(1) as u32;
        let leftover = (extent as u32).saturating_sub(content_len) as u16;

        let (leading, trailing, inter_gaps) = distribute_leftover(self.align_main, leftover, self.gap, items.len());

        let mut builder = LayoutBuilder::new();
        let root = builder.create_node();
        builder.set_rect(
            root,
            match self.direction {
                FlexDirection::Row => Rect::new(area.x, area.y, extent, cross_extent),
                FlexDirection::Column => Rect::new(area.x, area.y, cross_extent, extent),
            },
        );

        const EPSILON: f64 = 1e-6;
        let mut chain: Vec<(super::builder::NodeHandle, f64)> = Vec::new();
        chain.push((builder.create_node(), (leading as f64).max(EPSILON)));
        for (i, &size) in main_sizes.iter().enumerate() {
            chain.push((builder.create_node(), (size as f64).max(EPSILON)));
            if i + 1 < main_sizes.len() {
                chain.push((builder.create_node(), (inter_gaps[i] as f64).max(EPSILON)));
            }
        }
        chain.push((builder.create_node(), (trailing as f64).max(EPSILON)));

        match self.direction {
            FlexDirection::Row => builder.row(root, &chain)?,
            FlexDirection::Column => builder.column(root, &chain)?,
        }

        let resolved = builder.solve()?;

        // chain layout: [leading, item0, gap0, item1, gap1, ..., itemN, trailing]
        let mut item_handles = Vec::with_capacity(items.len());
        let mut idx = 1;
        for i in 0..items.len() {
            item_handles.push(chain[idx].0);
            idx += if i + 1 < items.len() { 2 } else { 1 };
        }

        let rects = item_handles
            .iter()
            .zip(items.iter())
            .map(|(&handle, item)| {
                let main_rect = resolved.rect(handle);
                apply_cross_axis(self, area, main_rect, item)
            })
            .collect();
        Ok(rects)
    }
}

/// Passes 1-4 of §4.3.3: resolve each item's main-axis basis, then grow to fill leftover room
/// or shrink to fit an overflow, clamped to non-negative.
fn resolve_main_sizes(extent: u16, gap: u16, items: &[FlexItem]) -> Vec<u16> {
    let n = items.len();
    let total_gap = gap as i64 * (n.saturating_sub(1)) as i64;
    let available = extent as i64 - total_gap;

    let mut basis = vec![0i64; n];
    let mut fixed_total: i64 = 0;
    let mut fraction_idxs = Vec::new();

    for (i, item) in items.iter().enumerate() {
        match item.basis {
            Dimension::Auto => {}
            Dimension::Px(px) => {
                basis[i] = (px as i64).min(available.max(0));
                fixed_total += basis[i];
            }
            Dimension::Percent(pct) => {
                let pct = pct.min(100) as i64;
                basis[i] = (available.max(0) * pct) / 100;
                fixed_total += basis[i];
            }
            Dimension::Fraction(_) => fraction_idxs.push(i),
        }
    }

    let mut remaining = available - fixed_total;
    if remaining > 0 && !fraction_idxs.is_empty() {
        let total_weight: u32 = fraction_idxs
            .iter()
            .map(|&i| match items[i].basis {
                Dimension::Fraction(w) => w.max(1),
                _ => unreachable!(),
            })
            .sum();
        let mut used = 0i64;
        for (k, &i) in fraction_idxs.iter().enumerate() {
            let w = match items[i].basis {
                Dimension::Fraction(w) => w.max(1),
                _ => unreachable!(),
            };
            let share = if k + 1 == fraction_idxs.len() {
                remaining - used
            } else {
                remaining * w as i64 / total_weight as i64
            };
            basis[i] = share;
            used += share;
        }
        remaining = 0;
    }

    if remaining > 0 {
        let total_grow: f64 = items.iter().map(|it| it.grow).sum();
        if total_grow > 0.0 {
            let mut used = 0i64;
            let grow_idxs: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, it)| it.grow > 0.0)
                .map(|(i, _)| i)
                .collect();
            for (k, &i) in grow_idxs.iter().enumerate() {
                let share = if k + 1 == grow_idxs.len() {
                    remaining - used
                } else {
                    ((remaining as f64) * items[i].grow / total_grow).round() as i64
                };
                basis[i] += share;
                used += share;
            }
        }
    } else if remaining < 0 {
        let overflow = -remaining;
        let total_shrink: f64 = items.iter().map(|it| it.shrink).sum();
        if total_shrink > 0.0 {
            let mut used = 0i64;
            let shrink_idxs: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, it)| it.shrink > 0.0)
                .map(|(i, _)| i)
                .collect();
            for (k, &i) in shrink_idxs.iter().enumerate() {
                let share = if k + 1 == shrink_idxs.len() {
                    overflow - used
                } else {
                    ((overflow as f64) * items[i].shrink / total_shrink).round() as i64
                };
                basis[i] = (basis[i] - share).max(0);
                used += share;
            }
        }
    }

    basis.into_iter().map(|v| v.clamp(0, u16::MAX as i64) as u16).collect()
}

/// Pass 5 of §4.3.3: turn leftover main-axis space into leading/trailing padding and extra
/// inter-item gap, per `align_main`.
fn distribute_leftover(align: AlignMain, leftover: u16, gap: u16, n: usize) -> (u16, u16, Vec<u16>) {
    let base_gaps = vec![gap; n.saturating_sub(1)];
    if n <= 1 || leftover == 0 {
        return match align {
            AlignMain::End => (leftover, 0, base_gaps),
            AlignMain::Center => (leftover / 2, leftover - leftover / 2, base_gaps),
            _ => (0, leftover, base_gaps),
        };
    }

    match align {
        AlignMain::Start => (0, leftover, base_gaps),
        AlignMain::End => (leftover, 0, base_gaps),
        AlignMain::Center => {
            let leading = leftover / 2;
            (leading, leftover - leading, base_gaps)
        }
        AlignMain::SpaceBetween => {
            let slots = n - 1;
            let mut gaps = Vec::with_capacity(slots);
            let mut used = 0u16;
            for k in 0..slots {
                let extra = if k + 1 == slots {
                    leftover - used
                } else {
                    leftover / slots as u16
                };
                gaps.push(gap + extra);
                used += extra;
            }
            (0, 0, gaps)
        }
        AlignMain::SpaceAround => {
            let per_slot = leftover / n as u16;
            let half = per_slot / 2;
            let mut gaps = Vec::with_capacity(n - 1);
            let mut used = half;
            for _ in 0..n - 1 {
                gaps.push(gap + per_slot);
                used += per_slot;
            }
            let trailing = leftover.saturating_sub(used);
            (half, trailing, gaps)
        }
        AlignMain::SpaceEvenly => {
            let slot = leftover / (n as u16 + 1);
            let mut gaps = Vec::with_capacity(n - 1);
            let mut used = slot;
            for _ in 0..n - 1 {
                gaps.push(gap + slot);
                used += slot;
            }
            let trailing = leftover.saturating_sub(used);
            (slot, trailing, gaps)
        }
    }
}

/// Pass 7 of §4.3.3: override the cross-axis band of a solved main-axis rect according to
/// `align_cross`/`align_self`. Without a content-measurement pass, a non-stretch item's
/// natural cross size is taken to be a single cell; `Stretch` fills the container's cross
/// extent. Always clamped inside `area`.
fn apply_cross_axis(container: &FlexContainer, area: Rect, main_rect: Rect, item: &FlexItem) -> Rect {
    let align = item.align_self.unwrap_or(container.align_cross);
    let (cross_origin, cross_extent) = match container.direction {
        FlexDirection::Row => (area.y, area.height),
        FlexDirection::Column => (area.x, area.width),
    };

    let (cross_offset, cross_size) = match align {
        AlignCross::Stretch => (0, cross_extent),
        AlignCross::Start => (0, 1.min(cross_extent)),
        AlignCross::Center => ((cross_extent.saturating_sub(1)) / 2, 1.min(cross_extent)),
        AlignCross::End => (cross_extent.saturating_sub(1), 1.min(cross_extent)),
    };

    let rect = match container.direction {
        FlexDirection::Row => Rect::new(main_rect.x, cross_origin + cross_offset, main_rect.width, cross_size),
        FlexDirection::Column => Rect::new(cross_origin + cross_offset, main_rect.y, cross_size, main_rect.height),
    };
    rect.clamp_to(&area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_items_row() {
        let container = FlexContainer::new(FlexDirection::Row);
        let items = [FlexItem::new(Dimension::Px(20)), FlexItem::new(Dimension::Px(30))];
        let rects = container.layout(Rect::new(0, 0, 100, 5), &items).unwrap();
        assert_eq!(rects[0].width, 20);
        assert_eq!(rects[1].width, 30);
        assert_eq!(rects[1].x, 20);
    }

    #[test]
    fn test_grow_fills_remaining_space() {
        let container = FlexContainer::new(FlexDirection::Row);
        let items = [
            FlexItem::new(Dimension::Px(20)),
            FlexItem::new(Dimension::Auto).grow(1.0),
        ];
        let rects = container.layout(Rect::new(0, 0, 100, 5), &items).unwrap();
        assert_eq!(rects[0].width, 20);
        assert_eq!(rects[1].width, 80);
    }

    #[test]
    fn test_shrink_reduces_overflow() {
        let container = FlexContainer::new(FlexDirection::Row);
        let items = [
            FlexItem::new(Dimension::Px(80)).shrink(1.0),
            FlexItem::new(Dimension::Px(80)).shrink(1.0),
        ];
        let rects = container.layout(Rect::new(0, 0, 100, 5), &items).unwrap();
        assert_eq!(rects[0].width + rects[1].width, 100);
    }

    #[test]
    fn test_align_main_end_pushes_items_to_trailing_edge() {
        let container = FlexContainer::new(FlexDirection::Row).align_main(AlignMain::End);
        let items = [FlexItem::new(Dimension::Px(20))];
        let rects = container.layout(Rect::new(0, 0, 100, 5), &items).unwrap();
        assert_eq!(rects[0].x, 80);
        assert_eq!(rects[0].width, 20);
    }

    #[test]
    fn test_align_cross_stretch_fills_container_height() {
        let container = FlexContainer::new(FlexDirection::Row);
        let items = [FlexItem::new(Dimension::Px(20))];
        let rects = container.layout(Rect::new(0, 0, 100, 8), &items).unwrap();
        assert_eq!(rects[0].height, 8);
    }

    #[test]
    fn test_items_placed_within_nonzero_origin_area() {
        let container = FlexContainer::new(FlexDirection::Row);
        let items = [FlexItem::new(Dimension::Px(20)), FlexItem::new(Dimension::Px(30))];
        let rects = container.layout(Rect::new(5, 5, 100, 5), &items).unwrap();
        assert_eq!(rects[0], Rect::new(5, 5, 20, 5));
        assert_eq!(rects[1], Rect::new(25, 5, 30, 5));
    }

    #[test]
    fn test_results_never_escape_area() {
        let container = FlexContainer::new(FlexDirection::Row).align_cross(AlignCross::Center);
        let items = [FlexItem::new(Dimension::Px(20))];
        let rects = container.layout(Rect::new(5, 5, 100, 8), &items).unwrap();
        let area = Rect::new(5, 5, 100, 8);
        assert!(area.contains(rects[0].x, rects[0].y));
    }
}
