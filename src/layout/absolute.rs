//! Absolute layout: each item's rect is resolved independently against the container extent,
//! with `Fraction` items sharing whatever the container provides proportionally (§4.3.3).

use super::dimension::{distribute, Dimension};
use crate::geometry::Rect;

/// One item's independently-specified position and size.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteItem {
    pub x: Dimension,
    pub y: Dimension,
    pub width: Dimension,
    pub height: Dimension,
}

impl AbsoluteItem {
    pub fn new(x: Dimension, y: Dimension, width: Dimension, height: Dimension) -> Self {
        AbsoluteItem { x, y, width, height }
    }
}

/// Resolve `items`' rects within `area`. Each item's `x`/`width` shares `area.width` with
/// every other item's `x`/`width` declared as a `Fraction` (and likewise for `y`/`height`
/// against `area.height`) — this mirrors the grid's per-axis track distribution, just with
/// each item contributing independent x/width and y/height "tracks" instead of a shared set.
/// Output is always clamped inside `area`.
pub fn layout(area: Rect, items: &[AbsoluteItem]) -> Vec<Rect> {
    if items.is_empty() {
        return Vec::new();
    }
    let xs: Vec<Dimension> = items.iter().map(|i| i.x).collect();
    let ws: Vec<Dimension> = items.iter().map(|i| i.width).collect();
    let ys: Vec<Dimension> = items.iter().map(|i| i.y).collect();
    let hs: Vec<Dimension> = items.iter().map(|i| i.height).collect();

    let xs = distribute(area.width, 0, &xs);
    let ws = distribute(area.width, 0, &ws);
    let ys = distribute(area.height, 0, &ys);
    let hs = distribute(area.height, 0, &hs);

    (0..items.len())
        .map(|i| {
            let rect = Rect::new(area.x + xs[i], area.y + ys[i], ws[i], hs[i]);
            rect.clamp_to(&area)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rect_independent_of_other_items() {
        let items = [
            AbsoluteItem::new(Dimension::Px(5), Dimension::Px(5), Dimension::Px(10), Dimension::Px(4)),
            AbsoluteItem::new(Dimension::Px(0), Dimension::Px(0), Dimension::Px(3), Dimension::Px(3)),
        ];
        let rects = layout(Rect::new(0, 0, 40, 20), &items);
        assert_eq!(rects[0], Rect::new(5, 5, 10, 4));
        assert_eq!(rects[1], Rect::new(0, 0, 3, 3));
    }

    #[test]
    fn test_fraction_items_share_extent_proportionally() {
        let items = [
            AbsoluteItem::new(Dimension::Px(0), Dimension::Px(0), Dimension::Fraction(1), Dimension::Px(4)),
            AbsoluteItem::new(Dimension::Px(0), Dimension::Px(0), Dimension::Fraction(1), Dimension::Px(4)),
        ];
        let rects = layout(Rect::new(0, 0, 20, 4), &items);
        assert_eq!(rects[0].width, 10);
        assert_eq!(rects[1].width, 10);
    }

    #[test]
    fn test_output_clamped_inside_area() {
        let items = [AbsoluteItem::new(
            Dimension::Px(100),
            Dimension::Px(100),
            Dimension::Px(50),
            Dimension::Px(50),
        )];
        let area = Rect::new(0, 0, 20, 20);
        let rects = layout(area, &items);
        assert!(rects[0].right() <= area.right());
        assert!(rects[0].bottom() <= area.bottom());
    }
}
