//! Grid layout: independent track distribution per axis, with item placement and spanning
//! (§4.3.3).

use super::dimension::{distribute, Dimension};
use crate::error::LayoutError;
use crate::geometry::Rect;

/// Where one item sits in the grid, in track indices (0-based) and spans (>= 1).
#[derive(Debug, Clone, Copy)]
pub struct GridPlacement {
    pub column: usize,
    pub column_span: usize,
    pub row: usize,
    pub row_span: usize,
}

impl GridPlacement {
    pub fn new(column: usize, row: usize) -> Self {
        GridPlacement {
            column,
            column_span: 1,
            row,
            row_span: 1,
        }
    }

    pub fn column_span(mut self, span: usize) -> Self {
        self.column_span = span.max(1);
        self
    }

    pub fn row_span(mut self, span: usize) -> Self {
        self.row_span = span.max(1);
        self
    }
}

/// A grid container: explicit column and row tracks, plus inter-track gaps.
pub struct GridContainer {
    pub columns: Vec<Dimension>,
    pub rows: Vec<Dimension>,
    pub column_gap: u16,
    pub row_gap: u16,
}

impl GridContainer {
    pub fn new(columns: Vec<Dimension>, rows: Vec<Dimension>) -> Self {
        GridContainer {
            columns,
            rows,
            column_gap: 0,
            row_gap: 0,
        }
    }

    pub fn column_gap(mut self, gap: u16) -> Self {
        self.column_gap = gap;
        self
    }

    pub fn row_gap(mut self, gap: u16) -> Self {
        self.row_gap = gap;
        self
    }

    /// Resolve track sizes within `area`, then place each of `items` at the union of its
    /// spanned tracks (minus inter-track gaps), clamped inside `area`.
    pub fn layout(&self, area: Rect, items: &[GridPlacement]) -> Result<Vec<Rect>, LayoutError> {
        let col_sizes = distribute(area.width, self.column_gap, &self.columns);
        let row_sizes = distribute(area.height, self.row_gap, &self.rows);
        let col_offsets = offsets(&col_sizes, self.column_gap);
        let row_offsets = offsets(&row_sizes, self.row_gap);

        let rects = items
            .iter()
            .map(|item| {
                let rect = span_rect(
                    area.x,
                    &col_offsets,
                    &col_sizes,
                    item.column,
                    item.column_span,
                    area.y,
                    &row_offsets,
                    &row_sizes,
                    item.row,
                    item.row_span,
                );
                rect.clamp_to(&area)
            })
            .collect();
        Ok(rects)
    }
}

fn offsets(sizes: &[u16], gap: u16) -> Vec<u16> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut pos = 0u16;
    for &size in sizes {
        offsets.push(pos);
        pos = pos.saturating_add(size).saturating_add(gap);
    }
    offsets
}

#[allow(clippy::too_many_arguments)]
fn span_rect(
    origin_x: u16,
    col_offsets: &[u16],
    col_sizes: &[u16],
    column: usize,
    column_span: usize,
    origin_y: u16,
    row_offsets: &[u16],
    row_sizes: &[u16],
    row: usize,
    row_span: usize,
) -> Rect {
    let col_end = (column + column_span).min(col_offsets.len()).max(column + 1);
    let row_end = (row + row_span).min(row_offsets.len()).max(row + 1);

    let x = origin_x + col_offsets.get(column).copied().unwrap_or(0);
    let y = origin_y + row_offsets.get(row).copied().unwrap_or(0);

    let right = col_offsets
        .get(col_end - 1)
        .zip(col_sizes.get(col_end - 1))
        .map(|(o, s)| origin_x + o + s)
        .unwrap_or(x);
    let bottom = row_offsets
        .get(row_end - 1)
        .zip(row_sizes.get(row_end - 1))
        .map(|(o, s)| origin_y + o + s)
        .unwrap_or(y);

    Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_two_by_two_equal_tracks() {
        let grid = GridContainer::new(
            vec![Dimension::Fraction(1), Dimension::Fraction(1)],
            vec![Dimension::Fraction(1), Dimension::Fraction(1)],
        );
        let items = [
            GridPlacement::new(0, 0),
            GridPlacement::new(1, 0),
            GridPlacement::new(0, 1),
            GridPlacement::new(1, 1),
        ];
        let rects = grid.layout(Rect::new(0, 0, 10, 10), &items).unwrap();
        assert_eq!(rects[0], Rect::new(0, 0, 5, 5));
        assert_eq!(rects[1], Rect::new(5, 0, 5, 5));
        assert_eq!(rects[3], Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn test_grid_item_spans_two_columns() {
        let grid = GridContainer::new(
            vec![Dimension::Fraction(1), Dimension::Fraction(1), Dimension::Fraction(1)],
            vec![Dimension::Fraction(1)],
        );
        let items = [GridPlacement::new(0, 0).column_span(2)];
        let rects = grid.layout(Rect::new(0, 0, 9, 4), &items).unwrap();
        assert_eq!(rects[0], Rect::new(0, 0, 6, 4));
    }

    #[test]
    fn test_grid_respects_column_gap() {
        let grid = GridContainer::new(
            vec![Dimension::Fraction(1), Dimension::Fraction(1)],
            vec![Dimension::Fraction(1)],
        )
        .column_gap(2);
        let items = [GridPlacement::new(1, 0)];
        let rects = grid.layout(Rect::new(0, 0, 10, 1), &items).unwrap();
        assert_eq!(rects[0].x, 6);
    }
}
