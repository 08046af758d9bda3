//! Layout builder: a tree of nodes pinned and chained by constraints, solved into [`Rect`]s
//! (§4.3.2).

use super::constraint::{ConstraintSpace, Relation, Solution, Strength, Variable};
use crate::error::LayoutError;
use crate::geometry::Rect;

/// A handle to one node's four rect variables (`x`, `y`, `width`, `height`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Clone, Copy)]
struct NodeVars {
    x: Variable,
    y: Variable,
    w: Variable,
    h: Variable,
}

/// Builds a constraint space over a tree of rect-valued nodes.
pub struct LayoutBuilder {
    space: ConstraintSpace,
    nodes: Vec<NodeVars>,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        LayoutBuilder::new()
    }
}

impl LayoutBuilder {
    pub fn new() -> Self {
        LayoutBuilder {
            space: ConstraintSpace::new(),
            nodes: Vec::new(),
        }
    }

    /// Allocate a new node (four fresh variables: x, y, width, height).
    pub fn create_node(&mut self) -> NodeHandle {
        let vars = NodeVars {
            x: self.space.new_variable(),
            y: self.space.new_variable(),
            w: self.space.new_variable(),
            h: self.space.new_variable(),
        };
        self.nodes.push(vars);
        NodeHandle(self.nodes.len() - 1)
    }

    /// Pin every variable of `handle` to a literal rect as a `Required` equality.
    pub fn set_rect(&mut self, handle: NodeHandle, rect: Rect) {
        let v = self.nodes[handle.0];
        self.pin(v.x, rect.x as f64);
        self.pin(v.y, rect.y as f64);
        self.pin(v.w, rect.width as f64);
        self.pin(v.h, rect.height as f64);
    }

    fn pin(&mut self, var: Variable, value: f64) {
        self.space
            .add_constraint(&[(var, 1.0)], Relation::Eq, value, Strength::Required);
    }

    fn eq(&mut self, terms: &[(Variable, f64)], constant: f64) {
        self.space
            .add_constraint(terms, Relation::Eq, constant, Strength::Required);
    }

    /// Lay out `children` as a horizontal row inside `parent`, each sized proportionally to
    /// its `weight` (> 0) of `parent`'s width. Returns `InvalidWeight` if any weight is not
    /// positive.
    pub fn row(&mut self, parent: NodeHandle, children: &[(NodeHandle, f64)]) -> Result<(), LayoutError> {
        self.chain(parent, children, Axis::Horizontal)
    }

    /// Mirror of [`Self::row`] on the vertical axis.
    pub fn column(&mut self, parent: NodeHandle, children: &[(NodeHandle, f64)]) -> Result<(), LayoutError> {
        self.chain(parent, children, Axis::Vertical)
    }

    fn chain(
        &mut self,
        parent: NodeHandle,
        children: &[(NodeHandle, f64)],
        axis: Axis,
    ) -> Result<(), LayoutError> {
        if children.iter().any(|(_, w)| *w <= 0.0) {
            return Err(LayoutError::InvalidWeight);
        }
        if children.is_empty() {
            return Ok(());
        }
        let total_weight: f64 = children.iter().map(|(_, w)| w).sum();
        let parent_vars = self.nodes[parent.0];

        for &(child, _) in children {
            let cv = self.nodes[child.0];
            match axis {
                Axis::Horizontal => {
                    self.eq(&[(cv.y, 1.0), (parent_vars.y, -1.0)], 0.0);
                    self.eq(&[(cv.h, 1.0), (parent_vars.h, -1.0)], 0.0);
                }
                Axis::Vertical => {
                    self.eq(&[(cv.x, 1.0), (parent_vars.x, -1.0)], 0.0);
                    self.eq(&[(cv.w, 1.0), (parent_vars.w, -1.0)], 0.0);
                }
            }
        }

        for &(child, weight) in children {
            let cv = self.nodes[child.0];
            let (main_size_var, parent_main_var) = match axis {
                Axis::Horizontal => (cv.w, parent_vars.w),
                Axis::Vertical => (cv.h, parent_vars.h),
            };
            // total_weight * child.main == weight * parent.main
            self.eq(
                &[(main_size_var, total_weight), (parent_main_var, -weight)],
                0.0,
            );
        }

        let first_vars = self.nodes[children[0].0];
        match axis {
            Axis::Horizontal => self.eq(&[(first_vars.x, 1.0), (parent_vars.x, -1.0)], 0.0),
            Axis::Vertical => self.eq(&[(first_vars.y, 1.0), (parent_vars.y, -1.0)], 0.0),
        }

        for pair in children.windows(2) {
            let (prev, _) = pair[0];
            let (cur, _) = pair[1];
            let pv = self.nodes[prev.0];
            let cv = self.nodes[cur.0];
            match axis {
                Axis::Horizontal => self.eq(&[(cv.x, 1.0), (pv.x, -1.0), (pv.w, -1.0)], 0.0),
                Axis::Vertical => self.eq(&[(cv.y, 1.0), (pv.y, -1.0), (pv.h, -1.0)], 0.0),
            }
        }

        let last_vars = self.nodes[children[children.len() - 1].0];
        match axis {
            Axis::Horizontal => self.eq(
                &[(last_vars.x, 1.0), (last_vars.w, 1.0), (parent_vars.x, -1.0), (parent_vars.w, -1.0)],
                0.0,
            ),
            Axis::Vertical => self.eq(
                &[(last_vars.y, 1.0), (last_vars.h, 1.0), (parent_vars.y, -1.0), (parent_vars.h, -1.0)],
                0.0,
            ),
        }

        Ok(())
    }

    /// Solve the accumulated space and read back every node's rect.
    pub fn solve(self) -> Result<ResolvedLayout, LayoutError> {
        let solution = self.space.solve()?;
        let rects = self
            .nodes
            .iter()
            .map(|v| rect_from_solution(&solution, *v))
            .collect();
        Ok(ResolvedLayout { rects })
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn rect_from_solution(solution: &Solution, v: NodeVars) -> Rect {
    Rect::new(
        clamp_u16(solution.value(v.x)),
        clamp_u16(solution.value(v.y)),
        clamp_u16(solution.value(v.w)),
        clamp_u16(solution.value(v.h)),
    )
}

fn clamp_u16(value: f64) -> u16 {
    value.round().clamp(0.0, u16::MAX as f64) as u16
}

/// The solved rect for every node created in a [`LayoutBuilder`].
pub struct ResolvedLayout {
    rects: Vec<Rect>,
}

impl ResolvedLayout {
    pub fn rect(&self, handle: NodeHandle) -> Rect {
        self.rects[handle.0]
    }
}

/// Split `area` into a horizontal row of rects sized proportionally to `weights`.
pub fn split_row(area: Rect, weights: &[f64]) -> Result<Vec<Rect>, LayoutError> {
    split(area, weights, Axis::Horizontal)
}

/// Split `area` into a vertical column of rects sized proportionally to `weights`.
pub fn split_column(area: Rect, weights: &[f64]) -> Result<Vec<Rect>, LayoutError> {
    split(area, weights, Axis::Vertical)
}

fn split(area: Rect, weights: &[f64], axis: Axis) -> Result<Vec<Rect>, LayoutError> {
    if weights.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = LayoutBuilder::new();
    let root = builder.create_node();
    builder.set_rect(root, area);
    let children: Vec<NodeHandle> = weights.iter().map(|_| builder.create_node()).collect();
    let pairs: Vec<(NodeHandle, f64)> = children.iter().copied().zip(weights.iter().copied()).collect();
    match axis {
        Axis::Horizontal => builder.row(root, &pairs)?,
        Axis::Vertical => builder.column(root, &pairs)?,
    }
    let resolved = builder.solve()?;
    Ok(children.iter().map(|h| resolved.rect(*h)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rect_pins_literal_values() {
        let mut builder = LayoutBuilder::new();
        let root = builder.create_node();
        builder.set_rect(root, Rect::new(1, 2, 3, 4));
        let resolved = builder.solve().unwrap();
        assert_eq!(resolved.rect(root), Rect::new(1, 2, 3, 4));
    }

    #[test]
    fn test_row_splits_by_weight() {
        let mut builder = LayoutBuilder::new();
        let root = builder.create_node();
        builder.set_rect(root, Rect::new(0, 0, 100, 10));
        let a = builder.create_node();
        let b = builder.create_node();
        builder.row(root, &[(a, 1.0), (b, 1.0)]).unwrap();
        let resolved = builder.solve().unwrap();
        assert_eq!(resolved.rect(a), Rect::new(0, 0, 50, 10));
        assert_eq!(resolved.rect(b), Rect::new(50, 0, 50, 10));
    }

    #[test]
    fn test_row_rejects_nonpositive_weight() {
        let mut builder = LayoutBuilder::new();
        let root = builder.create_node();
        builder.set_rect(root, Rect::new(0, 0, 100, 10));
        let a = builder.create_node();
        assert_eq!(
            builder.row(root, &[(a, 0.0)]),
            Err(LayoutError::InvalidWeight)
        );
    }

    #[test]
    fn test_split_row_convenience() {
        let rects = split_row(Rect::new(0, 0, 90, 1), &[1.0, 2.0]).unwrap();
        assert_eq!(rects[0], Rect::new(0, 0, 30, 1));
        assert_eq!(rects[1], Rect::new(30, 0, 60, 1));
    }

    #[test]
    fn test_split_column_convenience() {
        let rects = split_column(Rect::new(0, 0, 1, 20), &[1.0, 3.0]).unwrap();
        assert_eq!(rects[0], Rect::new(0, 0, 1, 5));
        assert_eq!(rects[1], Rect::new(0, 5, 1, 15));
    }
}
