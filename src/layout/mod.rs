//! Layout engine (§4.3): a constraint solver and builder producing [`crate::geometry::Rect`]s
//! for a tree of nodes, plus flex/grid/absolute helpers composed on top of it.

pub mod absolute;
pub mod builder;
pub mod constraint;
pub mod dimension;
pub mod flex;
pub mod grid;
pub mod legacy;

pub use absolute::{layout as absolute_layout, AbsoluteItem};
pub use builder::{split_column, split_row, LayoutBuilder, NodeHandle, ResolvedLayout};
pub use constraint::{ConstraintSpace, Relation, Solution, Strength, Variable};
pub use dimension::Dimension;
pub use flex::{AlignCross, AlignMain, FlexContainer, FlexDirection, FlexItem};
pub use grid::{GridContainer, GridPlacement};
