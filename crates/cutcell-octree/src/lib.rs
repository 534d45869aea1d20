#![warn(missing_docs)]

//! Hierarchical grid for octree-adaptive cut-cell searches.
//!
//! A [`CellTree`] is a rectangular grid of root cells, each of which may be
//! refined into eight children recursively. Cells live in an arena and are
//! addressed by [`CellId`]. Every cell owns a fixed-size slice of one data
//! blob managed by the tree; solvers lay out their per-cell payload inside
//! it (cutcell stores its six-direction cut info there).
//!
//! # Example
//!
//! ```
//! use cutcell_math::{Point3, Vec3};
//! use cutcell_octree::CellTree;
//!
//! let mut tree = CellTree::new([2, 1, 1], Point3::origin(), Vec3::new(1.0, 1.0, 1.0), 8).unwrap();
//! let root = tree.root(0, 0, 0).unwrap();
//! let children = tree.refine(root).unwrap();
//! assert_eq!(tree.cell(children[7]).origin, Point3::new(0.5, 0.5, 0.5));
//! assert_eq!(tree.leaf_cells().len(), 9);
//! ```

mod octree;

pub use octree::{Cell, CellId, CellTree};

use thiserror::Error;

/// Errors from octree construction and refinement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OctreeError {
    /// Root grid dimensions must all be positive.
    #[error("invalid root grid size: {0:?}")]
    InvalidSize([usize; 3]),

    /// Root cell pitch must be positive and finite.
    #[error("invalid root cell pitch: {0}")]
    InvalidPitch(String),

    /// No cell with this id exists.
    #[error("unknown cell: {0}")]
    UnknownCell(u32),

    /// The cell already has children.
    #[error("cell {0} is already refined")]
    AlreadyRefined(u32),

    /// Refinement would exceed the deepest supported level.
    #[error("maximum refinement level {0} reached")]
    MaxLevel(u8),
}

/// Result type for octree operations.
pub type Result<T> = std::result::Result<T, OctreeError>;
