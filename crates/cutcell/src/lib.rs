#![warn(missing_docs)]

//! Cut-cell intersection engine.
//!
//! For every point of a structured grid, or every cell of an octree, this
//! crate finds the nearest intersection of a closed triangulated surface
//! along the six axis-aligned directions within a short probe, and stores
//! the normalized distance and the boundary id of the surface that was hit.
//! Optionally the unit normal of each hit triangle is recorded in a
//! deduplicated normal table.
//!
//! Triangles come from any [`PolygonIndex`](cutcell_polygon::PolygonIndex);
//! grid geometry comes from any [`GridAccessor`]. Results land in compact
//! arrays whose encodings are chosen by codec type parameters.
//!
//! # Example
//!
//! ```
//! use cutcell::{calc_cut_info_all, CellGrid, CutBid8Array, CutPos32Array, CutSettings};
//! use cutcell_math::{Direction, Point3, Vec3};
//! use cutcell_polygon::PolygonStore;
//!
//! let mut store = PolygonStore::new();
//! let wall = store.add_group(None, "wall", 7).unwrap();
//! let p = |y: f64, z: f64| Point3::new(0.5, y, z);
//! store.add_triangle(wall, [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]).unwrap();
//! store.add_triangle(wall, [p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]).unwrap();
//! store.build_index();
//!
//! let grid = CellGrid::new(Point3::origin(), Vec3::new(0.25, 0.25, 0.25));
//! let mut pos = CutPos32Array::new([4, 4, 4]);
//! let mut bid = CutBid8Array::new([4, 4, 4]);
//! calc_cut_info_all(&grid, &store, &mut pos, &mut bid, None, &CutSettings::default()).unwrap();
//!
//! assert_eq!(bid.bid(1, 1, 1, Direction::XPlus).unwrap(), 7);
//! assert_eq!(pos.pos(1, 1, 1, Direction::XPlus).unwrap(), 0.5);
//! assert_eq!(bid.bid(2, 1, 1, Direction::XMinus).unwrap(), 7);
//! assert_eq!(bid.bid(0, 1, 1, Direction::XPlus).unwrap(), 0);
//! ```

pub mod cutinfo;
pub mod driver;
pub mod error;
pub mod extent;
pub mod grid;
pub mod interchange;
pub mod normal;
pub mod octree;
pub mod search;
pub mod settings;
pub mod target;

pub use cutinfo::{
    BidCodec, CutBid5, CutBid5Array, CutBid8, CutBid8Array, CutBidArray, CutBidView, CutPos32,
    CutPos32Array, CutPos8, CutPos8Array, CutPosArray, CutPosView, OctreeCutLayout, PosCodec,
};
pub use driver::{calc_cut_info, calc_cut_info_all, calc_cut_info_groups};
pub use error::{CutError, Result, ReturnCode};
pub use extent::IndexBox;
pub use grid::{CellGrid, GridAccessor, NodeGrid, NonUniformCellGrid, SearchRange};
pub use interchange::{CompareReport, CutInfoData, DEFAULT_TOLERANCE};
pub use normal::{CutNormalArray, NO_NORMAL};
pub use octree::{calc_cut_info_octree, calc_cut_info_octree_groups, cell_bid, cell_pos, cell_search_range};
pub use search::{select_groups, CutSearch, PointCut};
pub use settings::{CutSettings, OctreeMode};
pub use target::TargetTriangle;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
