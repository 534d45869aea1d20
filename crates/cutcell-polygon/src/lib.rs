#![warn(missing_docs)]

//! Triangle storage and spatial lookup for the cutcell engine.
//!
//! Triangles are organized in a tree of named polygon groups. Each leaf
//! group carries a boundary id; groups with a positive id take part in
//! cut searches, groups with an id `<= 0` are kept but ignored.
//!
//! The search engine only talks to the [`PolygonIndex`] trait, so any
//! spatial index can stand in for the BVH-backed [`PolygonStore`].
//!
//! # Example
//!
//! ```
//! use cutcell_math::{Aabb3, Point3};
//! use cutcell_polygon::{PolygonIndex, PolygonStore};
//!
//! let mut store = PolygonStore::new();
//! let wall = store.add_group(None, "wall", 3).unwrap();
//! store
//!     .add_triangle(
//!         wall,
//!         [
//!             Point3::new(0.0, 0.0, 0.0),
//!             Point3::new(1.0, 0.0, 0.0),
//!             Point3::new(0.0, 1.0, 0.0),
//!         ],
//!     )
//!     .unwrap();
//! store.build_index();
//!
//! let query = Aabb3::new(Point3::new(0.1, 0.1, -0.1), Point3::new(0.2, 0.2, 0.1));
//! let mut hits = Vec::new();
//! store.search(wall, &query, &mut hits).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].boundary_id, 3);
//! ```

mod bvh;
mod repair;
mod store;

pub use bvh::{Bvh, BvhNode};
pub use repair::{repair_polygons, RepairStats};
pub use store::{GroupId, GroupInfo, PolygonGroup, PolygonStore};

use cutcell_math::{Aabb3, Point3, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from polygon storage and lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonError {
    /// No group with this handle or path exists.
    #[error("unknown polygon group: {0}")]
    UnknownGroup(String),

    /// A sibling group with the same name already exists.
    #[error("duplicate polygon group: {0}")]
    DuplicateGroup(String),

    /// Group names must be non-empty and must not contain `/`.
    #[error("invalid polygon group name: {0:?}")]
    InvalidGroupName(String),

    /// Triangles can only be added to leaf groups, and a group holding
    /// triangles cannot receive children.
    #[error("group {0} mixes triangles and child groups")]
    NotALeaf(String),

    /// The search index has not been built since the last modification.
    #[error("polygon index not built")]
    NotLoaded,
}

/// Result type for polygon operations.
pub type Result<T> = std::result::Result<T, PolygonError>;

/// Stable identity of a triangle: owning group plus position in that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriangleId {
    /// Owning group.
    pub group: GroupId,
    /// Index within the group's triangle list.
    pub index: u32,
}

/// A surface triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Identity within its store.
    pub id: TriangleId,
    /// Corner vertices.
    pub vertices: [Point3; 3],
    /// Unit outward normal.
    pub normal: Vec3,
    /// Boundary tag inherited from the owning group.
    pub boundary_id: i32,
}

impl Triangle {
    /// Normal computed from the vertex winding (not normalized).
    pub fn geometric_normal(&self) -> Vec3 {
        let [v0, v1, v2] = &self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit normal from the vertex winding, or zero for a degenerate triangle.
    pub fn unit_normal(vertices: &[Point3; 3]) -> Vec3 {
        let n = (vertices[1] - vertices[0]).cross(&(vertices[2] - vertices[0]));
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vec3::zeros()
        }
    }

    /// Triangle area.
    pub fn area(&self) -> f64 {
        0.5 * self.geometric_normal().norm()
    }

    /// Bounding box of the three vertices.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_points(self.vertices.iter())
    }
}

/// Read-only lookup interface the cut search runs against.
///
/// Implementations must be safe to query from many threads at once.
pub trait PolygonIndex: Sync {
    /// True once the dataset is loaded and the spatial index is usable.
    fn is_loaded(&self) -> bool;

    /// All leaf groups, in tree order, with their full paths and ids.
    fn leaf_groups(&self) -> Vec<GroupInfo>;

    /// Look up a group by its full path (`parent/child`).
    fn find_group(&self, path: &str) -> Option<GroupInfo>;

    /// Append every triangle of `group` whose bounding box overlaps `bbox`.
    fn search<'a>(
        &'a self,
        group: GroupId,
        bbox: &Aabb3,
        out: &mut Vec<&'a Triangle>,
    ) -> Result<()>;

    /// Fetch a triangle by identity.
    fn triangle(&self, id: TriangleId) -> Option<&Triangle>;
}
