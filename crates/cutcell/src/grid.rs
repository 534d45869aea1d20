//! Grid geometry accessors.
//!
//! An accessor maps a grid index to the point the probes start from and
//! the probe length in each of the six directions. It is the only
//! grid-shape specific piece the search depends on.

use cutcell_math::{Direction, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{CutError, Result};
use crate::extent::IndexBox;

/// Probe origin and per-direction probe lengths for one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRange {
    /// World-space start point of the probes.
    pub center: Point3,
    /// Probe length, indexed by [`Direction::index`].
    pub range: [f64; 6],
}

impl SearchRange {
    /// Same probe length `d[axis]` in both directions along each axis.
    pub fn symmetric(center: Point3, d: &Vec3) -> Self {
        Self {
            center,
            range: [d.x, d.x, d.y, d.y, d.z, d.z],
        }
    }

    /// Probe length in one direction.
    pub fn length(&self, dir: Direction) -> f64 {
        self.range[dir.index()]
    }
}

/// Maps grid indices to probe geometry.
pub trait GridAccessor: Sync {
    /// Probe geometry for `(i, j, k)`.
    ///
    /// Only called for indices inside [`GridAccessor::index_box`].
    fn search_range(&self, i: i32, j: i32, k: i32) -> SearchRange;

    /// Indices this accessor can answer for; `None` means unbounded.
    fn index_box(&self) -> Option<IndexBox> {
        None
    }
}

/// Uniform cell-centered grid: point `(i, j, k)` is the center of cell
/// `[o + i·d, o + (i+1)·d]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    /// Corner of cell `(0, 0, 0)`.
    pub origin: Point3,
    /// Cell edge lengths.
    pub pitch: Vec3,
}

impl CellGrid {
    /// Create a cell-centered grid.
    pub fn new(origin: Point3, pitch: Vec3) -> Self {
        Self { origin, pitch }
    }
}

impl GridAccessor for CellGrid {
    fn search_range(&self, i: i32, j: i32, k: i32) -> SearchRange {
        let center = Point3::new(
            self.origin.x + (f64::from(i) + 0.5) * self.pitch.x,
            self.origin.y + (f64::from(j) + 0.5) * self.pitch.y,
            self.origin.z + (f64::from(k) + 0.5) * self.pitch.z,
        );
        SearchRange::symmetric(center, &self.pitch)
    }
}

/// Uniform node-centered grid: point `(i, j, k)` sits at `o + i·d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeGrid {
    /// Position of node `(0, 0, 0)`.
    pub origin: Point3,
    /// Node spacing.
    pub pitch: Vec3,
}

impl NodeGrid {
    /// Create a node-centered grid.
    pub fn new(origin: Point3, pitch: Vec3) -> Self {
        Self { origin, pitch }
    }
}

impl GridAccessor for NodeGrid {
    fn search_range(&self, i: i32, j: i32, k: i32) -> SearchRange {
        let center = Point3::new(
            self.origin.x + f64::from(i) * self.pitch.x,
            self.origin.y + f64::from(j) * self.pitch.y,
            self.origin.z + f64::from(k) * self.pitch.z,
        );
        SearchRange::symmetric(center, &self.pitch)
    }
}

/// Cell-centered grid on explicit, strictly increasing face coordinates.
///
/// Axis `a` with `n` cells has `n + 1` face coordinates. Probes reach the
/// neighbouring cell center, or the domain face for edge cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Vec<f64>; 3]", into = "[Vec<f64>; 3]")]
pub struct NonUniformCellGrid {
    coords: [Vec<f64>; 3],
}

impl NonUniformCellGrid {
    /// Create from face coordinates along x, y and z.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        let coords = [x, y, z];
        for (axis, c) in coords.iter().enumerate() {
            if c.len() < 2 {
                return Err(CutError::InvalidArgument(format!(
                    "axis {axis} needs at least two face coordinates"
                )));
            }
            if !c.windows(2).all(|w| w[0] < w[1]) {
                return Err(CutError::InvalidArgument(format!(
                    "axis {axis} face coordinates must be strictly increasing"
                )));
            }
        }
        Ok(Self { coords })
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> [usize; 3] {
        [
            self.coords[0].len() - 1,
            self.coords[1].len() - 1,
            self.coords[2].len() - 1,
        ]
    }

    /// Face coordinates along one axis.
    pub fn coords(&self, axis: usize) -> &[f64] {
        &self.coords[axis]
    }

    /// Center and (minus, plus) probe lengths of cell `i` along one axis.
    fn axis_range(&self, axis: usize, i: usize) -> (f64, f64, f64) {
        let c = &self.coords[axis];
        let n = c.len() - 1;
        let center = 0.5 * (c[i] + c[i + 1]);
        let minus = if i == 0 {
            0.5 * (c[i + 1] - c[i])
        } else {
            0.5 * (c[i + 1] - c[i - 1])
        };
        let plus = if i == n - 1 {
            0.5 * (c[i + 1] - c[i])
        } else {
            0.5 * (c[i + 2] - c[i])
        };
        (center, minus, plus)
    }
}

impl TryFrom<[Vec<f64>; 3]> for NonUniformCellGrid {
    type Error = CutError;

    fn try_from(coords: [Vec<f64>; 3]) -> Result<Self> {
        let [x, y, z] = coords;
        Self::new(x, y, z)
    }
}

impl From<NonUniformCellGrid> for [Vec<f64>; 3] {
    fn from(grid: NonUniformCellGrid) -> Self {
        grid.coords
    }
}

impl GridAccessor for NonUniformCellGrid {
    /// # Panics
    ///
    /// Panics for indices outside [`NonUniformCellGrid::size`].
    fn search_range(&self, i: i32, j: i32, k: i32) -> SearchRange {
        let (cx, xm, xp) = self.axis_range(0, i as usize);
        let (cy, ym, yp) = self.axis_range(1, j as usize);
        let (cz, zm, zp) = self.axis_range(2, k as usize);
        SearchRange {
            center: Point3::new(cx, cy, cz),
            range: [xm, xp, ym, yp, zm, zp],
        }
    }

    fn index_box(&self) -> Option<IndexBox> {
        Some(IndexBox::from_size(self.size()))
    }
}
