//! Axis-parallel line versus triangle test.

use cutcell_math::{orient2d, Axis, Point2, Point3, Sign};
use cutcell_polygon::Triangle;

/// A triangle prepared for axis-parallel line queries.
#[derive(Debug, Clone, Copy)]
pub struct TargetTriangle<'a> {
    triangle: &'a Triangle,
    plane_offset: f64,
}

impl<'a> TargetTriangle<'a> {
    /// Prepare a triangle; the plane is taken from its stored normal.
    pub fn new(triangle: &'a Triangle) -> Self {
        let plane_offset = triangle.normal.dot(&triangle.vertices[0].coords);
        Self {
            triangle,
            plane_offset,
        }
    }

    /// The wrapped triangle.
    pub fn triangle(&self) -> &'a Triangle {
        self.triangle
    }

    /// Intersect the line through `p` parallel to `axis`.
    ///
    /// Returns the coordinate along `axis` where the line crosses the
    /// triangle, or `None` if it misses or the triangle is edge-on.
    /// Points on an edge or vertex count as inside.
    pub fn intersect(&self, axis: Axis, p: &Point3) -> Option<f64> {
        let n = &self.triangle.normal;
        let a = axis.index();
        if n[a] == 0.0 {
            return None;
        }

        let (u, v) = axis.others();
        let (u, v) = (u.index(), v.index());
        let project = |q: &Point3| Point2::new(q[u], q[v]);
        let [v0, v1, v2] = &self.triangle.vertices;
        let (q0, q1, q2) = (project(v0), project(v1), project(v2));
        let pq = project(p);

        let s0 = orient2d(&q0, &q1, &pq);
        let s1 = orient2d(&q1, &q2, &pq);
        let s2 = orient2d(&q2, &q0, &pq);
        if !same_side(s0, s1, s2) {
            return None;
        }

        Some((self.plane_offset - n[u] * p[u] - n[v] * p[v]) / n[a])
    }
}

/// All non-negative or all non-positive, and not all zero.
fn same_side(s0: Sign, s1: Sign, s2: Sign) -> bool {
    let signs = [s0, s1, s2];
    if signs.iter().all(|s| s.is_zero()) {
        return false;
    }
    !signs.iter().any(|s| s.is_negative()) || !signs.iter().any(|s| s.is_positive())
}
