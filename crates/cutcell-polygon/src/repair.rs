//! Triangle winding and normal repair.
//!
//! Surface data from external tools often carries normals that disagree
//! with the vertex winding, or normals of poor quality. Repair runs over
//! leaf groups with a positive boundary id only; bounding boxes do not
//! change, so a built index stays valid.

use tracing::debug;

use crate::{PolygonStore, Triangle};

/// Counts of what a repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Triangles whose vertices 1 and 2 were swapped.
    pub flipped: usize,
    /// Triangles whose normal was recomputed.
    pub renormalized: usize,
}

/// Repair triangle data in place.
///
/// With `fix_vertex_order`, triangles whose winding normal points against
/// the stored normal get vertices 1 and 2 swapped. With
/// `recompute_normals`, every triangle's normal is replaced by the unit
/// normal of its (possibly swapped) winding. Both flags false is a no-op.
pub fn repair_polygons(
    store: &mut PolygonStore,
    fix_vertex_order: bool,
    recompute_normals: bool,
) -> RepairStats {
    let mut stats = RepairStats::default();
    if !fix_vertex_order && !recompute_normals {
        return stats;
    }

    for handle in store.leaf_handles() {
        let group = store.group_mut(handle);
        if group.id() <= 0 {
            continue;
        }
        for tri in &mut group.triangles {
            if fix_vertex_order && tri.geometric_normal().dot(&tri.normal) < 0.0 {
                tri.vertices.swap(1, 2);
                stats.flipped += 1;
            }
            if recompute_normals {
                tri.normal = Triangle::unit_normal(&tri.vertices);
                stats.renormalized += 1;
            }
        }
    }

    debug!(
        flipped = stats.flipped,
        renormalized = stats.renormalized,
        "polygon repair"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolygonIndex;
    use approx::assert_relative_eq;
    use cutcell_math::{Point3, Vec3};

    fn ccw() -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_flip_inconsistent_winding() {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "g", 1).unwrap();
        let bad = store
            .add_triangle_with_normal(g, ccw(), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        let good = store
            .add_triangle_with_normal(g, ccw(), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        store.build_index();

        let stats = repair_polygons(&mut store, true, false);
        assert_eq!(stats, RepairStats { flipped: 1, renormalized: 0 });

        let t = store.triangle(bad).unwrap();
        assert_eq!(t.vertices[1], Point3::new(0.0, 1.0, 0.0));
        assert_eq!(t.vertices[2], Point3::new(1.0, 0.0, 0.0));
        assert!(t.geometric_normal().dot(&t.normal) > 0.0);
        assert_eq!(store.triangle(good).unwrap().vertices, ccw());
        assert!(store.is_loaded());
    }

    #[test]
    fn test_recompute_normals() {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "g", 1).unwrap();
        let id = store
            .add_triangle_with_normal(g, ccw(), Vec3::new(0.3, 0.0, 2.0))
            .unwrap();

        let stats = repair_polygons(&mut store, false, true);
        assert_eq!(stats.renormalized, 1);
        assert_relative_eq!(store.triangle(id).unwrap().normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_skips_nonpositive_groups_and_noop() {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "inactive", 0).unwrap();
        let id = store
            .add_triangle_with_normal(g, ccw(), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();

        assert_eq!(repair_polygons(&mut store, true, true), RepairStats::default());
        assert_eq!(store.triangle(id).unwrap().vertices, ccw());

        let active = store.add_group(None, "active", 4).unwrap();
        store
            .add_triangle_with_normal(active, ccw(), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert_eq!(repair_polygons(&mut store, false, false), RepairStats::default());
    }
}
