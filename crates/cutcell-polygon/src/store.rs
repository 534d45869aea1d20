//! Group tree and triangle storage.

use cutcell_math::{Aabb3, Point3, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bvh::Bvh;
use crate::{PolygonError, PolygonIndex, Result, Triangle, TriangleId};

/// Handle of a polygon group inside a [`PolygonStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Summary of a group as seen by the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Handle used for searches.
    pub handle: GroupId,
    /// Full path from the root, components joined with `/`.
    pub path: String,
    /// Boundary id; only positive ids take part in cut searches.
    pub id: i32,
}

/// A named node of the group tree.
#[derive(Debug, Clone)]
pub struct PolygonGroup {
    name: String,
    path: String,
    id: i32,
    parent: Option<GroupId>,
    children: Vec<GroupId>,
    pub(crate) triangles: Vec<Triangle>,
    bvh: Bvh,
}

impl PolygonGroup {
    /// Group name (last path component).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path from the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Boundary id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Parent group, `None` for a root group.
    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    /// Child groups in insertion order.
    pub fn children(&self) -> &[GroupId] {
        &self.children
    }

    /// True if the group has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Triangles of this group.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

/// In-memory polygon index: a group tree with one BVH per leaf group.
///
/// Groups and triangles are added first; [`PolygonStore::build_index`]
/// then builds the search trees and marks the store as loaded. Any later
/// modification drops the loaded state until the index is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct PolygonStore {
    groups: Vec<PolygonGroup>,
    roots: Vec<GroupId>,
    indexed: bool,
}

impl PolygonStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group under `parent` (or as a root group).
    pub fn add_group(&mut self, parent: Option<GroupId>, name: &str, id: i32) -> Result<GroupId> {
        if name.is_empty() || name.contains('/') {
            return Err(PolygonError::InvalidGroupName(name.to_string()));
        }

        let path = match parent {
            Some(p) => {
                let parent_group = self.group_checked(p)?;
                if !parent_group.triangles.is_empty() {
                    return Err(PolygonError::NotALeaf(parent_group.path.clone()));
                }
                format!("{}/{}", parent_group.path, name)
            }
            None => name.to_string(),
        };

        let siblings = match parent {
            Some(p) => &self.groups[p.0 as usize].children,
            None => &self.roots,
        };
        if siblings.iter().any(|s| self.groups[s.0 as usize].name == name) {
            return Err(PolygonError::DuplicateGroup(path));
        }

        let handle = GroupId(self.groups.len() as u32);
        self.groups.push(PolygonGroup {
            name: name.to_string(),
            path,
            id,
            parent,
            children: Vec::new(),
            triangles: Vec::new(),
            bvh: Bvh::default(),
        });
        match parent {
            Some(p) => self.groups[p.0 as usize].children.push(handle),
            None => self.roots.push(handle),
        }
        self.indexed = false;
        Ok(handle)
    }

    /// Add a triangle whose normal follows the vertex winding.
    pub fn add_triangle(&mut self, group: GroupId, vertices: [Point3; 3]) -> Result<TriangleId> {
        let normal = Triangle::unit_normal(&vertices);
        self.add_triangle_with_normal(group, vertices, normal)
    }

    /// Add a triangle with an explicitly supplied normal.
    pub fn add_triangle_with_normal(
        &mut self,
        group: GroupId,
        vertices: [Point3; 3],
        normal: Vec3,
    ) -> Result<TriangleId> {
        let g = self.group_checked(group)?;
        if !g.is_leaf() {
            return Err(PolygonError::NotALeaf(g.path.clone()));
        }
        let boundary_id = g.id;

        let g = &mut self.groups[group.0 as usize];
        let id = TriangleId {
            group,
            index: g.triangles.len() as u32,
        };
        g.triangles.push(Triangle {
            id,
            vertices,
            normal,
            boundary_id,
        });
        self.indexed = false;
        Ok(id)
    }

    /// Build the per-group search trees and mark the store as loaded.
    pub fn build_index(&mut self) {
        for group in &mut self.groups {
            group.bvh = Bvh::build(&group.triangles);
        }
        self.indexed = true;
        debug!(
            groups = self.groups.len(),
            triangles = self.triangle_count(),
            "polygon index built"
        );
    }

    /// Root groups in insertion order.
    pub fn roots(&self) -> &[GroupId] {
        &self.roots
    }

    /// Access a group.
    pub fn group(&self, handle: GroupId) -> Option<&PolygonGroup> {
        self.groups.get(handle.0 as usize)
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of triangles over all groups.
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.triangles.len()).sum()
    }

    /// Bounding box of every stored triangle.
    pub fn bounds(&self) -> Aabb3 {
        let mut b = Aabb3::empty();
        for tri in self.groups.iter().flat_map(|g| &g.triangles) {
            b.include_box(&tri.aabb());
        }
        b
    }

    /// Leaf groups in depth-first tree order.
    pub(crate) fn leaf_handles(&self) -> Vec<GroupId> {
        let mut out = Vec::new();
        let mut stack: Vec<GroupId> = self.roots.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let g = &self.groups[handle.0 as usize];
            if g.is_leaf() {
                out.push(handle);
            } else {
                stack.extend(g.children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn group_mut(&mut self, handle: GroupId) -> &mut PolygonGroup {
        &mut self.groups[handle.0 as usize]
    }

    fn group_checked(&self, handle: GroupId) -> Result<&PolygonGroup> {
        self.group(handle)
            .ok_or_else(|| PolygonError::UnknownGroup(format!("#{}", handle.0)))
    }

    fn info(&self, handle: GroupId) -> GroupInfo {
        let g = &self.groups[handle.0 as usize];
        GroupInfo {
            handle,
            path: g.path.clone(),
            id: g.id,
        }
    }
}

impl PolygonIndex for PolygonStore {
    fn is_loaded(&self) -> bool {
        self.indexed
    }

    fn leaf_groups(&self) -> Vec<GroupInfo> {
        self.leaf_handles().into_iter().map(|h| self.info(h)).collect()
    }

    fn find_group(&self, path: &str) -> Option<GroupInfo> {
        self.groups
            .iter()
            .position(|g| g.path == path)
            .map(|i| self.info(GroupId(i as u32)))
    }

    fn search<'a>(
        &'a self,
        group: GroupId,
        bbox: &Aabb3,
        out: &mut Vec<&'a Triangle>,
    ) -> Result<()> {
        if !self.indexed {
            return Err(PolygonError::NotLoaded);
        }
        let g = self.group_checked(group)?;
        g.bvh.query(&g.triangles, bbox, out);
        Ok(())
    }

    fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.group(id.group)?.triangles.get(id.index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tri(z: f64) -> [Point3; 3] {
        [
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn test_group_tree_paths() {
        let mut store = PolygonStore::new();
        let body = store.add_group(None, "body", 0).unwrap();
        let wing = store.add_group(Some(body), "wing", 2).unwrap();
        let tail = store.add_group(Some(body), "tail", 3).unwrap();
        let ground = store.add_group(None, "ground", 1).unwrap();

        let leaves = store.leaf_groups();
        let paths: Vec<&str> = leaves.iter().map(|g| g.path.as_str()).collect();
        assert_eq!(paths, vec!["body/wing", "body/tail", "ground"]);
        assert_eq!(leaves[0].handle, wing);
        assert_eq!(leaves[1].handle, tail);
        assert_eq!(leaves[2].handle, ground);
        assert_eq!(store.find_group("body/tail").map(|g| g.id), Some(3));
        assert!(store.find_group("tail").is_none());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let mut store = PolygonStore::new();
        let a = store.add_group(None, "a", 1).unwrap();
        assert!(matches!(
            store.add_group(None, "a", 2),
            Err(PolygonError::DuplicateGroup(_))
        ));
        assert!(matches!(
            store.add_group(Some(a), "x/y", 2),
            Err(PolygonError::InvalidGroupName(_))
        ));
        assert!(matches!(
            store.add_group(Some(GroupId(99)), "b", 2),
            Err(PolygonError::UnknownGroup(_))
        ));
    }

    #[test]
    fn test_leaf_rules() {
        let mut store = PolygonStore::new();
        let parent = store.add_group(None, "p", 1).unwrap();
        store.add_group(Some(parent), "c", 1).unwrap();
        assert!(matches!(
            store.add_triangle(parent, unit_tri(0.0)),
            Err(PolygonError::NotALeaf(_))
        ));

        let leaf = store.add_group(None, "leaf", 1).unwrap();
        store.add_triangle(leaf, unit_tri(0.0)).unwrap();
        assert!(matches!(
            store.add_group(Some(leaf), "c", 1),
            Err(PolygonError::NotALeaf(_))
        ));
    }

    #[test]
    fn test_search_requires_index() {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "g", 5).unwrap();
        let id = store.add_triangle(g, unit_tri(0.5)).unwrap();
        assert!(!store.is_loaded());

        let query = Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(store.search(g, &query, &mut Vec::new()), Err(PolygonError::NotLoaded));
        let mut out = Vec::new();

        store.build_index();
        assert!(store.is_loaded());
        store.search(g, &query, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, id);
        assert_eq!(out[0].boundary_id, 5);
        assert_eq!(store.triangle(id).map(|t| t.boundary_id), Some(5));

        store.add_triangle(g, unit_tri(0.7)).unwrap();
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_bounds_and_counts() {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "g", 1).unwrap();
        store.add_triangle(g, unit_tri(-1.0)).unwrap();
        store.add_triangle(g, unit_tri(2.0)).unwrap();
        assert_eq!(store.triangle_count(), 2);
        assert_eq!(store.group_count(), 1);
        let b = store.bounds();
        assert_eq!(b.min.z, -1.0);
        assert_eq!(b.max.z, 2.0);
    }
}
