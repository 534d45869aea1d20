//! Bounding Volume Hierarchy over the triangles of one polygon group.
//!
//! Uses Surface Area Heuristic (SAH) for construction. The tree stores
//! triangle indices only; the triangles themselves stay in the owning
//! group and are passed back in at query time.

use cutcell_math::{Aabb3, Point3};

use crate::Triangle;

/// A BVH node - either a leaf holding triangle indices or an internal node.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Bounding box of this node.
        aabb: Aabb3,
        /// Indices into the group's triangle list.
        triangles: Vec<u32>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounding box of this node.
    pub fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Bounding Volume Hierarchy for box queries.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    root: Option<BvhNode>,
}

type Entry = (u32, Aabb3, Point3);

const LEAF_SIZE: usize = 4;

impl Bvh {
    /// Build a BVH over a triangle list using SAH construction.
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut entries: Vec<Entry> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                let aabb = tri.aabb();
                (i as u32, aabb, aabb.center())
            })
            .collect();

        let root = if entries.is_empty() {
            None
        } else {
            Some(build_node(&mut entries))
        };
        Self { root }
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Append every triangle whose bounding box overlaps `bbox`.
    ///
    /// `triangles` must be the slice the tree was built from.
    pub fn query<'a>(&self, triangles: &'a [Triangle], bbox: &Aabb3, out: &mut Vec<&'a Triangle>) {
        if let Some(root) = &self.root {
            query_node(root, triangles, bbox, out);
        }
    }
}

fn query_node<'a>(node: &BvhNode, triangles: &'a [Triangle], bbox: &Aabb3, out: &mut Vec<&'a Triangle>) {
    if !node.aabb().overlaps(bbox) {
        return;
    }
    match node {
        BvhNode::Leaf { triangles: ids, .. } => {
            for &id in ids {
                let tri = &triangles[id as usize];
                if tri.aabb().overlaps(bbox) {
                    out.push(tri);
                }
            }
        }
        BvhNode::Internal { left, right, .. } => {
            query_node(left, triangles, bbox, out);
            query_node(right, triangles, bbox, out);
        }
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(entries: &mut [Entry]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in entries.iter() {
        bounds.include_box(aabb);
    }

    if entries.len() <= LEAF_SIZE {
        // Sorted so query order depends only on the tree shape.
        let mut ids: Vec<u32> = entries.iter().map(|(id, _, _)| *id).collect();
        ids.sort_unstable();
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: ids,
        };
    }

    let (best_axis, best_pos) = find_best_split(entries, &bounds);
    let mut mid = partition(entries, best_axis, best_pos);

    // Fallback if partition fails: split in the middle
    if mid == 0 || mid == entries.len() {
        mid = entries.len() / 2;
    }

    let (left, right) = entries.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left)),
        right: Box::new(build_node(right)),
    }
}

/// Find the best split axis and position using SAH.
fn find_best_split(entries: &[Entry], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let extent = bounds.max - bounds.min;
    let total_area = bounds.surface_area();

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-12 {
            continue;
        }
        let axis_min = bounds.min[axis];

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in entries {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].include_box(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let (left_count, left_bounds) = merge_buckets(&bucket_counts[..split], &bucket_bounds[..split]);
            let (right_count, right_bounds) = merge_buckets(&bucket_counts[split..], &bucket_bounds[split..]);
            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = 0.125
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

fn merge_buckets(counts: &[usize], bounds: &[Aabb3]) -> (usize, Aabb3) {
    let mut total = 0;
    let mut merged = Aabb3::empty();
    for (count, aabb) in counts.iter().zip(bounds) {
        if *count > 0 {
            total += count;
            merged.include_box(aabb);
        }
    }
    (total, merged)
}

/// Partition entries by centroid along an axis.
fn partition(entries: &mut [Entry], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = entries.len();

    while left < right {
        if entries[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            entries.swap(left, right);
        }
    }

    left
}
