//! Nearest-hit search for a single grid point.

use std::collections::HashSet;

use cutcell_math::{Aabb3, Axis, Direction, Point3};
use cutcell_polygon::{GroupId, PolygonIndex, Triangle};
use tracing::warn;

use crate::error::{CutError, Result};
use crate::grid::SearchRange;
use crate::target::TargetTriangle;

/// Nearest hit per direction for one grid point.
///
/// Slots start at the probe length with boundary id 0 and no triangle; a
/// slot is only replaced by a strictly closer hit, so among hits at equal
/// distance the first one checked is kept.
#[derive(Debug, Clone, Copy)]
pub struct PointCut<'a> {
    /// Distance from the probe origin, indexed by direction.
    pub pos: [f64; 6],
    /// Boundary id of the hit, 0 when uncut.
    pub bid: [u8; 6],
    /// Triangle responsible for the hit.
    pub triangle: [Option<&'a Triangle>; 6],
}

impl<'a> PointCut<'a> {
    /// Empty result for the given probe lengths.
    pub fn new(range: &[f64; 6]) -> Self {
        Self {
            pos: *range,
            bid: [0; 6],
            triangle: [None; 6],
        }
    }

    /// Record the hits of one triangle along all three axes.
    pub fn check_triangle(&mut self, triangle: &'a Triangle, bid: u8, center: &Point3) {
        let target = TargetTriangle::new(triangle);
        for axis in Axis::ALL {
            let Some(x) = target.intersect(axis, center) else {
                continue;
            };
            let c = center[axis.index()];
            let (minus, plus) = Direction::pair(axis);
            if x >= c {
                self.offer(plus, x - c, bid, triangle);
            }
            if x <= c {
                self.offer(minus, c - x, bid, triangle);
            }
        }
    }

    fn offer(&mut self, dir: Direction, dist: f64, bid: u8, triangle: &'a Triangle) {
        let d = dir.index();
        if dist < self.pos[d] {
            self.pos[d] = dist;
            self.bid[d] = bid;
            self.triangle[d] = Some(triangle);
        }
    }

    /// True if direction `dir` found a hit.
    pub fn is_cut(&self, dir: Direction) -> bool {
        self.bid[dir.index()] > 0
    }

    /// Positions divided by the probe lengths; uncut slots give 1.0.
    pub fn normalized(&self, range: &[f64; 6]) -> [f32; 6] {
        let mut out = [1.0f32; 6];
        for d in 0..6 {
            if self.bid[d] > 0 {
                out[d] = (self.pos[d] / range[d]) as f32;
            }
        }
        out
    }
}

fn accepted(triangle: &Triangle, max_bid: u8) -> bool {
    triangle.boundary_id > 0 && triangle.boundary_id <= i32::from(max_bid)
}

/// Per-point search over a set of polygon groups.
#[derive(Debug)]
pub struct CutSearch<'a, I: PolygonIndex + ?Sized> {
    index: &'a I,
    groups: Vec<GroupId>,
    max_bid: u8,
}

impl<'a, I: PolygonIndex + ?Sized> CutSearch<'a, I> {
    /// Search `groups` of `index`, accepting boundary ids up to `max_bid`.
    pub fn new(index: &'a I, groups: Vec<GroupId>, max_bid: u8) -> Self {
        Self {
            index,
            groups,
            max_bid,
        }
    }

    /// Groups being searched.
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    /// Largest accepted boundary id.
    pub fn max_bid(&self) -> u8 {
        self.max_bid
    }

    /// Append every triangle overlapping `bbox` to `out`.
    ///
    /// Only triangles with a boundary id in `1..=max_bid` are kept, in
    /// index order.
    pub fn candidates(&self, bbox: &Aabb3, out: &mut Vec<&'a Triangle>) -> Result<()> {
        for &group in &self.groups {
            let first = out.len();
            self.index.search(group, bbox, out)?;
            let mut keep = first;
            for n in first..out.len() {
                if accepted(out[n], self.max_bid) {
                    out.swap(keep, n);
                    keep += 1;
                }
            }
            out.truncate(keep);
        }
        Ok(())
    }

    /// Nearest hit per direction for one grid point.
    ///
    /// `scratch` is reused between calls to avoid reallocating the
    /// candidate list; its contents on return are unspecified.
    pub fn search(&self, range: &SearchRange, scratch: &mut Vec<&'a Triangle>) -> Result<PointCut<'a>> {
        let r = &range.range;
        let bbox = Aabb3::around(&range.center, [r[0], r[2], r[4]], [r[1], r[3], r[5]]);

        scratch.clear();
        self.candidates(&bbox, scratch)?;

        let mut cut = PointCut::new(r);
        for &tri in scratch.iter() {
            cut.check_triangle(tri, tri.boundary_id as u8, &range.center);
        }
        Ok(cut)
    }
}

/// Resolve the groups a computation runs over.
///
/// With `paths == None` every leaf group with a positive id is used.
/// Otherwise each path must name a distinct leaf group with a positive
/// id. In both cases every selected id must fit in `1..=max_bid`.
pub fn select_groups<I: PolygonIndex + ?Sized>(
    index: &I,
    paths: Option<&[&str]>,
    max_bid: u8,
    caller: &str,
) -> Result<Vec<GroupId>> {
    let leaves = index.leaf_groups();
    let selected = match paths {
        None => leaves.into_iter().filter(|g| g.id > 0).collect::<Vec<_>>(),
        Some(paths) => {
            let mut seen = HashSet::new();
            let mut out = Vec::with_capacity(paths.len());
            for path in paths {
                let Some(group) = leaves.iter().find(|g| g.path == *path) else {
                    let reason = if index.find_group(path).is_some() {
                        "is not a leaf group"
                    } else {
                        "does not exist"
                    };
                    return Err(group_error(caller, format!("group {path:?} {reason}")));
                };
                if !seen.insert(group.handle) {
                    return Err(group_error(caller, format!("group {path:?} listed twice")));
                }
                if group.id <= 0 {
                    return Err(group_error(
                        caller,
                        format!("group {path:?} has no boundary id ({})", group.id),
                    ));
                }
                out.push(group.clone());
            }
            out
        }
    };

    if let Some(g) = selected.iter().find(|g| g.id > i32::from(max_bid)) {
        return Err(group_error(
            caller,
            format!("group {:?} boundary id {} exceeds {}", g.path, g.id, max_bid),
        ));
    }
    Ok(selected.into_iter().map(|g| g.handle).collect())
}

fn group_error(caller: &str, message: String) -> CutError {
    warn!(caller = caller, "{}", message);
    CutError::InvalidGroupList(message)
}
