//! Deduplicated surface normals per cut.

use std::collections::HashMap;

use cutcell_math::Direction;
use cutcell_polygon::{Triangle, TriangleId};

use crate::error::{CutError, Result};
use crate::extent::IndexBox;

/// Marker for "no normal" in the index array.
pub const NO_NORMAL: i32 = -1;

/// A cut found during the parallel pass, waiting for the normal merge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NormalHit<'a> {
    /// Linear index into the normal array.
    pub ijk: usize,
    pub dir: Direction,
    pub triangle: &'a Triangle,
}

/// Per-point, per-direction index into a table of unique normals.
#[derive(Debug, Clone, PartialEq)]
pub struct CutNormalArray {
    extent: IndexBox,
    index: Vec<[i32; 6]>,
    table: Vec<[f32; 3]>,
}

impl CutNormalArray {
    /// Array of `size` points starting at index 0, cleared.
    pub fn new(size: [usize; 3]) -> Self {
        Self::with_extent(IndexBox::from_size(size))
    }

    /// Array over inclusive `start..=end`, cleared.
    pub fn from_start_end(start: [i32; 3], end: [i32; 3]) -> Result<Self> {
        Ok(Self::with_extent(IndexBox::from_start_end(start, end)?))
    }

    /// Array over an index box, cleared.
    pub fn with_extent(extent: IndexBox) -> Self {
        Self {
            extent,
            index: vec![[NO_NORMAL; 6]; extent.volume()],
            table: Vec::new(),
        }
    }

    /// Index box covered by the array.
    pub fn extent(&self) -> &IndexBox {
        &self.extent
    }

    /// Unique normals.
    pub fn table(&self) -> &[[f32; 3]] {
        &self.table
    }

    /// Raw per-point index words; [`NO_NORMAL`] marks empty slots.
    pub fn index_data(&self) -> &[[i32; 6]] {
        &self.index
    }

    /// Table index for `(i, j, k)` in direction `dir`.
    pub fn normal_index(&self, i: i32, j: i32, k: i32, dir: Direction) -> Result<Option<usize>> {
        let ijk = self.extent.linear_checked(i, j, k)?;
        Ok(self.normal_index_at(ijk, dir))
    }

    /// Table index at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn normal_index_at(&self, ijk: usize, dir: Direction) -> Option<usize> {
        let n = self.index[ijk][dir.index()];
        (n >= 0).then_some(n as usize)
    }

    /// Normal for `(i, j, k)` in direction `dir`, if that link was cut.
    pub fn normal(&self, i: i32, j: i32, k: i32, dir: Direction) -> Result<Option<[f32; 3]>> {
        match self.normal_index(i, j, k, dir)? {
            None => Ok(None),
            Some(n) => self.table.get(n).copied().map(Some).ok_or_else(|| {
                CutError::InvalidArgument(format!(
                    "normal index {n} outside table of {}",
                    self.table.len()
                ))
            }),
        }
    }

    /// Normal at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn normal_at(&self, ijk: usize, dir: Direction) -> Option<[f32; 3]> {
        self.normal_index_at(ijk, dir)
            .and_then(|n| self.table.get(n).copied())
    }

    /// Drop the table and mark every slot empty.
    pub fn clear(&mut self) {
        self.index.iter_mut().for_each(|w| *w = [NO_NORMAL; 6]);
        self.table.clear();
    }

    /// Assign table entries in first-seen order and point every hit at
    /// its triangle's entry.
    ///
    /// Returns the number of hits merged.
    pub(crate) fn merge<'a>(&mut self, hits: impl IntoIterator<Item = NormalHit<'a>>) -> usize {
        let mut ids: HashMap<TriangleId, i32> = HashMap::new();
        let mut merged = 0;
        for hit in hits {
            let table = &mut self.table;
            let n = *ids.entry(hit.triangle.id).or_insert_with(|| {
                let nrm = &hit.triangle.normal;
                table.push([nrm.x as f32, nrm.y as f32, nrm.z as f32]);
                (table.len() - 1) as i32
            });
            self.index[hit.ijk][hit.dir.index()] = n;
            merged += 1;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutcell_math::{Point3, Vec3};
    use cutcell_polygon::GroupId;

    fn tri(index: u32, normal: Vec3) -> Triangle {
        Triangle {
            id: TriangleId {
                group: GroupId(0),
                index,
            },
            vertices: [Point3::origin(); 3],
            normal,
            boundary_id: 1,
        }
    }

    #[test]
    fn test_starts_empty() {
        let n = CutNormalArray::new([2, 2, 2]);
        assert!(n.table().is_empty());
        assert_eq!(n.normal(1, 1, 1, Direction::XPlus).unwrap(), None);
        assert!(n.normal(2, 0, 0, Direction::XPlus).is_err());
    }

    #[test]
    fn test_merge_dedups_first_seen() {
        let a = tri(0, Vec3::x());
        let b = tri(1, Vec3::y());
        let mut n = CutNormalArray::new([3, 1, 1]);
        let hits = [
            NormalHit { ijk: 2, dir: Direction::XMinus, triangle: &b },
            NormalHit { ijk: 0, dir: Direction::XPlus, triangle: &a },
            NormalHit { ijk: 1, dir: Direction::XPlus, triangle: &b },
            NormalHit { ijk: 1, dir: Direction::YPlus, triangle: &a },
        ];
        assert_eq!(n.merge(hits), 4);
        assert_eq!(n.table(), &[[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
        assert_eq!(n.normal_index_at(2, Direction::XMinus), Some(0));
        assert_eq!(n.normal_index_at(0, Direction::XPlus), Some(1));
        assert_eq!(n.normal_at(1, Direction::XPlus), n.normal_at(2, Direction::XMinus));
        assert_eq!(n.normal_at(1, Direction::ZPlus), None);
        // triangles are untouched
        assert_eq!(a.id.index, 0);
        assert_eq!(b.boundary_id, 1);

        n.clear();
        assert!(n.table().is_empty());
        assert_eq!(n.normal_index_at(2, Direction::XMinus), None);
    }
}
