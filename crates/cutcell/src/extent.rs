//! Rectangular index ranges.

use serde::{Deserialize, Serialize};

use crate::error::{CutError, Result};

/// A box of grid indices: `start` plus `size` points along each axis.
///
/// Linear indices run x fastest, then y, then z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexBox {
    /// First index on each axis.
    pub start: [i32; 3],
    /// Number of points on each axis.
    pub size: [usize; 3],
}

impl IndexBox {
    /// Box starting at `start` with `size` points per axis.
    pub fn new(start: [i32; 3], size: [usize; 3]) -> Self {
        Self { start, size }
    }

    /// Box of `size` points starting at the origin.
    pub fn from_size(size: [usize; 3]) -> Self {
        Self {
            start: [0; 3],
            size,
        }
    }

    /// Box from inclusive start and end indices.
    pub fn from_start_end(start: [i32; 3], end: [i32; 3]) -> Result<Self> {
        let mut size = [0usize; 3];
        for axis in 0..3 {
            if end[axis] < start[axis] {
                return Err(CutError::InvalidArgument(format!(
                    "end {:?} before start {:?}",
                    end, start
                )));
            }
            size[axis] = (i64::from(end[axis]) - i64::from(start[axis]) + 1) as usize;
        }
        Ok(Self { start, size })
    }

    /// Last index on each axis (inclusive).
    ///
    /// Meaningless along an axis of size zero.
    pub fn end(&self) -> [i32; 3] {
        [
            self.start[0] + self.size[0] as i32 - 1,
            self.start[1] + self.size[1] as i32 - 1,
            self.start[2] + self.size[2] as i32 - 1,
        ]
    }

    /// Number of points in the box.
    pub fn volume(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// True if the box holds no points.
    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// True if `(i, j, k)` lies in the box.
    pub fn contains(&self, i: i32, j: i32, k: i32) -> bool {
        [i, j, k].iter().enumerate().all(|(axis, &v)| {
            let offset = i64::from(v) - i64::from(self.start[axis]);
            offset >= 0 && (offset as u64) < self.size[axis] as u64
        })
    }

    /// True if every point of `other` lies in this box.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        (0..3).all(|axis| {
            let lo = i64::from(other.start[axis]);
            let hi = lo + other.size[axis] as i64;
            lo >= i64::from(self.start[axis])
                && hi <= i64::from(self.start[axis]) + self.size[axis] as i64
        })
    }

    /// Linear index of `(i, j, k)`, or `None` outside the box.
    pub fn linear(&self, i: i32, j: i32, k: i32) -> Option<usize> {
        if !self.contains(i, j, k) {
            return None;
        }
        Some(self.linear_unchecked(i, j, k))
    }

    /// Linear index of `(i, j, k)`, which must lie in the box.
    pub(crate) fn linear_unchecked(&self, i: i32, j: i32, k: i32) -> usize {
        let di = (i - self.start[0]) as usize;
        let dj = (j - self.start[1]) as usize;
        let dk = (k - self.start[2]) as usize;
        di + self.size[0] * (dj + self.size[1] * dk)
    }

    /// Grid index of a linear index.
    pub fn unlinear(&self, ijk: usize) -> [i32; 3] {
        let nx = self.size[0];
        let ny = self.size[1];
        [
            self.start[0] + (ijk % nx) as i32,
            self.start[1] + ((ijk / nx) % ny) as i32,
            self.start[2] + (ijk / (nx * ny)) as i32,
        ]
    }

    /// Checked linear index, with an error naming the extent.
    pub(crate) fn linear_checked(&self, i: i32, j: i32, k: i32) -> Result<usize> {
        self.linear(i, j, k).ok_or(CutError::IndexOutOfRange {
            index: [i, j, k],
            start: self.start,
            end: self.end(),
        })
    }

    /// Fail with `SizeExceeded` unless `range` fits in this box.
    pub(crate) fn check_covers(&self, array: &'static str, range: &IndexBox) -> Result<()> {
        if self.contains_box(range) {
            return Ok(());
        }
        Err(CutError::SizeExceeded {
            array,
            detail: format!(
                "requested start {:?} size {:?}, available start {:?} size {:?}",
                range.start, range.size, self.start, self.size
            ),
        })
    }
}

/// Split `data`, laid out over `extent`, into mutable rows covering `range`.
///
/// Rows come out in `(k, j)` order, `j` fastest, each holding the
/// `range.size[0]` points starting at `range.start[0]`. `range` must be
/// non-empty and contained in `extent`.
pub(crate) fn rows_mut<'a, W>(data: &'a mut [W], extent: &IndexBox, range: &IndexBox) -> Vec<&'a mut [W]> {
    let nx = extent.size[0];
    let ny = extent.size[1];
    let i0 = (range.start[0] - extent.start[0]) as usize;
    let nlen = range.size[0];
    data.chunks_mut(nx)
        .enumerate()
        .filter_map(|(row, chunk)| {
            let j = extent.start[1] + (row % ny) as i32;
            let k = extent.start[2] + (row / ny) as i32;
            if range.contains(range.start[0], j, k) {
                Some(&mut chunk[i0..i0 + nlen])
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_end() {
        let b = IndexBox::from_start_end([-1, 0, 2], [2, 0, 5]).unwrap();
        assert_eq!(b.size, [4, 1, 4]);
        assert_eq!(b.end(), [2, 0, 5]);
        assert_eq!(b.volume(), 16);
        assert!(IndexBox::from_start_end([0, 0, 0], [0, -1, 0]).is_err());
    }

    #[test]
    fn test_linear_roundtrip() {
        let b = IndexBox::new([-1, 2, 3], [3, 4, 5]);
        assert_eq!(b.linear(-1, 2, 3), Some(0));
        assert_eq!(b.linear(0, 2, 3), Some(1));
        assert_eq!(b.linear(-1, 3, 3), Some(3));
        assert_eq!(b.linear(-1, 2, 4), Some(12));
        assert_eq!(b.linear(2, 2, 3), None);
        assert_eq!(b.linear(-2, 2, 3), None);
        for ijk in 0..b.volume() {
            let [i, j, k] = b.unlinear(ijk);
            assert_eq!(b.linear(i, j, k), Some(ijk));
        }
    }

    #[test]
    fn test_contains_box() {
        let outer = IndexBox::new([0, 0, 0], [4, 4, 4]);
        assert!(outer.contains_box(&IndexBox::new([1, 1, 1], [3, 3, 3])));
        assert!(!outer.contains_box(&IndexBox::new([1, 1, 1], [4, 3, 3])));
        assert!(!outer.contains_box(&IndexBox::new([-1, 0, 0], [1, 1, 1])));
        assert!(outer.check_covers("pos", &IndexBox::new([0, 0, 3], [4, 4, 2])).is_err());
    }

    #[test]
    fn test_rows_mut() {
        let extent = IndexBox::new([0, 0, 0], [4, 3, 2]);
        let mut data: Vec<usize> = (0..extent.volume()).collect();
        let range = IndexBox::new([1, 1, 0], [2, 2, 2]);
        let rows = rows_mut(&mut data, &extent, &range);
        assert_eq!(rows.len(), 4);
        let firsts: Vec<usize> = rows.iter().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![5, 9, 17, 21]);
        assert!(rows.iter().all(|r| r.len() == 2));
    }
}
