//! Dense cut-info arrays over an index box.

use std::marker::PhantomData;

use cutcell_math::Direction;

use super::{BidCodec, PosCodec};
use crate::error::{CutError, Result};
use crate::extent::IndexBox;

/// Six cut positions per grid point.
///
/// `S` is the backing storage: `Vec<Word>` for an owned array, or
/// `&mut [Word]` for a view over a caller buffer (see [`CutPosView`]).
/// Both expose the same accessors.
#[derive(Debug, Clone)]
pub struct CutPosArray<C: PosCodec, S = Vec<<C as PosCodec>::Word>> {
    extent: IndexBox,
    data: S,
    codec: PhantomData<C>,
}

/// Position array borrowing a caller-owned buffer.
pub type CutPosView<'a, C> = CutPosArray<C, &'a mut [<C as PosCodec>::Word]>;

/// Six boundary ids per grid point.
///
/// Storage works as for [`CutPosArray`].
#[derive(Debug, Clone)]
pub struct CutBidArray<C: BidCodec, S = Vec<<C as BidCodec>::Word>> {
    extent: IndexBox,
    data: S,
    codec: PhantomData<C>,
}

/// Boundary-id array borrowing a caller-owned buffer.
pub type CutBidView<'a, C> = CutBidArray<C, &'a mut [<C as BidCodec>::Word]>;

fn check_len(extent: &IndexBox, len: usize) -> Result<()> {
    if len != extent.volume() {
        return Err(CutError::InvalidArgument(format!(
            "buffer holds {len} points, extent {:?} needs {}",
            extent.size,
            extent.volume()
        )));
    }
    Ok(())
}

impl<C: PosCodec> CutPosArray<C> {
    /// Owned array of `size` points starting at index 0, cleared.
    pub fn new(size: [usize; 3]) -> Self {
        Self::with_extent(IndexBox::from_size(size))
    }

    /// Owned array over inclusive `start..=end`, cleared.
    pub fn from_start_end(start: [i32; 3], end: [i32; 3]) -> Result<Self> {
        Ok(Self::with_extent(IndexBox::from_start_end(start, end)?))
    }

    /// Owned array over an index box, cleared.
    pub fn with_extent(extent: IndexBox) -> Self {
        Self {
            extent,
            data: vec![C::cleared(); extent.volume()],
            codec: PhantomData,
        }
    }

    /// Give up the array, returning its buffer.
    pub fn into_inner(self) -> Vec<C::Word> {
        self.data
    }
}

impl<'a, C: PosCodec> CutPosArray<C, &'a mut [C::Word]> {
    /// View over a caller buffer laid out over `extent`.
    ///
    /// The buffer is left as is.
    pub fn from_slice(data: &'a mut [C::Word], extent: IndexBox) -> Result<Self> {
        check_len(&extent, data.len())?;
        Ok(Self {
            extent,
            data,
            codec: PhantomData,
        })
    }
}

impl<C, S> CutPosArray<C, S>
where
    C: PosCodec,
    S: AsRef<[C::Word]>,
{
    /// Index box covered by the array.
    pub fn extent(&self) -> &IndexBox {
        &self.extent
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.extent.volume()
    }

    /// True if the array holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(i, j, k)`.
    pub fn index(&self, i: i32, j: i32, k: i32) -> Result<usize> {
        self.extent.linear_checked(i, j, k)
    }

    /// Packed words, one per grid point.
    pub fn data(&self) -> &[C::Word] {
        self.data.as_ref()
    }

    /// Position at `(i, j, k)` in direction `dir`.
    pub fn pos(&self, i: i32, j: i32, k: i32, dir: Direction) -> Result<f32> {
        Ok(self.pos_at(self.index(i, j, k)?, dir))
    }

    /// All six positions at `(i, j, k)`.
    pub fn pos6(&self, i: i32, j: i32, k: i32) -> Result<[f32; 6]> {
        Ok(self.pos6_at(self.index(i, j, k)?))
    }

    /// Position at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn pos_at(&self, ijk: usize, dir: Direction) -> f32 {
        C::get(&self.data.as_ref()[ijk], dir)
    }

    /// All six positions at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn pos6_at(&self, ijk: usize) -> [f32; 6] {
        C::get_all(&self.data.as_ref()[ijk])
    }
}

impl<C, S> CutPosArray<C, S>
where
    C: PosCodec,
    S: AsRef<[C::Word]> + AsMut<[C::Word]>,
{
    /// Mutable packed words.
    pub fn data_mut(&mut self) -> &mut [C::Word] {
        self.data.as_mut()
    }

    /// Set one position at `(i, j, k)`.
    pub fn set_pos(&mut self, i: i32, j: i32, k: i32, dir: Direction, pos: f32) -> Result<()> {
        let ijk = self.index(i, j, k)?;
        self.set_pos_at(ijk, dir, pos);
        Ok(())
    }

    /// Set all six positions at `(i, j, k)`.
    pub fn set_pos6(&mut self, i: i32, j: i32, k: i32, pos: &[f32; 6]) -> Result<()> {
        let ijk = self.index(i, j, k)?;
        self.set_pos6_at(ijk, pos);
        Ok(())
    }

    /// Set one position at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn set_pos_at(&mut self, ijk: usize, dir: Direction, pos: f32) {
        C::set(&mut self.data.as_mut()[ijk], dir, pos);
    }

    /// Set all six positions at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn set_pos6_at(&mut self, ijk: usize, pos: &[f32; 6]) {
        C::set_all(&mut self.data.as_mut()[ijk], pos);
    }

    /// Reset every position to 1.0.
    pub fn clear(&mut self) {
        self.data.as_mut().iter_mut().for_each(C::clear);
    }
}

impl<C: BidCodec> CutBidArray<C> {
    /// Owned array of `size` points starting at index 0, cleared.
    pub fn new(size: [usize; 3]) -> Self {
        Self::with_extent(IndexBox::from_size(size))
    }

    /// Owned array over inclusive `start..=end`, cleared.
    pub fn from_start_end(start: [i32; 3], end: [i32; 3]) -> Result<Self> {
        Ok(Self::with_extent(IndexBox::from_start_end(start, end)?))
    }

    /// Owned array over an index box, cleared.
    pub fn with_extent(extent: IndexBox) -> Self {
        Self {
            extent,
            data: vec![C::cleared(); extent.volume()],
            codec: PhantomData,
        }
    }

    /// Give up the array, returning its buffer.
    pub fn into_inner(self) -> Vec<C::Word> {
        self.data
    }
}

impl<'a, C: BidCodec> CutBidArray<C, &'a mut [C::Word]> {
    /// View over a caller buffer laid out over `extent`.
    ///
    /// The buffer is left as is.
    pub fn from_slice(data: &'a mut [C::Word], extent: IndexBox) -> Result<Self> {
        check_len(&extent, data.len())?;
        Ok(Self {
            extent,
            data,
            codec: PhantomData,
        })
    }
}

impl<C, S> CutBidArray<C, S>
where
    C: BidCodec,
    S: AsRef<[C::Word]>,
{
    /// Index box covered by the array.
    pub fn extent(&self) -> &IndexBox {
        &self.extent
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.extent.volume()
    }

    /// True if the array holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(i, j, k)`.
    pub fn index(&self, i: i32, j: i32, k: i32) -> Result<usize> {
        self.extent.linear_checked(i, j, k)
    }

    /// Packed words, one per grid point.
    pub fn data(&self) -> &[C::Word] {
        self.data.as_ref()
    }

    /// Boundary id at `(i, j, k)` in direction `dir`.
    pub fn bid(&self, i: i32, j: i32, k: i32, dir: Direction) -> Result<u8> {
        Ok(self.bid_at(self.index(i, j, k)?, dir))
    }

    /// All six boundary ids at `(i, j, k)`.
    pub fn bid6(&self, i: i32, j: i32, k: i32) -> Result<[u8; 6]> {
        Ok(self.bid6_at(self.index(i, j, k)?))
    }

    /// Boundary id at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn bid_at(&self, ijk: usize, dir: Direction) -> u8 {
        C::get(&self.data.as_ref()[ijk], dir)
    }

    /// All six boundary ids at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn bid6_at(&self, ijk: usize) -> [u8; 6] {
        C::get_all(&self.data.as_ref()[ijk])
    }
}

impl<C, S> CutBidArray<C, S>
where
    C: BidCodec,
    S: AsRef<[C::Word]> + AsMut<[C::Word]>,
{
    /// Mutable packed words.
    pub fn data_mut(&mut self) -> &mut [C::Word] {
        self.data.as_mut()
    }

    /// Set one boundary id at `(i, j, k)`.
    pub fn set_bid(&mut self, i: i32, j: i32, k: i32, dir: Direction, bid: u8) -> Result<()> {
        let ijk = self.index(i, j, k)?;
        check_bid::<C>(bid)?;
        C::set(&mut self.data.as_mut()[ijk], dir, bid);
        Ok(())
    }

    /// Set all six boundary ids at `(i, j, k)`.
    pub fn set_bid6(&mut self, i: i32, j: i32, k: i32, bid: &[u8; 6]) -> Result<()> {
        let ijk = self.index(i, j, k)?;
        for &b in bid {
            check_bid::<C>(b)?;
        }
        C::set_all(&mut self.data.as_mut()[ijk], bid);
        Ok(())
    }

    /// Set one boundary id at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn set_bid_at(&mut self, ijk: usize, dir: Direction, bid: u8) {
        C::set(&mut self.data.as_mut()[ijk], dir, bid);
    }

    /// Set all six boundary ids at a linear index.
    ///
    /// # Panics
    ///
    /// Panics if `ijk` is out of range.
    pub fn set_bid6_at(&mut self, ijk: usize, bid: &[u8; 6]) {
        C::set_all(&mut self.data.as_mut()[ijk], bid);
    }

    /// Reset every boundary id to 0.
    pub fn clear(&mut self) {
        self.data.as_mut().iter_mut().for_each(C::clear);
    }
}

fn check_bid<C: BidCodec>(bid: u8) -> Result<()> {
    if bid > C::MAX_BID {
        return Err(CutError::InvalidArgument(format!(
            "boundary id {bid} exceeds {} maximum {}",
            C::NAME,
            C::MAX_BID
        )));
    }
    Ok(())
}
