//! Cut info stored inside octree cell payloads.

use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::{bytes_of, pod_read_unaligned};

use super::{BidCodec, PosCodec};
use crate::error::{CutError, Result};

/// Byte offsets of the position and boundary-id words in a cell payload.
///
/// Payloads are raw bytes with no alignment guarantee; words are copied
/// in and out unaligned.
#[derive(Debug)]
pub struct OctreeCutLayout<P: PosCodec, B: BidCodec> {
    pos_offset: usize,
    bid_offset: usize,
    codecs: PhantomData<(P, B)>,
}

impl<P: PosCodec, B: BidCodec> Clone for OctreeCutLayout<P, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: PosCodec, B: BidCodec> Copy for OctreeCutLayout<P, B> {}

impl<P: PosCodec, B: BidCodec> Default for OctreeCutLayout<P, B> {
    fn default() -> Self {
        Self::packed()
    }
}

impl<P: PosCodec, B: BidCodec> OctreeCutLayout<P, B> {
    /// Bytes taken by the position word.
    pub const POS_SIZE: usize = size_of::<P::Word>();
    /// Bytes taken by the boundary-id word.
    pub const BID_SIZE: usize = size_of::<B::Word>();

    /// Layout with explicit offsets.
    pub fn new(pos_offset: usize, bid_offset: usize) -> Result<Self> {
        let pos = pos_offset..pos_offset + Self::POS_SIZE;
        let bid = bid_offset..bid_offset + Self::BID_SIZE;
        if pos.start < bid.end && bid.start < pos.end {
            return Err(CutError::InvalidArgument(format!(
                "{} at {pos:?} overlaps {} at {bid:?}",
                P::NAME,
                B::NAME
            )));
        }
        Ok(Self {
            pos_offset,
            bid_offset,
            codecs: PhantomData,
        })
    }

    /// Positions at offset 0, boundary ids right after.
    pub fn packed() -> Self {
        Self {
            pos_offset: 0,
            bid_offset: Self::POS_SIZE,
            codecs: PhantomData,
        }
    }

    /// Offset of the position word.
    pub fn pos_offset(&self) -> usize {
        self.pos_offset
    }

    /// Offset of the boundary-id word.
    pub fn bid_offset(&self) -> usize {
        self.bid_offset
    }

    /// Smallest payload size holding both words.
    pub fn required_size(&self) -> usize {
        (self.pos_offset + Self::POS_SIZE).max(self.bid_offset + Self::BID_SIZE)
    }

    /// Fail unless payloads of `data_size` bytes hold both words.
    pub fn check(&self, data_size: usize) -> Result<()> {
        if data_size < self.required_size() {
            return Err(CutError::InvalidArgument(format!(
                "cell payload of {data_size} bytes cannot hold {} + {} (needs {})",
                P::NAME,
                B::NAME,
                self.required_size()
            )));
        }
        Ok(())
    }

    fn pos_word(&self, blob: &[u8]) -> P::Word {
        pod_read_unaligned(&blob[self.pos_offset..self.pos_offset + Self::POS_SIZE])
    }

    fn bid_word(&self, blob: &[u8]) -> B::Word {
        pod_read_unaligned(&blob[self.bid_offset..self.bid_offset + Self::BID_SIZE])
    }

    /// Six positions stored in a payload.
    pub fn read_pos(&self, blob: &[u8]) -> [f32; 6] {
        P::get_all(&self.pos_word(blob))
    }

    /// Six boundary ids stored in a payload.
    pub fn read_bid(&self, blob: &[u8]) -> [u8; 6] {
        B::get_all(&self.bid_word(blob))
    }

    /// Store six positions.
    pub fn write_pos(&self, blob: &mut [u8], pos: &[f32; 6]) {
        let mut word = self.pos_word(blob);
        P::set_all(&mut word, pos);
        blob[self.pos_offset..self.pos_offset + Self::POS_SIZE].copy_from_slice(bytes_of(&word));
    }

    /// Store six boundary ids; bits outside the codec fields are kept.
    pub fn write_bid(&self, blob: &mut [u8], bid: &[u8; 6]) {
        let mut word = self.bid_word(blob);
        B::set_all(&mut word, bid);
        blob[self.bid_offset..self.bid_offset + Self::BID_SIZE].copy_from_slice(bytes_of(&word));
    }

    /// Reset positions to 1.0 and ids to 0.
    pub fn clear(&self, blob: &mut [u8]) {
        let mut pos = self.pos_word(blob);
        P::clear(&mut pos);
        blob[self.pos_offset..self.pos_offset + Self::POS_SIZE].copy_from_slice(bytes_of(&pos));
        let mut bid = self.bid_word(blob);
        B::clear(&mut bid);
        blob[self.bid_offset..self.bid_offset + Self::BID_SIZE].copy_from_slice(bytes_of(&bid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutinfo::{CutBid5, CutBid8, CutPos32, CutPos8};

    #[test]
    fn test_packed_sizes() {
        assert_eq!(OctreeCutLayout::<CutPos8, CutBid5>::packed().required_size(), 10);
        assert_eq!(OctreeCutLayout::<CutPos32, CutBid8>::packed().required_size(), 30);
        assert_eq!(OctreeCutLayout::<CutPos8, CutBid8>::default().bid_offset(), 6);
    }

    #[test]
    fn test_overlap_and_size_checks() {
        assert!(OctreeCutLayout::<CutPos8, CutBid5>::new(0, 4).is_err());
        let layout = OctreeCutLayout::<CutPos8, CutBid5>::new(5, 1).unwrap();
        assert_eq!(layout.required_size(), 11);
        assert!(layout.check(10).is_err());
        assert!(layout.check(11).is_ok());
    }

    #[test]
    fn test_unaligned_roundtrip() {
        // odd offsets inside a larger payload
        let layout = OctreeCutLayout::<CutPos32, CutBid5>::new(3, 29).unwrap();
        let mut blob = vec![0xAAu8; 40];
        layout.clear(&mut blob);
        assert_eq!(layout.read_pos(&blob), [1.0; 6]);
        assert_eq!(layout.read_bid(&blob), [0; 6]);

        layout.write_pos(&mut blob, &[0.5, 1.0, 0.25, 1.0, 1.0, 0.0]);
        layout.write_bid(&mut blob, &[3, 0, 31, 0, 0, 1]);
        assert_eq!(layout.read_pos(&blob), [0.5, 1.0, 0.25, 1.0, 1.0, 0.0]);
        assert_eq!(layout.read_bid(&blob), [3, 0, 31, 0, 0, 1]);
        // bytes outside both words untouched
        assert_eq!(&blob[..3], &[0xAA; 3]);
        assert_eq!(&blob[33..], &[0xAA; 7]);
    }

    #[test]
    fn test_bid5_high_bits_kept_in_payload() {
        let layout = OctreeCutLayout::<CutPos8, CutBid5>::packed();
        let mut blob = vec![0u8; 10];
        blob[9] = 0xC0;
        layout.write_bid(&mut blob, &[31; 6]);
        layout.clear(&mut blob);
        assert_eq!(blob[9], 0xC0);
        assert_eq!(layout.read_bid(&blob), [0; 6]);
    }
}
