//! Compact cut-info encodings.
//!
//! Each grid point stores six cut positions and six boundary ids. A
//! position codec packs the six positions into one fixed-size word, a
//! boundary-id codec packs the six ids into another. Codecs are plain
//! types with associated functions so raw solver buffers can be decoded
//! without any array wrapper.
//!
//! | codec | word | range |
//! |-------|------|-------|
//! | [`CutPos32`] | `[f32; 6]` | exact |
//! | [`CutPos8`] | `[u8; 6]` | `q / 255` |
//! | [`CutBid8`] | `[u8; 6]` | ids `0..=255` |
//! | [`CutBid5`] | `u32` | ids `0..=31`, bits 30-31 untouched |

mod array;
mod layout;

pub use array::{CutBidArray, CutBidView, CutPosArray, CutPosView};
pub use layout::OctreeCutLayout;

use bytemuck::Pod;
use cutcell_math::Direction;

/// Encoding of six cut positions in `[0, 1]`.
pub trait PosCodec: Send + Sync + 'static {
    /// Packed representation of one grid point.
    type Word: Pod + Send + Sync + PartialEq + std::fmt::Debug;

    /// Human readable name.
    const NAME: &'static str;

    /// Word with every position at 1.0.
    fn cleared() -> Self::Word;

    /// Decode one position.
    fn get(word: &Self::Word, dir: Direction) -> f32;

    /// Encode one position.
    fn set(word: &mut Self::Word, dir: Direction, pos: f32);

    /// Decode all six positions.
    fn get_all(word: &Self::Word) -> [f32; 6] {
        Direction::ALL.map(|dir| Self::get(word, dir))
    }

    /// Encode all six positions.
    fn set_all(word: &mut Self::Word, pos: &[f32; 6]) {
        for dir in Direction::ALL {
            Self::set(word, dir, pos[dir.index()]);
        }
    }

    /// Reset every position to 1.0.
    fn clear(word: &mut Self::Word) {
        *word = Self::cleared();
    }
}

/// Encoding of six boundary ids.
pub trait BidCodec: Send + Sync + 'static {
    /// Packed representation of one grid point.
    type Word: Pod + Send + Sync + PartialEq + std::fmt::Debug;

    /// Human readable name.
    const NAME: &'static str;

    /// Largest storable id.
    const MAX_BID: u8;

    /// Word with every id at 0.
    fn cleared() -> Self::Word;

    /// Decode one id.
    fn get(word: &Self::Word, dir: Direction) -> u8;

    /// Encode one id; `bid` must not exceed [`BidCodec::MAX_BID`].
    fn set(word: &mut Self::Word, dir: Direction, bid: u8);

    /// Decode all six ids.
    fn get_all(word: &Self::Word) -> [u8; 6] {
        Direction::ALL.map(|dir| Self::get(word, dir))
    }

    /// Encode all six ids.
    fn set_all(word: &mut Self::Word, bid: &[u8; 6]) {
        for dir in Direction::ALL {
            Self::set(word, dir, bid[dir.index()]);
        }
    }

    /// Reset every id to 0.
    fn clear(word: &mut Self::Word) {
        *word = Self::cleared();
    }
}

/// Full single-precision positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutPos32;

impl PosCodec for CutPos32 {
    type Word = [f32; 6];
    const NAME: &'static str = "CutPos32";

    fn cleared() -> [f32; 6] {
        [1.0; 6]
    }

    fn get(word: &[f32; 6], dir: Direction) -> f32 {
        word[dir.index()]
    }

    fn set(word: &mut [f32; 6], dir: Direction, pos: f32) {
        word[dir.index()] = pos;
    }
}

/// Positions quantized to 8 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutPos8;

impl CutPos8 {
    /// Quantize a position; out-of-range input saturates.
    pub fn quantize(pos: f32) -> u8 {
        (pos * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Position represented by a quantized value.
    pub fn dequantize(q: u8) -> f32 {
        f32::from(q) / 255.0
    }
}

impl PosCodec for CutPos8 {
    type Word = [u8; 6];
    const NAME: &'static str = "CutPos8";

    fn cleared() -> [u8; 6] {
        [u8::MAX; 6]
    }

    fn get(word: &[u8; 6], dir: Direction) -> f32 {
        Self::dequantize(word[dir.index()])
    }

    fn set(word: &mut [u8; 6], dir: Direction, pos: f32) {
        word[dir.index()] = Self::quantize(pos);
    }
}

/// One byte per boundary id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutBid8;

impl BidCodec for CutBid8 {
    type Word = [u8; 6];
    const NAME: &'static str = "CutBid8";
    const MAX_BID: u8 = u8::MAX;

    fn cleared() -> [u8; 6] {
        [0; 6]
    }

    fn get(word: &[u8; 6], dir: Direction) -> u8 {
        word[dir.index()]
    }

    fn set(word: &mut [u8; 6], dir: Direction, bid: u8) {
        word[dir.index()] = bid;
    }
}

/// Five bits per boundary id, packed in the low 30 bits of a `u32`.
///
/// Bits 30 and 31 belong to the caller and survive every write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutBid5;

impl CutBid5 {
    const BITS: u32 = 5;
    const MASK: u32 = (1 << Self::BITS) - 1;
    /// Bits used by the six ids.
    pub const ID_BITS: u32 = (1 << 30) - 1;

    fn shift(dir: Direction) -> u32 {
        Self::BITS * dir.index() as u32
    }
}

impl BidCodec for CutBid5 {
    type Word = u32;
    const NAME: &'static str = "CutBid5";
    const MAX_BID: u8 = 31;

    fn cleared() -> u32 {
        0
    }

    fn get(word: &u32, dir: Direction) -> u8 {
        ((*word >> Self::shift(dir)) & Self::MASK) as u8
    }

    fn set(word: &mut u32, dir: Direction, bid: u8) {
        debug_assert!(bid <= Self::MAX_BID, "boundary id {bid} does not fit in 5 bits");
        let shift = Self::shift(dir);
        *word = (*word & !(Self::MASK << shift)) | ((u32::from(bid) & Self::MASK) << shift);
    }

    fn clear(word: &mut u32) {
        *word &= !Self::ID_BITS;
    }
}

/// Compact position array, one byte per direction.
pub type CutPos8Array = CutPosArray<CutPos8>;
/// Full precision position array.
pub type CutPos32Array = CutPosArray<CutPos32>;
/// One byte per boundary id.
pub type CutBid8Array = CutBidArray<CutBid8>;
/// Five bits per boundary id.
pub type CutBid5Array = CutBidArray<CutBid5>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos32_exact() {
        let mut w = CutPos32::cleared();
        assert_eq!(CutPos32::get_all(&w), [1.0; 6]);
        CutPos32::set(&mut w, Direction::YPlus, 0.123_456_7);
        assert_eq!(CutPos32::get(&w, Direction::YPlus), 0.123_456_7);
        CutPos32::clear(&mut w);
        assert_eq!(w, [1.0; 6]);
    }

    #[test]
    fn test_pos8_endpoints_exact() {
        let mut w = CutPos8::cleared();
        assert_eq!(CutPos8::get(&w, Direction::XMinus), 1.0);
        CutPos8::set(&mut w, Direction::XMinus, 0.0);
        assert_eq!(CutPos8::get(&w, Direction::XMinus), 0.0);
        CutPos8::set(&mut w, Direction::XMinus, 1.0);
        assert_eq!(CutPos8::get(&w, Direction::XMinus), 1.0);
    }

    #[test]
    fn test_pos8_quantization_error() {
        let mut w = CutPos8::cleared();
        for n in 0..=1000 {
            let pos = n as f32 / 1000.0;
            CutPos8::set(&mut w, Direction::ZPlus, pos);
            let err = (CutPos8::get(&w, Direction::ZPlus) - pos).abs();
            assert!(err <= 0.5 / 255.0 + 1e-6, "pos {pos} err {err}");
        }
        assert_eq!(CutPos8::quantize(-0.5), 0);
        assert_eq!(CutPos8::quantize(2.0), 255);
    }

    #[test]
    fn test_pos8_requantize_stable() {
        for q in 0..=255u8 {
            assert_eq!(CutPos8::quantize(CutPos8::dequantize(q)), q);
        }
    }

    #[test]
    fn test_bid5_requantize_stable() {
        for bid in 0..=CutBid5::MAX_BID {
            for dir in Direction::ALL {
                let mut w = 0u32;
                CutBid5::set(&mut w, dir, bid);
                let decoded = CutBid5::get(&w, dir);
                let mut w2 = 0u32;
                CutBid5::set(&mut w2, dir, decoded);
                assert_eq!(w, w2);
                assert_eq!(decoded, bid);
            }
        }
    }

    #[test]
    fn test_bid5_fields_independent() {
        let mut w = 0u32;
        let bids = [31, 1, 17, 0, 5, 30];
        CutBid5::set_all(&mut w, &bids);
        assert_eq!(CutBid5::get_all(&w), bids);
        CutBid5::set(&mut w, Direction::YMinus, 2);
        assert_eq!(CutBid5::get_all(&w), [31, 1, 2, 0, 5, 30]);
    }

    #[test]
    fn test_bid5_preserves_high_bits() {
        let mut w = 0b11 << 30;
        CutBid5::set_all(&mut w, &[31; 6]);
        assert_eq!(w, u32::MAX);
        CutBid5::clear(&mut w);
        assert_eq!(w, 0b11 << 30);
        assert_eq!(CutBid5::get_all(&w), [0; 6]);
    }

    #[test]
    fn test_bid8_full_range() {
        let mut w = CutBid8::cleared();
        CutBid8::set(&mut w, Direction::ZMinus, 255);
        assert_eq!(CutBid8::get(&w, Direction::ZMinus), 255);
        assert_eq!(CutBid8::get(&w, Direction::ZPlus), 0);
    }
}
