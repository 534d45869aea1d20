//! Text interchange format for validating cut results.
//!
//! ```text
//! sx sy sz
//! ex ey ez
//! ijk d bid pos
//! ...
//! ```
//!
//! The first two lines give the inclusive start and end indices of the
//! sub-domain. Each following line records one cut: the linear index
//! within the sub-domain, the direction `0..6`, the boundary id `1..=255`,
//! and the normalized position in `[0, 1]`. A position of 0 marks a
//! surface passing exactly through the grid point, which is reported in
//! both directions along the axis. Uncut slots are not listed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use cutcell_math::Direction;
use tracing::warn;

use crate::cutinfo::{BidCodec, CutBid8Array, CutBidArray, CutPos32Array, CutPosArray, PosCodec};
use crate::error::{CutError, Result};
use crate::extent::IndexBox;

/// Default position tolerance for [`CutInfoData::compare`].
pub const DEFAULT_TOLERANCE: f32 = 2.0 / 256.0;

/// Differences reported in full before the rest are only counted.
const REPORTED_DIFFERENCES: usize = 10;

/// Cut positions and boundary ids over one sub-domain, at full precision.
#[derive(Debug, Clone)]
pub struct CutInfoData {
    pos: CutPos32Array,
    bid: CutBid8Array,
}

/// Outcome of [`CutInfoData::compare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareReport {
    /// Both data sets cover the same sub-domain.
    pub extents_match: bool,
    /// Slots whose boundary ids differ.
    pub bid_differences: usize,
    /// Largest position difference over slots cut in the expected data.
    pub max_error: f32,
    /// Tolerance the positions were checked against.
    pub tolerance: f32,
}

impl CompareReport {
    /// True if extents and ids match and positions are within tolerance.
    pub fn passed(&self) -> bool {
        self.extents_match && self.bid_differences == 0 && self.max_error <= self.tolerance
    }
}

impl CutInfoData {
    /// Uncut data over `extent`.
    pub fn new(extent: IndexBox) -> Self {
        Self {
            pos: CutPos32Array::with_extent(extent),
            bid: CutBid8Array::with_extent(extent),
        }
    }

    /// Copy of a pair of computed arrays, which must share an extent.
    pub fn from_arrays<P, SP, B, SB>(pos: &CutPosArray<P, SP>, bid: &CutBidArray<B, SB>) -> Result<Self>
    where
        P: PosCodec,
        SP: AsRef<[P::Word]>,
        B: BidCodec,
        SB: AsRef<[B::Word]>,
    {
        if pos.extent() != bid.extent() {
            return Err(CutError::InvalidArgument(format!(
                "position extent {:?} differs from boundary id extent {:?}",
                pos.extent(),
                bid.extent()
            )));
        }
        let mut data = Self::new(*pos.extent());
        for ijk in 0..pos.len() {
            data.pos.set_pos6_at(ijk, &pos.pos6_at(ijk));
            data.bid.set_bid6_at(ijk, &bid.bid6_at(ijk));
        }
        Ok(data)
    }

    /// Sub-domain covered.
    pub fn extent(&self) -> &IndexBox {
        self.pos.extent()
    }

    /// Positions.
    pub fn pos(&self) -> &CutPos32Array {
        &self.pos
    }

    /// Boundary ids.
    pub fn bid(&self) -> &CutBid8Array {
        &self.bid
    }

    /// Number of cut slots.
    pub fn cut_count(&self) -> usize {
        self.bid
            .data()
            .iter()
            .map(|w| w.iter().filter(|&&b| b > 0).count())
            .sum()
    }

    /// Write in interchange format.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        let start = self.extent().start;
        let end = self.extent().end();
        writeln!(out, "{} {} {}", start[0], start[1], start[2])?;
        writeln!(out, "{} {} {}", end[0], end[1], end[2])?;
        for ijk in 0..self.bid.len() {
            let bid = self.bid.bid6_at(ijk);
            for dir in Direction::ALL {
                let b = bid[dir.index()];
                if b > 0 {
                    writeln!(out, "{} {} {} {}", ijk, dir.index(), b, self.pos.pos_at(ijk, dir))?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Read interchange format.
    pub fn read<R: BufRead>(input: R) -> Result<Self> {
        let mut lines = input.lines().enumerate().map(|(n, line)| (n + 1, line));

        let mut header = |what: &str| -> Result<[i32; 3]> {
            let (n, line) = lines.next().ok_or(CutError::Parse {
                line: 0,
                message: format!("missing {what} line"),
            })?;
            let line = line?;
            let fields = fields::<i32>(&line, n)?;
            <[i32; 3]>::try_from(fields).map_err(|_| CutError::Parse {
                line: n,
                message: format!("{what} needs three indices"),
            })
        };
        let start = header("start")?;
        let end = header("end")?;
        let extent = IndexBox::from_start_end(start, end).map_err(|e| CutError::Parse {
            line: 2,
            message: e.to_string(),
        })?;

        let mut data = Self::new(extent);
        for (n, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parse_err = |message: String| CutError::Parse { line: n, message };
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [ijk, d, b, p] = parts.as_slice() else {
                return Err(parse_err(format!("expected 4 fields, found {}", parts.len())));
            };
            let ijk: usize = ijk.parse().map_err(|e| parse_err(format!("index: {e}")))?;
            let d: usize = d.parse().map_err(|e| parse_err(format!("direction: {e}")))?;
            let b: u32 = b.parse().map_err(|e| parse_err(format!("boundary id: {e}")))?;
            let p: f32 = p.parse().map_err(|e| parse_err(format!("position: {e}")))?;

            if ijk >= extent.volume() {
                return Err(parse_err(format!("index {ijk} outside {} points", extent.volume())));
            }
            let dir = Direction::from_index(d).ok_or_else(|| parse_err(format!("direction {d} not in 0..6")))?;
            if !(1..=255).contains(&b) {
                return Err(parse_err(format!("boundary id {b} not in 1..=255")));
            }
            if !(0.0..=1.0).contains(&p) {
                return Err(parse_err(format!("position {p} not in [0, 1]")));
            }
            data.bid.set_bid_at(ijk, dir, b as u8);
            data.pos.set_pos_at(ijk, dir, p);
        }
        Ok(data)
    }

    /// Write to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write(BufWriter::new(File::create(path)?))
    }

    /// Read from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Compare against `expected`.
    ///
    /// Boundary ids must match exactly; positions are compared only where
    /// `expected` records a cut.
    pub fn compare(&self, expected: &CutInfoData, tolerance: f32) -> CompareReport {
        let mut report = CompareReport {
            extents_match: self.extent() == expected.extent(),
            bid_differences: 0,
            max_error: 0.0,
            tolerance,
        };
        if !report.extents_match {
            warn!(
                actual = ?self.extent(),
                expected = ?expected.extent(),
                "extents differ"
            );
            return report;
        }

        for ijk in 0..self.bid.len() {
            let bid = self.bid.bid6_at(ijk);
            let bid0 = expected.bid.bid6_at(ijk);
            for dir in Direction::ALL {
                let d = dir.index();
                if bid[d] != bid0[d] {
                    if report.bid_differences < REPORTED_DIFFERENCES {
                        warn!(
                            ijk = ?self.extent().unlinear(ijk),
                            dir = ?dir,
                            actual = bid[d],
                            expected = bid0[d],
                            "boundary id differs"
                        );
                    }
                    report.bid_differences += 1;
                }
                if bid0[d] > 0 {
                    let err = (self.pos.pos_at(ijk, dir) - expected.pos.pos_at(ijk, dir)).abs();
                    report.max_error = report.max_error.max(err);
                }
            }
        }
        if report.bid_differences > REPORTED_DIFFERENCES {
            warn!(
                total = report.bid_differences,
                "further boundary id differences not shown"
            );
        }
        report
    }
}

fn fields<T: std::str::FromStr>(line: &str, n: usize) -> Result<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    line.split_whitespace()
        .map(|f| {
            f.parse().map_err(|e| CutError::Parse {
                line: n,
                message: format!("{f:?}: {e}"),
            })
        })
        .collect()
}
