//! Parallel cut computation over a structured grid.
//!
//! Every entry point validates all inputs before touching any output.
//! Once validation passes the outputs are cleared and the requested index
//! range is processed row by row on the rayon pool; each grid point's
//! result depends only on its own search, so rows are written without
//! synchronization. Normals, when requested, are merged on the calling
//! thread after the parallel pass.

use std::time::Instant;

use cutcell_math::Direction;
use cutcell_polygon::PolygonIndex;
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::cutinfo::{BidCodec, CutBidArray, CutPosArray, PosCodec};
use crate::error::{CutError, Result};
use crate::extent::{rows_mut, IndexBox};
use crate::grid::GridAccessor;
use crate::normal::{CutNormalArray, NormalHit};
use crate::search::{select_groups, CutSearch};
use crate::settings::CutSettings;

/// Compute cut info for `range` against every leaf group with a positive id.
///
/// `pos` and `bid` (and `normals`, if given) must each cover `range`.
/// They are cleared first; afterwards every point of `range` holds its
/// nearest cut per direction, with positions normalized by probe length.
pub fn calc_cut_info<G, I, P, SP, B, SB>(
    range: IndexBox,
    grid: &G,
    index: &I,
    pos: &mut CutPosArray<P, SP>,
    bid: &mut CutBidArray<B, SB>,
    normals: Option<&mut CutNormalArray>,
    settings: &CutSettings,
) -> Result<()>
where
    G: GridAccessor + ?Sized,
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    SP: AsRef<[P::Word]> + AsMut<[P::Word]> + Send,
    B: BidCodec,
    SB: AsRef<[B::Word]> + AsMut<[B::Word]> + Send,
{
    run("calc_cut_info", range, grid, index, None, pos, bid, normals, settings)
}

/// Like [`calc_cut_info`], restricted to the listed group paths.
#[allow(clippy::too_many_arguments)]
pub fn calc_cut_info_groups<G, I, P, SP, B, SB>(
    range: IndexBox,
    grid: &G,
    index: &I,
    groups: &[&str],
    pos: &mut CutPosArray<P, SP>,
    bid: &mut CutBidArray<B, SB>,
    normals: Option<&mut CutNormalArray>,
    settings: &CutSettings,
) -> Result<()>
where
    G: GridAccessor + ?Sized,
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    SP: AsRef<[P::Word]> + AsMut<[P::Word]> + Send,
    B: BidCodec,
    SB: AsRef<[B::Word]> + AsMut<[B::Word]> + Send,
{
    run(
        "calc_cut_info_groups",
        range,
        grid,
        index,
        Some(groups),
        pos,
        bid,
        normals,
        settings,
    )
}

/// Like [`calc_cut_info`] over the whole extent of `pos`.
pub fn calc_cut_info_all<G, I, P, SP, B, SB>(
    grid: &G,
    index: &I,
    pos: &mut CutPosArray<P, SP>,
    bid: &mut CutBidArray<B, SB>,
    normals: Option<&mut CutNormalArray>,
    settings: &CutSettings,
) -> Result<()>
where
    G: GridAccessor + ?Sized,
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    SP: AsRef<[P::Word]> + AsMut<[P::Word]> + Send,
    B: BidCodec,
    SB: AsRef<[B::Word]> + AsMut<[B::Word]> + Send,
{
    let range = *pos.extent();
    run("calc_cut_info_all", range, grid, index, None, pos, bid, normals, settings)
}

/// Log a rejected call and hand the error back.
pub(crate) fn reject(caller: &'static str, err: CutError) -> CutError {
    warn!(caller = caller, error = %err, "input rejected");
    err
}

#[allow(clippy::too_many_arguments)]
fn run<G, I, P, SP, B, SB>(
    caller: &'static str,
    range: IndexBox,
    grid: &G,
    index: &I,
    groups: Option<&[&str]>,
    pos: &mut CutPosArray<P, SP>,
    bid: &mut CutBidArray<B, SB>,
    mut normals: Option<&mut CutNormalArray>,
    settings: &CutSettings,
) -> Result<()>
where
    G: GridAccessor + ?Sized,
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    SP: AsRef<[P::Word]> + AsMut<[P::Word]> + Send,
    B: BidCodec,
    SB: AsRef<[B::Word]> + AsMut<[B::Word]> + Send,
{
    let _span = info_span!("cut_info", caller = caller, start = ?range.start, size = ?range.size).entered();

    settings.validate().map_err(|e| reject(caller, e))?;
    pos.extent()
        .check_covers("cut position array", &range)
        .map_err(|e| reject(caller, e))?;
    bid.extent()
        .check_covers("boundary id array", &range)
        .map_err(|e| reject(caller, e))?;
    if let Some(n) = normals.as_ref() {
        n.extent()
            .check_covers("normal array", &range)
            .map_err(|e| reject(caller, e))?;
    }
    if let Some(grid_box) = grid.index_box() {
        grid_box
            .check_covers("grid accessor", &range)
            .map_err(|e| reject(caller, e))?;
    }
    if !index.is_loaded() {
        return Err(reject(caller, CutError::PolygonIndexNotInitialized));
    }
    let max_bid = settings.max_boundary_id.min(B::MAX_BID);
    let groups = select_groups(index, groups, max_bid, caller)?;

    settings.install(|| -> Result<()> {
        pos.clear();
        bid.clear();
        if let Some(n) = normals.as_mut() {
            n.clear();
        }
        if range.is_empty() {
            return Ok(());
        }

        let search = CutSearch::new(index, groups, max_bid);
        let normal_extent = normals.as_ref().map(|n| *n.extent());
        let pos_extent = *pos.extent();
        let bid_extent = *bid.extent();
        let pos_rows = rows_mut(pos.data_mut(), &pos_extent, &range);
        let bid_rows = rows_mut(bid.data_mut(), &bid_extent, &range);
        let ny = range.size[1];

        let started = Instant::now();
        let hits: Vec<Vec<NormalHit>> = pos_rows
            .into_par_iter()
            .zip(bid_rows)
            .enumerate()
            .with_min_len(settings.min_rows_per_task)
            .map_init(Vec::new, |scratch, (row, (pos_row, bid_row))| -> Result<Vec<NormalHit>> {
                let j = range.start[1] + (row % ny) as i32;
                let k = range.start[2] + (row / ny) as i32;
                let mut hits = Vec::new();
                for (n, (pw, bw)) in pos_row.iter_mut().zip(bid_row.iter_mut()).enumerate() {
                    let i = range.start[0] + n as i32;
                    let sr = grid.search_range(i, j, k);
                    let cut = search.search(&sr, scratch)?;
                    P::set_all(pw, &cut.normalized(&sr.range));
                    B::set_all(bw, &cut.bid);
                    if let Some(extent) = &normal_extent {
                        let ijk = extent.linear_unchecked(i, j, k);
                        for dir in Direction::ALL {
                            if let Some(triangle) = cut.triangle[dir.index()] {
                                hits.push(NormalHit { ijk, dir, triangle });
                            }
                        }
                    }
                }
                Ok(hits)
            })
            .collect::<Result<_>>()?;
        debug!(
            points = range.volume(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "main loop done"
        );

        if let Some(n) = normals {
            let started = Instant::now();
            let merged = n.merge(hits.into_iter().flatten());
            debug!(
                tuples = merged,
                normals = n.table().len(),
                elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
                "normals merged"
            );
        }
        Ok(())
    })?
}
