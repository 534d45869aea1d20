//! Cut computation over an octree.
//!
//! Each root cell gathers the triangles overlapping its expanded box once;
//! descending into a child keeps only the candidates that still overlap the
//! child's expanded box. Candidate order is preserved at every level, so a
//! cell sees its triangles in the same order a direct index query would.

use std::time::Instant;

use cutcell_math::Aabb3;
use cutcell_octree::{Cell, CellId, CellTree};
use cutcell_polygon::{PolygonIndex, Triangle};
use tracing::{debug, info_span};

use crate::cutinfo::{BidCodec, OctreeCutLayout, PosCodec};
use crate::driver::reject;
use crate::error::{CutError, Result};
use crate::grid::SearchRange;
use crate::search::{select_groups, CutSearch, PointCut};
use crate::settings::{CutSettings, OctreeMode};

/// Triangle carried down the tree with its bounds cached.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    triangle: &'a Triangle,
    bounds: Aabb3,
    bid: u8,
}

/// Probe of a cell: from its center, one edge length in every direction.
///
/// Matches [`CellGrid`](crate::grid::CellGrid) probes for a cell of the
/// same placement, and stays inside the cell's expanded bounds.
pub fn cell_search_range(cell: &Cell) -> SearchRange {
    SearchRange::symmetric(cell.center(), &cell.pitch)
}

/// Compute cut info for the cells of `tree` against every leaf group with
/// a positive id, storing results in each cell's payload through `layout`.
pub fn calc_cut_info_octree<I, P, B>(
    tree: &mut CellTree,
    index: &I,
    layout: &OctreeCutLayout<P, B>,
    mode: OctreeMode,
    settings: &CutSettings,
) -> Result<()>
where
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    B: BidCodec,
{
    run("calc_cut_info_octree", tree, index, None, layout, mode, settings)
}

/// Like [`calc_cut_info_octree`], restricted to the listed group paths.
pub fn calc_cut_info_octree_groups<I, P, B>(
    tree: &mut CellTree,
    index: &I,
    groups: &[&str],
    layout: &OctreeCutLayout<P, B>,
    mode: OctreeMode,
    settings: &CutSettings,
) -> Result<()>
where
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    B: BidCodec,
{
    run(
        "calc_cut_info_octree_groups",
        tree,
        index,
        Some(groups),
        layout,
        mode,
        settings,
    )
}

fn run<I, P, B>(
    caller: &'static str,
    tree: &mut CellTree,
    index: &I,
    groups: Option<&[&str]>,
    layout: &OctreeCutLayout<P, B>,
    mode: OctreeMode,
    settings: &CutSettings,
) -> Result<()>
where
    I: PolygonIndex + ?Sized,
    P: PosCodec,
    B: BidCodec,
{
    let _span = info_span!("cut_info_octree", caller = caller, mode = ?mode).entered();

    settings.validate().map_err(|e| reject(caller, e))?;
    if !index.is_loaded() {
        return Err(reject(caller, CutError::PolygonIndexNotInitialized));
    }
    if !tree.is_initialized() {
        return Err(reject(caller, CutError::TreeNotInitialized));
    }
    layout
        .check(tree.data_size())
        .map_err(|e| reject(caller, e))?;
    let max_bid = settings.max_boundary_id.min(B::MAX_BID);
    let groups = select_groups(index, groups, max_bid, caller)?;
    let search = CutSearch::new(index, groups, max_bid);

    for n in 0..tree.cell_count() {
        layout.clear(tree.cell_data_mut(CellId(n as u32)));
    }

    let started = Instant::now();
    match mode {
        OctreeMode::AllCellsUnpruned => {
            let mut scratch = Vec::new();
            for n in 0..tree.cell_count() {
                let id = CellId(n as u32);
                let range = cell_search_range(tree.cell(id));
                let cut = search.search(&range, &mut scratch)?;
                store(layout, tree.cell_data_mut(id), &cut, &range);
            }
        }
        OctreeMode::LeafOnly | OctreeMode::AllCells => {
            let write_inner = mode == OctreeMode::AllCells;
            walk(tree, &search, &mut |tree: &mut CellTree, id: CellId, list: &[Candidate<'_>]| {
                let cell = *tree.cell(id);
                if cell.is_leaf() || write_inner {
                    let range = cell_search_range(&cell);
                    let mut cut = PointCut::new(&range.range);
                    for c in list {
                        cut.check_triangle(c.triangle, c.bid, &range.center);
                    }
                    store(layout, tree.cell_data_mut(id), &cut, &range);
                }
            })?;
        }
    }
    debug!(
        cells = tree.cell_count(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "octree cut info done"
    );
    Ok(())
}

/// Visit every cell with its pruned candidate list.
///
/// Each root starts from a fresh index query over its expanded bounds; a
/// child keeps the parent's candidates that overlap its own expanded bounds.
fn walk<'a, I, F>(tree: &mut CellTree, search: &CutSearch<'a, I>, visit: &mut F) -> Result<()>
where
    I: PolygonIndex + ?Sized,
    F: FnMut(&mut CellTree, CellId, &[Candidate<'a>]),
{
    let roots = tree.roots().to_vec();
    let mut found = Vec::new();
    let mut list = Vec::new();
    for root in roots {
        found.clear();
        search.candidates(&tree.cell(root).expanded_bounds(), &mut found)?;
        list.clear();
        list.extend(found.iter().map(|&triangle| Candidate {
            triangle,
            bounds: triangle.aabb(),
            bid: triangle.boundary_id as u8,
        }));
        descend(tree, root, &list, visit);
    }
    Ok(())
}

fn descend<'a, F>(tree: &mut CellTree, id: CellId, list: &[Candidate<'a>], visit: &mut F)
where
    F: FnMut(&mut CellTree, CellId, &[Candidate<'a>]),
{
    visit(tree, id, list);

    let Some(children) = tree.cell(id).children else {
        return;
    };
    let mut child_list = Vec::with_capacity(list.len());
    for child in children {
        let bounds = tree.cell(child).expanded_bounds();
        child_list.clear();
        child_list.extend(list.iter().filter(|c| c.bounds.overlaps(&bounds)).copied());
        descend(tree, child, &child_list, visit);
    }
}

fn store<P: PosCodec, B: BidCodec>(
    layout: &OctreeCutLayout<P, B>,
    blob: &mut [u8],
    cut: &PointCut,
    range: &SearchRange,
) {
    layout.write_pos(blob, &cut.normalized(&range.range));
    layout.write_bid(blob, &cut.bid);
}

/// Cut positions of one cell, read back through `layout`.
pub fn cell_pos<P: PosCodec, B: BidCodec>(
    tree: &CellTree,
    layout: &OctreeCutLayout<P, B>,
    id: CellId,
) -> [f32; 6] {
    layout.read_pos(tree.cell_data(id))
}

/// Boundary ids of one cell, read back through `layout`.
pub fn cell_bid<P: PosCodec, B: BidCodec>(
    tree: &CellTree,
    layout: &OctreeCutLayout<P, B>,
    id: CellId,
) -> [u8; 6] {
    layout.read_bid(tree.cell_data(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cutinfo::{CutBid5, CutBid8, CutPos32, CutPos8};
    use crate::ReturnCode;
    use cutcell_math::{Direction, Point3, Vec3};
    use cutcell_polygon::PolygonStore;

    fn wall_store(x: f64) -> PolygonStore {
        let mut store = PolygonStore::new();
        let g = store.add_group(None, "wall", 3).unwrap();
        let p = |y: f64, z: f64| Point3::new(x, y, z);
        store.add_triangle(g, [p(-1.0, -1.0), p(2.0, -1.0), p(2.0, 2.0)]).unwrap();
        store.add_triangle(g, [p(-1.0, -1.0), p(2.0, 2.0), p(-1.0, 2.0)]).unwrap();
        store.build_index();
        store
    }

    fn tree(data_size: usize) -> CellTree {
        let mut tree = CellTree::new([1, 1, 1], Point3::origin(), Vec3::new(1.0, 1.0, 1.0), data_size).unwrap();
        tree.refine_where(2, |c| c.origin.x < 0.5).unwrap();
        tree
    }

    #[test]
    fn test_cell_search_range() {
        let tree = tree(0);
        let r = cell_search_range(tree.cell(tree.roots()[0]));
        assert_eq!(r.center, Point3::new(0.5, 0.5, 0.5));
        assert_eq!(r.range, [1.0; 6]);
    }

    #[test]
    fn test_modes_agree_on_leaves() {
        let store = wall_store(0.3);
        let layout = OctreeCutLayout::<CutPos32, CutBid8>::packed();
        let mut results = Vec::new();
        for mode in [OctreeMode::LeafOnly, OctreeMode::AllCells, OctreeMode::AllCellsUnpruned] {
            let mut t = tree(layout.required_size());
            calc_cut_info_octree(&mut t, &store, &layout, mode, &CutSettings::default()).unwrap();
            let leaves: Vec<_> = t
                .leaf_cells()
                .into_iter()
                .map(|id| (cell_pos(&t, &layout, id), cell_bid(&t, &layout, id)))
                .collect();
            results.push(leaves);
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
        assert!(results[0].iter().any(|(_, bid)| bid.contains(&3)));
    }

    #[test]
    fn test_leaf_only_leaves_inner_cells_cleared() {
        let store = wall_store(0.3);
        let layout = OctreeCutLayout::<CutPos8, CutBid5>::packed();
        let mut t = tree(layout.required_size());
        calc_cut_info_octree(&mut t, &store, &layout, OctreeMode::LeafOnly, &CutSettings::default()).unwrap();
        let root = t.roots()[0];
        assert_eq!(cell_bid(&t, &layout, root), [0; 6]);
        assert_eq!(cell_pos(&t, &layout, root), [1.0; 6]);

        calc_cut_info_octree(&mut t, &store, &layout, OctreeMode::AllCells, &CutSettings::default()).unwrap();
        // the root probe spans x in [-0.5, 1.5] and finds the wall at 0.3
        assert_eq!(cell_bid(&t, &layout, root)[Direction::XMinus.index()], 3);
    }

    #[test]
    fn test_leaf_cut_position() {
        let store = wall_store(0.3);
        let layout = OctreeCutLayout::<CutPos32, CutBid8>::packed();
        let mut t = tree(layout.required_size());
        calc_cut_info_octree(&mut t, &store, &layout, OctreeMode::LeafOnly, &CutSettings::default()).unwrap();
        // level-2 leaf spanning x in [0.25, 0.5], center 0.375
        let leaf = t
            .leaf_cells()
            .into_iter()
            .find(|&id| {
                let c = t.cell(id);
                c.level == 2 && c.origin.x == 0.25 && c.origin.y == 0.0 && c.origin.z == 0.0
            })
            .unwrap();
        let pos = cell_pos(&t, &layout, leaf);
        let bid = cell_bid(&t, &layout, leaf);
        assert_eq!(bid[Direction::XMinus.index()], 3);
        assert!((pos[Direction::XMinus.index()] - 0.3).abs() < 1e-6);
        assert_eq!(bid[Direction::XPlus.index()], 0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let store = wall_store(0.3);
        let layout = OctreeCutLayout::<CutPos32, CutBid8>::packed();

        let mut empty = CellTree::default();
        let result = calc_cut_info_octree(&mut empty, &store, &layout, OctreeMode::LeafOnly, &CutSettings::default());
        assert_eq!(ReturnCode::from_result(&result), ReturnCode::BadTree);

        let mut small = tree(layout.required_size() - 1);
        let result = calc_cut_info_octree(&mut small, &store, &layout, OctreeMode::LeafOnly, &CutSettings::default());
        assert_eq!(ReturnCode::from_result(&result), ReturnCode::OtherError);

        let mut t = tree(layout.required_size());
        let result = calc_cut_info_octree_groups(
            &mut t,
            &store,
            &["missing"],
            &layout,
            OctreeMode::LeafOnly,
            &CutSettings::default(),
        );
        assert_eq!(ReturnCode::from_result(&result), ReturnCode::BadGroupList);
    }

    #[test]
    fn test_candidate_lists_match_expanded_bounds() {
        let mut store = PolygonStore::new();
        let patch = store.add_group(None, "patch", 4).unwrap();
        let p = |y: f64, z: f64| Point3::new(0.5, y, z);
        store.add_triangle(patch, [p(0.05, 0.05), p(0.2, 0.05), p(0.2, 0.2)]).unwrap();
        let ignored = store.add_group(None, "ignored", 0).unwrap();
        store.add_triangle(ignored, [p(0.05, 0.05), p(0.2, 0.05), p(0.05, 0.2)]).unwrap();
        store.build_index();

        let mut tree = CellTree::new([5, 1, 1], Point3::origin(), Vec3::new(1.0, 1.0, 1.0), 0).unwrap();
        tree.refine_where(2, |c| c.origin.x < 1.0).unwrap();

        let groups = select_groups(&store, None, u8::MAX, "test").unwrap();
        let search = CutSearch::new(&store, groups, u8::MAX);
        let mut lists = Vec::new();
        walk(&mut tree, &search, &mut |_: &mut CellTree, id: CellId, list: &[Candidate<'_>]| {
            lists.push((id, list.iter().map(|c| c.triangle.id).collect::<Vec<_>>()));
        })
        .unwrap();

        assert_eq!(lists.len(), tree.cell_count());
        for (id, ids) in &lists {
            let bounds = tree.cell(*id).expanded_bounds();
            let expected: Vec<_> = search
                .groups()
                .iter()
                .flat_map(|&g| store.group(g).unwrap().triangles())
                .filter(|t| t.aabb().overlaps(&bounds))
                .map(|t| t.id)
                .collect();
            assert_eq!(ids, &expected, "cell {id:?}");
        }

        // roots at x >= 2 are out of reach of the patch at x = 0.5
        let root_sizes: Vec<usize> = tree
            .roots()
            .iter()
            .map(|r| lists.iter().find(|(id, _)| id == r).unwrap().1.len())
            .collect();
        assert_eq!(root_sizes, vec![1, 1, 0, 0, 0]);
        assert!(lists
            .iter()
            .any(|(id, ids)| tree.cell(*id).level == 2 && ids.is_empty()));
    }
}
