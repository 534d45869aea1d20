//! Arena storage for the cell tree.

use cutcell_math::{Aabb3, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::{OctreeError, Result};

/// Deepest refinement level below the root cells.
const MAX_LEVEL: u8 = 20;

/// Index of a cell in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

/// One octree cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Minimum corner.
    pub origin: Point3,
    /// Edge lengths.
    pub pitch: Vec3,
    /// Refinement level, 0 for root cells.
    pub level: u8,
    /// Parent cell, `None` for root cells.
    pub parent: Option<CellId>,
    /// Children in Morton order: bit 0 selects +x, bit 1 +y, bit 2 +z.
    pub children: Option<[CellId; 8]>,
}

impl Cell {
    /// Cell center.
    pub fn center(&self) -> Point3 {
        self.origin + self.pitch * 0.5
    }

    /// True if the cell has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Cell box grown by half a pitch on every side.
    ///
    /// This is the region reached by probes of one pitch length from the
    /// cell center.
    pub fn expanded_bounds(&self) -> Aabb3 {
        let c = self.center();
        let d = [self.pitch.x, self.pitch.y, self.pitch.z];
        Aabb3::around(&c, d, d)
    }

    /// Origin of child `index` (0..8) for a cell with this origin and pitch.
    fn child_origin(&self, index: usize) -> Point3 {
        let h = self.pitch * 0.5;
        Point3::new(
            self.origin.x + if index & 1 != 0 { h.x } else { 0.0 },
            self.origin.y + if index & 2 != 0 { h.y } else { 0.0 },
            self.origin.z + if index & 4 != 0 { h.z } else { 0.0 },
        )
    }
}

/// A grid of root cells with recursive 8-ary refinement.
///
/// Every cell owns `data_size` bytes of the tree's data blob, zeroed when
/// the cell is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellTree {
    size: [usize; 3],
    origin: Point3,
    root_pitch: Vec3,
    cells: Vec<Cell>,
    roots: Vec<CellId>,
    data_size: usize,
    data: Vec<u8>,
}

impl CellTree {
    /// Create a tree of `size` root cells starting at `origin`.
    pub fn new(size: [usize; 3], origin: Point3, root_pitch: Vec3, data_size: usize) -> Result<Self> {
        if size.iter().any(|&n| n == 0) {
            return Err(OctreeError::InvalidSize(size));
        }
        if !root_pitch.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(OctreeError::InvalidPitch(format!(
                "({}, {}, {})",
                root_pitch.x, root_pitch.y, root_pitch.z
            )));
        }

        let n = size[0] * size[1] * size[2];
        let mut tree = Self {
            size,
            origin,
            root_pitch,
            cells: Vec::with_capacity(n),
            roots: Vec::with_capacity(n),
            data_size,
            data: Vec::with_capacity(n * data_size),
        };
        for k in 0..size[2] {
            for j in 0..size[1] {
                for i in 0..size[0] {
                    let cell_origin = Point3::new(
                        origin.x + i as f64 * root_pitch.x,
                        origin.y + j as f64 * root_pitch.y,
                        origin.z + k as f64 * root_pitch.z,
                    );
                    let id = tree.push_cell(Cell {
                        origin: cell_origin,
                        pitch: root_pitch,
                        level: 0,
                        parent: None,
                        children: None,
                    });
                    tree.roots.push(id);
                }
            }
        }
        Ok(tree)
    }

    /// True once the tree has root cells.
    pub fn is_initialized(&self) -> bool {
        !self.roots.is_empty()
    }

    /// Root grid dimensions.
    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Minimum corner of the root grid.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Edge lengths of a root cell.
    pub fn root_pitch(&self) -> Vec3 {
        self.root_pitch
    }

    /// Bytes of payload per cell.
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    /// Total number of cells at all levels.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Root cells, x fastest, then y, then z.
    pub fn roots(&self) -> &[CellId] {
        &self.roots
    }

    /// Root cell at grid position `(i, j, k)`.
    pub fn root(&self, i: usize, j: usize, k: usize) -> Option<CellId> {
        if i >= self.size[0] || j >= self.size[1] || k >= self.size[2] {
            return None;
        }
        Some(self.roots[i + self.size[0] * (j + self.size[1] * k)])
    }

    /// Access a cell.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0 as usize]
    }

    /// Access a cell, returning `None` for a foreign id.
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0 as usize)
    }

    /// Iterate over every cell id in arena order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cells.len() as u32).map(CellId)
    }

    /// Split a leaf cell into eight children.
    pub fn refine(&mut self, id: CellId) -> Result<[CellId; 8]> {
        let parent = self.get(id).ok_or(OctreeError::UnknownCell(id.0))?.clone();
        if parent.children.is_some() {
            return Err(OctreeError::AlreadyRefined(id.0));
        }
        if parent.level >= MAX_LEVEL {
            return Err(OctreeError::MaxLevel(MAX_LEVEL));
        }

        let mut children = [CellId(0); 8];
        for (index, child) in children.iter_mut().enumerate() {
            *child = self.push_cell(Cell {
                origin: parent.child_origin(index),
                pitch: parent.pitch * 0.5,
                level: parent.level + 1,
                parent: Some(id),
                children: None,
            });
        }
        self.cells[id.0 as usize].children = Some(children);
        Ok(children)
    }

    /// Repeatedly refine leaves accepted by `predicate`, down to `max_level`.
    ///
    /// Returns the number of cells refined.
    pub fn refine_where<F>(&mut self, max_level: u8, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Cell) -> bool,
    {
        let mut refined = 0;
        let mut pending = self.leaf_cells();
        while let Some(id) = pending.pop() {
            let cell = self.cell(id);
            if cell.level >= max_level || !predicate(cell) {
                continue;
            }
            pending.extend(self.refine(id)?);
            refined += 1;
        }
        Ok(refined)
    }

    /// Leaf cells in depth-first order, root by root.
    pub fn leaf_cells(&self) -> Vec<CellId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                match self.cell(id).children {
                    Some(children) => stack.extend(children.iter().rev()),
                    None => out.push(id),
                }
            }
        }
        out
    }

    /// Payload bytes of a cell.
    pub fn cell_data(&self, id: CellId) -> &[u8] {
        let start = id.0 as usize * self.data_size;
        &self.data[start..start + self.data_size]
    }

    /// Mutable payload bytes of a cell.
    pub fn cell_data_mut(&mut self, id: CellId) -> &mut [u8] {
        let start = id.0 as usize * self.data_size;
        &mut self.data[start..start + self.data_size]
    }

    fn push_cell(&mut self, cell: Cell) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        self.data.resize(self.data.len() + self.data_size, 0);
        id
    }
}
