//! Run settings.

use serde::{Deserialize, Serialize};

use crate::error::{CutError, Result};

/// Parameters shared by every cut computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutSettings {
    /// Worker threads. `None` runs on rayon's global pool.
    pub threads: Option<usize>,
    /// Minimum number of grid rows handed to one task.
    pub min_rows_per_task: usize,
    /// Largest boundary id accepted from the polygon groups.
    pub max_boundary_id: u8,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            threads: None,
            min_rows_per_task: 1,
            max_boundary_id: u8::MAX,
        }
    }
}

impl CutSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(CutError::InvalidSettings(
                "threads must be at least 1".into(),
            ));
        }
        if self.min_rows_per_task == 0 {
            return Err(CutError::InvalidSettings(
                "min_rows_per_task must be at least 1".into(),
            ));
        }
        if self.max_boundary_id == 0 {
            return Err(CutError::InvalidSettings(
                "max_boundary_id must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Run `op` on the configured pool.
    pub(crate) fn install<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self.threads {
            None => Ok(op()),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| CutError::InvalidSettings(e.to_string()))?;
                Ok(pool.install(op))
            }
        }
    }
}

/// Which cells of an octree receive cut information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OctreeMode {
    /// Only leaf cells are written; inner cells keep their cleared state.
    #[default]
    LeafOnly,
    /// Every cell at every level is written.
    AllCells,
    /// Every cell, querying the full polygon index at each cell instead of
    /// pruning a candidate list. Slow; useful as a reference.
    AllCellsUnpruned,
}
