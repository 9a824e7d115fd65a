//! Runtime knobs shared by every strategy.

use crate::error::{ReduceError, Result};

/// Leaf size below which the task strategy stops splitting.
/// 64K `i32` values sit comfortably in a 256 KB L2.
pub const DEFAULT_TASK_THRESHOLD: usize = 65_536;

/// Tile extent over the (i, j) plane; each tile also covers the full depth P.
pub const DEFAULT_TILE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Number of execution units. `None` uses every available core.
    pub threads: Option<usize>,
    pub task_threshold: usize,
    pub tile_i: usize,
    pub tile_j: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            threads: None,
            task_threshold: DEFAULT_TASK_THRESHOLD,
            tile_i: DEFAULT_TILE,
            tile_j: DEFAULT_TILE,
        }
    }
}

impl ReduceConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_task_threshold(mut self, threshold: usize) -> Self {
        self.task_threshold = threshold;
        self
    }

    pub fn with_tile(mut self, tile_i: usize, tile_j: usize) -> Self {
        self.tile_i = tile_i;
        self.tile_j = tile_j;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(ReduceError::InvalidConfig(
                "thread count must be at least 1".into(),
            ));
        }
        if self.task_threshold == 0 {
            return Err(ReduceError::InvalidConfig(
                "task threshold must be at least 1 element".into(),
            ));
        }
        if self.tile_i == 0 || self.tile_j == 0 {
            return Err(ReduceError::InvalidConfig(format!(
                "tile extent must be positive, got {}x{}",
                self.tile_i, self.tile_j
            )));
        }
        Ok(())
    }

    /// Unit count this config resolves to on the current machine.
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
