//! Interchangeable partitioning strategies behind one `run` entry point.

pub mod chunked;
pub mod sections;
pub mod tasks;
pub mod tiled;
pub mod two_pass;

use std::fmt;
use std::str::FromStr;

use crate::combine::MinMax;
use crate::config::ReduceConfig;
use crate::dataset::Dataset;
use crate::error::{ReduceError, Result};
use crate::kernel::{scan_minmax, Kernel};
use crate::pool::ExecPool;

use self::sections::SectionPools;
use self::tiled::RowKernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Single unit, fused min+max scan. Reference for speedups.
    Sequential,
    /// One chunk per unit, scalar kernel, lock-guarded merge.
    StaticLoop,
    /// As `StaticLoop` with the mask-select kernel.
    Branchless,
    /// Value-only reduction, then a first-index locate pass.
    TwoPass,
    /// As `StaticLoop` with the 8-lane kernel.
    SimdLanes,
    /// 8x8 (i, j) tiles, full depth, fused min+max per row.
    Tiled,
    /// `Tiled` with the fused 8-lane row kernel.
    TiledLanes,
    /// Recursive halving down to the task threshold.
    Tasks,
    /// Outer min/max fan-out, each with its own inner pool.
    Sections,
}

impl Strategy {
    pub const ALL: [Strategy; 9] = [
        Strategy::Sequential,
        Strategy::StaticLoop,
        Strategy::Branchless,
        Strategy::TwoPass,
        Strategy::SimdLanes,
        Strategy::Tiled,
        Strategy::TiledLanes,
        Strategy::Tasks,
        Strategy::Sections,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::StaticLoop => "static",
            Strategy::Branchless => "branchless",
            Strategy::TwoPass => "two-pass",
            Strategy::SimdLanes => "simd",
            Strategy::Tiled => "tiled",
            Strategy::TiledLanes => "tiled-simd",
            Strategy::Tasks => "tasks",
            Strategy::Sections => "sections",
        }
    }

    /// Whether the strategy spreads work over the execution pool.
    pub fn is_parallel(self) -> bool {
        self != Strategy::Sequential
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ReduceError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Strategy::ALL.iter().map(|s| s.name()).collect();
                ReduceError::InvalidConfig(format!(
                    "unknown strategy {s:?}, expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Owns the worker pools and runs any strategy over a dataset.
#[derive(Debug)]
pub struct Reducer {
    config: ReduceConfig,
    pool: ExecPool,
    sections: SectionPools,
}

impl Reducer {
    pub fn new(config: ReduceConfig) -> Result<Self> {
        config.validate()?;
        let units = config.resolved_threads();
        let pool = ExecPool::new(units)?;
        let sections = SectionPools::new(units)?;
        tracing::debug!(
            units,
            inner_units = sections.inner_units(),
            task_threshold = config.task_threshold,
            "reducer ready"
        );
        Ok(Self {
            config,
            pool,
            sections,
        })
    }

    pub fn with_threads(units: usize) -> Result<Self> {
        Self::new(ReduceConfig::default().with_threads(units))
    }

    pub fn units(&self) -> usize {
        self.pool.units()
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Min and max of `dataset` with their locations. Every strategy returns
    /// the same pair for the same data.
    pub fn run(&self, strategy: Strategy, dataset: &Dataset) -> MinMax {
        let data = dataset.values();
        let tile = (self.config.tile_i, self.config.tile_j);
        match strategy {
            Strategy::Sequential => scan_minmax(data, 0),
            Strategy::StaticLoop => chunked::reduce_static(&self.pool, data, Kernel::Scalar),
            Strategy::Branchless => chunked::reduce_static(&self.pool, data, Kernel::Branchless),
            Strategy::TwoPass => two_pass::reduce_two_pass(&self.pool, data),
            Strategy::SimdLanes => chunked::reduce_static(&self.pool, data, Kernel::Lanes),
            Strategy::Tiled => {
                tiled::reduce_tiled(&self.pool, data, dataset.dims(), tile, RowKernel::Scalar)
            }
            Strategy::TiledLanes => {
                tiled::reduce_tiled(&self.pool, data, dataset.dims(), tile, RowKernel::Lanes)
            }
            Strategy::Tasks => tasks::reduce_tasks(&self.pool, data, self.config.task_threshold),
            Strategy::Sections => sections::reduce_sections(&self.sections, data),
        }
    }
}
