// === File: src/lib.rs ======================================================
// AGENT: PURPOSE    - min and max with location over flat 3D i32 grids
// AGENT: OWNER      - argminmax-par
// AGENT: INTERFACE  - exports: Reducer, Strategy, Harness, scan, combine_min, combine_max
// AGENT: INVARIANTS - ties resolve to the lowest flat index under every strategy
// AGENT: RISK       - `portable-simd` feature relies on nightly std::simd
// ==========================================================================

#![cfg_attr(feature = "portable-simd", feature(portable_simd))]

pub mod combine;
pub mod config;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod kernel;
pub mod lanes;
pub mod pool;
pub mod prefetch;
pub mod strategy;

pub use combine::{combine_max, combine_min, Combinator, Direction, Located, MaxLoc, MinLoc, MinMax};
pub use config::ReduceConfig;
pub use dataset::{Coord, DataGen, Dataset, Dims, Value};
pub use error::{ReduceError, Result};
pub use harness::{planted, Harness, Mismatch, Report, RunRecord};
pub use kernel::{scan, Kernel};
pub use strategy::{Reducer, Strategy};

/// Sequential min and max of `values`, `None` when empty.
pub fn min_max(values: &[Value]) -> Option<MinMax> {
    if values.is_empty() {
        return None;
    }
    Some(kernel::scan_minmax(values, 0))
}
