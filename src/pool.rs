//! Fixed-size pool of execution units shared by the strategies.

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;

pub struct ExecPool {
    pool: ThreadPool,
    units: usize,
}

impl ExecPool {
    pub fn new(units: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(units)
            .thread_name(|idx| format!("argminmax-{idx}"))
            .build()?;
        tracing::debug!(units, "built execution pool");
        Ok(Self { pool, units })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Runs `op` with this pool as the ambient rayon pool.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn scope<'scope, R, F>(&self, op: F) -> R
    where
        F: FnOnce(&rayon::Scope<'scope>) -> R + Send,
        R: Send,
    {
        self.pool.scope(op)
    }
}

impl std::fmt::Debug for ExecPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecPool").field("units", &self.units).finish()
    }
}

/// Splits `0..len` into `units` contiguous ranges of `len / units` elements,
/// the last one also taking the remainder. With `len < units` the leading
/// ranges are empty.
pub fn static_partition(len: usize, units: usize) -> Vec<Range<usize>> {
    let units = units.max(1);
    let chunk = len / units;
    (0..units)
        .map(|unit| {
            let lo = unit * chunk;
            let hi = if unit == units - 1 { len } else { lo + chunk };
            lo..hi
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_everything_once() {
        for len in [0, 1, 7, 8, 100, 1001] {
            for units in [1, 2, 3, 4, 16] {
                let parts = static_partition(len, units);
                assert_eq!(parts.len(), units);
                assert_eq!(parts[0].start, 0);
                assert_eq!(parts[units - 1].end, len);
                for pair in parts.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        }
    }

    #[test]
    fn test_short_input_leaves_leading_units_idle() {
        let parts = static_partition(3, 4);
        assert_eq!(parts, vec![0..0, 0..0, 0..0, 0..3]);
    }

    #[test]
    fn test_pool_reports_units() {
        let pool = ExecPool::new(2).unwrap();
        assert_eq!(pool.units(), 2);
        assert_eq!(pool.install(rayon::current_num_threads), 2);
    }
}
