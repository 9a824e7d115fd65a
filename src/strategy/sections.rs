//! Two-level distribution: an outer fan-out of two (min, max), each side
//! driving its own inner pool with the static chunked discipline.

use crate::combine::{MaxLoc, MinLoc, MinMax};
use crate::dataset::Value;
use crate::error::Result;
use crate::pool::ExecPool;
use crate::strategy::chunked::reduce_static_one;

/// Inner group size for `units` total: half each, at least one.
pub fn inner_units(units: usize) -> usize {
    if units > 2 {
        units / 2
    } else {
        1
    }
}

#[derive(Debug)]
pub struct SectionPools {
    min: ExecPool,
    max: ExecPool,
}

impl SectionPools {
    pub fn new(units: usize) -> Result<Self> {
        let inner = inner_units(units);
        Ok(Self {
            min: ExecPool::new(inner)?,
            max: ExecPool::new(inner)?,
        })
    }

    pub fn inner_units(&self) -> usize {
        self.min.units()
    }
}

pub fn reduce_sections(pools: &SectionPools, data: &[Value]) -> MinMax {
    std::thread::scope(|s| {
        let min_section = s.spawn(|| reduce_static_one(&pools.min, data, MinLoc));
        let max = reduce_static_one(&pools.max, data, MaxLoc);
        let min = min_section
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        MinMax { min, max }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::Located;

    #[test]
    fn test_inner_units() {
        assert_eq!(inner_units(1), 1);
        assert_eq!(inner_units(2), 1);
        assert_eq!(inner_units(3), 1);
        assert_eq!(inner_units(8), 4);
    }

    #[test]
    fn test_sections_agree_with_sample() {
        let pools = SectionPools::new(4).unwrap();
        assert_eq!(pools.inner_units(), 2);
        let mm = reduce_sections(&pools, &[5, 3, 9, -1, 100_000, 2, 3, 9, 0]);
        assert_eq!(mm.min, Located::new(-1, 3));
        assert_eq!(mm.max, Located::new(100_000, 4));
    }
}
