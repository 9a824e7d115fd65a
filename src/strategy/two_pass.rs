//! Value pass, then locate pass.
//!
//! Pass 1 reduces values only (no index bookkeeping, so the inner loop is
//! a plain lane-wise min/max). Pass 2 looks for the first occurrence of
//! each winning value. Each direction's location lives in one atomic that
//! only ever moves down, and units skip blocks that start past an index
//! already recorded, so the search stops as soon as it cannot improve.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::combine::{Combinator, Located, MaxLoc, MinLoc, MinMax, NO_INDEX};
use crate::dataset::Value;
use crate::kernel::locate;
use crate::lanes::extreme_value;
use crate::pool::{static_partition, ExecPool};

/// Locate pass checks the shared slot between blocks of this many elements.
const LOCATE_BLOCK: usize = 4096;

// AGENT: DECISION - one fetch_min slot per direction, NO_INDEX means "not found yet"
// AGENT: REASONING - first-writer-wins depends on scheduling once a value repeats
/// Lowest flat index found so far for one target value.
struct FirstHit {
    value: Value,
    index: AtomicUsize,
}

impl FirstHit {
    fn new(value: Value) -> Self {
        Self {
            value,
            index: AtomicUsize::new(NO_INDEX),
        }
    }

    /// `true` while an element at `from` or later could still lower the slot.
    fn open_at(&self, from: usize) -> bool {
        from < self.index.load(Ordering::Acquire)
    }

    /// Records `index` unless a lower one is already in place.
    fn record(&self, index: usize) {
        self.index.fetch_min(index, Ordering::AcqRel);
    }

    fn into_located(self) -> Located {
        Located::new(self.value, self.index.into_inner())
    }
}

fn value_pass<C: Combinator>(data: &[Value], parts: &[Range<usize>], c: C) -> Located {
    parts
        .par_iter()
        .filter_map(|range| extreme_value(&data[range.clone()], c))
        .map(|value| Located::new(value, NO_INDEX))
        .reduce(|| c.identity(), |a, b| c.combine(a, b))
}

fn locate_pass(data: &[Value], parts: &[Range<usize>], targets: [&FirstHit; 2]) {
    parts.par_iter().for_each(|range| {
        let mut lo = range.start;
        while lo < range.end {
            let hi = (lo + LOCATE_BLOCK).min(range.end);
            let mut open = false;
            for hit in targets {
                if hit.open_at(lo) {
                    open = true;
                    if let Some(index) = locate(&data[lo..hi], lo, hit.value) {
                        hit.record(index);
                    }
                }
            }
            if !open {
                break;
            }
            lo = hi;
        }
    });
}

pub fn reduce_two_pass(pool: &ExecPool, data: &[Value]) -> MinMax {
    if data.is_empty() {
        return MinMax::none();
    }
    let parts = static_partition(data.len(), pool.units());
    pool.install(|| {
        // indices are still NO_INDEX here, only the values are meaningful
        let (min, max) = rayon::join(
            || value_pass(data, &parts, MinLoc),
            || value_pass(data, &parts, MaxLoc),
        );
        tracing::debug!(min = min.value, max = max.value, "value pass done");

        let min_hit = FirstHit::new(min.value);
        let max_hit = FirstHit::new(max.value);
        locate_pass(data, &parts, [&min_hit, &max_hit]);
        MinMax {
            min: min_hit.into_located(),
            max: max_hit.into_located(),
        }
    })
}
