//! Recursive halving with `rayon::join`; idle units steal the other half.

use crate::combine::{Combinator, Located, MaxLoc, MinLoc, MinMax};
use crate::dataset::Value;
use crate::kernel::scan_scalar;
use crate::pool::ExecPool;

fn split<C: Combinator>(slice: &[Value], base: usize, threshold: usize, c: C) -> Located {
    if slice.len() <= threshold {
        return scan_scalar(slice, base, c);
    }
    let mid = slice.len() / 2;
    let (left, right) = slice.split_at(mid);
    let (l, r) = rayon::join(
        || split(left, base, threshold, c),
        || split(right, base + mid, threshold, c),
    );
    c.combine(l, r)
}

/// Number of sequential leaves the recursion produces for `len` elements.
pub fn leaf_count(len: usize, threshold: usize) -> usize {
    if len <= threshold {
        1
    } else {
        let mid = len / 2;
        leaf_count(mid, threshold) + leaf_count(len - mid, threshold)
    }
}

/// Min and max run as two top-level tasks, each splitting down to
/// `threshold` elements.
pub fn reduce_tasks(pool: &ExecPool, data: &[Value], threshold: usize) -> MinMax {
    let threshold = threshold.max(1);
    tracing::debug!(
        threshold,
        leaves = leaf_count(data.len(), threshold),
        "task split"
    );
    pool.install(|| {
        let (min, max) = rayon::join(
            || split(data, 0, threshold, MinLoc),
            || split(data, 0, threshold, MaxLoc),
        );
        MinMax { min, max }
    })
}
