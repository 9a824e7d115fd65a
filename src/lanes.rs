//! 8-lane kernels.
//!
//! Each lane keeps its own best (value, offset) over the elements at
//! `offset % LANES == lane`. After the last full block the lanes are
//! merged with the combinator, which settles equal values on the lowest
//! index, and the `len % LANES` tail is folded in scalar.
//!
//! The default build keeps lane state in plain arrays that LLVM turns into
//! compare/blend instructions. With the `portable-simd` feature (nightly)
//! the single-direction scan uses `std::simd` directly.

use crate::combine::{Combinator, Located, MaxLoc, MinLoc, MinMax};
use crate::dataset::Value;
use crate::kernel::scan_scalar;

pub const LANES: usize = 8;

/// Extremum of `slice` in `c`'s direction using 8 lanes.
#[inline]
pub fn scan_lanes<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
    #[cfg(feature = "portable-simd")]
    {
        simd::scan_lanes(slice, base, c)
    }
    #[cfg(not(feature = "portable-simd"))]
    {
        array::scan_lanes(slice, base, c)
    }
}

#[inline(always)]
fn pick(take: bool, a: Value, b: Value) -> Value {
    if take {
        a
    } else {
        b
    }
}

#[inline(always)]
fn pick_index(take: bool, a: usize, b: usize) -> usize {
    if take {
        a
    } else {
        b
    }
}

// AGENT: DECISION - merge lanes through the combinator, not in lane order
// AGENT: REASONING - lane 7 can hold an earlier index than lane 0 after a replace
fn merge_lanes<C: Combinator>(
    vals: &[Value; LANES],
    idxs: &[usize; LANES],
    base: usize,
    c: C,
) -> Located {
    vals.iter()
        .zip(idxs)
        .fold(c.identity(), |acc, (&v, &i)| {
            c.combine(acc, Located::new(v, base + i))
        })
}

fn fold_tail<C: Combinator>(mut acc: Located, tail: &[Value], tail_base: usize, c: C) -> Located {
    for (offset, &v) in tail.iter().enumerate() {
        if c.beats(v, acc.value) {
            acc = Located::new(v, tail_base + offset);
        }
    }
    acc
}

#[cfg_attr(feature = "portable-simd", allow(dead_code))]
mod array {
    use super::*;

    pub(super) fn scan_lanes<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
        let mut chunks = slice.chunks_exact(LANES);
        let remainder = chunks.remainder();
        let Some(first) = chunks.next() else {
            return scan_scalar(slice, base, c);
        };

        let mut best = [0; LANES];
        best.copy_from_slice(first);
        let mut best_idx: [usize; LANES] = std::array::from_fn(|lane| lane);
        let mut offset = LANES;

        for chunk in chunks {
            for lane in 0..LANES {
                let v = chunk[lane];
                let take = c.beats(v, best[lane]);
                best[lane] = pick(take, v, best[lane]);
                best_idx[lane] = pick_index(take, offset + lane, best_idx[lane]);
            }
            offset += LANES;
        }

        let acc = merge_lanes(&best, &best_idx, base, c);
        let tail_start = slice.len() - remainder.len();
        fold_tail(acc, remainder, base + tail_start, c)
    }
}

#[cfg(feature = "portable-simd")]
mod simd {
    use std::simd::prelude::*;

    use super::*;
    use crate::combine::Direction;

    pub(super) fn scan_lanes<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
        // lane offsets are u32
        if slice.len() < LANES || slice.len() > u32::MAX as usize {
            return array::scan_lanes(slice, base, c);
        }
        let mut chunks = slice.chunks_exact(LANES);
        let remainder = chunks.remainder();
        let Some(first) = chunks.next() else {
            return c.identity();
        };

        let step = u32x8::splat(LANES as u32);
        let mut best = i32x8::from_slice(first);
        let mut best_idx = u32x8::from_array([0, 1, 2, 3, 4, 5, 6, 7]);
        let mut current_idx = best_idx + step;

        for chunk in chunks {
            let vals = i32x8::from_slice(chunk);
            let mask = match C::DIRECTION {
                Direction::Min => vals.simd_lt(best),
                Direction::Max => vals.simd_gt(best),
            };
            best = mask.select(vals, best);
            best_idx = mask.select(current_idx, best_idx);
            current_idx += step;
        }

        let vals = best.to_array();
        let idxs: [usize; LANES] = best_idx.to_array().map(|i| i as usize);
        let acc = merge_lanes(&vals, &idxs, base, c);
        let tail_start = slice.len() - remainder.len();
        fold_tail(acc, remainder, base + tail_start, c)
    }
}

/// Both extrema in one pass with 8 lanes per direction.
pub fn scan_minmax_lanes(slice: &[Value], base: usize) -> MinMax {
    let mut chunks = slice.chunks_exact(LANES);
    let remainder = chunks.remainder();
    let Some(first) = chunks.next() else {
        return crate::kernel::scan_minmax(slice, base);
    };

    let mut min = [0; LANES];
    min.copy_from_slice(first);
    let mut max = min;
    let mut min_idx: [usize; LANES] = std::array::from_fn(|lane| lane);
    let mut max_idx = min_idx;
    let mut offset = LANES;

    for chunk in chunks {
        for lane in 0..LANES {
            let v = chunk[lane];
            let lt = v < min[lane];
            let gt = v > max[lane];
            min[lane] = pick(lt, v, min[lane]);
            min_idx[lane] = pick_index(lt, offset + lane, min_idx[lane]);
            max[lane] = pick(gt, v, max[lane]);
            max_idx[lane] = pick_index(gt, offset + lane, max_idx[lane]);
        }
        offset += LANES;
    }

    let tail_start = slice.len() - remainder.len();
    let min = merge_lanes(&min, &min_idx, base, MinLoc);
    let max = merge_lanes(&max, &max_idx, base, MaxLoc);
    MinMax {
        min: fold_tail(min, remainder, base + tail_start, MinLoc),
        max: fold_tail(max, remainder, base + tail_start, MaxLoc),
    }
}

/// Extremal value only; no index bookkeeping, so the loop is a pure
/// lane-wise min/max.
pub fn extreme_value<C: Combinator>(slice: &[Value], c: C) -> Option<Value> {
    let better = |a: Value, v: Value| pick(c.beats(v, a), v, a);
    let mut chunks = slice.chunks_exact(LANES);
    let remainder = chunks.remainder();
    let Some(first) = chunks.next() else {
        return slice.iter().copied().reduce(better);
    };

    let mut acc = [0; LANES];
    acc.copy_from_slice(first);
    for chunk in chunks {
        for lane in 0..LANES {
            acc[lane] = better(acc[lane], chunk[lane]);
        }
    }
    acc.into_iter().chain(remainder.iter().copied()).reduce(better)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::scan_scalar;

    fn pattern(len: usize) -> Vec<Value> {
        (0..len as i64)
            .map(|i| ((i * 2_654_435_761) % 10_007) as Value - 5_000)
            .collect()
    }

    #[test]
    fn test_matches_scalar_for_every_remainder() {
        for len in 0..=40 {
            let data = pattern(len);
            assert_eq!(
                scan_lanes(&data, 3, MinLoc),
                scan_scalar(&data, 3, MinLoc),
                "len={len}"
            );
            assert_eq!(
                scan_lanes(&data, 3, MaxLoc),
                scan_scalar(&data, 3, MaxLoc),
                "len={len}"
            );
            assert_eq!(array::scan_lanes(&data, 0, MinLoc), scan_scalar(&data, 0, MinLoc));
        }
    }

    #[test]
    fn test_exactly_one_lane_width() {
        let data = [5, 3, 9, -1, 100_000, 2, 3, 9];
        assert_eq!(scan_lanes(&data, 0, MinLoc), Located::new(-1, 3));
        assert_eq!(scan_lanes(&data, 0, MaxLoc), Located::new(100_000, 4));
        let fused = scan_minmax_lanes(&data, 0);
        assert_eq!(fused.min, Located::new(-1, 3));
        assert_eq!(fused.max, Located::new(100_000, 4));
    }

    #[test]
    fn test_tie_across_lanes_prefers_lowest_index() {
        // the 1 in lane 0 (index 8) must lose to the 1 in lane 3 (index 3)
        let mut data = vec![50; 24];
        data[3] = 1;
        data[8] = 1;
        data[17] = 1;
        assert_eq!(scan_lanes(&data, 0, MinLoc), Located::new(1, 3));
        assert_eq!(scan_minmax_lanes(&data, 0).min, Located::new(1, 3));
        data[23] = 90;
        data[9] = 90;
        assert_eq!(scan_lanes(&data, 0, MaxLoc), Located::new(90, 9));
    }

    #[test]
    fn test_minimum_in_tail() {
        let mut data = vec![10; 19];
        data[18] = -3;
        assert_eq!(scan_lanes(&data, 100, MinLoc), Located::new(-3, 118));
    }

    #[test]
    fn test_fused_lanes_matches_scalar() {
        for len in [0, 1, 7, 8, 9, 63, 64, 65, 500] {
            let data = pattern(len);
            let fused = scan_minmax_lanes(&data, 11);
            assert_eq!(fused.min, scan_scalar(&data, 11, MinLoc), "len={len}");
            assert_eq!(fused.max, scan_scalar(&data, 11, MaxLoc), "len={len}");
        }
    }

    #[test]
    fn test_extreme_value() {
        assert_eq!(extreme_value(&[], MinLoc), None);
        assert_eq!(extreme_value(&[4], MaxLoc), Some(4));
        let data = pattern(333);
        assert_eq!(extreme_value(&data, MinLoc), data.iter().copied().min());
        assert_eq!(extreme_value(&data, MaxLoc), data.iter().copied().max());
    }
}
