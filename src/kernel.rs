//! Sequential scan kernels.
//!
//! Every kernel folds one contiguous slice left to right and reports flat
//! indices as `base + offset`, where `base` is the slice's position in the
//! dataset. They differ only in speed: on the same input each returns the
//! extremal value at its first (lowest) index. An empty slice yields the
//! combinator identity.

use std::ops::Range;

use crate::combine::{Combinator, Direction, Located, MaxLoc, MinLoc, MinMax};
use crate::dataset::Value;
use crate::lanes;

/// Inner-loop flavour used by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    Scalar,
    Branchless,
    Lanes,
    TwoPass,
}

impl Kernel {
    pub const ALL: [Kernel; 4] = [
        Kernel::Scalar,
        Kernel::Branchless,
        Kernel::Lanes,
        Kernel::TwoPass,
    ];
}

/// Scans `data[range]` for the extremum in `direction`.
///
/// # Panics
///
/// Panics if `range` is out of bounds for `data`.
pub fn scan(data: &[Value], range: Range<usize>, direction: Direction, kernel: Kernel) -> Located {
    let base = range.start;
    let slice = &data[range];
    match direction {
        Direction::Min => scan_with(slice, base, MinLoc, kernel),
        Direction::Max => scan_with(slice, base, MaxLoc, kernel),
    }
}

#[inline]
pub fn scan_with<C: Combinator>(slice: &[Value], base: usize, c: C, kernel: Kernel) -> Located {
    match kernel {
        Kernel::Scalar => scan_scalar(slice, base, c),
        Kernel::Branchless => scan_branchless(slice, base, c),
        Kernel::Lanes => lanes::scan_lanes(slice, base, c),
        Kernel::TwoPass => scan_two_pass(slice, base, c),
    }
}

pub fn scan_scalar<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
    let Some((&first, rest)) = slice.split_first() else {
        return c.identity();
    };
    let mut best = Located::new(first, base);
    for (offset, &v) in rest.iter().enumerate() {
        if c.beats(v, best.value) {
            best = Located::new(v, base + 1 + offset);
        }
    }
    best
}

/// All-ones when `take`, zero otherwise; then `a` or `b` through the mask.
#[inline(always)]
fn select_value(take: bool, a: Value, b: Value) -> Value {
    let mask = -(take as Value);
    (a & mask) | (b & !mask)
}

#[inline(always)]
fn select_index(take: bool, a: usize, b: usize) -> usize {
    let mask = (take as usize).wrapping_neg();
    (a & mask) | (b & !mask)
}

/// Same result as [`scan_scalar`] with the update done through masks, so a
/// descending input costs no mispredicted branches.
pub fn scan_branchless<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
    let Some((&first, rest)) = slice.split_first() else {
        return c.identity();
    };
    let mut value = first;
    let mut index = base;
    for (offset, &v) in rest.iter().enumerate() {
        let take = c.beats(v, value);
        value = select_value(take, v, value);
        index = select_index(take, base + 1 + offset, index);
    }
    Located::new(value, index)
}

/// Finds the first index holding `value`.
pub fn locate(slice: &[Value], base: usize, value: Value) -> Option<usize> {
    slice.iter().position(|&v| v == value).map(|offset| base + offset)
}

/// Pass 1 reduces values only, pass 2 looks up the first index of the winner.
pub fn scan_two_pass<C: Combinator>(slice: &[Value], base: usize, c: C) -> Located {
    let Some(value) = lanes::extreme_value(slice, c) else {
        return c.identity();
    };
    match locate(slice, base, value) {
        Some(index) => Located::new(value, index),
        None => c.identity(),
    }
}

/// Both extrema in a single pass over `slice`.
pub fn scan_minmax(slice: &[Value], base: usize) -> MinMax {
    let Some((&first, rest)) = slice.split_first() else {
        return MinMax::none();
    };
    let mut min = Located::new(first, base);
    let mut max = min;
    for (offset, &v) in rest.iter().enumerate() {
        if v < min.value {
            min = Located::new(v, base + 1 + offset);
        }
        if v > max.value {
            max = Located::new(v, base + 1 + offset);
        }
    }
    MinMax { min, max }
}
