//! (value, location) candidates and the associative merge over them.
//!
//! Candidates are ordered lexicographically by `(value, flat index)`, with
//! the value compared in the combinator's direction and the index always
//! ascending. That is a total order, so `combine` is associative and
//! commutative and every merge tree over the same partials produces the
//! same winner: the extremal value at its lowest flat index.

use std::fmt;

use crate::dataset::{Coord, Dims, Value};
use crate::error::{ReduceError, Result};

/// Index carried by a candidate that stands for "nothing scanned yet".
pub const NO_INDEX: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Min,
    Max,
}

/// A value together with its flat index in the dataset.
///
/// Always replaced as a whole, never field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Located {
    pub value: Value,
    pub index: usize,
}

impl Located {
    #[inline]
    pub const fn new(value: Value, index: usize) -> Self {
        Self { value, index }
    }

    /// The identity of `direction`'s combinator. Loses against every real
    /// element, including one holding the same sentinel value.
    pub const fn none(direction: Direction) -> Self {
        match direction {
            Direction::Min => Self::new(Value::MAX, NO_INDEX),
            Direction::Max => Self::new(Value::MIN, NO_INDEX),
        }
    }

    pub fn is_none(&self) -> bool {
        self.index == NO_INDEX
    }

    pub fn coord(&self, dims: Dims) -> Coord {
        dims.coord(self.index)
    }
}

/// Merge rule for one direction.
pub trait Combinator: Copy + Send + Sync + 'static {
    const DIRECTION: Direction;

    /// `true` when `candidate` is strictly more extreme than `incumbent`.
    fn beats(self, candidate: Value, incumbent: Value) -> bool;

    #[inline]
    fn identity(self) -> Located {
        Located::none(Self::DIRECTION)
    }

    /// Keeps the more extreme candidate; equal values go to the lower index.
    #[inline]
    fn combine(self, a: Located, b: Located) -> Located {
        if self.beats(b.value, a.value) || (b.value == a.value && b.index < a.index) {
            b
        } else {
            a
        }
    }

    /// Folds any number of partials. Order does not affect the result.
    fn reduce<I>(self, partials: I) -> Located
    where
        I: IntoIterator<Item = Located>,
    {
        partials
            .into_iter()
            .fold(self.identity(), |acc, p| self.combine(acc, p))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinLoc;

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLoc;

impl Combinator for MinLoc {
    const DIRECTION: Direction = Direction::Min;

    #[inline(always)]
    fn beats(self, candidate: Value, incumbent: Value) -> bool {
        candidate < incumbent
    }
}

impl Combinator for MaxLoc {
    const DIRECTION: Direction = Direction::Max;

    #[inline(always)]
    fn beats(self, candidate: Value, incumbent: Value) -> bool {
        candidate > incumbent
    }
}

pub fn combine_min(a: Located, b: Located) -> Located {
    MinLoc.combine(a, b)
}

pub fn combine_max(a: Located, b: Located) -> Located {
    MaxLoc.combine(a, b)
}

/// The pair every strategy produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinMax {
    pub min: Located,
    pub max: Located,
}

impl MinMax {
    pub const fn none() -> Self {
        Self {
            min: Located::none(Direction::Min),
            max: Located::none(Direction::Max),
        }
    }

    /// Merges both halves with their combinators.
    #[inline]
    pub fn combine(self, other: Self) -> Self {
        Self {
            min: MinLoc.combine(self.min, other.min),
            max: MaxLoc.combine(self.max, other.max),
        }
    }

    pub fn get(&self, direction: Direction) -> Located {
        match direction {
            Direction::Min => self.min,
            Direction::Max => self.max,
        }
    }

    /// Renders the two report lines `Min = v at (i, j, k)` / `Max = ...`.
    pub fn report(&self, dims: Dims) -> String {
        format!(
            "Min = {} at {}\nMax = {} at {}",
            self.min.value,
            self.min.coord(dims),
            self.max.value,
            self.max.coord(dims)
        )
    }

    /// Reads back the `Min =` / `Max =` lines written by [`MinMax::report`]
    /// (other lines are ignored).
    pub fn parse_report(text: &str, dims: Dims) -> Result<Self> {
        let mut min = None;
        let mut max = None;
        for line in text.lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix("Min = ") {
                min = Some(parse_extremum(rest, line, dims)?);
            } else if let Some(rest) = line.strip_prefix("Max = ") {
                max = Some(parse_extremum(rest, line, dims)?);
            }
        }
        match (min, max) {
            (Some(min), Some(max)) => Ok(Self { min, max }),
            _ => Err(ReduceError::MalformedReport(text.to_string())),
        }
    }
}

impl Default for MinMax {
    fn default() -> Self {
        Self::none()
    }
}

fn parse_extremum(rest: &str, line: &str, dims: Dims) -> Result<Located> {
    let malformed = || ReduceError::MalformedReport(line.to_string());
    let (value, coord) = rest.split_once(" at ").ok_or_else(malformed)?;
    let value: Value = value.trim().parse().map_err(|_| malformed())?;
    let inner = coord
        .trim()
        .strip_prefix('(')
        .and_then(|c| c.strip_suffix(')'))
        .ok_or_else(malformed)?;
    let parts: Vec<usize> = inner
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| malformed())?;
    let &[i, j, k] = parts.as_slice() else {
        return Err(malformed());
    };
    if i >= dims.m() || j >= dims.n() || k >= dims.p() {
        return Err(malformed());
    }
    Ok(Located::new(value, dims.flat(Coord { i, j, k })))
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "{} @ {}", self.value, self.index)
        }
    }
}
