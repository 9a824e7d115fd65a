//! Flat 3D integer grids and the seeded generator that fills them.
//!
//! Element `(i, j, k)` lives at flat index `i * (N * P) + j * P + k`.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ReduceError, Result};

pub type Value = i32;

/// Value planted at the last coordinate; below every generated value.
pub const PLANTED_MIN: Value = -1;
/// Value planted at the center coordinate; above every generated value.
pub const PLANTED_MAX: Value = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

/// Grid extents `M x N x P`. Always non-empty once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims {
    m: usize,
    n: usize,
    p: usize,
    len: usize,
}

impl Dims {
    pub fn new(m: usize, n: usize, p: usize) -> Result<Self> {
        let len = m
            .checked_mul(n)
            .and_then(|mn| mn.checked_mul(p))
            .filter(|&len| len > 0)
            .ok_or(ReduceError::InvalidDimensions { m, n, p })?;
        Ok(Self { m, n, p, len })
    }

    /// A `1 x 1 x len` grid, handy for plain sequences.
    pub fn linear(len: usize) -> Result<Self> {
        Self::new(1, 1, len)
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn flat(&self, c: Coord) -> usize {
        c.i * (self.n * self.p) + c.j * self.p + c.k
    }

    #[inline]
    pub fn coord(&self, flat: usize) -> Coord {
        let plane = self.n * self.p;
        Coord {
            i: flat / plane,
            j: (flat % plane) / self.p,
            k: flat % self.p,
        }
    }

    /// Where the generator plants the unique minimum.
    pub fn last(&self) -> Coord {
        Coord {
            i: self.m - 1,
            j: self.n - 1,
            k: self.p - 1,
        }
    }

    /// Where the generator plants the unique maximum.
    pub fn center(&self) -> Coord {
        Coord {
            i: self.m / 2,
            j: self.n / 2,
            k: self.p / 2,
        }
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.m, self.n, self.p)
    }
}

/// Immutable grid shared read-only by every strategy.
#[derive(Debug, Clone)]
pub struct Dataset {
    dims: Dims,
    values: Vec<Value>,
}

impl Dataset {
    pub fn from_vec(dims: Dims, values: Vec<Value>) -> Result<Self> {
        if values.len() != dims.len() {
            return Err(ReduceError::LengthMismatch {
                expected: dims.len(),
                actual: values.len(),
            });
        }
        Ok(Self { dims, values })
    }

    /// Treats `values` as a `1 x 1 x len` grid.
    pub fn from_slice(values: &[Value]) -> Result<Self> {
        let dims = Dims::linear(values.len())?;
        Self::from_vec(dims, values.to_vec())
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, c: Coord) -> Option<Value> {
        if c.i >= self.dims.m || c.j >= self.dims.n || c.k >= self.dims.p {
            return None;
        }
        self.values.get(self.dims.flat(c)).copied()
    }
}

/// Deterministic generator for benchmark grids.
///
/// Owns its RNG state so two generators with the same seed produce
/// identical grids without any shared global state.
#[derive(Debug, Clone)]
pub struct DataGen {
    rng: StdRng,
}

impl DataGen {
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fills `dims` with values in `[0, 99_999]`, then plants
    /// [`PLANTED_MIN`] at [`Dims::last`] and [`PLANTED_MAX`] at
    /// [`Dims::center`]. On a 1x1x1 grid both land on the same cell and the
    /// maximum is written last.
    pub fn generate(&mut self, dims: Dims) -> Result<Dataset> {
        let len = dims.len();
        let mut values: Vec<Value> = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|source| ReduceError::Allocation {
                elements: len,
                source,
            })?;
        values.extend((0..len).map(|_| self.rng.gen_range(0..PLANTED_MAX)));

        values[dims.flat(dims.last())] = PLANTED_MIN;
        values[dims.flat(dims.center())] = PLANTED_MAX;

        tracing::debug!(%dims, elements = len, "generated dataset");
        Dataset::from_vec(dims, values)
    }
}

impl Default for DataGen {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reports_allocation_failure() {
        // 2^62 elements: reserving fails instead of aborting
        let dims = Dims::new(1 << 31, 1 << 31, 1).unwrap();
        let err = DataGen::new(1).generate(dims).unwrap_err();
        assert!(
            matches!(err, ReduceError::Allocation { elements, .. } if elements == 1 << 62),
            "{err:?}"
        );
    }

    #[test]
    fn test_flat_coord_bijection() {
        let dims = Dims::new(3, 4, 5).unwrap();
        for flat in 0..dims.len() {
            assert_eq!(dims.flat(dims.coord(flat)), flat);
        }
        assert_eq!(dims.flat(Coord { i: 1, j: 2, k: 3 }), 20 + 10 + 3);
    }

    #[test]
    fn test_rejects_empty_and_overflowing_dims() {
        assert!(matches!(
            Dims::new(0, 5, 5),
            Err(ReduceError::InvalidDimensions { m: 0, .. })
        ));
        assert!(Dims::new(5, 5, 0).is_err());
        assert!(Dims::new(usize::MAX, 2, 1).is_err());
        assert!(Dataset::from_slice(&[]).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let dims = Dims::new(2, 2, 2).unwrap();
        let err = Dataset::from_vec(dims, vec![0; 7]).unwrap_err();
        assert!(matches!(
            err,
            ReduceError::LengthMismatch {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_generator_is_reproducible_and_planted() {
        let dims = Dims::new(6, 7, 9).unwrap();
        let a = DataGen::new(7).generate(dims).unwrap();
        let b = DataGen::new(7).generate(dims).unwrap();
        assert_eq!(a.values(), b.values());

        assert_eq!(a.get(dims.last()), Some(PLANTED_MIN));
        assert_eq!(a.get(dims.center()), Some(PLANTED_MAX));
        let others = a
            .values()
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != dims.flat(dims.last()) && idx != dims.flat(dims.center()));
        for (_, &v) in others {
            assert!((0..PLANTED_MAX).contains(&v));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let dims = Dims::new(4, 4, 4).unwrap();
        let a = DataGen::new(1).generate(dims).unwrap();
        let b = DataGen::new(2).generate(dims).unwrap();
        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let ds = Dataset::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(ds.get(Coord { i: 0, j: 0, k: 2 }), Some(3));
        assert_eq!(ds.get(Coord { i: 0, j: 1, k: 0 }), None);
    }
}
