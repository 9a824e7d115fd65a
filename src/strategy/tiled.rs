//! Cache tiles over the (i, j) plane, full depth P per tile, min and max in
//! the same pass so each element is read once.

use std::ops::Range;

use rayon::prelude::*;

use crate::combine::MinMax;
use crate::dataset::{Coord, Dims, Value};
use crate::kernel::scan_minmax;
use crate::lanes::scan_minmax_lanes;
use crate::pool::ExecPool;
use crate::prefetch::prefetch_read;

/// Fused min+max kernel applied to each `(i, j)` row of length P.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKernel {
    Scalar,
    Lanes,
}

impl RowKernel {
    fn scan(self, row: &[Value], base: usize) -> MinMax {
        match self {
            RowKernel::Scalar => scan_minmax(row, base),
            RowKernel::Lanes => scan_minmax_lanes(row, base),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TileGrid {
    dims: Dims,
    tile_i: usize,
    tile_j: usize,
    tiles_j: usize,
    count: usize,
}

impl TileGrid {
    pub fn new(dims: Dims, tile_i: usize, tile_j: usize) -> Self {
        let tiles_i = dims.m().div_ceil(tile_i);
        let tiles_j = dims.n().div_ceil(tile_j);
        Self {
            dims,
            tile_i,
            tile_j,
            tiles_j,
            count: tiles_i * tiles_j,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Row and column ranges of tile `t`, clipped at the grid edge.
    pub fn bounds(&self, t: usize) -> (Range<usize>, Range<usize>) {
        let i0 = (t / self.tiles_j) * self.tile_i;
        let j0 = (t % self.tiles_j) * self.tile_j;
        (
            i0..(i0 + self.tile_i).min(self.dims.m()),
            j0..(j0 + self.tile_j).min(self.dims.n()),
        )
    }

    fn row_start(&self, i: usize, j: usize) -> usize {
        self.dims.flat(Coord { i, j, k: 0 })
    }

    /// First element of the row scanned after `(i, j)`: the next row in the
    /// same tile, else the first row of tile `t + 1`.
    fn next_row(&self, t: usize, i: usize, j: usize) -> Option<usize> {
        let (rows, cols) = self.bounds(t);
        if j + 1 < cols.end {
            Some(self.row_start(i, j + 1))
        } else if i + 1 < rows.end {
            Some(self.row_start(i + 1, cols.start))
        } else if t + 1 < self.count {
            let (rows, cols) = self.bounds(t + 1);
            Some(self.row_start(rows.start, cols.start))
        } else {
            None
        }
    }

    fn scan_tile(&self, data: &[Value], t: usize, kernel: RowKernel) -> MinMax {
        let p = self.dims.p();
        let (rows, cols) = self.bounds(t);
        let mut acc = MinMax::none();
        for i in rows {
            for j in cols.clone() {
                if let Some(next) = self.next_row(t, i, j) {
                    prefetch_read(data, next);
                }
                let base = self.row_start(i, j);
                acc = acc.combine(kernel.scan(&data[base..base + p], base));
            }
        }
        acc
    }
}

pub fn reduce_tiled(
    pool: &ExecPool,
    data: &[Value],
    dims: Dims,
    tile: (usize, usize),
    kernel: RowKernel,
) -> MinMax {
    let grid = TileGrid::new(dims, tile.0, tile.1);
    tracing::debug!(
        tiles = grid.count(),
        tile_i = tile.0,
        tile_j = tile.1,
        ?kernel,
        "tile grid"
    );
    pool.install(|| {
        (0..grid.count())
            .into_par_iter()
            .map(|t| grid.scan_tile(data, t, kernel))
            .reduce(MinMax::none, MinMax::combine)
    })
}
