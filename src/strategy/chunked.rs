//! Static partitioning: one contiguous chunk per unit, thread-private
//! partials, merge under a lock.

use parking_lot::Mutex;

use crate::combine::{Combinator, Located, MaxLoc, MinLoc, MinMax};
use crate::dataset::Value;
use crate::kernel::{scan_minmax, scan_with, Kernel};
use crate::pool::{static_partition, ExecPool};

fn scan_partition(slice: &[Value], base: usize, kernel: Kernel) -> MinMax {
    match kernel {
        Kernel::Scalar => scan_minmax(slice, base),
        _ => MinMax {
            min: scan_with(slice, base, MinLoc, kernel),
            max: scan_with(slice, base, MaxLoc, kernel),
        },
    }
}

/// Both extrema, one partial per unit.
///
/// The global pair sits behind one mutex and is replaced as a whole, so a
/// reader can never observe a value from one partial next to an index from
/// another.
pub fn reduce_static(pool: &ExecPool, data: &[Value], kernel: Kernel) -> MinMax {
    let parts = static_partition(data.len(), pool.units());
    tracing::debug!(
        units = parts.len(),
        chunk = data.len() / parts.len(),
        ?kernel,
        "static partition"
    );

    let global = Mutex::new(MinMax::none());
    pool.scope(|s| {
        for range in parts {
            let global = &global;
            s.spawn(move |_| {
                let partial = scan_partition(&data[range.clone()], range.start, kernel);
                let mut merged = global.lock();
                *merged = merged.combine(partial);
            });
        }
    });
    global.into_inner()
}

/// One direction only, scalar kernel. Used by the inner groups of the
/// nested strategy.
pub fn reduce_static_one<C: Combinator>(pool: &ExecPool, data: &[Value], c: C) -> Located {
    let parts = static_partition(data.len(), pool.units());
    let global = Mutex::new(c.identity());
    pool.scope(|s| {
        for range in parts {
            let global = &global;
            s.spawn(move |_| {
                let partial = scan_with(&data[range.clone()], range.start, c, Kernel::Scalar);
                let mut merged = global.lock();
                *merged = c.combine(*merged, partial);
            });
        }
    });
    global.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_units_than_elements() {
        let pool = ExecPool::new(4).unwrap();
        let data = [3, -2, 3];
        for kernel in Kernel::ALL {
            let mm = reduce_static(&pool, &data, kernel);
            assert_eq!(mm.min, Located::new(-2, 1), "{kernel:?}");
            assert_eq!(mm.max, Located::new(3, 0), "{kernel:?}");
        }
    }

    #[test]
    fn test_tie_spanning_chunks() {
        let pool = ExecPool::new(4).unwrap();
        // every chunk holds a 0 and a 9; lowest index must win
        let data: Vec<Value> = (0..64)
            .map(|i| match i % 16 {
                5 => 0,
                7 => 9,
                _ => 4,
            })
            .collect();
        for kernel in Kernel::ALL {
            let mm = reduce_static(&pool, &data, kernel);
            assert_eq!(mm.min, Located::new(0, 5), "{kernel:?}");
            assert_eq!(mm.max, Located::new(9, 7), "{kernel:?}");
        }
    }

    #[test]
    fn test_single_direction() {
        let pool = ExecPool::new(3).unwrap();
        let data = [8, 1, 8, 1, 8];
        assert_eq!(reduce_static_one(&pool, &data, MinLoc), Located::new(1, 1));
        assert_eq!(reduce_static_one(&pool, &data, MaxLoc), Located::new(8, 0));
    }
}
