//! Software prefetch hint. Never affects results.

use crate::dataset::Value;

/// Hints the cache hierarchy that `data[index..]` will be read soon.
/// Out-of-range indices are ignored.
#[inline(always)]
pub fn prefetch_read(data: &[Value], index: usize) {
    if index >= data.len() {
        return;
    }
    #[cfg(target_arch = "x86_64")]
    unsafe {
        // SAFETY: `index` is in bounds.
        let ptr = data.as_ptr().add(index);
        std::arch::x86_64::_mm_prefetch(ptr as *const i8, std::arch::x86_64::_MM_HINT_T2);
    }
}
