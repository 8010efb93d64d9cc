//! Allocator setup and native heap accounting
//!
//! With `memory_tracking`, every allocation goes through a counting wrapper
//! around mimalloc (or the system allocator). Without it the stats read 0.

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

    #[cfg(feature = "mimalloc")]
    static INNER: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static INNER: std::alloc::System = std::alloc::System;

    pub struct CountingAllocator;

    fn raise_peak(live: usize) {
        PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
    }

    unsafe impl GlobalAlloc for CountingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = INNER.alloc(layout);
            if !ptr.is_null() {
                let live = LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                raise_peak(live);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            LIVE_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
            INNER.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::CountingAllocator = tracking::CountingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated by the native side
#[cfg(feature = "memory_tracking")]
pub fn current() -> usize {
    tracking::LIVE_BYTES.load(std::sync::atomic::Ordering::SeqCst)
}

/// Highest value [`current`] has reached since the last reset
#[cfg(feature = "memory_tracking")]
pub fn peak() -> usize {
    tracking::PEAK_BYTES.load(std::sync::atomic::Ordering::SeqCst)
}

/// Reset the peak to the live size; returns `(current, previous_peak)`
#[cfg(feature = "memory_tracking")]
pub fn reset() -> (usize, usize) {
    use std::sync::atomic::Ordering;
    let live = tracking::LIVE_BYTES.load(Ordering::SeqCst);
    let previous = tracking::PEAK_BYTES.swap(live, Ordering::SeqCst);
    (live, previous)
}

#[cfg(not(feature = "memory_tracking"))]
pub fn current() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
pub fn reset() -> (usize, usize) {
    (0, 0)
}
