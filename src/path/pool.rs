//! String Buffer Pool
//!
//! Reusable scratch buffers for path assembly. Buffers are cleared on
//! return, so nothing written during one call is visible to the next.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Buffers above this capacity are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 4096;
/// Default number of idle buffers kept
const DEFAULT_MAX_IDLE: usize = 32;

/// Thread-safe pool of `String` buffers
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<String>>,
    max_idle: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(max_idle: usize) -> Self {
        BufferPool {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Borrow an empty buffer; it goes back to the pool when the guard drops
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .idle
            .lock()
            .ok()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_else(|| String::with_capacity(128));
        PooledBuffer { buf, pool: self }
    }

    /// Number of idle buffers currently held
    #[cfg(test)]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn release(&self, mut buf: String) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // A poisoned pool just stops recycling
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(buf);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped borrow of a pooled buffer
pub struct PooledBuffer<'p> {
    buf: String,
    pool: &'p BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
