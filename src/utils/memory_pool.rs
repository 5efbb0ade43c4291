//! Reusable luma buffer for per-frame decoding
//!
//! A live scan converts a new frame on every tick; the pool keeps one
//! allocation alive across ticks and grows it only when the camera
//! resolution goes up.

/// Pre-allocated luma buffer shared across decode calls
#[derive(Debug, Default)]
pub struct BufferPool {
    luma: Vec<u8>,
    stats: AllocationStats,
}

impl BufferPool {
    /// Create an empty pool; the first frame sizes it
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a luma buffer of exactly `size` bytes (reuses capacity when possible)
    pub fn luma_buffer(&mut self, size: usize) -> &mut [u8] {
        if size > self.luma.capacity() {
            self.stats.record_allocation();
        } else {
            self.stats.record_reuse(size);
        }
        self.luma.resize(size, 0);
        &mut self.luma[..size]
    }

    /// Current luma capacity in bytes
    pub fn capacity(&self) -> usize {
        self.luma.capacity()
    }

    /// Reuse/allocation counters
    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }
}

/// Statistics for monitoring allocation patterns
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
    /// Requests served from existing capacity
    pub reuses: usize,
    /// Requests that had to grow the buffer
    pub allocations: usize,
    /// Bytes served without allocating
    pub total_bytes_reused: usize,
}

impl AllocationStats {
    fn record_reuse(&mut self, bytes: usize) {
        self.reuses += 1;
        self.total_bytes_reused += bytes;
    }

    fn record_allocation(&mut self) {
        self.allocations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_pool_basic() {
        let mut pool = BufferPool::new();

        let buf1 = pool.luma_buffer(100);
        assert_eq!(buf1.len(), 100);

        // Smaller request reuses the allocation
        let buf2 = pool.luma_buffer(50);
        assert_eq!(buf2.len(), 50);

        assert_eq!(pool.stats().allocations, 1);
        assert_eq!(pool.stats().reuses, 1);
        assert_eq!(pool.stats().total_bytes_reused, 50);
    }

    #[test]
    fn test_buffer_pool_growth() {
        let mut pool = BufferPool::new();
        pool.luma_buffer(100);

        let buf = pool.luma_buffer(500);
        assert_eq!(buf.len(), 500);
        assert!(pool.capacity() >= 500);
        assert_eq!(pool.stats().allocations, 2);
    }
}
