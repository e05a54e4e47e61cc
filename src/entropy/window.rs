//! Sliding-Window Byte Histogram
//!
//! Maintains the frequency of each of the 256 byte values within the
//! trailing `window_size` positions of a single sequence, updated
//! incrementally: the entering byte's count goes up, and once the window is
//! full the byte falling out of the window goes down. The full distribution
//! is never rebuilt.
//!
//! # Invariant
//!
//! `sum(counts) == min(positions_pushed, window_size)` after every push.
//!
//! # Performance
//!
//! - Push: O(1) amortized (two counter updates plus a ring-buffer write)
//! - Memory: O(window_size + 256), bounded and predictable

use std::collections::VecDeque;

/// Sliding-window histogram over the 256 possible byte values.
///
/// One instance per batch row. The window may be larger than the sequence it
/// observes; it then simply never evicts.
#[derive(Debug, Clone)]
pub struct ByteFrequencyWindow {
    /// Maximum number of trailing bytes contributing to the histogram
    window_size: usize,

    /// Ring buffer of the bytes currently inside the window (FIFO)
    history: VecDeque<u8>,

    /// Occurrence count per byte value
    counts: [u32; 256],

    /// Running sum of all counts, kept so normalization never rescans the
    /// 256 bins
    total: u32,
}

impl ByteFrequencyWindow {
    /// Create an empty window.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0 (config validation rejects this before
    /// any window is built).
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "window_size must be > 0");

        Self {
            window_size,
            history: VecDeque::with_capacity(window_size),
            counts: [0; 256],
            total: 0,
        }
    }

    /// Push the next byte of the sequence into the window.
    ///
    /// Returns the byte evicted from the far end, if the window was full.
    ///
    /// # Example
    ///
    /// ```
    /// use patch_segmenter::entropy::ByteFrequencyWindow;
    ///
    /// let mut window = ByteFrequencyWindow::new(2);
    /// assert_eq!(window.push(b'a'), None);
    /// assert_eq!(window.push(b'b'), None);
    /// assert_eq!(window.push(b'c'), Some(b'a')); // 'a' fell out
    /// assert_eq!(window.count(b'a'), 0);
    /// assert_eq!(window.total(), 2);
    /// ```
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        let evicted = if self.history.len() >= self.window_size {
            let old = self.history.pop_front().expect("window is non-empty");
            self.counts[old as usize] -= 1;
            self.total -= 1;
            Some(old)
        } else {
            None
        };

        self.history.push_back(byte);
        self.counts[byte as usize] += 1;
        self.total += 1;

        evicted
    }

    /// Occurrence count of `byte` within the current window.
    #[inline]
    pub fn count(&self, byte: u8) -> u32 {
        self.counts[byte as usize]
    }

    /// Sum of all counts: `min(positions_pushed, window_size)`.
    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of bytes currently inside the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True before the first push.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// True once the window holds `window_size` bytes.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.history.len() >= self.window_size
    }

    /// Configured lookback.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Raw histogram, indexed by byte value.
    #[inline]
    pub fn counts(&self) -> &[u32; 256] {
        &self.counts
    }

    /// Clear all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.history.clear();
        self.counts = [0; 256];
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let window = ByteFrequencyWindow::new(8);
        assert_eq!(window.window_size(), 8);
        assert_eq!(window.total(), 0);
        assert!(window.is_empty());
        assert!(!window.is_full());
    }

    #[test]
    #[should_panic(expected = "window_size must be > 0")]
    fn test_new_zero_window() {
        ByteFrequencyWindow::new(0);
    }

    #[test]
    fn test_push_before_full_never_evicts() {
        let mut window = ByteFrequencyWindow::new(4);
        for b in 0..4u8 {
            assert_eq!(window.push(b), None);
        }
        assert!(window.is_full());
        assert_eq!(window.total(), 4);
    }

    #[test]
    fn test_eviction_order_is_fifo() {
        let mut window = ByteFrequencyWindow::new(3);
        window.push(10);
        window.push(20);
        window.push(30);

        assert_eq!(window.push(40), Some(10));
        assert_eq!(window.push(50), Some(20));
        assert_eq!(window.count(10), 0);
        assert_eq!(window.count(20), 0);
        assert_eq!(window.count(30), 1);
    }

    #[test]
    fn test_count_sum_invariant() {
        let mut window = ByteFrequencyWindow::new(5);
        let bytes = [7u8, 7, 7, 1, 2, 7, 9, 9, 1, 7];

        for (i, &b) in bytes.iter().enumerate() {
            window.push(b);

            let expected_total = (i + 1).min(5) as u32;
            assert_eq!(window.total(), expected_total);
            assert_eq!(window.counts().iter().sum::<u32>(), expected_total);
        }
    }

    #[test]
    fn test_repeated_byte_counts() {
        let mut window = ByteFrequencyWindow::new(4);
        for _ in 0..6 {
            window.push(42);
        }
        assert_eq!(window.count(42), 4);
        assert_eq!(window.total(), 4);
    }

    #[test]
    fn test_window_larger_than_sequence_never_evicts() {
        let mut window = ByteFrequencyWindow::new(100);
        for b in 0..10u8 {
            assert_eq!(window.push(b), None);
        }
        assert_eq!(window.total(), 10);
        assert!(!window.is_full());
    }

    #[test]
    fn test_reset() {
        let mut window = ByteFrequencyWindow::new(3);
        window.push(1);
        window.push(2);

        window.reset();

        assert!(window.is_empty());
        assert_eq!(window.total(), 0);
        assert_eq!(window.count(1), 0);
        assert_eq!(window.count(2), 0);
    }
}
