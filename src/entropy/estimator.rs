//! Windowed Shannon Entropy Estimation
//!
//! Turns the sliding byte histogram into a per-position entropy scalar that
//! the segmenter compares against the adaptive threshold.
//!
//! # Mathematical Foundation
//!
//! ```text
//! p_i  = count_i / max(total, ε)          (ε = 1e-8 guards position 0)
//! H    = −Σ p_i · log2(p_i + ε)           (sum over occupied bins only)
//! ```
//!
//! Bins with zero count contribute exactly 0 and are skipped. The ε inside
//! the log makes a single-symbol window come out at −log2(1 + ε), a hair
//! below zero; the result is clamped to ≥ 0 so the estimate always sits in
//! [0, 8] bits.
//!
//! This is a biased online count, not a calibrated probability model — it
//! only has to rank "surprising" positions above "predictable" ones.

use super::window::ByteFrequencyWindow;

/// Upper bound of the estimate: log2(256) bits.
pub const MAX_ENTROPY_BITS: f64 = 8.0;

/// Floor applied to the count total and inside the log, to keep the very
/// first position and empty bins well-defined.
const EPS: f64 = 1e-8;

/// Online entropy estimator over a sliding byte window.
///
/// One instance per batch row; `update` is called once per position, in
/// order. Estimation never fails mid-sequence: degenerate inputs fall back
/// to defined values instead of errors.
#[derive(Debug, Clone)]
pub struct EntropyEstimator {
    window: ByteFrequencyWindow,
}

impl EntropyEstimator {
    /// Create an estimator with the given lookback.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0 (rejected earlier by config validation).
    pub fn new(window_size: usize) -> Self {
        Self {
            window: ByteFrequencyWindow::new(window_size),
        }
    }

    /// Consume the next byte and return the entropy (bits) of the windowed
    /// distribution at this position.
    ///
    /// # Example
    ///
    /// ```
    /// use patch_segmenter::entropy::EntropyEstimator;
    ///
    /// let mut est = EntropyEstimator::new(8);
    /// // A constant run carries no information
    /// for _ in 0..8 {
    ///     assert_eq!(est.update(b'x'), 0.0);
    /// }
    /// // A fresh symbol raises the entropy
    /// assert!(est.update(b'y') > 0.0);
    /// ```
    pub fn update(&mut self, byte: u8) -> f64 {
        self.window.push(byte);
        self.entropy()
    }

    /// Entropy (bits) of the current window contents.
    pub fn entropy(&self) -> f64 {
        let total = (self.window.total() as f64).max(EPS);

        let mut entropy = 0.0;
        for &count in self.window.counts() {
            if count == 0 {
                continue;
            }
            let p = count as f64 / total;
            entropy -= p * (p + EPS).log2();
        }

        // ε pushes a single-symbol window fractionally negative
        entropy.max(0.0)
    }

    /// Number of bytes observed by the window so far (capped at its size).
    #[inline]
    pub fn observed(&self) -> usize {
        self.window.len()
    }

    /// True once the lookback is fully populated.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.window.is_full()
    }

    /// Configured lookback.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window.window_size()
    }

    /// Clear all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.window.reset();
    }
}
