//! Adaptive Entropy-Trigger Threshold
//!
//! The segmenter fires a boundary when local entropy exceeds a threshold.
//! A fixed threshold works poorly across inputs with different information
//! density: compressible text under-splits while binary noise splits on
//! every byte. The controller makes segmentation density self-regulating:
//! each position where *any* row of the batch triggered a boundary nudges
//! the threshold up (stricter), each quiet position nudges it down (more
//! permissive), always clamped to configured bounds.
//!
//! ```text
//! triggered:  threshold = min(threshold + step_up,   max_threshold)
//! quiet:      threshold = max(threshold − step_down, min_threshold)
//! ```
//!
//! The threshold is a single scalar shared by the whole batch, observed once
//! per position after all rows have been evaluated. This couples rows that
//! are otherwise independent: the same row segments differently depending on
//! what it is batched with. That coupling is part of the contract, carried
//! here as an explicit value owned by one segmentation pass rather than any
//! hidden global.

/// Bounded additive-step controller for the entropy trigger threshold.
///
/// Lifecycle: constructed at the start of a segmentation pass from the
/// configured initial value (clamped into bounds), mutated once per position
/// via [`observe`](Self::observe), discarded with the pass. Nothing persists
/// across calls.
#[derive(Debug, Clone)]
pub struct ThresholdController {
    /// Current trigger threshold (bits), always within [min, max]
    current: f64,

    /// Lower clamp (bits)
    min: f64,

    /// Upper clamp (bits)
    max: f64,

    /// Decrement applied on a quiet position
    step_down: f64,

    /// Increment applied on a triggered position
    step_up: f64,
}

impl ThresholdController {
    /// Create a controller.
    ///
    /// `initial` is clamped into `[min, max]`. Bound ordering is enforced by
    /// config validation before any controller exists.
    pub fn new(initial: f64, min: f64, max: f64, step_down: f64, step_up: f64) -> Self {
        Self {
            current: initial.clamp(min, max),
            min,
            max,
            step_down,
            step_up,
        }
    }

    /// Threshold to compare entropies against at the current position.
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Feed the position's aggregate trigger signal ("did any row fire?")
    /// and return the adapted threshold for the next position.
    pub fn observe(&mut self, any_triggered: bool) -> f64 {
        self.current = if any_triggered {
            (self.current + self.step_up).min(self.max)
        } else {
            (self.current - self.step_down).max(self.min)
        };
        self.current
    }

    /// True while the threshold sits at its upper bound.
    #[inline]
    pub fn at_max(&self) -> bool {
        self.current >= self.max
    }

    /// True while the threshold sits at its lower bound.
    #[inline]
    pub fn at_min(&self) -> bool {
        self.current <= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn default_controller() -> ThresholdController {
        ThresholdController::new(3.0, 2.0, 5.0, 0.1, 0.1)
    }

    #[test]
    fn test_initial_value() {
        let ctl = default_controller();
        assert!((ctl.current() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_initial_clamped_into_bounds() {
        let low = ThresholdController::new(0.5, 2.0, 5.0, 0.1, 0.1);
        assert_eq!(low.current(), 2.0);

        let high = ThresholdController::new(9.0, 2.0, 5.0, 0.1, 0.1);
        assert_eq!(high.current(), 5.0);
    }

    #[test]
    fn test_trigger_steps_up() {
        let mut ctl = default_controller();
        let next = ctl.observe(true);
        assert!((next - 3.1).abs() < EPSILON);
    }

    #[test]
    fn test_quiet_steps_down() {
        let mut ctl = default_controller();
        let next = ctl.observe(false);
        assert!((next - 2.9).abs() < EPSILON);
    }

    #[test]
    fn test_saturates_at_max() {
        let mut ctl = default_controller();
        for _ in 0..100 {
            ctl.observe(true);
        }
        assert_eq!(ctl.current(), 5.0);
        assert!(ctl.at_max());

        // Stays pinned under continued triggering
        ctl.observe(true);
        assert_eq!(ctl.current(), 5.0);
    }

    #[test]
    fn test_saturates_at_min() {
        let mut ctl = default_controller();
        for _ in 0..100 {
            ctl.observe(false);
        }
        assert_eq!(ctl.current(), 2.0);
        assert!(ctl.at_min());
    }

    #[test]
    fn test_stays_in_bounds_under_mixed_signals() {
        let mut ctl = default_controller();
        for i in 0..1000 {
            ctl.observe(i % 3 == 0);
            assert!(ctl.current() >= 2.0 - EPSILON);
            assert!(ctl.current() <= 5.0 + EPSILON);
        }
    }

    #[test]
    fn test_asymmetric_steps() {
        let mut ctl = ThresholdController::new(3.0, 0.0, 10.0, 0.5, 0.25);
        ctl.observe(true);
        assert!((ctl.current() - 3.25).abs() < EPSILON);
        ctl.observe(false);
        assert!((ctl.current() - 2.75).abs() < EPSILON);
    }

    #[test]
    fn test_zero_width_bounds_pin_threshold() {
        let mut ctl = ThresholdController::new(3.0, 4.0, 4.0, 0.1, 0.1);
        assert_eq!(ctl.current(), 4.0);
        ctl.observe(true);
        assert_eq!(ctl.current(), 4.0);
        ctl.observe(false);
        assert_eq!(ctl.current(), 4.0);
    }
}
