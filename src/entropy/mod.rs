//! Online byte-entropy estimation.
//!
//! - [`ByteFrequencyWindow`]: sliding histogram over the trailing
//!   `window_size` bytes of one sequence
//! - [`EntropyEstimator`]: per-position Shannon entropy (bits) of that
//!   windowed distribution
//!
//! Both are strictly per-row state: a batch of B sequences carries B
//! independent estimators.

mod estimator;
mod window;

pub use estimator::{EntropyEstimator, MAX_ENTROPY_BITS};
pub use window::ByteFrequencyWindow;
