//! Entropy-Guided Patch Segmentation
//!
//! Drives the per-row entropy estimators and the shared threshold controller
//! across the sequence, assigning every byte a patch id. A boundary opens a
//! new patch when either trigger fires:
//!
//! - **entropy trigger**: local entropy strictly exceeds the adaptive
//!   threshold
//! - **length trigger**: the current patch has reached `patch_size` bytes
//!
//! The byte that causes a split is the first byte of the new patch. Patch
//! ids start at 0, never decrease, and never skip an integer; a run between
//! boundaries is never longer than `patch_size`.
//!
//! # Scheduling
//!
//! The position loop is strictly sequential (the threshold at position
//! `pos` depends on the triggers observed at `pos − 1`). Rows within a
//! position are independent and are stepped in parallel for large batches;
//! the single threshold update is the per-position barrier.

use crate::batch::ByteBatch;
use crate::config::PatcherConfig;
use crate::entropy::EntropyEstimator;
use crate::threshold::ThresholdController;
use ndarray::Array2;
use rayon::prelude::*;

/// Row counts below this are stepped serially; forking the pool costs more
/// than 16 histogram updates.
const PAR_ROWS_MIN: usize = 16;

/// Per-row segmentation state: the entropy estimator plus the patch-id
/// counter and the length of the still-open patch.
#[derive(Debug, Clone)]
struct RowState {
    estimator: EntropyEstimator,
    patch_id: u32,
    run_length: usize,
}

impl RowState {
    fn new(window_size: usize) -> Self {
        Self {
            estimator: EntropyEstimator::new(window_size),
            patch_id: 0,
            run_length: 0,
        }
    }

    /// Advance one position. Returns the entropy, the id assigned to this
    /// position, and the raw trigger signal (fed to the controller even when
    /// the id increment is suppressed at position 0, where patch 0 is still
    /// empty).
    fn step(&mut self, byte: u8, threshold: f64, pos: usize, patch_size: usize) -> (f64, u32, bool) {
        let entropy = self.estimator.update(byte);
        self.run_length += 1;

        let trigger = entropy > threshold || self.run_length >= patch_size;
        if trigger {
            if pos > 0 {
                self.patch_id += 1;
            }
            self.run_length = 0;
        }

        (entropy, self.patch_id, trigger)
    }
}

/// Result of one segmentation pass.
///
/// Holds the `[batch, seq]` patch-id and entropy arrays plus inspection
/// helpers. Purely derived data: re-running the pass on the same input and
/// config reproduces it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    patch_ids: Array2<u32>,
    entropy: Array2<f64>,
    final_threshold: f64,
}

/// Aggregate statistics over every patch in a segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationStats {
    /// Total positions across the batch (B × S)
    pub total_positions: usize,
    /// Patch count shared by the batch: global max id + 1
    pub num_patches: usize,
    /// Mean patch length in bytes, over all (row, patch) buckets
    pub mean_patch_len: f64,
    /// Shortest patch observed
    pub min_patch_len: usize,
    /// Longest patch observed
    pub max_patch_len: usize,
}

impl Segmentation {
    /// Number of rows (B).
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.patch_ids.nrows()
    }

    /// Sequence length (S).
    #[inline]
    pub fn seq_len(&self) -> usize {
        self.patch_ids.ncols()
    }

    /// Patch-id array, `[batch, seq]`, non-decreasing along the position
    /// axis per row.
    #[inline]
    pub fn patch_ids(&self) -> &Array2<u32> {
        &self.patch_ids
    }

    /// Entropy array, `[batch, seq]`, bits.
    #[inline]
    pub fn entropy(&self) -> &Array2<f64> {
        &self.entropy
    }

    /// Threshold value after the final position's update.
    #[inline]
    pub fn final_threshold(&self) -> f64 {
        self.final_threshold
    }

    /// Patch count shared across the batch: global max id + 1 (the pooled
    /// feature dimension P). Zero for empty input.
    pub fn num_patches(&self) -> usize {
        self.patch_ids.iter().max().map_or(0, |&m| m as usize + 1)
    }

    /// Number of patches a single row actually produced (≤
    /// [`num_patches`](Self::num_patches)).
    pub fn row_patch_count(&self, row: usize) -> usize {
        self.patch_ids
            .row(row)
            .iter()
            .max()
            .map_or(0, |&m| m as usize + 1)
    }

    /// Byte length of every patch of one row, in patch-id order.
    pub fn patch_lengths(&self, row: usize) -> Vec<usize> {
        let mut lengths = vec![0usize; self.row_patch_count(row)];
        for &id in self.patch_ids.row(row) {
            lengths[id as usize] += 1;
        }
        lengths
    }

    /// Aggregate patch statistics across the whole batch.
    pub fn stats(&self) -> SegmentationStats {
        let mut bucket_count = 0usize;
        let mut min_len = usize::MAX;
        let mut max_len = 0usize;

        for row in 0..self.batch_size() {
            for len in self.patch_lengths(row) {
                bucket_count += 1;
                min_len = min_len.min(len);
                max_len = max_len.max(len);
            }
        }

        let total_positions = self.patch_ids.len();
        SegmentationStats {
            total_positions,
            num_patches: self.num_patches(),
            mean_patch_len: if bucket_count == 0 {
                0.0
            } else {
                total_positions as f64 / bucket_count as f64
            },
            min_patch_len: if bucket_count == 0 { 0 } else { min_len },
            max_patch_len: max_len,
        }
    }
}

/// The segmentation pass: byte batch in, patch ids and entropies out.
///
/// Stateless between calls; every pass builds fresh row states and a fresh
/// threshold controller, so segmentation is a pure function of
/// (input, config).
#[derive(Debug, Clone)]
pub struct PatchSegmenter {
    config: PatcherConfig,
}

impl PatchSegmenter {
    /// Create a segmenter. The config is assumed validated (the
    /// [`BytePatcher`](crate::patcher::BytePatcher) façade enforces this).
    pub fn new(config: PatcherConfig) -> Self {
        Self { config }
    }

    /// Borrow the configuration.
    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Segment a batch.
    ///
    /// `S = 0` (or `B = 0`) yields empty output arrays. Never fails: all
    /// input validation happened at [`ByteBatch`] construction and all
    /// numeric edge cases have defined fallbacks.
    pub fn segment(&self, batch: &ByteBatch) -> Segmentation {
        let (b, s) = (batch.batch_size(), batch.seq_len());

        let mut patch_ids = Array2::<u32>::zeros((b, s));
        let mut entropy = Array2::<f64>::zeros((b, s));

        let mut controller = ThresholdController::new(
            self.config.threshold,
            self.config.min_threshold,
            self.config.max_threshold,
            self.config.threshold_step_down,
            self.config.threshold_step_up,
        );

        let patch_size = self.config.patch_size;
        let mut rows: Vec<RowState> = (0..b)
            .map(|_| RowState::new(self.config.window_size))
            .collect();

        let bytes = batch.view();
        for pos in 0..s {
            let threshold = controller.current();

            let stepped: Vec<(f64, u32, bool)> = if b >= PAR_ROWS_MIN {
                rows.par_iter_mut()
                    .enumerate()
                    .map(|(r, state)| state.step(bytes[[r, pos]], threshold, pos, patch_size))
                    .collect()
            } else {
                rows.iter_mut()
                    .enumerate()
                    .map(|(r, state)| state.step(bytes[[r, pos]], threshold, pos, patch_size))
                    .collect()
            };

            let mut any_triggered = false;
            for (r, &(h, id, triggered)) in stepped.iter().enumerate() {
                entropy[[r, pos]] = h;
                patch_ids[[r, pos]] = id;
                any_triggered |= triggered;
            }

            controller.observe(any_triggered);
        }

        let segmentation = Segmentation {
            patch_ids,
            entropy,
            final_threshold: controller.current(),
        };

        if b > 0 && s > 0 {
            log::debug!(
                "segmented [{b}, {s}] into {} patches (final threshold {:.2} bits)",
                segmentation.num_patches(),
                segmentation.final_threshold
            );
            if controller.at_max() {
                log::warn!(
                    "threshold ended pinned at max_threshold ({:.2} bits); \
                     boundaries may still be firing on every position",
                    self.config.max_threshold
                );
            }
        }

        segmentation
    }
}
