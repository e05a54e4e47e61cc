//! High-level segmentation + pooling façade.
//!
//! [`BytePatcher`] owns a validated [`PatcherConfig`] and wires the two
//! passes together: segment a [`ByteBatch`] into patch ids and entropies,
//! then scatter-reduce per-byte features into per-patch features under the
//! configured reduction. Both passes are also usable on their own through
//! [`segment`](BytePatcher::segment) and [`pool`](BytePatcher::pool).
//!
//! # Example
//!
//! ```
//! use patch_segmenter::prelude::*;
//! use ndarray::Array3;
//!
//! let patcher = BytePatcher::new(PatcherConfig::default()).unwrap();
//! let batch = ByteBatch::single(b"the quick brown fox jumps over the lazy dog");
//!
//! let seg = patcher.segment(&batch);
//! let features = Array3::<f64>::ones((1, batch.seq_len(), 4));
//! let pooled = patcher.pool(features.view(), &seg).unwrap();
//!
//! assert_eq!(pooled.dim(), (1, seg.num_patches(), 4));
//! ```

use crate::batch::ByteBatch;
use crate::config::PatcherConfig;
use crate::error::Result;
use crate::pooling::pool_patches;
use crate::segmenter::{PatchSegmenter, Segmentation};
use ndarray::{Array3, ArrayView3};

/// Entropy-guided byte patcher: segmentation plus feature pooling under one
/// validated configuration.
///
/// Cheap to clone and stateless between calls; two patchers built from equal
/// configs produce identical output for identical input.
#[derive(Debug, Clone)]
pub struct BytePatcher {
    segmenter: PatchSegmenter,
}

impl BytePatcher {
    /// Build a patcher, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// [`PatchError::InvalidConfig`](crate::error::PatchError::InvalidConfig)
    /// describing the first rejected field.
    pub fn new(config: PatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            segmenter: PatchSegmenter::new(config),
        })
    }

    /// Build a patcher with the reference default tuning.
    pub fn with_defaults() -> Self {
        Self {
            segmenter: PatchSegmenter::new(PatcherConfig::default()),
        }
    }

    /// Borrow the active configuration.
    #[inline]
    pub fn config(&self) -> &PatcherConfig {
        self.segmenter.config()
    }

    /// Run the segmentation pass: patch ids, per-position entropies, and the
    /// final adapted threshold.
    pub fn segment(&self, batch: &ByteBatch) -> Segmentation {
        self.segmenter.segment(batch)
    }

    /// Pool `[batch, seq, dim]` features into `[batch, patches, dim]` under
    /// the configured reduction, using a previously computed segmentation.
    ///
    /// # Errors
    ///
    /// [`PatchError::FeatureShapeMismatch`](crate::error::PatchError::FeatureShapeMismatch)
    /// when the feature array's leading dimensions disagree with the
    /// segmentation's.
    pub fn pool(
        &self,
        features: ArrayView3<'_, f64>,
        segmentation: &Segmentation,
    ) -> Result<Array3<f64>> {
        pool_patches(features, segmentation.patch_ids(), self.config().reduce_op)
    }

    /// Segment and pool in one call.
    pub fn segment_and_pool(
        &self,
        batch: &ByteBatch,
        features: ArrayView3<'_, f64>,
    ) -> Result<(Segmentation, Array3<f64>)> {
        let segmentation = self.segment(batch);
        let pooled = self.pool(features, &segmentation)?;
        log::debug!(
            "pooled features to {:?} ({})",
            pooled.dim(),
            self.config().reduce_op.as_str()
        );
        Ok((segmentation, pooled))
    }
}
