//! Patch Feature Pooling
//!
//! Collapses per-byte feature vectors into per-patch feature vectors using
//! the patch ids produced by segmentation: a scatter-reduce from
//! `[batch, seq, dim]` onto `[batch, patches, dim]`, where `patches` is the
//! patch count shared across the batch (global max id + 1).
//!
//! Rows that produced fewer patches than the batch maximum leave their
//! trailing slots untouched; untouched slots are exactly 0.0 for every
//! reduction, including min and max, so pooled tensors are always finite and
//! shape-uniform.

use crate::error::{PatchError, Result};
use ndarray::{Array2, Array3, ArrayView3, Axis};

/// Reduction applied to the byte features of one patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    /// Arithmetic mean over the patch's positions (the default)
    #[default]
    Mean,
    /// Elementwise minimum
    Min,
    /// Elementwise maximum
    Max,
    /// Elementwise sum
    Sum,
}

impl ReduceOp {
    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
        }
    }
}

/// Scatter-reduce per-byte features into per-patch features.
///
/// `features` is `[batch, seq, dim]`, `patch_ids` is the `[batch, seq]`
/// assignment from segmentation. Returns `[batch, patches, dim]` with
/// `patches = global max id + 1` (0 for empty input, giving a
/// `[batch, 0, dim]` result).
///
/// # Errors
///
/// [`PatchError::FeatureShapeMismatch`] when the leading `[batch, seq]`
/// dimensions of the two arrays disagree.
pub fn pool_patches(
    features: ArrayView3<'_, f64>,
    patch_ids: &Array2<u32>,
    op: ReduceOp,
) -> Result<Array3<f64>> {
    let (b, s, d) = features.dim();
    let ids_dim = patch_ids.dim();
    if ids_dim != (b, s) {
        return Err(PatchError::FeatureShapeMismatch {
            expected: ids_dim,
            actual: (b, s),
        });
    }

    let num_patches = patch_ids.iter().max().map_or(0, |&m| m as usize + 1);
    let mut pooled = match op {
        ReduceOp::Min => Array3::from_elem((b, num_patches, d), f64::INFINITY),
        ReduceOp::Max => Array3::from_elem((b, num_patches, d), f64::NEG_INFINITY),
        ReduceOp::Mean | ReduceOp::Sum => Array3::zeros((b, num_patches, d)),
    };
    // Positions contributing to each (row, patch) bucket
    let mut counts = Array2::<u32>::zeros((b, num_patches));

    for row in 0..b {
        for pos in 0..s {
            let patch = patch_ids[[row, pos]] as usize;
            counts[[row, patch]] += 1;
            for dim in 0..d {
                let x = features[[row, pos, dim]];
                let slot = &mut pooled[[row, patch, dim]];
                match op {
                    ReduceOp::Mean | ReduceOp::Sum => *slot += x,
                    ReduceOp::Min => *slot = slot.min(x),
                    ReduceOp::Max => *slot = slot.max(x),
                }
            }
        }
    }

    // Finalize: divide mean buckets by their counts, zero out buckets no
    // position of this row landed in.
    for row in 0..b {
        for patch in 0..num_patches {
            let count = counts[[row, patch]];
            let mut slot = pooled.index_axis_mut(Axis(0), row);
            let mut slot = slot.index_axis_mut(Axis(0), patch);
            if count == 0 {
                slot.fill(0.0);
            } else if op == ReduceOp::Mean {
                slot.mapv_inplace(|v| v / count as f64);
            }
        }
    }

    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    const EPSILON: f64 = 1e-12;

    /// [1, 4, 1] feature block with values [1, 2, 3, 4]
    fn ramp_features() -> Array3<f64> {
        Array3::from_shape_vec((1, 4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap()
    }

    #[test]
    fn test_mean_pooling() {
        let ids = arr2(&[[0u32, 0, 1, 1]]);
        let pooled = pool_patches(ramp_features().view(), &ids, ReduceOp::Mean).unwrap();

        assert_eq!(pooled.dim(), (1, 2, 1));
        assert!((pooled[[0, 0, 0]] - 1.5).abs() < EPSILON);
        assert!((pooled[[0, 1, 0]] - 3.5).abs() < EPSILON);
    }

    #[test]
    fn test_sum_pooling() {
        let features = Array3::from_elem((1, 3, 2), 1.0);
        let ids = arr2(&[[0u32, 0, 0]]);
        let pooled = pool_patches(features.view(), &ids, ReduceOp::Sum).unwrap();

        assert_eq!(pooled.dim(), (1, 1, 2));
        assert_eq!(pooled[[0, 0, 0]], 3.0);
        assert_eq!(pooled[[0, 0, 1]], 3.0);
    }

    #[test]
    fn test_min_max_pooling() {
        let ids = arr2(&[[0u32, 0, 1, 1]]);

        let min = pool_patches(ramp_features().view(), &ids, ReduceOp::Min).unwrap();
        assert_eq!(min[[0, 0, 0]], 1.0);
        assert_eq!(min[[0, 1, 0]], 3.0);

        let max = pool_patches(ramp_features().view(), &ids, ReduceOp::Max).unwrap();
        assert_eq!(max[[0, 0, 0]], 2.0);
        assert_eq!(max[[0, 1, 0]], 4.0);
    }

    #[test]
    fn test_empty_buckets_are_zero_for_all_ops() {
        // Row 1 never reaches patch 1; its slot must be 0, not inf or NaN
        let features = Array3::from_elem((2, 2, 1), 5.0);
        let ids = arr2(&[[0u32, 1], [0, 0]]);

        for op in [ReduceOp::Mean, ReduceOp::Min, ReduceOp::Max, ReduceOp::Sum] {
            let pooled = pool_patches(features.view(), &ids, op).unwrap();
            assert_eq!(pooled.dim(), (2, 2, 1));
            assert_eq!(pooled[[1, 1, 0]], 0.0, "empty bucket under {op:?}");
            assert!(pooled.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_negative_features_pool_correctly() {
        // max of an all-negative patch must not be contaminated by the
        // zero-fill of empty buckets
        let features = Array3::from_shape_vec((1, 2, 1), vec![-3.0, -1.0]).unwrap();
        let ids = arr2(&[[0u32, 0]]);
        let pooled = pool_patches(features.view(), &ids, ReduceOp::Max).unwrap();
        assert_eq!(pooled[[0, 0, 0]], -1.0);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let features = Array3::<f64>::zeros((2, 8, 4));
        let ids = Array2::<u32>::zeros((2, 6));
        let err = pool_patches(features.view(), &ids, ReduceOp::Mean).unwrap_err();
        assert_eq!(
            err,
            PatchError::FeatureShapeMismatch {
                expected: (2, 6),
                actual: (2, 8),
            }
        );
    }

    #[test]
    fn test_empty_input_gives_empty_pooled() {
        let features = Array3::<f64>::zeros((2, 0, 4));
        let ids = Array2::<u32>::zeros((2, 0));
        let pooled = pool_patches(features.view(), &ids, ReduceOp::Mean).unwrap();
        assert_eq!(pooled.dim(), (2, 0, 4));
    }

    #[test]
    fn test_per_byte_patches_are_identity() {
        let ids = arr2(&[[0u32, 1, 2, 3]]);
        for op in [ReduceOp::Mean, ReduceOp::Min, ReduceOp::Max, ReduceOp::Sum] {
            let pooled = pool_patches(ramp_features().view(), &ids, op).unwrap();
            assert_eq!(pooled.dim(), (1, 4, 1));
            for p in 0..4 {
                assert_eq!(pooled[[0, p, 0]], (p + 1) as f64);
            }
        }
    }

    #[test]
    fn test_reduce_op_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ReduceOp::Mean).unwrap(), "\"mean\"");
        assert_eq!(
            serde_json::from_str::<ReduceOp>("\"max\"").unwrap(),
            ReduceOp::Max
        );
        assert_eq!(ReduceOp::Sum.as_str(), "sum");
        assert_eq!(ReduceOp::default(), ReduceOp::Mean);
    }
}
