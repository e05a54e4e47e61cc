//! # Entropy-Guided Byte Patch Segmentation
//!
//! Segmentation and pooling front-end for byte-level sequence models:
//! instead of splitting a byte stream into fixed-size blocks, boundaries are
//! placed where the local byte statistics become hard to predict, so
//! compressible stretches form long patches and information-dense stretches
//! form short ones.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │ ByteBatch│──▶│ EntropyEstimator  │──▶│ PatchSegmenter   │──▶│ pool_patches│
//! │ [B, S]   │   │ sliding histogram │   │ + Threshold-     │   │ scatter-    │
//! │ u8       │   │ Shannon bits      │   │   Controller     │   │ reduce      │
//! └──────────┘   └───────────────────┘   │ ids [B, S] u32   │   │ [B, P, D]   │
//!                                        └──────────────────┘   └─────────────┘
//! ```
//!
//! Per position, each row updates its sliding byte-frequency window and
//! computes the Shannon entropy of that window. A boundary opens when the
//! entropy strictly exceeds an adaptive threshold, or when the current patch
//! reaches `patch_size` bytes. The threshold is a single scalar shared by the
//! batch, nudged up after positions where any row split and down after quiet
//! positions, clamped to configured bounds. Pooling then scatter-reduces
//! per-byte feature vectors into one vector per patch (mean, min, max, or
//! sum).
//!
//! ## Quick start
//!
//! ```
//! use patch_segmenter::prelude::*;
//! use ndarray::Array3;
//!
//! let patcher = BytePatcher::new(PatcherConfig::default())?;
//! let batch = ByteBatch::single(b"aaaaaaaaaaaaaaaa0x7f_!93q");
//!
//! let seg = patcher.segment(&batch);
//! // The constant prefix packs into long patches; the noisy tail splits fast
//! assert!(seg.num_patches() > 1);
//!
//! let features = Array3::<f64>::ones((1, batch.seq_len(), 8));
//! let pooled = patcher.pool(features.view(), &seg)?;
//! assert_eq!(pooled.dim(), (1, seg.num_patches(), 8));
//! # Ok::<(), patch_segmenter::PatchError>(())
//! ```
//!
//! ## Guarantees
//!
//! - Patch ids per row start at 0, never decrease, never skip an integer
//! - No patch is longer than `patch_size` bytes
//! - Entropy estimates lie in [0, 8] bits; the threshold stays in its bounds
//! - Output is a pure function of (input, config): reruns are bit-identical
//! - Empty pooled slots are exactly 0.0 for every reduction

pub mod batch;
pub mod config;
pub mod entropy;
pub mod error;
pub mod export;
pub mod patcher;
pub mod pooling;
pub mod prelude;
pub mod segmenter;
pub mod threshold;

pub use batch::ByteBatch;
pub use config::PatcherConfig;
pub use error::{PatchError, Result};
pub use patcher::BytePatcher;
pub use pooling::ReduceOp;
pub use segmenter::Segmentation;
