//! Convenience re-exports for typical usage.
//!
//! ```
//! use patch_segmenter::prelude::*;
//!
//! let patcher = BytePatcher::new(PatcherConfig::default()).unwrap();
//! let seg = patcher.segment(&ByteBatch::single(b"hello world"));
//! assert!(seg.num_patches() >= 1);
//! ```

pub use crate::batch::ByteBatch;
pub use crate::config::PatcherConfig;
pub use crate::error::{PatchError, Result};
pub use crate::patcher::BytePatcher;
pub use crate::pooling::{pool_patches, ReduceOp};
pub use crate::segmenter::{PatchSegmenter, Segmentation, SegmentationStats};
