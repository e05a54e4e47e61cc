//! Export segmentation results for downstream model training.
//!
//! Writes the arrays as `.npy` files (directly loadable with
//! `numpy.load`) plus a JSON sidecar describing shapes and the settings that
//! produced them:
//!
//! ```text
//! out_dir/
//! ├── patch_ids.npy      [batch, seq]           u32
//! ├── entropy.npy        [batch, seq]           f64
//! ├── pooled.npy         [batch, patches, dim]  f64   (optional)
//! └── metadata.json
//! ```

use crate::config::PatcherConfig;
use crate::error::{PatchError, Result};
use crate::segmenter::Segmentation;
use ndarray::Array3;
use ndarray_npy::WriteNpyExt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Sidecar metadata written next to the arrays.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ExportMetadata {
    /// Number of sequences in the batch
    pub batch_size: usize,
    /// Sequence length in bytes
    pub seq_len: usize,
    /// Shared patch count (pooled axis length)
    pub num_patches: usize,
    /// Threshold value at the end of the pass (bits)
    pub final_threshold: f64,
    /// Configuration that produced the arrays
    pub config: PatcherConfig,
}

fn export_err(what: &str, err: impl std::fmt::Display) -> PatchError {
    PatchError::Export(format!("{what}: {err}"))
}

fn write_npy<A, D>(path: &Path, array: &ndarray::Array<A, D>) -> Result<()>
where
    A: ndarray_npy::WritableElement,
    D: ndarray::Dimension,
{
    let file = File::create(path).map_err(|e| export_err(&path.display().to_string(), e))?;
    array
        .write_npy(BufWriter::new(file))
        .map_err(|e| export_err(&path.display().to_string(), e))
}

/// Write a segmentation (and optionally the pooled features) to `out_dir`,
/// creating the directory if needed.
///
/// # Errors
///
/// [`PatchError::Export`] wrapping the underlying I/O or serialization
/// failure.
pub fn export_segmentation<P: AsRef<Path>>(
    out_dir: P,
    segmentation: &Segmentation,
    pooled: Option<&Array3<f64>>,
    config: &PatcherConfig,
) -> Result<()> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|e| export_err("create output directory", e))?;

    write_npy(&out_dir.join("patch_ids.npy"), segmentation.patch_ids())?;
    write_npy(&out_dir.join("entropy.npy"), segmentation.entropy())?;
    if let Some(pooled) = pooled {
        write_npy(&out_dir.join("pooled.npy"), pooled)?;
    }

    let metadata = ExportMetadata {
        batch_size: segmentation.batch_size(),
        seq_len: segmentation.seq_len(),
        num_patches: segmentation.num_patches(),
        final_threshold: segmentation.final_threshold(),
        config: config.clone(),
    };
    let file = File::create(out_dir.join("metadata.json"))
        .map_err(|e| export_err("metadata.json", e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &metadata)
        .map_err(|e| export_err("metadata.json", e))?;

    log::info!(
        "exported segmentation [{}, {}] ({} patches) to {}",
        metadata.batch_size,
        metadata.seq_len,
        metadata.num_patches,
        out_dir.display()
    );
    Ok(())
}
