//! Segmentation pipeline configuration.
//!
//! A single serde-backed struct carries every tunable of the entropy
//! estimator, the threshold controller, the segmenter, and the pooling
//! reduction, so a full experiment can be reproduced from one TOML or JSON
//! file.
//!
//! # Example
//!
//! ```
//! use patch_segmenter::config::PatcherConfig;
//!
//! let config = PatcherConfig::default()
//!     .with_patch_size(6)
//!     .with_window_size(16);
//!
//! config.validate().expect("valid config");
//! ```

use crate::error::{PatchError, Result};
use crate::pooling::ReduceOp;
use std::fs;
use std::path::Path;

/// Configuration for entropy-guided patch segmentation and pooling.
///
/// All thresholds are Shannon entropies in bits. Defaults follow the
/// reference tuning: start at 3.0 bits, adapt by 0.1 per position within
/// [2.0, 5.0], force a boundary every 4 bytes, estimate entropy over the
/// trailing 8 bytes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatcherConfig {
    /// Initial entropy trigger threshold (bits). Clamped into
    /// [`min_threshold`](Self::min_threshold)..=[`max_threshold`](Self::max_threshold)
    /// at the start of each pass.
    pub threshold: f64,

    /// Lower bound for the adaptive threshold (bits)
    pub min_threshold: f64,

    /// Upper bound for the adaptive threshold (bits)
    pub max_threshold: f64,

    /// Amount subtracted from the threshold at each position where no row
    /// triggered a boundary
    pub threshold_step_down: f64,

    /// Amount added to the threshold at each position where at least one row
    /// triggered a boundary
    pub threshold_step_up: f64,

    /// Maximum run length before a boundary is forced, regardless of entropy.
    /// A value of 1 degenerates to per-byte patches.
    pub patch_size: usize,

    /// Sliding-window lookback for the byte-frequency entropy estimate.
    /// May exceed the sequence length (the window then never evicts).
    pub window_size: usize,

    /// Reduction applied when pooling per-byte features into per-patch
    /// features
    pub reduce_op: ReduceOp,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            min_threshold: 2.0,
            max_threshold: 5.0,
            threshold_step_down: 0.1,
            threshold_step_up: 0.1,
            patch_size: 4,
            window_size: 8,
            reduce_op: ReduceOp::Mean,
        }
    }
}

impl PatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial entropy threshold (bits).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the threshold bounds (bits).
    pub fn with_threshold_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_threshold = min;
        self.max_threshold = max;
        self
    }

    /// Set the adaptation step sizes.
    pub fn with_threshold_steps(mut self, step_down: f64, step_up: f64) -> Self {
        self.threshold_step_down = step_down;
        self.threshold_step_up = step_up;
        self
    }

    /// Set the maximum patch length.
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Set the entropy lookback window.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the pooling reduction.
    pub fn with_reduce_op(mut self, op: ReduceOp) -> Self {
        self.reduce_op = op;
        self
    }

    /// Validate the configuration.
    ///
    /// Checked once at [`BytePatcher`](crate::patcher::BytePatcher)
    /// construction; per-call code assumes a valid config.
    pub fn validate(&self) -> Result<()> {
        if self.patch_size < 1 {
            return Err(PatchError::InvalidConfig(
                "patch_size must be >= 1".to_string(),
            ));
        }
        if self.window_size < 1 {
            return Err(PatchError::InvalidConfig(
                "window_size must be >= 1".to_string(),
            ));
        }
        if self.min_threshold > self.max_threshold {
            return Err(PatchError::InvalidConfig(format!(
                "min_threshold ({}) must be <= max_threshold ({})",
                self.min_threshold, self.max_threshold
            )));
        }
        if !self.min_threshold.is_finite()
            || !self.max_threshold.is_finite()
            || !self.threshold.is_finite()
        {
            return Err(PatchError::InvalidConfig(
                "thresholds must be finite".to_string(),
            ));
        }
        if self.threshold_step_down < 0.0 || self.threshold_step_up < 0.0 {
            return Err(PatchError::InvalidConfig(
                "threshold steps must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    ///
    /// # Example
    ///
    /// ```ignore
    /// config.save_toml("configs/run1.toml")?;
    /// ```
    pub fn save_toml<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn load_toml<P: AsRef<Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: PatcherConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: PatcherConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_tuning() {
        let config = PatcherConfig::default();
        assert_eq!(config.threshold, 3.0);
        assert_eq!(config.min_threshold, 2.0);
        assert_eq!(config.max_threshold, 5.0);
        assert_eq!(config.threshold_step_down, 0.1);
        assert_eq!(config.threshold_step_up, 0.1);
        assert_eq!(config.patch_size, 4);
        assert_eq!(config.window_size, 8);
        assert_eq!(config.reduce_op, ReduceOp::Mean);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = PatcherConfig::new()
            .with_threshold(4.0)
            .with_threshold_bounds(1.0, 6.0)
            .with_threshold_steps(0.2, 0.05)
            .with_patch_size(8)
            .with_window_size(32)
            .with_reduce_op(ReduceOp::Sum);

        assert_eq!(config.threshold, 4.0);
        assert_eq!(config.min_threshold, 1.0);
        assert_eq!(config.max_threshold, 6.0);
        assert_eq!(config.threshold_step_down, 0.2);
        assert_eq!(config.threshold_step_up, 0.05);
        assert_eq!(config.patch_size, 8);
        assert_eq!(config.window_size, 32);
        assert_eq!(config.reduce_op, ReduceOp::Sum);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_patch_size() {
        let config = PatcherConfig::default().with_patch_size(0);
        assert!(matches!(
            config.validate(),
            Err(PatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_window_size() {
        let config = PatcherConfig::default().with_window_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_threshold_bounds() {
        let config = PatcherConfig::default().with_threshold_bounds(5.0, 2.0);
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("min_threshold"));
    }

    #[test]
    fn test_negative_steps_rejected() {
        let config = PatcherConfig::default().with_threshold_steps(-0.1, 0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = PatcherConfig::default().with_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.toml");

        let config = PatcherConfig::default()
            .with_patch_size(6)
            .with_reduce_op(ReduceOp::Max);
        config.save_toml(&path).unwrap();

        let loaded = PatcherConfig::load_toml(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.json");

        let config = PatcherConfig::default().with_window_size(64);
        config.save_json(&path).unwrap();

        let loaded = PatcherConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");

        let config = PatcherConfig::default().with_threshold_bounds(9.0, 1.0);
        // Serialized directly so load_toml has to do the rejecting
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert!(PatcherConfig::load_toml(&path).is_err());
    }
}
