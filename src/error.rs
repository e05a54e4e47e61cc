//! Error types for segmentation and pooling.
//!
//! Configuration problems are reported once, at construction time. Numeric
//! edge cases inside a pass (zero-count normalization, empty pooling buckets)
//! are handled with defined fallback values and never surface as errors.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PatchError>;

/// Error type for patch segmentation and pooling operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchError {
    /// Configuration rejected at construction.
    InvalidConfig(String),

    /// Input symbol outside the byte range [0, 255].
    InvalidByte {
        /// Batch row of the offending symbol
        row: usize,
        /// Position within the row
        pos: usize,
        /// The out-of-range value
        value: i64,
    },

    /// Batch rows have unequal lengths.
    RaggedBatch {
        /// First row whose length differs
        row: usize,
        /// Length of row 0
        expected: usize,
        /// Length of the offending row
        actual: usize,
    },

    /// Feature array whose leading [batch, seq] dimensions do not match the
    /// patch-id array handed to pooling.
    FeatureShapeMismatch {
        /// (batch, seq) of the patch-id array
        expected: (usize, usize),
        /// (batch, seq) of the feature array
        actual: (usize, usize),
    },

    /// I/O or serialization failure while exporting results.
    Export(String),
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::InvalidByte { row, pos, value } => {
                write!(
                    f,
                    "Invalid byte value {value} at row {row}, position {pos} (must be in [0, 255])"
                )
            }
            Self::RaggedBatch {
                row,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Ragged batch: row {row} has length {actual}, expected {expected} (pad externally)"
                )
            }
            Self::FeatureShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Feature shape mismatch: patch ids are [{}, {}], features are [{}, {}, _]",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            Self::Export(msg) => write!(f, "Export failed: {msg}"),
        }
    }
}

impl std::error::Error for PatchError {}
