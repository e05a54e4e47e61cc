//! Validated byte-sequence batch input.
//!
//! The segmenter operates on a rectangular `[batch, seq]` block of bytes.
//! All input validation happens here, at the boundary: ragged batches and
//! out-of-range symbols are rejected before any per-position work starts,
//! so the position loop itself never fails.
//!
//! Ragged inputs must be padded externally (with whatever sentinel the
//! surrounding model uses) before construction.

use crate::error::{PatchError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// An immutable batch of equal-length byte sequences.
///
/// Backed by a contiguous `[batch, seq]` array. Construction validates shape
/// (and, for wide-token input, the byte range); afterwards every accessor is
/// infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBatch {
    data: Array2<u8>,
}

impl ByteBatch {
    /// Build a batch from equal-length byte rows.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::RaggedBatch`] if any row's length differs from
    /// row 0. An empty row set (or rows of length 0) is legal and yields
    /// empty output arrays downstream.
    ///
    /// # Example
    ///
    /// ```
    /// use patch_segmenter::batch::ByteBatch;
    ///
    /// let batch = ByteBatch::from_rows(vec![b"hello".to_vec(), b"world".to_vec()]).unwrap();
    /// assert_eq!(batch.batch_size(), 2);
    /// assert_eq!(batch.seq_len(), 5);
    /// ```
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let batch_size = rows.len();
        let seq_len = rows.first().map_or(0, |r| r.len());

        for (row, r) in rows.iter().enumerate() {
            if r.len() != seq_len {
                return Err(PatchError::RaggedBatch {
                    row,
                    expected: seq_len,
                    actual: r.len(),
                });
            }
        }

        let mut data = Vec::with_capacity(batch_size * seq_len);
        for r in &rows {
            data.extend_from_slice(r);
        }

        // Shape is consistent by construction above
        let data = Array2::from_shape_vec((batch_size, seq_len), data)
            .expect("row lengths validated");
        Ok(Self { data })
    }

    /// Build a batch from wide integer tokens, rejecting anything outside
    /// [0, 255].
    ///
    /// This is the ingestion path for callers whose token ids are wider than
    /// a byte (e.g. i64 token tensors). Values are checked, not wrapped.
    ///
    /// # Errors
    ///
    /// [`PatchError::InvalidByte`] for the first out-of-range token,
    /// [`PatchError::RaggedBatch`] for unequal row lengths.
    pub fn from_tokens(rows: &[Vec<i64>]) -> Result<Self> {
        let seq_len = rows.first().map_or(0, |r| r.len());

        let mut byte_rows = Vec::with_capacity(rows.len());
        for (row, r) in rows.iter().enumerate() {
            if r.len() != seq_len {
                return Err(PatchError::RaggedBatch {
                    row,
                    expected: seq_len,
                    actual: r.len(),
                });
            }
            let mut bytes = Vec::with_capacity(r.len());
            for (pos, &value) in r.iter().enumerate() {
                if !(0..=255).contains(&value) {
                    return Err(PatchError::InvalidByte { row, pos, value });
                }
                bytes.push(value as u8);
            }
            byte_rows.push(bytes);
        }

        Self::from_rows(byte_rows)
    }

    /// Build a single-row batch from a byte slice.
    pub fn single(bytes: &[u8]) -> Self {
        let data = Array2::from_shape_vec((1, bytes.len()), bytes.to_vec())
            .expect("single row is never ragged");
        Self { data }
    }

    /// Build a batch directly from a `[batch, seq]` array. Infallible: a
    /// rectangular `u8` array is always a valid batch.
    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// Number of rows (B).
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.data.nrows()
    }

    /// Sequence length (S), uniform across rows.
    #[inline]
    pub fn seq_len(&self) -> usize {
        self.data.ncols()
    }

    /// True if the batch holds no positions at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at (row, pos).
    #[inline]
    pub fn byte(&self, row: usize, pos: usize) -> u8 {
        self.data[[row, pos]]
    }

    /// View of a single row.
    #[inline]
    pub fn row(&self, row: usize) -> ArrayView1<'_, u8> {
        self.data.row(row)
    }

    /// View of the whole `[batch, seq]` block.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }
}
