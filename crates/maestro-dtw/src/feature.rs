//! Feature sequence types with validation guarantees.

use crate::error::FeatureError;

/// Owned, validated feature sequence: `n_frames` frames of `dim` values
/// each, stored row-major. Guaranteed non-empty, rectangular, and all
/// finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_frames: usize,
    dim: usize,
}

impl FeatureMatrix {
    /// Create a feature matrix from per-frame rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Empty`] | No rows, or rows of width zero |
    /// | [`FeatureError::DimMismatch`] | A row differs in width from the first |
    /// | [`FeatureError::NonFinite`] | Any value is NaN or infinite |
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FeatureError> {
        let dim = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || dim == 0 {
            return Err(FeatureError::Empty);
        }
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (frame, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(FeatureError::DimMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            for (d, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(FeatureError::NonFinite { frame, dim: d });
                }
                data.push(v);
            }
        }
        Ok(Self {
            data,
            n_frames: rows.len(),
            dim,
        })
    }

    /// Create a feature matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Empty`] | `data` is empty or `dim` is zero |
    /// | [`FeatureError::DimMismatch`] | `data.len()` is not a multiple of `dim` |
    /// | [`FeatureError::NonFinite`] | Any value is NaN or infinite |
    pub fn from_flat(data: Vec<f64>, dim: usize) -> Result<Self, FeatureError> {
        if data.is_empty() || dim == 0 {
            return Err(FeatureError::Empty);
        }
        if data.len() % dim != 0 {
            return Err(FeatureError::DimMismatch {
                expected: dim,
                got: data.len() % dim,
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite {
                frame: index / dim,
                dim: index % dim,
            });
        }
        let n_frames = data.len() / dim;
        Ok(Self {
            data,
            n_frames,
            dim,
        })
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> FeatureView<'_> {
        FeatureView {
            data: &self.data,
            n_frames: self.n_frames,
            dim: self.dim,
        }
    }

    /// Return the number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Return the per-frame dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the feature vector of frame `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_frames`.
    #[must_use]
    pub fn frame(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Borrow a contiguous sub-window of frames `[start, end)` as a view.
    ///
    /// Callers are expected to pre-crop long sequences before invoking the
    /// 3D solver; this is the zero-copy way to do it.
    ///
    /// # Panics
    ///
    /// Panics if `start >= end` or `end > n_frames`.
    #[must_use]
    pub fn window(&self, start: usize, end: usize) -> FeatureView<'_> {
        assert!(start < end && end <= self.n_frames, "invalid frame window {start}..{end}");
        FeatureView {
            data: &self.data[start * self.dim..end * self.dim],
            n_frames: end - start,
            dim: self.dim,
        }
    }
}

/// Borrowed, validated view into a feature sequence. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    data: &'a [f64],
    n_frames: usize,
    dim: usize,
}

impl<'a> FeatureView<'a> {
    /// Create a view over a flat row-major slice, validating shape and
    /// finiteness.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FeatureMatrix::from_flat`].
    pub fn new(data: &'a [f64], dim: usize) -> Result<Self, FeatureError> {
        if data.is_empty() || dim == 0 {
            return Err(FeatureError::Empty);
        }
        if data.len() % dim != 0 {
            return Err(FeatureError::DimMismatch {
                expected: dim,
                got: data.len() % dim,
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite {
                frame: index / dim,
                dim: index % dim,
            });
        }
        Ok(Self {
            data,
            n_frames: data.len() / dim,
            dim,
        })
    }

    /// Return the number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Return the per-frame dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the feature vector of frame `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_frames`.
    #[must_use]
    pub fn frame(&self, i: usize) -> &'a [f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}
