//! Cost metrics: cosine distance, dense cost matrices, and mixture cost
//! tensors for three-way alignment.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::FeatureError;
use crate::feature::FeatureView;

/// Numerical floor added to the cosine denominator so that all-zero
/// frames (silence) produce a distance of 1 instead of dividing by zero.
pub const COSINE_EPS: f64 = 1e-9;

/// Cosine distance between two equal-length vectors: `1 - <a,b> / (|a||b| + eps)`.
///
/// Non-negative and symmetric. A vector compared against itself yields a
/// distance of zero up to floating-point rounding and the epsilon floor.
#[must_use]
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "cosine distance needs equal dims");
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt() + COSINE_EPS)
}

/// Dense pairwise cost matrix. Entry `(i, j)` is the dissimilarity between
/// frame `i` of the first sequence and frame `j` of the second.
///
/// Derived data, never persisted; a solve call builds it, consumes it, and
/// drops it.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl CostMatrix {
    /// Build a cost matrix from explicit rows. Intended for callers that
    /// bring their own metric (and for tests with hand-crafted costs).
    ///
    /// # Errors
    ///
    /// Same taxonomy as feature validation: [`FeatureError::Empty`],
    /// [`FeatureError::DimMismatch`] for ragged rows,
    /// [`FeatureError::NonFinite`] for NaN/infinite entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FeatureError> {
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || n_cols == 0 {
            return Err(FeatureError::Empty);
        }
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(FeatureError::DimMismatch {
                    expected: n_cols,
                    got: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(FeatureError::NonFinite { frame: i, dim: j });
                }
                data.push(v);
            }
        }
        Ok(Self {
            data,
            n_rows: rows.len(),
            n_cols,
        })
    }

    pub(crate) fn from_raw(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Self {
        debug_assert_eq!(data.len(), n_rows * n_cols);
        Self {
            data,
            n_rows,
            n_cols,
        }
    }

    /// Number of rows (frames of the first sequence).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (frames of the second sequence).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the cost at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n_rows && j < self.n_cols, "cost matrix index out of bounds");
        self.data[i * self.n_cols + j]
    }
}

/// Compute the dense cosine cost matrix between two feature sequences.
///
/// No cell depends on another, so rows are computed in parallel with rayon.
///
/// # Errors
///
/// Returns [`FeatureError::DimMismatch`] when the sequences differ in
/// per-frame dimensionality.
#[instrument(skip(a, b), fields(n = a.n_frames(), m = b.n_frames()))]
pub fn cost_matrix(a: FeatureView<'_>, b: FeatureView<'_>) -> Result<CostMatrix, FeatureError> {
    if a.dim() != b.dim() {
        return Err(FeatureError::DimMismatch {
            expected: a.dim(),
            got: b.dim(),
        });
    }
    let n = a.n_frames();
    let m = b.n_frames();

    let mut data = vec![0.0_f64; n * m];
    data.par_chunks_mut(m).enumerate().for_each(|(i, row)| {
        let fa = a.frame(i);
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = cosine_distance(fa, b.frame(j));
        }
    });

    debug!(cells = n * m, "cost matrix built");
    Ok(CostMatrix::from_raw(data, n, m))
}

/// Relative-loudness gains applied to the two part sequences before they
/// are combined into a synthetic mixture frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixGains {
    /// Gain applied to frames of the first part sequence.
    pub x: f64,
    /// Gain applied to frames of the second part sequence.
    pub y: f64,
}

impl MixGains {
    /// Unit gains: both parts contribute as-is.
    #[must_use]
    pub fn balanced() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Estimate gains from the sequences themselves: the second part is
    /// rescaled by the ratio of mean per-frame magnitudes so both parts
    /// contribute at comparable loudness.
    #[must_use]
    pub fn from_features(x: FeatureView<'_>, y: FeatureView<'_>) -> Self {
        let mx = mean_frame_magnitude(x);
        let my = mean_frame_magnitude(y);
        Self {
            x: 1.0,
            y: mx / (my + COSINE_EPS),
        }
    }
}

fn mean_frame_magnitude(v: FeatureView<'_>) -> f64 {
    let total: f64 = (0..v.n_frames())
        .map(|i| v.frame(i).iter().map(|&x| x * x).sum::<f64>().sqrt())
        .sum();
    total / v.n_frames() as f64
}

/// How a three-way cost cell combines the two part frames against the
/// full-mix frame. Resolved once at solver construction, never
/// re-dispatched per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixtureCost {
    /// `cosine(z_k, gx*x_i + gy*y_j)`: the parts are summed into a
    /// synthetic mixture and compared against the full mix.
    #[default]
    Sum,
    /// Explanation-based difference: `cosine(z_k - gx*x_i, gy*y_j)`. The
    /// first part is subtracted from the mix and the residual is compared
    /// against the second part.
    Residual,
}

/// Dense three-way cost tensor of shape `n x m x k`, row-major with the
/// third axis fastest.
///
/// Construction is `O(n*m*k*dim)` and dominates the runtime of a 3D solve.
/// Memory is the caller's concern: pre-crop or pre-downsample long
/// sequences before building one.
#[derive(Debug, Clone)]
pub struct CostTensor {
    data: Vec<f64>,
    n: usize,
    m: usize,
    k: usize,
}

impl CostTensor {
    /// Build a tensor from an explicit per-cell function. Intended for
    /// callers with their own metric and for tests with crafted tensors.
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero.
    #[must_use]
    pub fn from_fn<F>(n: usize, m: usize, k: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        assert!(n > 0 && m > 0 && k > 0, "cost tensor dimensions must be non-zero");
        let mut data = Vec::with_capacity(n * m * k);
        for i in 0..n {
            for j in 0..m {
                for kk in 0..k {
                    data.push(f(i, j, kk));
                }
            }
        }
        Self { data, n, m, k }
    }

    pub(crate) fn from_raw(data: Vec<f64>, n: usize, m: usize, k: usize) -> Self {
        debug_assert_eq!(data.len(), n * m * k);
        Self { data, n, m, k }
    }

    /// Shape as `(n, m, k)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n, self.m, self.k)
    }

    /// Return the cost at `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        assert!(
            i < self.n && j < self.m && k < self.k,
            "cost tensor index out of bounds"
        );
        self.data[(i * self.m + j) * self.k + k]
    }
}

/// Build the mixture cost tensor for three-way alignment: part sequences
/// `x` and `y` against the full-mix sequence `z`.
///
/// Parallel across the first axis; each `(i, j, k)` cell is written exactly
/// once. The loop nesting per variant reuses the combined vector across the
/// axis it does not depend on.
///
/// # Errors
///
/// Returns [`FeatureError::DimMismatch`] when the three sequences differ in
/// per-frame dimensionality.
#[instrument(skip(x, y, z), fields(n = x.n_frames(), m = y.n_frames(), k = z.n_frames()))]
pub fn mixture_tensor(
    x: FeatureView<'_>,
    y: FeatureView<'_>,
    z: FeatureView<'_>,
    cost: MixtureCost,
    gains: MixGains,
) -> Result<CostTensor, FeatureError> {
    let dim = x.dim();
    if y.dim() != dim {
        return Err(FeatureError::DimMismatch {
            expected: dim,
            got: y.dim(),
        });
    }
    if z.dim() != dim {
        return Err(FeatureError::DimMismatch {
            expected: dim,
            got: z.dim(),
        });
    }
    let (n, m, k) = (x.n_frames(), y.n_frames(), z.n_frames());

    // gy*y_j is independent of the other two axes; scale it once.
    let scaled_y: Vec<f64> = (0..m)
        .flat_map(|j| y.frame(j).iter().map(|&v| gains.y * v))
        .collect();

    let mut data = vec![0.0_f64; n * m * k];
    data.par_chunks_mut(m * k).enumerate().for_each(|(i, slab)| {
        let fx = x.frame(i);
        let mut combined = vec![0.0_f64; dim];
        match cost {
            MixtureCost::Sum => {
                // combined = gx*x_i + gy*y_j, reused across the whole k axis
                for j in 0..m {
                    let fy = &scaled_y[j * dim..(j + 1) * dim];
                    for d in 0..dim {
                        combined[d] = gains.x * fx[d] + fy[d];
                    }
                    for (kk, cell) in slab[j * k..(j + 1) * k].iter_mut().enumerate() {
                        *cell = cosine_distance(z.frame(kk), &combined);
                    }
                }
            }
            MixtureCost::Residual => {
                // combined = z_k - gx*x_i, reused across the whole j axis
                for kk in 0..k {
                    let fz = z.frame(kk);
                    for d in 0..dim {
                        combined[d] = fz[d] - gains.x * fx[d];
                    }
                    for j in 0..m {
                        slab[j * k + kk] =
                            cosine_distance(&combined, &scaled_y[j * dim..(j + 1) * dim]);
                    }
                }
            }
        }
    });

    debug!(cells = n * m * k, "cost tensor built");
    Ok(CostTensor::from_raw(data, n, m, k))
}
