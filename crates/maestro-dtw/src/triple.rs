//! Three-way DTW solver over a mixture cost tensor, with fixed-corner and
//! flexible-boundary (face start/end) modes.
//!
//! The tensor build is the dominant cost and is parallelized; the DP
//! itself is a dense sequential scan. No pruning, beam search, or
//! hierarchical downsampling happens here: callers pre-crop and
//! pre-downsample their sequences instead.

use tracing::{debug, instrument};

use crate::cost::{mixture_tensor, CostTensor, MixGains, MixtureCost};
use crate::error::AlignError;
use crate::feature::FeatureView;
use crate::path::{AlignmentPath3, PathPoint3};
use crate::step::StepPattern3;

/// Marker stored in the backtrace grid for cells where a path begins.
const PATH_START: u8 = u8::MAX;

/// Boundary handling for the three-way solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode3 {
    /// Path runs from `(0,0,0)` to `(n-1, m-1, k-1)`.
    #[default]
    Fixed,
    /// The path may start anywhere on the three faces touching the origin
    /// corner and end anywhere on the three faces touching the opposite
    /// corner. Endpoints are scored by accumulated cost per Manhattan
    /// block of path extent; candidates with any coordinate closer than
    /// `buffer` to a start-adjacent face are excluded as degenerate.
    Flex {
        /// Minimum distance of an endpoint from the origin-adjacent faces.
        buffer: usize,
    },
}

/// A solved three-way alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment3 {
    /// The monotonic warping path through the tensor.
    pub path: AlignmentPath3,
    /// Accumulated cost at the chosen endpoint.
    pub cost: f64,
    /// The start cell of the path (always `(0,0,0)` in fixed mode).
    pub start: PathPoint3,
}

/// Immutable three-way DTW configuration. The mixture cost variant and
/// gains are resolved here, once, rather than re-dispatched per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleDtw {
    steps: StepPattern3,
    mode: BoundaryMode3,
    mixture: MixtureCost,
    gains: Option<MixGains>,
}

impl TripleDtw {
    /// Create a solver with the given step pattern, fixed corners, and the
    /// sum mixture cost with gains estimated from the part sequences.
    #[must_use]
    pub fn new(steps: StepPattern3) -> Self {
        Self {
            steps,
            mode: BoundaryMode3::Fixed,
            mixture: MixtureCost::default(),
            gains: None,
        }
    }

    /// Create a solver with the default seven-step pattern.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(StepPattern3::standard())
    }

    /// Select a boundary mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BoundaryMode3) -> Self {
        self.mode = mode;
        self
    }

    /// Select the mixture cost variant.
    #[must_use]
    pub fn with_mixture(mut self, mixture: MixtureCost) -> Self {
        self.mixture = mixture;
        self
    }

    /// Fix explicit mixture gains instead of estimating them from the
    /// part sequences.
    #[must_use]
    pub fn with_gains(mut self, gains: MixGains) -> Self {
        self.gains = Some(gains);
        self
    }

    /// Return the boundary mode.
    #[must_use]
    pub fn mode(&self) -> BoundaryMode3 {
        self.mode
    }

    /// Align two part sequences `x`, `y` against a full-mix sequence `z`.
    ///
    /// Builds the mixture cost tensor (the `O(n*m*k*dim)` step) and
    /// solves. Sequences of a few thousand frames already produce a
    /// multi-gigabyte tensor: pre-crop with
    /// [`FeatureMatrix::window`](crate::FeatureMatrix::window) first.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::Feature`] | Sequences differ in dimensionality |
    /// | [`AlignError::NoFeasiblePath`] | No endpoint reachable (or all excluded by the flex buffer) |
    #[instrument(skip(self, x, y, z), fields(n = x.n_frames(), m = y.n_frames(), k = z.n_frames()))]
    pub fn align(
        &self,
        x: FeatureView<'_>,
        y: FeatureView<'_>,
        z: FeatureView<'_>,
    ) -> Result<Alignment3, AlignError> {
        let gains = self
            .gains
            .unwrap_or_else(|| MixGains::from_features(x, y));
        let tensor = mixture_tensor(x, y, z, self.mixture, gains)?;
        self.solve(&tensor)
    }

    /// Solve over an explicit cost tensor.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::NoFeasiblePath`] when no legal endpoint is
    /// reachable.
    #[instrument(skip(self, cost), fields(shape = ?cost.shape(), mode = ?self.mode))]
    pub fn solve(&self, cost: &CostTensor) -> Result<Alignment3, AlignError> {
        let (n, m, k) = cost.shape();
        let steps = self.steps.steps();
        let cells = n * m * k;
        let idx = |i: usize, j: usize, kk: usize| (i * m + j) * k + kk;

        let mut acc = vec![f64::INFINITY; cells];
        let mut back = vec![PATH_START; cells];
        // Start-cell coordinates per cell, tracked only in flex mode where
        // endpoint scoring needs the path extent.
        let flex = matches!(self.mode, BoundaryMode3::Flex { .. });
        let mut starts: Vec<[u32; 3]> = if flex { vec![[0; 3]; cells] } else { Vec::new() };

        if !flex {
            acc[0] = cost.get(0, 0, 0);
        }

        for i in 0..n {
            for j in 0..m {
                for kk in 0..k {
                    let local = cost.get(i, j, kk);
                    let cell = idx(i, j, kk);
                    let mut best = acc[cell];
                    let mut best_step = back[cell];

                    for (s_idx, s) in steps.iter().enumerate() {
                        if s.di > i || s.dj > j || s.dk > kk {
                            continue;
                        }
                        let prev = idx(i - s.di, j - s.dj, kk - s.dk);
                        if !acc[prev].is_finite() {
                            continue;
                        }
                        let candidate = acc[prev] + local * s.weight;
                        if candidate < best {
                            best = candidate;
                            best_step = s_idx as u8;
                        }
                    }

                    if flex {
                        if best_step != PATH_START {
                            let s = steps[best_step as usize];
                            starts[cell] = starts[idx(i - s.di, j - s.dj, kk - s.dk)];
                        }
                        // A start-face cell restarts the path at its own
                        // local cost when that is strictly cheaper than
                        // anything inherited.
                        let on_start_face = i == 0 || j == 0 || kk == 0;
                        if on_start_face && local < best {
                            best = local;
                            best_step = PATH_START;
                            starts[cell] = [i as u32, j as u32, kk as u32];
                        }
                    }

                    acc[cell] = best;
                    back[cell] = best_step;
                }
            }
        }

        // Endpoint selection.
        let (end, total) = match self.mode {
            BoundaryMode3::Fixed => {
                let corner = (n - 1, m - 1, k - 1);
                let total = acc[idx(corner.0, corner.1, corner.2)];
                if !total.is_finite() {
                    return Err(AlignError::NoFeasiblePath);
                }
                (corner, total)
            }
            BoundaryMode3::Flex { buffer } => {
                // Scan the three end faces, scoring each candidate by
                // accumulated cost per Manhattan block of path extent.
                // Scan order (i, then j, then k) breaks score ties.
                let mut best: Option<((usize, usize, usize), f64, f64)> = None;
                for i in 0..n {
                    for j in 0..m {
                        for kk in 0..k {
                            if i != n - 1 && j != m - 1 && kk != k - 1 {
                                continue;
                            }
                            if i < buffer || j < buffer || kk < buffer {
                                continue;
                            }
                            let cell = idx(i, j, kk);
                            let total = acc[cell];
                            if !total.is_finite() {
                                continue;
                            }
                            let s = starts[cell];
                            let blocks = (i - s[0] as usize)
                                + (j - s[1] as usize)
                                + (kk - s[2] as usize);
                            let score = total / blocks.max(1) as f64;
                            if best.is_none_or(|(_, best_score, _)| score < best_score) {
                                best = Some(((i, j, kk), score, total));
                            }
                        }
                    }
                }
                let Some((end, _, total)) = best else {
                    return Err(AlignError::NoFeasiblePath);
                };
                (end, total)
            }
        };

        // Backtrack until a path-start cell.
        let mut points = Vec::new();
        let (mut i, mut j, mut kk) = end;
        loop {
            points.push(PathPoint3 { a: i, b: j, c: kk });
            let marker = back[idx(i, j, kk)];
            if marker == PATH_START {
                break;
            }
            let s = steps[marker as usize];
            i -= s.di;
            j -= s.dj;
            kk -= s.dk;
        }
        points.reverse();

        let start = points[0];
        debug!(cost = total, path_len = points.len(), ?start, "triple solve complete");
        Ok(Alignment3 {
            path: AlignmentPath3::new(points),
            cost: total,
            start,
        })
    }
}
