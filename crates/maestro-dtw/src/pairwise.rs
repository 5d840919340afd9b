//! Pairwise DTW solver: standard, subsequence, and fixed-start/free-end
//! boundary modes over an explicit step pattern.

use tracing::{debug, instrument};

use crate::cost::{cost_matrix, CostMatrix};
use crate::error::AlignError;
use crate::feature::FeatureView;
use crate::path::{AlignmentPath, PathPoint};
use crate::step::StepPattern2;

/// Marker stored in the backtrace grid for cells where a path begins.
const PATH_START: u8 = u8::MAX;

/// Boundary handling for the pairwise solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode2 {
    /// Path runs corner to corner: `(0,0)` to `(n-1, m-1)`.
    #[default]
    Fixed,
    /// Path may start at any column of row 0 and end at any column of the
    /// last row; locates a short query (rows) inside a longer reference
    /// (columns).
    Subsequence,
    /// Path starts at `(0,0)` but ends at the cheapest column of the last
    /// row. Used when two recordings begin together but one ends early.
    FixedStartFreeEnd,
}

/// A solved pairwise alignment: the path and its accumulated cost at the
/// chosen endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment2 {
    /// The monotonic warping path.
    pub path: AlignmentPath,
    /// Accumulated cost at the endpoint cell.
    pub cost: f64,
}

/// Immutable pairwise DTW configuration: a validated step pattern plus a
/// boundary mode. Thread-safe; each solve call allocates its own grids.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseDtw {
    steps: StepPattern2,
    mode: BoundaryMode2,
}

impl PairwiseDtw {
    /// Create a solver with the given step pattern in [`BoundaryMode2::Fixed`].
    #[must_use]
    pub fn new(steps: StepPattern2) -> Self {
        Self {
            steps,
            mode: BoundaryMode2::Fixed,
        }
    }

    /// Create a solver with the default step pattern in fixed mode.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(StepPattern2::standard())
    }

    /// Select a boundary mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BoundaryMode2) -> Self {
        self.mode = mode;
        self
    }

    /// Return the boundary mode.
    #[must_use]
    pub fn mode(&self) -> BoundaryMode2 {
        self.mode
    }

    /// Return the step pattern.
    #[must_use]
    pub fn steps(&self) -> &StepPattern2 {
        &self.steps
    }

    /// Build the cosine cost matrix for two feature sequences and solve.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::Feature`] | Sequences differ in dimensionality |
    /// | [`AlignError::NoFeasiblePath`] | Endpoint unreachable under the step pattern |
    #[instrument(skip(self, a, b), fields(n = a.n_frames(), m = b.n_frames()))]
    pub fn align(&self, a: FeatureView<'_>, b: FeatureView<'_>) -> Result<Alignment2, AlignError> {
        let cost = cost_matrix(a, b)?;
        self.solve(&cost)
    }

    /// Solve over an explicit cost matrix.
    ///
    /// The DP visits cells in row-major order, which is a topological
    /// order because every step has non-negative displacement in both
    /// dimensions. Ties between steps are broken by declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::NoFeasiblePath`] when the endpoint cell is
    /// still at the infinite sentinel after the DP pass.
    #[instrument(skip(self, cost), fields(n = cost.n_rows(), m = cost.n_cols(), mode = ?self.mode))]
    pub fn solve(&self, cost: &CostMatrix) -> Result<Alignment2, AlignError> {
        let n = cost.n_rows();
        let m = cost.n_cols();
        let steps = self.steps.steps();

        let mut acc = vec![f64::INFINITY; n * m];
        let mut back = vec![PATH_START; n * m];

        // Seed cells take the raw local cost; step weights apply to
        // transitions only.
        match self.mode {
            BoundaryMode2::Subsequence => {
                for j in 0..m {
                    acc[j] = cost.get(0, j);
                }
            }
            BoundaryMode2::Fixed | BoundaryMode2::FixedStartFreeEnd => {
                acc[0] = cost.get(0, 0);
            }
        }

        for i in 0..n {
            // In subsequence mode the whole first row is a fixed set of
            // path starts; transitions within it would amount to stay
            // steps, which are initialization-only.
            if i == 0 && self.mode == BoundaryMode2::Subsequence {
                continue;
            }
            for j in 0..m {
                let local = cost.get(i, j);
                let idx = i * m + j;
                let mut best = acc[idx]; // seed value or infinity
                let mut best_step = back[idx];

                for (s_idx, s) in steps.iter().enumerate() {
                    if s.di > i || s.dj > j {
                        continue;
                    }
                    let prev = acc[(i - s.di) * m + (j - s.dj)];
                    if !prev.is_finite() {
                        continue;
                    }
                    let candidate = prev + local * s.weight;
                    if candidate < best {
                        best = candidate;
                        best_step = s_idx as u8;
                    }
                }

                acc[idx] = best;
                back[idx] = best_step;
            }
        }

        // Endpoint selection.
        let (end_i, end_j) = match self.mode {
            BoundaryMode2::Fixed => (n - 1, m - 1),
            BoundaryMode2::Subsequence | BoundaryMode2::FixedStartFreeEnd => {
                let last_row = &acc[(n - 1) * m..n * m];
                let mut best_j = 0;
                for (j, &v) in last_row.iter().enumerate() {
                    if v < last_row[best_j] {
                        best_j = j;
                    }
                }
                (n - 1, best_j)
            }
        };

        let total = acc[end_i * m + end_j];
        if !total.is_finite() {
            return Err(AlignError::NoFeasiblePath);
        }

        // Backtrack until a path-start cell.
        let mut points = Vec::new();
        let mut i = end_i;
        let mut j = end_j;
        loop {
            points.push(PathPoint { a: i, b: j });
            let marker = back[i * m + j];
            if marker == PATH_START {
                break;
            }
            let s = steps[marker as usize];
            i -= s.di;
            j -= s.dj;
        }
        points.reverse();

        debug!(cost = total, path_len = points.len(), "pairwise solve complete");
        Ok(Alignment2 {
            path: AlignmentPath::new(points),
            cost: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureMatrix;
    use crate::step::StepPattern2;

    fn matrix(rows: Vec<Vec<f64>>) -> CostMatrix {
        CostMatrix::from_rows(rows).unwrap()
    }

    fn unit_solver() -> PairwiseDtw {
        PairwiseDtw::new(StepPattern2::unit())
    }

    #[test]
    fn standard_mode_endpoints() {
        let cost = matrix(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let result = unit_solver().solve(&cost).unwrap();
        let points = result.path.points();
        assert_eq!(points.first().unwrap(), &PathPoint { a: 0, b: 0 });
        assert_eq!(points.last().unwrap(), &PathPoint { a: 2, b: 2 });
    }

    #[test]
    fn identity_matrix_follows_diagonal_with_zero_cost() {
        let cost = matrix(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let result = unit_solver().solve(&cost).unwrap();
        assert_eq!(
            result.path.points(),
            &[
                PathPoint { a: 0, b: 0 },
                PathPoint { a: 1, b: 1 },
                PathPoint { a: 2, b: 2 },
            ]
        );
        assert!(result.cost.abs() < 1e-12);
    }

    #[test]
    fn zero_cost_diagonal_is_found_exactly() {
        // Steps {(1,1): 1, (1,2): 1, (2,1): 2}; cost 0.5 everywhere except
        // a zero diagonal: the solver must return exactly the diagonal at
        // total cost zero.
        let n = 6;
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 0.5 }).collect())
            .collect();
        let cost = matrix(rows);
        let pattern = StepPattern2::new(&[(1, 1), (1, 2), (2, 1)], &[1.0, 1.0, 2.0]).unwrap();
        let result = PairwiseDtw::new(pattern).solve(&cost).unwrap();
        let expected: Vec<PathPoint> = (0..n).map(|t| PathPoint { a: t, b: t }).collect();
        assert_eq!(result.path.points(), expected.as_slice());
        assert!(result.cost.abs() < 1e-12);
    }

    #[test]
    fn weighted_recurrence_hand_computed() {
        // All-ones 3x3 with the standard pattern {(1,1):2, (1,2):3, (2,1):3}:
        //   acc[0][0] = 1
        //   acc[1][1] = 1 + 1*2 = 3
        //   acc[2][2] = 3 + 1*2 = 5
        let cost = matrix(vec![vec![1.0; 3]; 3]);
        let result = PairwiseDtw::standard().solve(&cost).unwrap();
        assert!((result.cost - 5.0).abs() < 1e-12);
        assert_eq!(result.path.len(), 3);
    }

    #[test]
    fn subsequence_finds_embedded_query() {
        // Query of 2 frames embedded at columns 1..=2 of the reference.
        let cost = matrix(vec![
            vec![1.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0, 1.0],
        ]);
        let result = unit_solver()
            .with_mode(BoundaryMode2::Subsequence)
            .solve(&cost)
            .unwrap();
        assert_eq!(
            result.path.points(),
            &[PathPoint { a: 0, b: 1 }, PathPoint { a: 1, b: 2 }]
        );
        assert!(result.cost.abs() < 1e-12);
    }

    #[test]
    fn subsequence_endpoint_matches_last_row_argmin() {
        let cost = matrix(vec![
            vec![0.5, 0.5, 0.5, 0.5],
            vec![0.9, 0.1, 0.9, 0.2],
        ]);
        let result = unit_solver()
            .with_mode(BoundaryMode2::Subsequence)
            .solve(&cost)
            .unwrap();
        // Best endpoint: acc[1][1] = 0.5 + 0.1 = 0.6, cheaper than
        // acc[1][3] = 0.5 + 0.2 = 0.7.
        assert_eq!(result.path.last().unwrap(), PathPoint { a: 1, b: 1 });
        assert!((result.cost - 0.6).abs() < 1e-12);
    }

    #[test]
    fn subsequence_path_starts_at_row_zero() {
        let cost = matrix(vec![
            vec![0.9, 0.9, 0.0, 0.9],
            vec![0.9, 0.9, 0.9, 0.0],
        ]);
        let result = unit_solver()
            .with_mode(BoundaryMode2::Subsequence)
            .solve(&cost)
            .unwrap();
        assert_eq!(result.path.first().unwrap().a, 0);
        assert_eq!(result.path.first().unwrap(), PathPoint { a: 0, b: 2 });
    }

    #[test]
    fn fixed_start_free_end_pins_origin() {
        // The cheap window starts at column 1, but fixed-start mode must
        // anchor at (0,0) and only the endpoint is free.
        let cost = matrix(vec![
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 5.0],
        ]);
        let result = unit_solver()
            .with_mode(BoundaryMode2::FixedStartFreeEnd)
            .solve(&cost)
            .unwrap();
        assert_eq!(result.path.first().unwrap(), PathPoint { a: 0, b: 0 });
        assert_eq!(result.path.last().unwrap(), PathPoint { a: 1, b: 1 });
        assert!(result.cost.abs() < 1e-12);
    }

    #[test]
    fn no_feasible_path_when_sequences_too_short() {
        // Only a (2,2) step: a 2x2 matrix has no legal move from (0,0),
        // and (1,1) has no legal predecessor.
        let cost = matrix(vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let pattern = StepPattern2::new(&[(2, 2)], &[1.0]).unwrap();
        let result = PairwiseDtw::new(pattern).solve(&cost);
        assert!(matches!(result, Err(AlignError::NoFeasiblePath)));
    }

    #[test]
    fn single_cell_matrix() {
        let cost = matrix(vec![vec![0.25]]);
        let result = unit_solver().solve(&cost).unwrap();
        assert_eq!(result.path.points(), &[PathPoint { a: 0, b: 0 }]);
        assert!((result.cost - 0.25).abs() < 1e-12);
    }

    #[test]
    fn path_is_monotone_under_legal_steps() {
        let cost = matrix(vec![
            vec![0.1, 0.9, 0.2, 0.8],
            vec![0.4, 0.3, 0.7, 0.1],
            vec![0.6, 0.2, 0.5, 0.9],
        ]);
        let result = PairwiseDtw::standard().solve(&cost).unwrap();
        for pair in result.path.points().windows(2) {
            let da = pair[1].a - pair[0].a;
            let db = pair[1].b - pair[0].b;
            assert!(da + db >= 1, "no progress in step");
            assert!(
                PairwiseDtw::standard()
                    .steps()
                    .steps()
                    .iter()
                    .any(|s| s.di == da && s.dj == db),
                "step ({da}, {db}) not in the pattern"
            );
        }
    }

    #[test]
    fn solve_is_deterministic() {
        let cost = matrix(vec![
            vec![0.5, 0.5, 0.5],
            vec![0.5, 0.5, 0.5],
            vec![0.5, 0.5, 0.5],
        ]);
        let solver = unit_solver();
        let first = solver.solve(&cost).unwrap();
        let second = solver.solve(&cost).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(first.cost.to_bits(), second.cost.to_bits());
    }

    #[test]
    fn tie_break_prefers_first_declared_step() {
        // Uniform costs: from (1,1) both (1,1)-from-(0,0) and
        // (1,0)-from-(0,1) etc. tie. With the diagonal declared first the
        // path must be the pure diagonal.
        let cost = matrix(vec![vec![1.0; 3]; 3]);
        let result = unit_solver().solve(&cost).unwrap();
        assert_eq!(
            result.path.points(),
            &[
                PathPoint { a: 0, b: 0 },
                PathPoint { a: 1, b: 1 },
                PathPoint { a: 2, b: 2 },
            ]
        );
    }

    #[test]
    fn align_from_features_end_to_end() {
        let a = FeatureMatrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let result = unit_solver().align(a.as_view(), a.as_view()).unwrap();
        // Self-alignment follows the diagonal at (near) zero cost.
        for p in result.path.points() {
            assert_eq!(p.a, p.b);
        }
        assert!(result.cost < 1e-6);
    }
}
