//! Error types for the alignment engine.

use crate::curve::Unit;

/// Errors from feature sequence validation.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Returned when a feature sequence contains no frames.
    #[error("feature sequence must contain at least one frame")]
    Empty,

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite feature value at frame {frame}, dimension {dim}")]
    NonFinite {
        /// Frame index of the first non-finite value found.
        frame: usize,
        /// Dimension index within that frame.
        dim: usize,
    },

    /// Returned when per-frame dimensionality is inconsistent, either within
    /// one sequence or between two sequences passed to a cost function.
    #[error("feature dimensionality mismatch: expected {expected}, got {got}")]
    DimMismatch {
        /// Expected per-frame dimensionality.
        expected: usize,
        /// Actual dimensionality encountered.
        got: usize,
    },
}

/// Errors from step pattern construction.
#[derive(Debug, thiserror::Error)]
pub enum StepPatternError {
    /// Returned when the pattern contains no steps.
    #[error("step pattern must contain at least one step")]
    Empty,

    /// Returned when the displacement and weight arrays differ in length.
    #[error("step/weight count mismatch: {steps} steps but {weights} weights")]
    WeightMismatch {
        /// Number of displacement tuples.
        steps: usize,
        /// Number of weights.
        weights: usize,
    },

    /// Returned when a step has zero displacement in every dimension.
    /// Such a step would let the recurrence revisit the same cell forever.
    #[error("step {index} has zero displacement in every dimension")]
    ZeroDisplacement {
        /// Position of the degenerate step in declaration order.
        index: usize,
    },

    /// Returned when a step weight is negative, NaN, or infinite.
    #[error("step {index} has invalid weight {weight} (must be finite and non-negative)")]
    InvalidWeight {
        /// Position of the offending step in declaration order.
        index: usize,
        /// The rejected weight value.
        weight: f64,
    },
}

/// Errors from DTW solving.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when the chosen endpoint cell is still at the infinite
    /// sentinel after the DP pass: the sequences cannot be connected under
    /// the given step pattern (commonly, a sequence shorter than the
    /// minimum step displacement, or a flex buffer that excludes every
    /// candidate endpoint).
    #[error("no feasible path connects the sequences under the given step pattern")]
    NoFeasiblePath,

    /// Wraps a feature validation error encountered while building costs.
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Errors from warp curve construction, conversion, and composition.
#[derive(Debug, thiserror::Error)]
pub enum CurveError {
    /// Returned when a curve contains no points.
    #[error("warp curve must contain at least one point")]
    Empty,

    /// Returned when a coordinate is NaN or infinite.
    #[error("warp curve contains a non-finite coordinate at point {index}")]
    NonFinite {
        /// Position of the first non-finite point.
        index: usize,
    },

    /// Returned when a curve decreases along either axis.
    #[error("warp curve is not monotonically non-decreasing at point {index} on the {axis} axis")]
    NonMonotonic {
        /// Position of the first offending point.
        index: usize,
        /// Which axis decreased, `"a"` or `"b"`.
        axis: &'static str,
    },

    /// Returned when two curves passed to composition carry different units.
    #[error("curve unit mismatch: {left} vs {right}")]
    UnitMismatch {
        /// Unit of the first curve.
        left: Unit,
        /// Unit of the second curve.
        right: Unit,
    },

    /// Returned when a conversion expects a curve in a specific unit.
    #[error("curve has wrong unit: expected {expected}, got {got}")]
    WrongUnit {
        /// The unit the operation requires.
        expected: Unit,
        /// The unit the curve actually carries.
        got: Unit,
    },
}
