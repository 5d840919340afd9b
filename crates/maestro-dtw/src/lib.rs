//! Generalized DTW alignment engine for audio feature sequences.
//!
//! Pure math library — zero I/O. Provides cosine cost matrices and
//! mixture cost tensors, pairwise DTW with standard / subsequence /
//! fixed-start boundary modes, three-way DTW with flexible boundary
//! selection, warp-curve composition, and frame/time conversion.

mod compose;
mod cost;
mod curve;
mod error;
mod feature;
mod pairwise;
mod path;
mod step;
mod triple;

pub use compose::compose;
pub use cost::{
    cosine_distance, cost_matrix, mixture_tensor, CostMatrix, CostTensor, MixGains, MixtureCost,
    COSINE_EPS,
};
pub use curve::{hop_seconds, Unit, WarpCurve};
pub use error::{AlignError, CurveError, FeatureError, StepPatternError};
pub use feature::{FeatureMatrix, FeatureView};
pub use pairwise::{Alignment2, BoundaryMode2, PairwiseDtw};
pub use path::{AlignmentPath, AlignmentPath3, PathPoint, PathPoint3};
pub use step::{Step2, Step3, StepPattern2, StepPattern3};
pub use triple::{Alignment3, BoundaryMode3, TripleDtw};
