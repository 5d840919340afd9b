//! Alignment composition: chain an A->B curve and a B->C curve into the
//! induced A->C correspondence.

use tracing::{debug, instrument};

use crate::curve::{Unit, WarpCurve};
use crate::error::CurveError;

/// Spacing of the seconds-domain sampling grid (20 ms).
const SECONDS_GRID: f64 = 0.02;

/// Compose two warp curves sharing the middle sequence: `ab` maps A to B,
/// `bc` maps B to C, and the result maps A to C.
///
/// The A axis is sampled densely (every integer frame for frame-unit
/// curves, a 20 ms grid for second-unit curves); each sample is linearly
/// interpolated through `ab` to a B coordinate and through `bc` to a C
/// coordinate. Both inputs get a `(0,0)` anchor prepended when absent so
/// the interpolation does not extrapolate at the lower boundary.
///
/// If `bc` runs C->B, flip it first with
/// [`WarpCurve::swap_axes`].
///
/// # Errors
///
/// Returns [`CurveError::UnitMismatch`] when the curves carry different
/// units. Monotonicity is guaranteed by [`WarpCurve`] construction.
#[instrument(skip(ab, bc), fields(ab_len = ab.len(), bc_len = bc.len()))]
pub fn compose(ab: &WarpCurve, bc: &WarpCurve) -> Result<WarpCurve, CurveError> {
    if ab.unit() != bc.unit() {
        return Err(CurveError::UnitMismatch {
            left: ab.unit(),
            right: bc.unit(),
        });
    }
    let unit = ab.unit();
    let step = match unit {
        Unit::Frames => 1.0,
        Unit::Seconds => SECONDS_GRID,
    };

    let ab_pts = with_anchor(ab.points());
    let bc_pts = with_anchor(bc.points());
    let a_end = ab_pts[ab_pts.len() - 1].0;

    let mut points = Vec::new();
    let mut tick = 0usize;
    loop {
        let a = tick as f64 * step;
        if a > a_end {
            break;
        }
        let b = interp(a, &ab_pts);
        let c = interp(b, &bc_pts);
        points.push((a, c));
        tick += 1;
    }
    // The grid rarely lands on the final coordinate exactly; close the
    // curve at the true endpoint.
    if points.last().is_none_or(|&(a, _)| a < a_end) {
        let b = interp(a_end, &ab_pts);
        points.push((a_end, interp(b, &bc_pts)));
    }

    debug!(samples = points.len(), "composition complete");
    // Interpolating monotone curves yields monotone output.
    Ok(WarpCurve::new_unchecked(points, unit))
}

/// Prepend a `(0,0)` anchor unless the curve already starts there or
/// begins in negative coordinates (offset-corrected sub-windows).
fn with_anchor(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (a0, b0) = points[0];
    if (a0 == 0.0 && b0 == 0.0) || a0 < 0.0 || b0 < 0.0 {
        points.to_vec()
    } else {
        let mut anchored = Vec::with_capacity(points.len() + 1);
        anchored.push((0.0, 0.0));
        anchored.extend_from_slice(points);
        anchored
    }
}

/// Piecewise-linear interpolation with edge clamping: `x` below the first
/// point returns the first value, above the last returns the last value.
/// Where several points share an x coordinate (a vertical segment), the
/// last of them wins.
fn interp(x: f64, points: &[(f64, f64)]) -> f64 {
    let (x_first, y_first) = points[0];
    if x <= x_first {
        return y_first;
    }
    let (x_last, y_last) = points[points.len() - 1];
    if x >= x_last {
        return y_last;
    }
    // First index whose x exceeds the query; its predecessor is the
    // segment start. The bounds checks above keep both in range.
    let hi = points.partition_point(|&(px, _)| px <= x);
    let (x0, y0) = points[hi - 1];
    let (x1, y1) = points[hi];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
