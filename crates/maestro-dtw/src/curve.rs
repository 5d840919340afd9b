//! Unit-tagged warp curves and frame/time conversion.
//!
//! Every solver output is a frame-index path; downstream consumers want
//! timestamps. Tagging the unit on the curve makes a frames-vs-seconds
//! mix-up a typed error instead of a silently wrong composition.

use std::fmt;

use crate::error::CurveError;

/// The unit a warp curve's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Feature frame indices.
    Frames,
    /// Seconds.
    Seconds,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Frames => f.write_str("frames"),
            Unit::Seconds => f.write_str("seconds"),
        }
    }
}

/// Convert a hop size in samples to seconds, e.g. `hop_seconds(512, 22050)`.
#[must_use]
pub fn hop_seconds(hop_samples: u32, sample_rate: u32) -> f64 {
    f64::from(hop_samples) / f64::from(sample_rate)
}

/// A pairwise warp curve: ordered `(a, b)` coordinate pairs, monotone
/// non-decreasing on both axes, tagged with the unit they are expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpCurve {
    points: Vec<(f64, f64)>,
    unit: Unit,
}

impl WarpCurve {
    /// Create a curve, validating that it is non-empty, finite, and
    /// monotone non-decreasing on both axes. Malformed curves fail fast
    /// here rather than producing an undefined interpolation later.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CurveError::Empty`] | No points |
    /// | [`CurveError::NonFinite`] | A coordinate is NaN or infinite |
    /// | [`CurveError::NonMonotonic`] | Either axis decreases |
    pub fn new(points: Vec<(f64, f64)>, unit: Unit) -> Result<Self, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, &(a, b)) in points.iter().enumerate() {
            if !a.is_finite() || !b.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if index > 0 {
                let (pa, pb) = points[index - 1];
                if a < pa {
                    return Err(CurveError::NonMonotonic { index, axis: "a" });
                }
                if b < pb {
                    return Err(CurveError::NonMonotonic { index, axis: "b" });
                }
            }
        }
        Ok(Self { points, unit })
    }

    /// Create a curve without validation. For internal use where
    /// monotonicity is guaranteed by construction.
    pub(crate) fn new_unchecked(points: Vec<(f64, f64)>, unit: Unit) -> Self {
        Self { points, unit }
    }

    /// Return the unit tag.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Return the coordinate pairs in order.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if the curve has no points. Never true for a curve
    /// built via [`WarpCurve::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Scale a frame-unit curve into seconds using the given hop length.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::WrongUnit`] if the curve is already in
    /// seconds.
    pub fn into_seconds(self, hop_secs: f64) -> Result<WarpCurve, CurveError> {
        if self.unit != Unit::Frames {
            return Err(CurveError::WrongUnit {
                expected: Unit::Frames,
                got: self.unit,
            });
        }
        Ok(WarpCurve {
            points: self
                .points
                .into_iter()
                .map(|(a, b)| (a * hop_secs, b * hop_secs))
                .collect(),
            unit: Unit::Seconds,
        })
    }

    /// Additive offset correction: shift both axes, e.g. to translate a
    /// curve computed on a cropped sub-window back into the full
    /// recording's timeline. Offsets may be negative.
    #[must_use]
    pub fn translate(&self, da: f64, db: f64) -> WarpCurve {
        WarpCurve {
            points: self.points.iter().map(|&(a, b)| (a + da, b + db)).collect(),
            unit: self.unit,
        }
    }

    /// Swap the two axes, turning an A->B curve into a B->A curve.
    #[must_use]
    pub fn swap_axes(&self) -> WarpCurve {
        WarpCurve {
            points: self.points.iter().map(|&(a, b)| (b, a)).collect(),
            unit: self.unit,
        }
    }

    /// Drop every point whose successor repeats either coordinate,
    /// removing the vertical and horizontal segments a step pattern with
    /// single-axis moves produces. The final point is always kept.
    #[must_use]
    pub fn strip_plateaus(&self) -> WarpCurve {
        let mut kept = Vec::with_capacity(self.points.len());
        for window in self.points.windows(2) {
            let (a, b) = window[0];
            let (na, nb) = window[1];
            if a != na && b != nb {
                kept.push((a, b));
            }
        }
        kept.push(self.points[self.points.len() - 1]);
        WarpCurve {
            points: kept,
            unit: self.unit,
        }
    }

    /// Keep both endpoints and every `factor`-th interior point. Used to
    /// smooth a dense warp curve before driving time-scale modification.
    /// A factor of zero or one returns the curve unchanged.
    #[must_use]
    pub fn downsample(&self, factor: usize) -> WarpCurve {
        if factor <= 1 || self.points.len() <= 2 {
            return self.clone();
        }
        let last = self.points.len() - 1;
        let mut kept = vec![self.points[0]];
        kept.extend(
            self.points[1..last]
                .iter()
                .step_by(factor)
                .copied(),
        );
        kept.push(self.points[last]);
        WarpCurve {
            points: kept,
            unit: self.unit,
        }
    }
}
