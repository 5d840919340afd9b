//! Alignment path types produced by the DTW solvers.

use crate::curve::{Unit, WarpCurve};

/// A single point in a pairwise alignment path, mapping frame `a` of the
/// first sequence to frame `b` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    /// Frame index in the first sequence.
    pub a: usize,
    /// Frame index in the second sequence.
    pub b: usize,
}

/// A single point in a three-way alignment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint3 {
    /// Frame index in the first sequence.
    pub a: usize,
    /// Frame index in the second sequence.
    pub b: usize,
    /// Frame index in the third sequence.
    pub c: usize,
}

/// An ordered pairwise alignment path: component-wise monotone
/// non-decreasing, connected under the step pattern that produced it.
/// Constructed only by solver backtracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPath(Vec<PathPoint>);

impl AlignmentPath {
    pub(crate) fn new(points: Vec<PathPoint>) -> Self {
        Self(points)
    }

    /// Return the path points in order.
    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.0
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no points. Never true for a path
    /// returned by a solver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First point of the path.
    #[must_use]
    pub fn first(&self) -> Option<PathPoint> {
        self.0.first().copied()
    }

    /// Last point of the path.
    #[must_use]
    pub fn last(&self) -> Option<PathPoint> {
        self.0.last().copied()
    }

    /// Translate every point by `(da, db)`. Used to map a path computed on
    /// a cropped sub-window back into the full sequences' index space.
    #[must_use]
    pub fn translate(&self, da: usize, db: usize) -> AlignmentPath {
        AlignmentPath(
            self.0
                .iter()
                .map(|p| PathPoint {
                    a: p.a + da,
                    b: p.b + db,
                })
                .collect(),
        )
    }

    /// Convert to a frame-unit warp curve for composition or time
    /// conversion.
    #[must_use]
    pub fn to_curve(&self) -> WarpCurve {
        // Monotone by construction, so the unchecked constructor applies.
        WarpCurve::new_unchecked(
            self.0.iter().map(|p| (p.a as f64, p.b as f64)).collect(),
            Unit::Frames,
        )
    }
}

impl<'a> IntoIterator for &'a AlignmentPath {
    type Item = &'a PathPoint;
    type IntoIter = std::slice::Iter<'a, PathPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An ordered three-way alignment path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPath3(Vec<PathPoint3>);

impl AlignmentPath3 {
    pub(crate) fn new(points: Vec<PathPoint3>) -> Self {
        Self(points)
    }

    /// Return the path points in order.
    #[must_use]
    pub fn points(&self) -> &[PathPoint3] {
        &self.0
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no points. Never true for a path
    /// returned by a solver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First point of the path.
    #[must_use]
    pub fn first(&self) -> Option<PathPoint3> {
        self.0.first().copied()
    }

    /// Last point of the path.
    #[must_use]
    pub fn last(&self) -> Option<PathPoint3> {
        self.0.last().copied()
    }

    /// Translate every point by `(da, db, dc)` back into full-sequence
    /// index space.
    #[must_use]
    pub fn translate(&self, da: usize, db: usize, dc: usize) -> AlignmentPath3 {
        AlignmentPath3(
            self.0
                .iter()
                .map(|p| PathPoint3 {
                    a: p.a + da,
                    b: p.b + db,
                    c: p.c + dc,
                })
                .collect(),
        )
    }

    /// Project onto the first two sequences. Consecutive duplicate points
    /// are kept; strip them downstream with
    /// [`WarpCurve::strip_plateaus`] if needed.
    #[must_use]
    pub fn project_ab(&self) -> AlignmentPath {
        AlignmentPath(self.0.iter().map(|p| PathPoint { a: p.a, b: p.b }).collect())
    }

    /// Project onto the first and third sequences.
    #[must_use]
    pub fn project_ac(&self) -> AlignmentPath {
        AlignmentPath(self.0.iter().map(|p| PathPoint { a: p.a, b: p.c }).collect())
    }

    /// Project onto the second and third sequences.
    #[must_use]
    pub fn project_bc(&self) -> AlignmentPath {
        AlignmentPath(self.0.iter().map(|p| PathPoint { a: p.b, b: p.c }).collect())
    }
}

impl<'a> IntoIterator for &'a AlignmentPath3 {
    type Item = &'a PathPoint3;
    type IntoIter = std::slice::Iter<'a, PathPoint3>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
