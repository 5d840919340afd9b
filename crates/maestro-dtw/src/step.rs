//! Step patterns: the legal index-advancement moves of the DP recurrence.

use crate::error::StepPatternError;

/// A single legal transition in the 2D recurrence: advance `di` rows and
/// `dj` columns, weighting the local cost by `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step2 {
    /// Row displacement (first sequence).
    pub di: usize,
    /// Column displacement (second sequence).
    pub dj: usize,
    /// Multiplier applied to the local cost when taking this step.
    pub weight: f64,
}

/// A single legal transition in the 3D recurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step3 {
    /// Displacement along the first sequence.
    pub di: usize,
    /// Displacement along the second sequence.
    pub dj: usize,
    /// Displacement along the third sequence.
    pub dk: usize,
    /// Multiplier applied to the local cost when taking this step.
    pub weight: f64,
}

/// Validated, ordered set of 2D transitions. Declaration order is the
/// deterministic tie-break order of the recurrence: when two steps reach a
/// cell at equal cost, the earlier-declared step wins.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPattern2(Vec<Step2>);

impl StepPattern2 {
    /// Build a pattern from parallel displacement and weight arrays.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StepPatternError::Empty`] | No steps |
    /// | [`StepPatternError::WeightMismatch`] | Array lengths differ |
    /// | [`StepPatternError::ZeroDisplacement`] | A step with `di == dj == 0` |
    /// | [`StepPatternError::InvalidWeight`] | A weight is negative or non-finite |
    pub fn new(displacements: &[(usize, usize)], weights: &[f64]) -> Result<Self, StepPatternError> {
        if displacements.is_empty() {
            return Err(StepPatternError::Empty);
        }
        if displacements.len() != weights.len() {
            return Err(StepPatternError::WeightMismatch {
                steps: displacements.len(),
                weights: weights.len(),
            });
        }
        let mut steps = Vec::with_capacity(displacements.len());
        for (index, (&(di, dj), &weight)) in displacements.iter().zip(weights).enumerate() {
            if di == 0 && dj == 0 {
                return Err(StepPatternError::ZeroDisplacement { index });
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(StepPatternError::InvalidWeight { index, weight });
            }
            steps.push(Step2 { di, dj, weight });
        }
        Ok(Self(steps))
    }

    /// The pattern the alignment systems run with by default:
    /// `{(1,1): 2, (1,2): 3, (2,1): 3}`.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(&[(1, 1), (1, 2), (2, 1)], &[2.0, 3.0, 3.0])
            .expect("standard pattern is valid")
    }

    /// Minimal unit pattern: `{(1,1): 1, (1,0): 1, (0,1): 1}`.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(&[(1, 1), (1, 0), (0, 1)], &[1.0, 1.0, 1.0])
            .expect("unit pattern is valid")
    }

    /// Return the steps in declaration order.
    #[must_use]
    pub fn steps(&self) -> &[Step2] {
        &self.0
    }

    /// Return the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the pattern has no steps. Never true for a pattern
    /// built via [`StepPattern2::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated, ordered set of 3D transitions. Declaration order breaks ties,
/// as in [`StepPattern2`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepPattern3(Vec<Step3>);

impl StepPattern3 {
    /// Build a pattern from parallel displacement and weight arrays.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`StepPattern2::new`], with the zero-displacement
    /// check covering all three dimensions.
    pub fn new(
        displacements: &[(usize, usize, usize)],
        weights: &[f64],
    ) -> Result<Self, StepPatternError> {
        if displacements.is_empty() {
            return Err(StepPatternError::Empty);
        }
        if displacements.len() != weights.len() {
            return Err(StepPatternError::WeightMismatch {
                steps: displacements.len(),
                weights: weights.len(),
            });
        }
        let mut steps = Vec::with_capacity(displacements.len());
        for (index, (&(di, dj, dk), &weight)) in displacements.iter().zip(weights).enumerate() {
            if di == 0 && dj == 0 && dk == 0 {
                return Err(StepPatternError::ZeroDisplacement { index });
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(StepPatternError::InvalidWeight { index, weight });
            }
            steps.push(Step3 { di, dj, dk, weight });
        }
        Ok(Self(steps))
    }

    /// All seven non-degenerate 0/1 displacement triples, weighted by the
    /// number of dimensions they advance. The full diagonal is declared
    /// first so it wins ties.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            &[
                (1, 1, 1),
                (1, 1, 0),
                (1, 0, 1),
                (0, 1, 1),
                (1, 0, 0),
                (0, 1, 0),
                (0, 0, 1),
            ],
            &[3.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0],
        )
        .expect("standard 3D pattern is valid")
    }

    /// Return the steps in declaration order.
    #[must_use]
    pub fn steps(&self) -> &[Step3] {
        &self.0
    }

    /// Return the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the pattern has no steps. Never true for a pattern
    /// built via [`StepPattern3::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
