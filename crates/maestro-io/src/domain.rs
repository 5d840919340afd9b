//! Domain types for maestro-io.

use serde::Serialize;

use crate::IoError;

/// A validated scenario identifier used to name output files.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Parse and validate a scenario id.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidScenarioId`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidScenarioId { name });
        }
        Ok(Self(name))
    }

    /// Return the scenario id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON artifact summarizing a solved alignment, written next to the path
/// CSV by [`PathWriter`](crate::PathWriter).
#[derive(Debug, Serialize)]
pub struct AlignSummary {
    /// Scenario id the alignment belongs to.
    pub scenario: String,
    /// Boundary mode the solver ran in.
    pub mode: String,
    /// Frames in the first sequence.
    pub n_a: usize,
    /// Frames in the second sequence.
    pub n_b: usize,
    /// Frames in the third sequence, for three-way alignments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_c: Option<usize>,
    /// Number of points in the returned path.
    pub path_len: usize,
    /// Accumulated cost at the chosen endpoint.
    pub cost: f64,
    /// Unit of the written path coordinates.
    pub unit: String,
}
