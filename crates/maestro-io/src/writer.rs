//! CSV path writer and JSON summary artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use maestro_dtw::{Unit, WarpCurve};
use tracing::{debug, info, instrument};

use crate::domain::{AlignSummary, ScenarioId};
use crate::IoError;

/// Writes alignment outputs for one scenario.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{scenario}_path.csv` and
/// `{scenario}_align.json`.
pub struct PathWriter {
    output_dir: PathBuf,
    scenario: ScenarioId,
}

impl PathWriter {
    /// Create a new writer targeting the given directory and scenario.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), scenario = %scenario))]
    pub fn new(output_dir: &Path, scenario: ScenarioId) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            scenario,
        })
    }

    /// Path of the curve CSV this writer produces.
    #[must_use]
    pub fn curve_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_path.csv", self.scenario.as_str()))
    }

    /// Path of the JSON summary this writer produces.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_align.json", self.scenario.as_str()))
    }

    /// Write a warp curve to `{scenario}_path.csv`. The header names the
    /// unit (`a_frames,b_frames` or `a_seconds,b_seconds`) so a reader
    /// can restore the tag.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all, fields(points = curve.len(), unit = %curve.unit()))]
    pub fn write_curve(&self, curve: &WarpCurve) -> Result<PathBuf, IoError> {
        let path = self.curve_path();
        let write_err = |e: std::io::Error| IoError::WriteFile {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        let header = match curve.unit() {
            Unit::Frames => ["a_frames", "b_frames"],
            Unit::Seconds => ["a_seconds", "b_seconds"],
        };
        let record_err = |e: csv::Error| IoError::WriteFile {
            path: path.clone(),
            source: std::io::Error::other(e),
        };
        wtr.write_record(header).map_err(record_err)?;
        for &(a, b) in curve.points() {
            wtr.write_record([a.to_string(), b.to_string()])
                .map_err(record_err)?;
        }
        wtr.flush().map_err(write_err)?;

        info!(path = %path.display(), "warp curve written");
        Ok(path)
    }

    /// Write the JSON summary artifact to `{scenario}_align.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_summary(&self, summary: &AlignSummary) -> Result<PathBuf, IoError> {
        let path = self.summary_path();
        let json = serde_json::to_string_pretty(summary).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "alignment summary written");
        Ok(path)
    }
}
