//! I/O error types for maestro-io.

use std::path::PathBuf;

use maestro_dtw::{CurveError, FeatureError};

/// Errors from file I/O, CSV parsing, and artifact serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or unparseable.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a path CSV header does not name a recognized unit.
    #[error("unrecognized path unit in {path}: header \"{header}\" (expected a_frames,b_frames or a_seconds,b_seconds)")]
    UnknownUnit {
        /// Path to the CSV file.
        path: PathBuf,
        /// The offending header line.
        header: String,
    },

    /// Returned when parsed features fail engine-side validation.
    #[error("invalid feature data in {path}")]
    InvalidFeatures {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying validation error.
        source: FeatureError,
    },

    /// Returned when a parsed warp curve fails engine-side validation
    /// (non-monotonic or non-finite coordinates).
    #[error("invalid warp curve in {path}")]
    InvalidCurve {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying validation error.
        source: CurveError,
    },

    /// Returned when the scenario name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid scenario id \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidScenarioId {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
