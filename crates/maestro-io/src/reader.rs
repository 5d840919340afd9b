//! CSV readers for feature matrices and warp curves.

use std::path::{Path, PathBuf};

use maestro_dtw::{FeatureMatrix, Unit, WarpCurve};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a feature matrix from a CSV file.
///
/// Expected CSV format:
/// - Header row required, one column per feature dimension (`f0,f1,...`)
/// - One row per frame, all rows the same width as the header
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row width differs from header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable |
pub struct FeatureReader {
    path: PathBuf,
}

impl FeatureReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`FeatureMatrix`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<FeatureMatrix, IoError> {
        let mut rdr = open_csv(&self.path)?;

        let header = rdr.headers().map_err(|e| csv_parse(&self.path, e))?;
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_parse(&self.path, e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }
            let mut row = Vec::with_capacity(expected_cols);
            for col_index in 0..record.len() {
                row.push(parse_cell(&self.path, &record, row_index, col_index)?);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let n_frames = rows.len();
        let matrix = FeatureMatrix::from_rows(rows).map_err(|e| IoError::InvalidFeatures {
            path: self.path.clone(),
            source: e,
        })?;

        info!(n_frames, dim = matrix.dim(), "feature matrix loaded");
        Ok(matrix)
    }
}

/// Reads a warp curve from a path CSV written by
/// [`PathWriter`](crate::PathWriter).
///
/// Expected CSV format: header `a_frames,b_frames` or
/// `a_seconds,b_seconds`, then one `(a, b)` pair per row. The header
/// suffix determines the curve's unit tag.
pub struct CurveReader {
    path: PathBuf,
}

impl CurveReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a unit-tagged [`WarpCurve`].
    ///
    /// # Errors
    ///
    /// Same file/parse taxonomy as [`FeatureReader::read`], plus
    /// [`IoError::UnknownUnit`] for an unrecognized header and
    /// [`IoError::InvalidCurve`] when the points fail monotonicity
    /// validation.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<WarpCurve, IoError> {
        let mut rdr = open_csv(&self.path)?;

        let header = rdr.headers().map_err(|e| csv_parse(&self.path, e))?;
        let header_line = header.iter().collect::<Vec<_>>().join(",");
        let unit = match header_line.as_str() {
            "a_frames,b_frames" => Unit::Frames,
            "a_seconds,b_seconds" => Unit::Seconds,
            _ => {
                return Err(IoError::UnknownUnit {
                    path: self.path.clone(),
                    header: header_line,
                });
            }
        };

        let mut points: Vec<(f64, f64)> = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| csv_parse(&self.path, e))?;
            if record.len() != 2 {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: 2,
                    got: record.len(),
                });
            }
            let a = parse_cell(&self.path, &record, row_index, 0)?;
            let b = parse_cell(&self.path, &record, row_index, 1)?;
            points.push((a, b));
        }

        if points.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let curve = WarpCurve::new(points, unit).map_err(|e| IoError::InvalidCurve {
            path: self.path.clone(),
            source: e,
        })?;

        info!(points = curve.len(), unit = %curve.unit(), "warp curve loaded");
        Ok(curve)
    }
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>, IoError> {
    let file = std::fs::File::open(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    // flexible(true) lets our own InconsistentRowLength check fire instead
    // of a low-level CsvParse error.
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn csv_parse(path: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: path.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

fn parse_cell(
    path: &Path,
    record: &csv::StringRecord,
    row_index: usize,
    col_index: usize,
) -> Result<f64, IoError> {
    let raw = record.get(col_index).unwrap_or("");
    let value: f64 = raw.parse().map_err(|_| IoError::NonFiniteValue {
        path: path.to_path_buf(),
        row_index,
        col_index,
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(IoError::NonFiniteValue {
            path: path.to_path_buf(),
            row_index,
            col_index,
            raw: raw.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_features() {
        let csv = "f0,f1,f2\n1.0,0.0,0.5\n0.0,1.0,0.5\n0.5,0.5,0.5\n";
        let f = write_csv(csv);
        let m = FeatureReader::new(f.path()).read().unwrap();
        assert_eq!(m.n_frames(), 3);
        assert_eq!(m.dim(), 3);
        assert_eq!(m.frame(0), &[1.0, 0.0, 0.5]);
    }

    #[test]
    fn feature_error_file_not_found() {
        let result = FeatureReader::new(Path::new("/nonexistent/features.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn feature_error_empty_dataset() {
        let f = write_csv("f0,f1\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn feature_error_ragged_row() {
        let f = write_csv("f0,f1\n1.0,2.0\n3.0\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, got: 1, .. })
        ));
    }

    #[test]
    fn feature_error_nan_cell() {
        let f = write_csv("f0,f1\n1.0,NaN\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { row_index: 0, col_index: 1, .. })
        ));
    }

    #[test]
    fn feature_error_unparseable_cell() {
        let f = write_csv("f0,f1\n1.0,abc\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { .. })));
    }

    #[test]
    fn read_frames_curve() {
        let f = write_csv("a_frames,b_frames\n0,0\n1,2\n2,4\n");
        let curve = CurveReader::new(f.path()).read().unwrap();
        assert_eq!(curve.unit(), Unit::Frames);
        assert_eq!(curve.points(), &[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0)]);
    }

    #[test]
    fn read_seconds_curve() {
        let f = write_csv("a_seconds,b_seconds\n0.0,0.0\n0.5,1.0\n");
        let curve = CurveReader::new(f.path()).read().unwrap();
        assert_eq!(curve.unit(), Unit::Seconds);
    }

    #[test]
    fn curve_error_unknown_unit() {
        let f = write_csv("x,y\n0,0\n1,1\n");
        let result = CurveReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::UnknownUnit { .. })));
    }

    #[test]
    fn curve_error_non_monotonic() {
        let f = write_csv("a_frames,b_frames\n0,0\n2,2\n1,3\n");
        let result = CurveReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::InvalidCurve { .. })));
    }

    #[test]
    fn curve_error_wrong_column_count() {
        let f = write_csv("a_frames,b_frames\n0,0,0\n");
        let result = CurveReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { expected: 2, got: 3, .. })
        ));
    }
}
