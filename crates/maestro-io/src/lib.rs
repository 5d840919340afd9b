//! File I/O and artifact serialization for the maestro pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{AlignSummary, ScenarioId};
pub use error::IoError;
pub use reader::{CurveReader, FeatureReader};
pub use writer::PathWriter;
