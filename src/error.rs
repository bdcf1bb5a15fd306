//! Field-level issues recovered while enriching records.

use thiserror::Error;

/// A malformed field that was degraded to a null value.
///
/// None of these abort a pipeline run; they are collected per record so the
/// caller can report data quality.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldIssue {
    /// Text that could not be parsed into the field's type
    #[error("{field} value {value:?} could not be parsed")]
    ParseFailure { field: &'static str, value: String },

    /// Numeric value outside the domain of a binning rule
    #[error("{field} value {value} is out of range ({min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl FieldIssue {
    /// Name of the source column the issue was found in.
    pub fn field(&self) -> &'static str {
        match self {
            FieldIssue::ParseFailure { field, .. } | FieldIssue::OutOfRange { field, .. } => field,
        }
    }
}
