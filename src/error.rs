//! Error types for u-scatter.

use thiserror::Error;

/// Coarse classification of a [`ScatterError`].
///
/// Callers that render user-facing messages usually branch on the kind and
/// read the variant fields for column names and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A requested column is missing, non-numeric, or an option is out of range.
    Validation,
    /// Fewer valid rows or points than the operation's minimum.
    InsufficientData,
    /// Zero-variance axis, collinear point set, or another undefined configuration.
    DegenerateInput,
    /// Unsupported or under-provisioned interpolation method.
    InterpolationMethod,
    /// The data source could not read or parse its input.
    Load,
    /// The logging sink could not be installed.
    Logging,
    /// A result could not be serialized.
    Serialization,
}

/// All errors produced by u-scatter operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScatterError {
    /// Column not found in the dataset.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Column is not numeric where numeric data is required.
    #[error("column '{column}' is not numeric (found {data_type})")]
    NonNumericColumn { column: String, data_type: String },

    /// Two columns share the same name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// An option value is outside its accepted range.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    /// Insufficient valid rows for the requested operation.
    #[error("columns [{}] have {actual} valid rows, need at least {min_required}", .columns.join(", "))]
    InsufficientData {
        columns: Vec<String>,
        min_required: usize,
        actual: usize,
    },

    /// The selected data does not define the requested quantity.
    #[error("degenerate input in [{}] ({sample_size} rows): {reason}", .columns.join(", "))]
    DegenerateInput {
        columns: Vec<String>,
        sample_size: usize,
        reason: String,
    },

    /// Interpolation method is unknown or lacks the samples it needs.
    #[error("interpolation method '{method}' rejected: {reason}")]
    InterpolationMethod { method: String, reason: String },

    /// CSV parsing failed.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    /// Column lengths disagree.
    #[error("expected {expected} rows, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The data source does not handle this file type.
    #[error("unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(String),

    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),

    /// A result could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ScatterError {
    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ColumnNotFound { .. }
            | Self::NonNumericColumn { .. }
            | Self::DuplicateColumn { .. }
            | Self::InvalidOption { .. } => ErrorKind::Validation,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::DegenerateInput { .. } => ErrorKind::DegenerateInput,
            Self::InterpolationMethod { .. } => ErrorKind::InterpolationMethod,
            Self::CsvParse { .. }
            | Self::DimensionMismatch { .. }
            | Self::UnsupportedFormat { .. }
            | Self::Io(_) => ErrorKind::Load,
            Self::Logging(_) => ErrorKind::Logging,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub(crate) fn insufficient(columns: &[&str], min_required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            min_required,
            actual,
        }
    }

    pub(crate) fn degenerate(columns: &[&str], sample_size: usize, reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            sample_size,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ScatterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ScatterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<std::fmt::Error> for ScatterError {
    fn from(e: std::fmt::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        let err = ScatterError::ColumnNotFound { name: "x".into() };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = ScatterError::insufficient(&["x", "y"], 2, 1);
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = ScatterError::degenerate(&["x"], 5, "zero variance");
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);

        let err = ScatterError::Io("gone".into());
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn messages_carry_columns_and_counts() {
        let err = ScatterError::insufficient(&["temp", "load"], 2, 1);
        assert_eq!(
            err.to_string(),
            "columns [temp, load] have 1 valid rows, need at least 2"
        );

        let err = ScatterError::degenerate(&["x", "y"], 4, "points are collinear");
        assert_eq!(
            err.to_string(),
            "degenerate input in [x, y] (4 rows): points are collinear"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: ScatterError = io.into();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.to_string().contains("missing.csv"));
    }
}
