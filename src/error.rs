//! Unified error hierarchy for hreff
//!
//! Every fatal condition of the activity pipeline surfaces as a [`HrEffError`].
//! Degenerate arithmetic (missing heart rate, zero denominators) is never an error:
//! it turns into a missing [`crate::measure::Measure`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all hreff operations
#[derive(Debug, Error)]
pub enum HrEffError {
    /// Activity export could not be loaded
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Transformed table could not be written
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while reading the activity export
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Row does not have the fixed column count
    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A cell could not be parsed into its column type
    #[error("Line {line}: invalid value {value:?} in column {column}: {reason}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    /// Underlying CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised while exporting the transformed table
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for hreff operations
pub type Result<T> = std::result::Result<T, HrEffError>;

impl HrEffError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HrEffError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Error,
            HrEffError::Import(_) => ErrorSeverity::Error,
            HrEffError::Configuration(_) => ErrorSeverity::Error,
            HrEffError::Export(ExportError::UnsupportedFormat(_)) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HrEffError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find activity export: {}", path.display())
            }
            HrEffError::Import(ImportError::ColumnCount { line, expected, .. }) => {
                format!(
                    "Activity export is malformed at line {}: every row needs {} columns.",
                    line, expected
                )
            }
            HrEffError::Export(ExportError::UnsupportedFormat(format)) => {
                format!("Unknown output format '{}'. Use table, csv or json.", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the run from completing
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = HrEffError::Import(ImportError::FileNotFound {
            path: PathBuf::from("../export.csv"),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err = HrEffError::Export(ExportError::UnsupportedFormat("pdf".to_string()));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_user_messages() {
        let err = HrEffError::Import(ImportError::FileNotFound {
            path: PathBuf::from("export.csv"),
        });
        assert!(err.user_message().contains("Could not find"));

        let err = HrEffError::Import(ImportError::ColumnCount {
            line: 3,
            expected: 14,
            found: 12,
        });
        assert!(err.user_message().contains("line 3"));
        assert!(err.to_string().contains("found 12"));
    }
}
