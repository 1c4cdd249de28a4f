//! Error types for the Promoview summary pipeline.
//!
//! - [`CsvError`] - reading, decoding and tokenizing the upload
//! - [`SchemaError`] - required columns missing after normalization
//! - [`ParseError`] - a financial cell that is not a number
//! - [`ValidationError`] - output rows violating the embedded schema
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or tokenizing a CSV upload.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Row could not be tokenized.
    #[error("Invalid CSV format at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Required columns absent after header normalization.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Normalized names of every missing column, in declaration order.
    pub missing: Vec<String>,
}

// =============================================================================
// Value Parse Errors
// =============================================================================

/// A financial cell holding something that is neither null nor a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors from output schema validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A row does not match its schema.
    #[error("{kind} {index} failed validation: {}", .errors.join("; "))]
    Row {
        kind: &'static str,
        index: usize,
        errors: Vec<String>,
    },

    /// The embedded schema itself could not be compiled.
    #[error("Invalid embedded schema: {0}")]
    InvalidSchema(String),

    /// Serialization of a row failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::summarize_csv`]
/// and friends. Any variant means the whole computation was aborted.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Required columns missing.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Non-numeric financial value.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Output failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No data rows after loading.
    #[error("No records to summarize")]
    EmptyInput,

    /// A total left the range of `f64` because the inputs are too large.
    #[error("Totals for {group} are too large to represent")]
    Overflow { group: String },

    /// IO error outside of CSV reading (output files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the failure was caused by the uploaded content itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Csv(_)
                | PipelineError::Schema(_)
                | PipelineError::Parse(_)
                | PipelineError::EmptyInput
                | PipelineError::Overflow { .. }
        )
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // SchemaError -> PipelineError
        let schema_err = SchemaError {
            missing: vec!["cod_canal".into(), "cod_ciclo".into()],
        };
        let pipeline_err: PipelineError = schema_err.into();
        assert!(pipeline_err.to_string().contains("cod_canal, cod_ciclo"));
        assert!(pipeline_err.is_input_error());
    }

    #[test]
    fn test_parse_error_format() {
        let err = ParseError::new(5, "not a number")
            .with_column("vlr_preco_base")
            .with_value("abc");

        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'vlr_preco_base'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_validation_error_is_not_input_error() {
        let err = ValidationError::Row {
            kind: "Summary row",
            index: 3,
            errors: vec!["null is not of type \"number\"".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Summary row 3"));

        let pipeline_err: PipelineError = err.into();
        assert!(!pipeline_err.is_input_error());
    }

    #[test]
    fn test_overflow_is_input_error() {
        let err = PipelineError::Overflow {
            group: "A/X/202401".into(),
        };
        assert!(err.is_input_error());
        assert!(err.to_string().contains("A/X/202401"));
    }
}
