//! Custom error types for the missingness analyzer.
//!
//! This module provides the error hierarchy using `thiserror`. Bad parameters
//! and unknown columns get their own variants so callers can tell them apart
//! from failures inside polars.
//!
//! Errors are serializable, allowing them to be handed to a front end or
//! written into a JSON report as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for missingness analysis.
#[derive(Error, Debug)]
pub enum MissingnessError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A call parameter is outside its valid range.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MissingnessError>,
    },
}

impl MissingnessError {
    /// Build an [`MissingnessError::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        MissingnessError::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MissingnessError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the caller's arguments rather than
    /// by the data or the environment.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::InvalidParameter { .. } => true,
            Self::WithContext { source, .. } => source.is_caller_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for MissingnessError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("MissingnessError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for missingness operations.
pub type Result<T> = std::result::Result<T, MissingnessError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MissingnessError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            MissingnessError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            MissingnessError::invalid_parameter("support", 0.0, "must be in (0, 1]").error_code(),
            "INVALID_PARAMETER"
        );
    }

    #[test]
    fn test_is_caller_error() {
        assert!(MissingnessError::ColumnNotFound("x".to_string()).is_caller_error());
        assert!(MissingnessError::invalid_parameter("confidence", 2.0, "bad").is_caller_error());
        assert!(!MissingnessError::Io(std::io::Error::other("boom")).is_caller_error());
        assert!(
            MissingnessError::ColumnNotFound("x".to_string())
                .with_context("During counts")
                .is_caller_error()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = MissingnessError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_invalid_parameter_message() {
        let error = MissingnessError::invalid_parameter("support", 1.5, "must be in (0, 1]");
        let message = error.to_string();
        assert!(message.contains("support"));
        assert!(message.contains("1.5"));
    }

    #[test]
    fn test_with_context() {
        let error =
            MissingnessError::ColumnNotFound("test".to_string()).with_context("During pattern");
        assert!(error.to_string().contains("During pattern"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND"); // code of the wrapped error
    }
}
