//! Error types for the journey history pipeline.
//!
//! Import and discovery failures are fatal and propagate straight to the
//! caller. Per-row timestamp problems are never errors: incomplete journeys
//! flow through with null derived fields.
//!
//! Errors serialize as `{ "code", "message" }` so the CLI can emit them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the journey history pipeline.
#[derive(Error, Debug)]
pub enum JourneyError {
    /// A file or folder could not be read or parsed as CSV.
    #[error("Failed to import '{}': {reason}", .path.display())]
    Import { path: PathBuf, reason: String },

    /// Discovery matched no files.
    #[error("No files matching '*{pattern}*.csv' found in '{}'", .folder.display())]
    NoFilesFound { folder: PathBuf, pattern: String },

    /// A rail-journey description could not be split into two station names.
    #[error("Cannot split journey description at row {row} into two stations: '{action}'")]
    Classification { row: usize, action: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A station pattern failed to compile.
    #[error("Invalid station pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Duration histogram could not be rendered.
    #[error("Failed to render duration histogram: {0}")]
    Visualization(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<JourneyError>,
    },
}

impl JourneyError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        JourneyError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an [`JourneyError::Import`] failure.
    pub fn import(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        JourneyError::Import {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable code, used by the CLI's JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Import { .. } => "IMPORT_ERROR",
            Self::NoFilesFound { .. } => "NO_FILES_FOUND",
            Self::Classification { .. } => "CLASSIFICATION_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Visualization(_) => "VISUALIZATION_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the run can be retried after the user changes their input
    /// (a different folder, pattern or option) rather than their data.
    pub fn is_user_input(&self) -> bool {
        match self {
            Self::NoFilesFound { .. } | Self::InvalidPattern { .. } | Self::InvalidConfig(_) => {
                true
            }
            Self::WithContext { source, .. } => source.is_user_input(),
            _ => false,
        }
    }
}

impl Serialize for JourneyError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("JourneyError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for journey history operations.
pub type Result<T> = std::result::Result<T, JourneyError>;

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

static_assertions::assert_impl_all!(JourneyError: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let error = JourneyError::NoFilesFound {
            folder: PathBuf::from("data"),
            pattern: "journeys".to_string(),
        };
        assert_eq!(error.error_code(), "NO_FILES_FOUND");
        assert_eq!(
            JourneyError::ColumnNotFound("Date".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_no_files_message_names_folder_and_pattern() {
        let error = JourneyError::NoFilesFound {
            folder: PathBuf::from("exports"),
            pattern: "journeys".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("exports"));
        assert!(message.contains("*journeys*.csv"));
    }

    #[test]
    fn test_is_user_input() {
        assert!(JourneyError::InvalidConfig("x".to_string()).is_user_input());
        assert!(
            JourneyError::InvalidConfig("x".to_string())
                .with_context("loading")
                .is_user_input()
        );
        assert!(!JourneyError::import("a.csv", "missing").is_user_input());
    }

    #[test]
    fn test_error_serialization() {
        let error = JourneyError::Classification {
            row: 3,
            action: "A to B to C".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("CLASSIFICATION_ERROR"));
        assert!(json.contains("A to B to C"));
    }

    #[test]
    fn test_json_error_code() {
        let error: JourneyError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(error.error_code(), "JSON_ERROR");
        assert!(!error.is_user_input());
    }

    #[test]
    fn test_with_context() {
        let error = JourneyError::import("data/x_journeys.csv", "not found")
            .with_context("While loading corpus");
        assert!(error.to_string().contains("While loading corpus"));
        assert_eq!(error.error_code(), "IMPORT_ERROR");
    }
}
