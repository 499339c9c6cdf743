//! Error types for the trade-guard validation engine.
//!
//! Every fallible stage returns [`GuardError`]. The orchestrator is the only
//! place that decides whether an error aborts a run; quality findings are
//! never errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for trade-guard.
///
/// Variants fall into three groups: the input could not be read, the input
/// is not a recognized export, or the export could not be loaded into a
/// [`Dataset`](crate::core::Dataset).
#[derive(Error, Debug)]
pub enum GuardError {
    /// The input file could not be opened or read.
    #[error("Cannot read file: {path}: {source}")]
    UnreadableFile {
        /// Path that was being read
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line contained none of the known header tokens.
    #[error("Invalid CSV format - missing required headers")]
    UnrecognizedFormat,

    /// A column required for loading is not in the header.
    #[error("Column '{column}' not found in dataset")]
    MissingColumn { column: String },

    /// A required timestamp was empty or could not be parsed.
    #[error("Invalid timestamp '{value}' on line {line}")]
    InvalidTimestamp {
        /// 1-based line number in the loaded text
        line: usize,
        /// The raw cell content
        value: String,
    },

    /// Malformed CSV record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The row-transform collaborator failed.
    #[error("Row transform failed: {message}")]
    Transform {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations outside of the initial file read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid validator configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, GuardError>`.
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates an unreadable-file error.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a transform error without an underlying cause.
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transform error wrapping an underlying cause.
    pub fn transform_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Transform {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true for errors raised before any data was loaded: the file
    /// could not be read or its header was not recognized.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            GuardError::UnreadableFile { .. } | GuardError::UnrecognizedFormat
        )
    }

    /// Renders the error the way it appears in a report's error list.
    pub fn to_finding_message(&self) -> String {
        match self {
            GuardError::UnreadableFile { source, .. } => format!("Cannot read file: {source}"),
            GuardError::UnrecognizedFormat => self.to_string(),
            other => format!("Error loading data: {other}"),
        }
    }
}
