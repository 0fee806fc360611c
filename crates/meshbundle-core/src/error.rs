//! Unified error handling for meshbundle
//!
//! This module provides the error taxonomy shared by the export and
//! import pipelines. Leaf failures are usually logged and swallowed by
//! the walkers; the variants here surface when a whole call aborts.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all meshbundle operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Argument Errors ====================

    /// A required input was null or empty
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
    },

    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file or directory not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Directory could not be created
    #[error("Failed to create directory: {0}")]
    CreateDirectory(PathBuf),

    /// File could not be written
    #[error("Failed to write {path}: {message}")]
    WriteFailed {
        path: PathBuf,
        message: String,
    },

    // ==================== Format Errors ====================

    /// File has the wrong extension for the requested operation
    #[error("Unsupported format: {path} (expected .{expected})")]
    UnsupportedFormat {
        path: PathBuf,
        expected: String,
    },

    /// Malformed JSON manifest
    #[error("Parse error in {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
    },

    // ==================== Pipeline Errors ====================

    /// An external exporter, importer or codec reported errors
    #[error("{tool} failed: {}", .errors.join("; "))]
    ExternalToolFailure {
        tool: String,
        errors: Vec<String>,
    },

    /// Nothing to process (no mesh components, no imported objects)
    #[error("No content: {message}")]
    NoContent {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a no content error
    pub fn no_content(message: impl Into<String>) -> Self {
        Error::NoContent {
            message: message.into(),
        }
    }

    /// Create an external tool failure from a list of reported errors
    pub fn external(tool: impl Into<String>, errors: Vec<String>) -> Self {
        Error::ExternalToolFailure {
            tool: tool.into(),
            errors,
        }
    }

    /// Create a parse error for the given file
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Innermost error, skipping context wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound(_))
    }

    /// Check if this is an I/O class error
    pub fn is_io_error(&self) -> bool {
        matches!(
            self.root(),
            Error::Io(_) | Error::CreateDirectory(_) | Error::WriteFailed { .. }
        )
    }

    /// Check if this is a parse/format error
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.root(),
            Error::Parse { .. } | Error::UnsupportedFormat { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
