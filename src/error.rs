//! Error types for the overload pay pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`LoadError`] - spreadsheet loading errors (I/O, encoding, shape)
//! - [`ExportError`] - workbook serialization errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while loading an input spreadsheet into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode text content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV shape.
    #[error("Invalid CSV format: {0}")]
    Csv(String),

    /// Failed to open or read a workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Workbook has no worksheets.
    #[error("Workbook contains no worksheets")]
    NoSheets,

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No column headers found")]
    NoHeaders,
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing the output workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Workbook write failed.
    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Failed to write output file.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`]
/// entry points. It wraps the stage errors and adds input-shape variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A required column is absent from the input.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The enrollment column holds a non-numeric value.
    #[error("Row {row}: column '{column}' is not numeric (value '{value}')")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
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

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
