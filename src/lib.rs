//! # Overcalc - overload pay calculation for course rosters
//!
//! Overcalc takes a district roster export (XLSX or CSV), keeps the course
//! sections that qualify for overload pay, computes the two-tier overload
//! split and pay figures, and writes a workbook grouped by staff member
//! with per-staff subtotal rows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Roster file │────▶│   Parser    │────▶│  Transform   │────▶│ XLSX output │
//! │ (xlsx/csv)  │     │ (auto-enc)  │     │ (rules+group)│     │ (subtotals) │
//! └─────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use overcalc::{process_file, write_workbook_file};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = process_file("roster.xlsx")?;
//!     write_workbook_file("Processed_roster.xlsx", &table)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (SectionRecord, OutputRow, ProcessedTable)
//! - [`rules`] - Business constants and the capacity tier table
//! - [`parser`] - Spreadsheet loading with auto-detection
//! - [`transform`] - Filtering, overload math, grouping, and the pipeline
//! - [`export`] - XLSX workbook writer
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod rules;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Export
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, LoadError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    format_currency, Capacity, Cell, OutputRow, Overload, PaySummary, ProcessStats,
    ProcessedTable, SectionRecord, SubtotalRecord,
};

// =============================================================================
// Re-exports - Rules
// =============================================================================

pub use rules::{classify_title, title_matches_keywords, CapacityTier, CAPACITY_TIERS};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    detect_delimiter, detect_encoding, load_table_bytes, load_table_file, parse_csv_bytes,
    parse_workbook_bytes, RosterTable, SourceInfo,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    process_batch, process_bytes, process_file, process_table, BatchOutcome, FileOutcome,
    NamedInput,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{batch_workbook_bytes, workbook_bytes, write_workbook_file};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, BatchMetadata, BatchResponse, FileReport};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
