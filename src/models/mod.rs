//! Domain models for the overload pay pipeline.
//!
//! This module contains the core data structures passed between pipeline
//! stages:
//!
//! - [`SectionRecord`] - one course section with computed capacity/overload/pay
//! - [`SubtotalRecord`] - synthetic per-staff subtotal row
//! - [`OutputRow`] - tagged union of the two row kinds in the final table
//! - [`ProcessedTable`] - ordered output headers, rows, and run statistics
//! - [`Cell`] - a rendered output cell, ready for the exporter

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rules::{
    CURRENCY_SYMBOL, COL_COURSE_TITLE, COL_STAFF_NAME, COL_TOTAL_STUDENTS, OUTPUT_COLUMNS,
};

// =============================================================================
// Capacity / Overload / Pay
// =============================================================================

/// Base and max student capacity assigned from the course title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capacity {
    /// Base teaching capacity.
    pub base: i64,
    /// Max capacity ceiling before premium pay.
    pub max: i64,
}

impl Capacity {
    /// No tier matched; the row carries zero capacity and zero overload.
    pub const ZERO: Capacity = Capacity { base: 0, max: 0 };
}

/// Overload counts derived from enrollment vs. assigned capacity.
///
/// All three counts are clamped to be non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overload {
    /// Students beyond base capacity.
    pub total: i64,
    /// Portion billed at base rate.
    pub base: i64,
    /// Portion beyond max capacity, billed at premium rate.
    pub max: i64,
}

/// Numeric pay figures for one section.
///
/// Kept numeric through the pipeline; currency strings are produced only at
/// render time and never parsed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaySummary {
    /// Pay for the base-rate overload portion.
    pub base_pay: f64,
    /// Pay for the premium-rate overload portion.
    pub max_pay: f64,
    /// Combined figure converted to a monthly amount.
    pub monthly_total: f64,
}

/// Render a monetary amount as a currency string: symbol prefix, exactly
/// two decimal places.
pub fn format_currency(amount: f64) -> String {
    format!("{}{:.2}", CURRENCY_SYMBOL, amount)
}

// =============================================================================
// Section Record
// =============================================================================

/// One course-section row of the working table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionRecord {
    /// Free-text course title; drives filtering and classification.
    pub course_title: String,
    /// Staff member teaching the section; drives grouping.
    pub staff_name: String,
    /// Enrollment count.
    pub total_students: i64,
    /// Passthrough columns preserved verbatim, keyed by header.
    pub extra: Map<String, Value>,
    /// Capacity tier assigned by the classifier.
    pub capacity: Capacity,
    /// Overload counts.
    pub overload: Overload,
    /// Pay figures.
    pub pay: PaySummary,
}

// =============================================================================
// Subtotal Record
// =============================================================================

/// Synthetic row summarizing one staff member's overload.
///
/// Subtotal rows are terminal artifacts: they are never filtered,
/// classified, or re-summed, and every column other than the staff name and
/// the two overload sums stays blank.
#[derive(Debug, Clone, Serialize)]
pub struct SubtotalRecord {
    /// The staff member this subtotal belongs to.
    pub staff_name: String,
    /// Sum of base overload across the staff member's sections.
    pub base_overload: i64,
    /// Sum of max overload across the staff member's sections.
    pub max_overload: i64,
}

// =============================================================================
// Output Row
// =============================================================================

/// A row of the final table: either real section data or a subtotal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRow {
    /// A course-section data row.
    Section(SectionRecord),
    /// A per-staff subtotal row.
    Subtotal(SubtotalRecord),
}

// =============================================================================
// Rendered cells
// =============================================================================

/// A rendered output cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Text content, including pre-formatted currency strings.
    Text(String),
    /// An integer count.
    Int(i64),
    /// A blank cell.
    Empty,
}

impl Cell {
    fn from_value(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) if s.is_empty() => Cell::Empty,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => Cell::Text(n.to_string()),
            },
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl OutputRow {
    /// Render this row against the table's passthrough headers.
    ///
    /// `passthrough` excludes the computed columns, which are appended in
    /// their fixed order.
    pub fn render(&self, passthrough: &[String]) -> Vec<Cell> {
        match self {
            OutputRow::Section(section) => section.render(passthrough),
            OutputRow::Subtotal(subtotal) => subtotal.render(passthrough),
        }
    }
}

impl SectionRecord {
    fn render(&self, passthrough: &[String]) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(passthrough.len() + OUTPUT_COLUMNS.len());
        for header in passthrough {
            let cell = match header.as_str() {
                COL_COURSE_TITLE => Cell::Text(self.course_title.clone()),
                COL_STAFF_NAME => Cell::Text(self.staff_name.clone()),
                COL_TOTAL_STUDENTS => Cell::Int(self.total_students),
                other => self
                    .extra
                    .get(other)
                    .map(Cell::from_value)
                    .unwrap_or(Cell::Empty),
            };
            cells.push(cell);
        }
        cells.push(Cell::Int(self.capacity.base));
        cells.push(Cell::Int(self.capacity.max));
        cells.push(Cell::Int(self.overload.total));
        cells.push(Cell::Int(self.overload.base));
        cells.push(Cell::Int(self.overload.max));
        cells.push(Cell::Text(format_currency(self.pay.base_pay)));
        cells.push(Cell::Text(format_currency(self.pay.max_pay)));
        cells.push(Cell::Text(format_currency(self.pay.monthly_total)));
        cells
    }
}

impl SubtotalRecord {
    fn render(&self, passthrough: &[String]) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(passthrough.len() + OUTPUT_COLUMNS.len());
        for header in passthrough {
            if header == COL_STAFF_NAME {
                cells.push(Cell::Text(self.staff_name.clone()));
            } else {
                cells.push(Cell::Empty);
            }
        }
        for column in OUTPUT_COLUMNS {
            match *column {
                "Base Overload" => cells.push(Cell::Int(self.base_overload)),
                "Max Overload" => cells.push(Cell::Int(self.max_overload)),
                _ => cells.push(Cell::Empty),
            }
        }
        cells
    }
}

// =============================================================================
// Processed table
// =============================================================================

/// Statistics from one pipeline run, surfaced in reports and logs.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProcessStats {
    /// Rows in the input table.
    pub rows_in: usize,
    /// Rows surviving the keyword + nonzero filter.
    pub rows_kept: usize,
    /// Kept rows whose title matched no capacity tier.
    pub unclassified: usize,
    /// Distinct staff members in the output.
    pub staff_count: usize,
}

/// The final ordered table handed to the exporter.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedTable {
    /// Passthrough headers (input headers minus pruned columns).
    pub passthrough: Vec<String>,
    /// Data rows interleaved with subtotal rows, in output order.
    pub rows: Vec<OutputRow>,
    /// Run statistics.
    pub stats: ProcessStats,
}

impl ProcessedTable {
    /// All output headers: passthrough columns followed by the computed
    /// columns in their fixed order.
    pub fn headers(&self) -> Vec<String> {
        self.passthrough
            .iter()
            .cloned()
            .chain(OUTPUT_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Render every row to cells in header order.
    pub fn to_grid(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| row.render(&self.passthrough))
            .collect()
    }
}
