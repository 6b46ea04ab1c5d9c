//! High-level pipeline API.
//!
//! Chains every stage for one input file: load, prune, validate, filter,
//! classify, compute overload and pay, group by staff. Batch processing
//! runs files independently so one malformed upload never takes down its
//! siblings.
//!
//! # Example
//!
//! ```rust,ignore
//! use overcalc::transform::pipeline::process_file;
//!
//! let table = process_file("roster.xlsx")?;
//! println!("{} output rows", table.rows.len());
//! ```

use std::path::Path;

use serde_json::Value;

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ProcessStats, ProcessedTable, SectionRecord};
use crate::parser::{load_table_bytes, load_table_file, RosterTable};
use crate::rules::{
    classify_title, COL_COURSE_TITLE, COL_STAFF_NAME, COL_TOTAL_STUDENTS, REQUIRED_COLUMNS,
};
use crate::transform::filter::{filter_sections, prune_columns};
use crate::transform::grouper::{distinct_staff, group_by_staff};
use crate::transform::overload::{compute_overload, compute_pay};

// =============================================================================
// Single-file pipeline
// =============================================================================

/// Process an already-loaded table through every stage.
pub fn process_table(table: RosterTable) -> PipelineResult<ProcessedTable> {
    let rows_in = table.records.len();
    log_info(format!("Read {} rows, {} columns", rows_in, table.headers.len()));

    let table = prune_columns(table);
    validate_headers(&table)?;

    let sections = build_sections(&table)?;
    let sections = filter_sections(sections);
    let rows_kept = sections.len();
    log_success(format!(
        "{} of {} rows qualify for overload pay",
        rows_kept, rows_in
    ));

    let sections: Vec<SectionRecord> = sections.into_iter().map(compute_section).collect();
    let unclassified = sections
        .iter()
        .filter(|s| s.capacity == crate::models::Capacity::ZERO)
        .count();
    if unclassified > 0 {
        log_warning(format!(
            "{} rows matched no capacity tier (kept with zero capacity)",
            unclassified
        ));
    }

    let rows = group_by_staff(sections);
    let staff_count = distinct_staff(&rows);
    log_success(format!("Grouped into {} staff subtotals", staff_count));

    Ok(ProcessedTable {
        passthrough: table.headers,
        rows,
        stats: ProcessStats {
            rows_in,
            rows_kept,
            unclassified,
            staff_count,
        },
    })
}

/// Process raw upload bytes; the file name picks the loader.
pub fn process_bytes(file_name: &str, bytes: &[u8]) -> PipelineResult<ProcessedTable> {
    let table = load_table_bytes(file_name, bytes)?;
    process_table(table)
}

/// Process a file on disk.
pub fn process_file<P: AsRef<Path>>(path: P) -> PipelineResult<ProcessedTable> {
    let table = load_table_file(path)?;
    process_table(table)
}

/// Classify one section and fill in its overload and pay figures.
fn compute_section(mut section: SectionRecord) -> SectionRecord {
    section.capacity = classify_title(&section.course_title);
    section.overload = compute_overload(section.total_students, section.capacity);
    section.pay = compute_pay(section.overload);
    section
}

/// Fail fast when a required column is absent.
fn validate_headers(table: &RosterTable) -> PipelineResult<()> {
    for column in REQUIRED_COLUMNS {
        if !table.headers.iter().any(|h| h == column) {
            return Err(PipelineError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

/// Convert raw records into typed sections.
///
/// The enrollment column must be numeric in every row; anything else fails
/// the whole file. A missing or blank course title is legal and simply
/// never matches the filter.
fn build_sections(table: &RosterTable) -> PipelineResult<Vec<SectionRecord>> {
    let mut sections = Vec::with_capacity(table.records.len());

    for (idx, record) in table.records.iter().enumerate() {
        let course_title = string_field(record.get(COL_COURSE_TITLE));
        let staff_name = string_field(record.get(COL_STAFF_NAME));

        let raw_students = record.get(COL_TOTAL_STUDENTS);
        let total_students =
            numeric_field(raw_students).ok_or_else(|| PipelineError::NonNumeric {
                // +2: one for the header row, one for 1-based numbering.
                row: idx + 2,
                column: COL_TOTAL_STUDENTS.to_string(),
                value: raw_students.map(display_value).unwrap_or_default(),
            })?;

        let extra = record
            .iter()
            .filter(|(key, _)| !REQUIRED_COLUMNS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        sections.push(SectionRecord {
            course_title,
            staff_name,
            total_students,
            extra,
            ..Default::default()
        });
    }

    Ok(sections)
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Read a count cell. Blank cells count as zero (the nonzero filter drops
/// them); non-numeric text is a hard error.
fn numeric_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0);
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
        }
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Batch processing
// =============================================================================

/// One input file of a batch run.
#[derive(Debug, Clone)]
pub struct NamedInput {
    /// Original file name (drives loader dispatch and reporting).
    pub name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// The per-file result of a batch run: processed table or failure reason.
#[derive(Debug)]
pub struct FileOutcome {
    /// Original file name.
    pub name: String,
    /// Success with the processed table, or the error that stopped the file.
    pub result: PipelineResult<ProcessedTable>,
}

/// All per-file outcomes of one batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Outcomes in input order.
    pub files: Vec<FileOutcome>,
}

impl BatchOutcome {
    /// Successfully processed files, in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &ProcessedTable)> {
        self.files.iter().filter_map(|file| {
            file.result
                .as_ref()
                .ok()
                .map(|table| (file.name.as_str(), table))
        })
    }

    /// Failed files with their error messages, in input order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.files.iter().filter_map(|file| {
            file.result
                .as_ref()
                .err()
                .map(|err| (file.name.as_str(), err.to_string()))
        })
    }

    /// True when not a single file processed cleanly.
    pub fn all_failed(&self) -> bool {
        !self.files.is_empty() && self.successes().next().is_none()
    }
}

/// Process a batch of uploads, isolating failures per file.
pub fn process_batch(inputs: Vec<NamedInput>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for input in inputs {
        log_info(format!("Processing {}", input.name));
        let result = process_bytes(&input.name, &input.bytes);
        match &result {
            Ok(table) => log_success(format!(
                "{}: {} output rows",
                input.name,
                table.rows.len()
            )),
            Err(err) => log_error(format!("{}: {}", input.name, err)),
        }
        outcome.files.push(FileOutcome {
            name: input.name,
            result,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, OutputRow};
    use crate::parser::parse_csv_bytes;

    const ROSTER: &str = "\
Course Title,Staff Name,Total Students,C,Room
MUSIC GR 2,Smith,27,x,12B
ALGEBRA 1,Nguyen,30,x,3A
ART 4,Jones,30,x,7C
KINDER A,Smith,20,x,1A
PHYS ED 5,Jones,0,x,GYM
";

    fn load(csv: &str) -> RosterTable {
        parse_csv_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_end_to_end() {
        let table = process_table(load(ROSTER)).unwrap();

        // Column C pruned, Room passed through.
        assert_eq!(
            table.passthrough,
            vec!["Course Title", "Staff Name", "Total Students", "Room"]
        );

        // ALGEBRA dropped (keyword), PHYS ED 5 dropped (zero enrollment):
        // 3 kept rows + 2 staff subtotals.
        assert_eq!(table.stats.rows_kept, 3);
        assert_eq!(table.stats.staff_count, 2);
        assert_eq!(table.rows.len(), 5);

        // Jones sorts before Smith.
        match &table.rows[0] {
            OutputRow::Section(s) => {
                assert_eq!(s.staff_name, "Jones");
                assert_eq!(s.course_title, "ART 4");
                // 30 students in a 26/28 section.
                assert_eq!(s.overload.total, 4);
                assert_eq!(s.overload.max, 2);
                assert_eq!(s.overload.base, 2);
            }
            _ => panic!("expected a section row first"),
        }
    }

    #[test]
    fn test_rendered_currency_cells() {
        let table = process_table(load(ROSTER)).unwrap();
        let grid = table.to_grid();
        let headers = table.headers();
        let pay_col = headers
            .iter()
            .position(|h| h == "Total Monthly Overload")
            .unwrap();

        // Jones / ART 4: (2 + 2*1.5) * 30 / 8 = 18.75
        assert_eq!(grid[0][pay_col], Cell::Text("$18.75".into()));
        // Jones subtotal leaves pay blank.
        assert_eq!(grid[1][pay_col], Cell::Empty);
    }

    #[test]
    fn test_missing_required_column() {
        let result = process_table(load("Course Title,Total Students\nMUSIC 1,20\n"));
        match result {
            Err(PipelineError::MissingColumn(col)) => assert_eq!(col, "Staff Name"),
            other => panic!("expected MissingColumn, got {:?}", other.map(|t| t.rows.len())),
        }
    }

    #[test]
    fn test_non_numeric_enrollment_fails_file() {
        let csv = "Course Title,Staff Name,Total Students\nMUSIC 1,Smith,twenty\n";
        let result = process_table(load(csv));
        match result {
            Err(PipelineError::NonNumeric { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Total Students");
                assert_eq!(value, "twenty");
            }
            other => panic!("expected NonNumeric, got {:?}", other.map(|t| t.rows.len())),
        }
    }

    #[test]
    fn test_blank_enrollment_treated_as_zero() {
        let csv = "Course Title,Staff Name,Total Students\nMUSIC 1,Smith,\n";
        let table = process_table(load(csv)).unwrap();
        // Blank count reads as 0 and the nonzero filter drops the row.
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let csv = "Course Title,Staff Name,Total Students\nALGEBRA 1,Smith,30\n";
        let table = process_table(load(csv)).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.stats.rows_in, 1);
        assert_eq!(table.stats.rows_kept, 0);
        // Header row survives for the exporter.
        assert!(!table.headers().is_empty());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let table = process_table(load(ROSTER)).unwrap();
        for row in &table.rows {
            if let OutputRow::Section(section) = row {
                let again = compute_section(section.clone());
                assert_eq!(again.capacity, section.capacity);
                assert_eq!(again.overload, section.overload);
                assert_eq!(again.pay, section.pay);
            }
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = NamedInput {
            name: "good.csv".into(),
            bytes: ROSTER.as_bytes().to_vec(),
        };
        let bad = NamedInput {
            name: "bad.csv".into(),
            bytes: b"Course Title,Staff Name,Total Students\nMUSIC 1,Smith,oops\n".to_vec(),
        };

        let outcome = process_batch(vec![good, bad]);
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.successes().count(), 1);

        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "bad.csv");
        assert!(failures[0].1.contains("not numeric"));
        assert!(!outcome.all_failed());
    }
}
