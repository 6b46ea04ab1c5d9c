//! XLSX exporter for processed tables.
//!
//! Produces the downloadable workbook: one bold header row, data rows with
//! subtotal rows highlighted, numbers written as numbers and pre-formatted
//! currency strings written verbatim. Batch export places each input file
//! on its own worksheet.

use std::path::Path;

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use crate::error::ExportResult;
use crate::models::{Cell, OutputRow, ProcessedTable};

/// Excel's hard limit on worksheet name length.
const SHEET_NAME_MAX: usize = 31;

/// Default worksheet name for single-file export.
const DEFAULT_SHEET: &str = "Overload";

/// Reusable cell formats.
struct ExportFormats {
    header: Format,
    body: Format,
    subtotal: Format,
}

impl ExportFormats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let body = Format::new().set_border(FormatBorder::Thin);

        let subtotal = Format::new()
            .set_bold()
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        ExportFormats {
            header,
            body,
            subtotal,
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Serialize one processed table to workbook bytes.
pub fn workbook_bytes(table: &ProcessedTable) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = ExportFormats::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(DEFAULT_SHEET)?;
    write_table(worksheet, table, &formats)?;
    Ok(workbook.save_to_buffer()?)
}

/// Serialize a batch to workbook bytes, one worksheet per input file.
///
/// Sheet names are derived from the file names, sanitized and de-duplicated.
pub fn batch_workbook_bytes(tables: &[(&str, &ProcessedTable)]) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = ExportFormats::new();
    let mut used_names: Vec<String> = Vec::new();

    for (file_name, table) in tables {
        let base = sanitize_sheet_name(file_name);
        let name = unique_sheet_name(&base, &used_names);
        used_names.push(name.clone());

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_table(worksheet, table, &formats)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write one processed table to a workbook file on disk.
pub fn write_workbook_file<P: AsRef<Path>>(path: P, table: &ProcessedTable) -> ExportResult<()> {
    let mut workbook = Workbook::new();
    let formats = ExportFormats::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(DEFAULT_SHEET)?;
    write_table(worksheet, table, &formats)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

// =============================================================================
// Worksheet writing
// =============================================================================

fn write_table(
    worksheet: &mut Worksheet,
    table: &ProcessedTable,
    formats: &ExportFormats,
) -> ExportResult<()> {
    let headers = table.headers();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &formats.header)?;
        // Wide enough for the header text; currency columns never exceed it.
        let width = (header.len() as f64 + 4.0).max(12.0);
        worksheet.set_column_width(col as u16, width)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let format = match row {
            OutputRow::Section(_) => &formats.body,
            OutputRow::Subtotal(_) => &formats.subtotal,
        };
        let cells = row.render(&table.passthrough);
        let row_num = (idx + 1) as u32;

        for (col, cell) in cells.iter().enumerate() {
            let col_num = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string_with_format(row_num, col_num, text, format)?;
                }
                Cell::Int(value) => {
                    worksheet.write_number_with_format(row_num, col_num, *value as f64, format)?;
                }
                Cell::Empty => {
                    worksheet.write_blank(row_num, col_num, format)?;
                }
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

// =============================================================================
// Sheet naming
// =============================================================================

/// Turn a file name into a legal worksheet name.
pub fn sanitize_sheet_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name);

    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\'' => '_',
            other => other,
        })
        .take(SHEET_NAME_MAX)
        .collect();

    if cleaned.trim().is_empty() {
        DEFAULT_SHEET.to_string()
    } else {
        cleaned
    }
}

fn unique_sheet_name(base: &str, used: &[String]) -> String {
    if !used.iter().any(|n| n == base) {
        return base.to_string();
    }

    let trimmed: String = base.chars().take(SHEET_NAME_MAX.saturating_sub(4)).collect();
    let mut idx = 2usize;
    loop {
        let candidate = format!("{}_{}", trimmed, idx);
        if !used.iter().any(|n| n == &candidate) {
            return candidate;
        }
        idx += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Capacity, Overload, PaySummary, ProcessStats, SectionRecord, SubtotalRecord,
    };

    fn sample_table() -> ProcessedTable {
        let section = SectionRecord {
            course_title: "MUSIC GR 2".into(),
            staff_name: "Smith".into(),
            total_students: 27,
            capacity: Capacity { base: 23, max: 25 },
            overload: Overload {
                total: 4,
                base: 2,
                max: 2,
            },
            pay: PaySummary {
                base_pay: 2.0,
                max_pay: 3.0,
                monthly_total: 18.75,
            },
            ..Default::default()
        };
        let subtotal = SubtotalRecord {
            staff_name: "Smith".into(),
            base_overload: 2,
            max_overload: 2,
        };
        ProcessedTable {
            passthrough: vec![
                "Course Title".to_string(),
                "Staff Name".to_string(),
                "Total Students".to_string(),
            ],
            rows: vec![
                OutputRow::Section(section),
                OutputRow::Subtotal(subtotal),
            ],
            stats: ProcessStats {
                rows_in: 1,
                rows_kept: 1,
                unclassified: 0,
                staff_count: 1,
            },
        }
    }

    #[test]
    fn test_produces_valid_workbook_bytes() {
        let bytes = workbook_bytes(&sample_table()).unwrap();
        // XLSX files start with PK (ZIP header)
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_empty_table_exports_header_only() {
        let table = ProcessedTable {
            passthrough: vec!["Course Title".to_string(), "Staff Name".to_string()],
            rows: vec![],
            stats: ProcessStats::default(),
        };
        let bytes = workbook_bytes(&table).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_batch_multiple_sheets() {
        let table = sample_table();
        let bytes =
            batch_workbook_bytes(&[("a.xlsx", &table), ("b.xlsx", &table)]).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("roster.xlsx"), "roster");
        assert_eq!(sanitize_sheet_name("a/b:c.csv"), "a_b_c");
        assert_eq!(sanitize_sheet_name(""), "Overload");

        let long = "x".repeat(64);
        assert_eq!(sanitize_sheet_name(&long).len(), SHEET_NAME_MAX);
    }

    #[test]
    fn test_unique_sheet_name() {
        let used = vec!["roster".to_string()];
        assert_eq!(unique_sheet_name("roster", &used), "roster_2");
        assert_eq!(unique_sheet_name("other", &used), "other");
    }
}
