//! Spreadsheet loader: turns an uploaded file into a column-named table.
//!
//! Two input paths, picked by file extension:
//!
//! - workbook formats (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) read via
//!   calamine, first worksheet only, first row as headers;
//! - everything else parsed as delimited text with encoding and delimiter
//!   auto-detection.
//!
//! No overload-specific logic lives here; the output is a generic
//! [`RosterTable`] of JSON objects keyed by header.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{json, Map, Value};

use crate::error::{LoadError, LoadResult};

/// File extensions routed to the workbook reader.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Source metadata recorded while loading.
#[derive(Debug, Clone)]
pub enum SourceInfo {
    /// Delimited text input.
    Csv {
        /// Detected or assumed encoding.
        encoding: String,
        /// Detected delimiter.
        delimiter: char,
    },
    /// Workbook input.
    Workbook {
        /// Name of the worksheet that was read.
        sheet: String,
    },
}

/// A loaded table: ordered headers plus one JSON object per row.
#[derive(Debug, Clone)]
pub struct RosterTable {
    /// Column headers in file order.
    pub headers: Vec<String>,
    /// Parsed rows; values are strings for text input, numbers where the
    /// workbook cell was numeric.
    pub records: Vec<Map<String, Value>>,
    /// How the table was read.
    pub source: SourceInfo,
}

// =============================================================================
// Encoding / delimiter detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// CSV parsing
// =============================================================================

/// Parse delimited text bytes with auto-detected encoding and delimiter.
pub fn parse_csv_bytes(bytes: &[u8]) -> LoadResult<RosterTable> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_csv_str(&content, delimiter, encoding)
}

/// Parse delimited text with an explicit delimiter.
pub fn parse_csv_str(content: &str, delimiter: char, encoding: String) -> LoadResult<RosterTable> {
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(LoadError::EmptyFile)?;
    // Blank header cells stay in place so later columns keep their position.
    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(delimiter).collect();
        let mut record = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let raw = values
                .get(i)
                .map(|s| s.trim().trim_matches('"'))
                .unwrap_or("");
            record.insert(header.clone(), json!(raw));
        }
        records.push(record);
    }

    Ok(RosterTable {
        headers,
        records,
        source: SourceInfo::Csv {
            encoding,
            delimiter,
        },
    })
}

// =============================================================================
// Workbook parsing
// =============================================================================

/// Parse workbook bytes; reads the first worksheet only.
pub fn parse_workbook_bytes(bytes: &[u8]) -> LoadResult<RosterTable> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::NoHeaders)?;

    // Keep positional alignment; blank header cells are skipped together
    // with their column.
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (i, cell) in header_row.iter().enumerate() {
        let name = cell.to_string().trim().to_string();
        if !name.is_empty() {
            columns.push((i, name));
        }
    }
    if columns.is_empty() {
        return Err(LoadError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let mut record = Map::new();
        for (i, header) in &columns {
            let value = row.get(*i).map(cell_to_value).unwrap_or_else(|| json!(""));
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    Ok(RosterTable {
        headers: columns.into_iter().map(|(_, name)| name).collect(),
        records,
        source: SourceInfo::Workbook { sheet },
    })
}

/// Convert a workbook cell to a JSON value, preserving numeric types.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => json!(""),
        Data::String(s) => json!(s),
        Data::Int(i) => json!(i),
        Data::Float(f) => {
            // Whole floats (the common case for count columns) become integers.
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(f)
            }
        }
        Data::Bool(b) => json!(b),
        Data::DateTime(dt) => json!(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => json!(s),
        Data::Error(e) => json!(e.to_string()),
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// True when the file name routes to the workbook reader.
pub fn is_workbook_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a table from raw bytes, dispatching on the original file name.
pub fn load_table_bytes(file_name: &str, bytes: &[u8]) -> LoadResult<RosterTable> {
    if is_workbook_name(file_name) {
        parse_workbook_bytes(bytes)
    } else {
        parse_csv_bytes(bytes)
    }
}

/// Load a table from a file on disk.
pub fn load_table_file<P: AsRef<Path>>(path: P) -> LoadResult<RosterTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_table_bytes(name, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "Course Title,Staff Name,Total Students\nMUSIC GR 2,Smith,27\nART 4,Jones,20";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Course Title", "Staff Name", "Total Students"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0]["Course Title"], "MUSIC GR 2");
        assert_eq!(table.records[1]["Total Students"], "20");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "a;b;c\n1;2;3";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.records[0]["a"], "1");
        assert_eq!(table.records[0]["c"], "3");
        match table.source {
            SourceInfo::Csv { delimiter, .. } => assert_eq!(delimiter, ';'),
            _ => panic!("expected csv source"),
        }
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Alice\",\"Hello\"";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.records[0]["name"], "Alice");
        assert_eq!(table.records[0]["value"], "Hello");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn test_missing_values_become_empty() {
        let csv = "a,b,c\n1,,3";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.records[0]["b"], "");
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a,b,c\n1,2";
        let table = parse_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.records[0]["c"], "");
    }

    #[test]
    fn test_empty_input_errors() {
        assert!(matches!(
            parse_csv_bytes(b""),
            Err(LoadError::EmptyFile)
        ));
    }

    #[test]
    fn test_detect_delimiter_variants() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_workbook_name_dispatch() {
        assert!(is_workbook_name("roster.xlsx"));
        assert!(is_workbook_name("ROSTER.XLS"));
        assert!(is_workbook_name("roster.ods"));
        assert!(!is_workbook_name("roster.csv"));
        assert!(!is_workbook_name("roster"));
    }

    #[test]
    fn test_cell_to_value_numeric() {
        assert_eq!(cell_to_value(&Data::Float(27.0)), serde_json::json!(27));
        assert_eq!(cell_to_value(&Data::Float(0.5)), serde_json::json!(0.5));
        assert_eq!(cell_to_value(&Data::Int(12)), serde_json::json!(12));
        assert_eq!(cell_to_value(&Data::Empty), serde_json::json!(""));
    }
}
