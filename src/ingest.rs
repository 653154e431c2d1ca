//! Ingestion of raw provider exports into an in-memory table.
//!
//! Provider report centers export either `|`-delimited text (the pipe keeps
//! free-text template bodies unambiguous) or a spreadsheet. The parser is
//! selected from the filename hint's extension; the byte source itself is
//! read to completion up front, so no stage after this touches I/O.

use std::{fs, io::Cursor, path::Path};

use calamine::{Data, DataType as _, Reader, open_workbook_auto_from_rs};
use encoding_rs::UTF_8;
use log::debug;

use crate::error::IngestionError;

pub const CSV_DELIMITER: u8 = b'|';

const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb"];

/// Raw rows-by-named-columns structure with no type interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell<'a>(&'a self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column_index(name)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }
}

/// Parses a byte source into a [`RawTable`], choosing the parser from the
/// filename hint's extension.
pub fn from_bytes(bytes: &[u8], filename_hint: Option<&str>) -> Result<RawTable, IngestionError> {
    if bytes.is_empty() {
        return Err(IngestionError::Empty);
    }
    if is_spreadsheet(filename_hint) {
        debug!("Parsing input as spreadsheet ({} bytes)", bytes.len());
        parse_spreadsheet(bytes)
    } else {
        debug!("Parsing input as '|'-delimited text ({} bytes)", bytes.len());
        parse_delimited(bytes)
    }
}

/// Convenience wrapper that reads `path` and uses its name as the hint.
pub fn from_path(path: &Path) -> Result<RawTable, IngestionError> {
    let bytes = fs::read(path)?;
    let hint = path.file_name().and_then(|name| name.to_str());
    from_bytes(&bytes, hint)
}

fn is_spreadsheet(filename_hint: Option<&str>) -> bool {
    filename_hint
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

fn parse_delimited(bytes: &[u8]) -> Result<RawTable, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(CSV_DELIMITER)
        .double_quote(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader.byte_headers()?.clone();
    let columns = decode_record(&headers)?;
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err(IngestionError::NoColumns);
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(decode_record(&record)?);
    }
    Ok(RawTable { columns, rows })
}

fn decode_record(record: &csv::ByteRecord) -> Result<Vec<String>, IngestionError> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = UTF_8.decode(field);
            if had_errors {
                Err(IngestionError::Decode {
                    encoding: UTF_8.name(),
                })
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}

fn parse_spreadsheet(bytes: &[u8]) -> Result<RawTable, IngestionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| IngestionError::Spreadsheet(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestionError::NoColumns)?
        .map_err(|err| IngestionError::Spreadsheet(err.to_string()))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Err(IngestionError::NoColumns);
    };
    let columns: Vec<String> = header_row
        .iter()
        .map(|cell| cell.as_string().unwrap_or_else(|| cell.to_string()))
        .collect();
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err(IngestionError::NoColumns);
    }

    let rows = rows_iter
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
            cells.resize(columns.len(), String::new());
            cells
        })
        .collect();
    Ok(RawTable { columns, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
