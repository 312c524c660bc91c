//! Tabular source readers (CSV and spreadsheets)

use crate::contract::MigrationError;
use crate::domain::{RecordReader, SourceRecord};
use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;

/// Source file formats understood by [`FileRecordReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> Result<Self, MigrationError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Self::Spreadsheet),
            _ => Err(MigrationError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Reads records from local files, dispatching on extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRecordReader;

impl RecordReader for FileRecordReader {
    fn read_records(&self, path: &Path) -> Result<Vec<SourceRecord>, MigrationError> {
        match SourceFormat::detect(path)? {
            SourceFormat::Csv => read_csv(path),
            SourceFormat::Spreadsheet => read_spreadsheet(path),
        }
    }
}

fn source_error(path: &Path, details: impl ToString) -> MigrationError {
    MigrationError::Source {
        path: path.to_path_buf(),
        details: details.to_string(),
    }
}

/// CSV with a header row
fn read_csv(path: &Path) -> Result<Vec<SourceRecord>, MigrationError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| source_error(path, e))?;

    let headers = reader.headers().map_err(|e| source_error(path, e))?.clone();

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| source_error(path, e))?;
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        records.push(SourceRecord::new(i + 1, fields));
    }
    Ok(records)
}

/// First worksheet, first row as header; blank rows are skipped
fn read_spreadsheet(path: &Path) -> Result<Vec<SourceRecord>, MigrationError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| source_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| source_error(path, "workbook has no worksheets"))?
        .map_err(|e| source_error(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|cell| cell_text(cell).trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let fields = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell_text(cell)))
            .collect::<HashMap<_, _>>();
        records.push(SourceRecord::new(i + 1, fields));
    }
    Ok(records)
}

/// Whole-number floats render without a fraction so numeric ids parse
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{f:.0}"),
        other => other.to_string(),
    }
}
