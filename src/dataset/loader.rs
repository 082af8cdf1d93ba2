use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::{debug, trace};

use crate::dataset::value::{Inferred, Value, infer_column, parse_cell};
use crate::domain::{GridError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Spreadsheet,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Column names plus row-major cells, as read from disk before an engine
/// takes ownership of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Every row must hold exactly one value per declared column.
    pub fn validate(&self) -> Result<()> {
        match self
            .rows
            .iter()
            .position(|row| row.len() != self.columns.len())
        {
            Some(ridx) => Err(GridError::LoadingFailed(format!(
                "row {ridx} has {} values, expected {}",
                self.rows[ridx].len(),
                self.columns.len()
            ))),
            None => Ok(()),
        }
    }
}

/// Maps a path's extension onto a reader. `.excel` is accepted literally, next
/// to the usual spreadsheet extensions.
pub fn detect_file_type(path: &Path) -> Result<FileType> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase());
    match extension.as_deref() {
        Some("CSV") => Ok(FileType::Csv),
        Some("EXCEL") | Some("XLSX") | Some("XLS") | Some("XLSM") | Some("ODS") => {
            Ok(FileType::Spreadsheet)
        }
        _ => Err(GridError::UnsupportedFormat {
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
        }),
    }
}

/// Checks the extension first so an unsupported path fails the same way
/// whether or not it exists.
pub fn get_file_info(path: &Path) -> Result<FileInfo> {
    let file_type = detect_file_type(path)?;
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GridError::FileNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => GridError::PermissionDenied(path.to_path_buf()),
        _ => GridError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(GridError::LoadingFailed(format!(
            "{} is not a file",
            path.display()
        )));
    }

    Ok(FileInfo {
        path: path.to_path_buf(),
        file_size: metadata.len(),
        file_type,
    })
}

/// Reads a CSV file with a header row. Column types are inferred from every
/// non-empty cell.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').to_string())
        .collect();

    let mut text: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        text.push(record.iter().map(str::to_string).collect());
    }

    let kinds: Vec<Inferred> = (0..columns.len())
        .map(|c| infer_column(text.iter().map(|row| row.get(c).map(String::as_str).unwrap_or(""))))
        .collect();
    trace!("Inferred CSV column types: {kinds:?}");

    let rows = text
        .iter()
        .map(|row| {
            kinds
                .iter()
                .enumerate()
                .map(|(c, kind)| parse_cell(row.get(c).map(String::as_str).unwrap_or(""), *kind))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

/// Reads the first worksheet of a workbook. The format is sniffed from the
/// content, since `.excel` is not an extension the reader knows.
pub fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let bytes = fs::read(path)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(GridError::LoadingFailed("workbook has no sheets".into())),
    };

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| spreadsheet_value(c).to_string()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows: Vec<Vec<Value>> = rows
        .map(|row| {
            (0..columns.len())
                .map(|c| row.get(c).map(spreadsheet_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    debug!("Read {} rows x {} columns from sheet 0", rows.len(), columns.len());

    Ok(RawTable { columns, rows })
}

fn spreadsheet_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Str(s.clone()),
        Data::DateTime(dt) => Value::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Str(s.clone()),
        Data::Error(e) => Value::Str(format!("#{e}")),
    }
}

pub fn write_csv(table: &RawTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Loads any supported file into a [`RawTable`].
pub fn read_raw(info: &FileInfo) -> Result<RawTable> {
    match info.file_type {
        FileType::Csv => read_csv(&info.path),
        FileType::Spreadsheet => read_spreadsheet(&info.path),
    }
}
