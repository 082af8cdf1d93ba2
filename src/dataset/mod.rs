//! Immutable tabular snapshots.
//!
//! A [`Dataset`] is never edited in place once it is installed in a model:
//! sorting and column updates return a new dataset that replaces the old one
//! wholesale. Two engines sit behind the same [`TabularEngine`] interface and
//! differ only in storage layout and in how rows are labelled.

pub mod frame;
pub mod indexed;
pub mod loader;
pub mod value;

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::{EngineKind, Result};
use frame::FrameDataset;
use indexed::IndexedDataset;
use loader::{FileType, RawTable};

/// How an engine labels rows in the vertical header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLabels {
    /// The row's current position, counted from 0.
    Positional,
    /// The index the row was loaded with; it moves with the row when sorted.
    Index,
}

/// Read access shared by both storage engines.
pub trait TabularEngine {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn column_names(&self) -> Vec<String>;
    fn row_labels(&self) -> RowLabels;
    fn row_label(&self, row: usize) -> Result<String>;
    fn cell(&self, row: usize, column: usize, null: &str) -> Result<String>;
    fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>>;
    fn is_numeric(&self, column: usize) -> Result<bool>;
    fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>>;
    fn to_raw(&self) -> Result<RawTable>;
}

impl TabularEngine for FrameDataset {
    fn row_count(&self) -> usize {
        FrameDataset::row_count(self)
    }
    fn column_count(&self) -> usize {
        FrameDataset::column_count(self)
    }
    fn column_names(&self) -> Vec<String> {
        FrameDataset::column_names(self)
    }
    fn row_labels(&self) -> RowLabels {
        RowLabels::Positional
    }
    fn row_label(&self, row: usize) -> Result<String> {
        FrameDataset::row_label(self, row)
    }
    fn cell(&self, row: usize, column: usize, null: &str) -> Result<String> {
        FrameDataset::cell(self, row, column, null)
    }
    fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>> {
        FrameDataset::column_display(self, column, null)
    }
    fn is_numeric(&self, column: usize) -> Result<bool> {
        FrameDataset::is_numeric(self, column)
    }
    fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        FrameDataset::numeric_column(self, column)
    }
    fn to_raw(&self) -> Result<RawTable> {
        FrameDataset::to_raw(self)
    }
}

impl TabularEngine for IndexedDataset {
    fn row_count(&self) -> usize {
        IndexedDataset::row_count(self)
    }
    fn column_count(&self) -> usize {
        IndexedDataset::column_count(self)
    }
    fn column_names(&self) -> Vec<String> {
        IndexedDataset::column_names(self)
    }
    fn row_labels(&self) -> RowLabels {
        RowLabels::Index
    }
    fn row_label(&self, row: usize) -> Result<String> {
        IndexedDataset::row_label(self, row)
    }
    fn cell(&self, row: usize, column: usize, null: &str) -> Result<String> {
        IndexedDataset::cell(self, row, column, null)
    }
    fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>> {
        IndexedDataset::column_display(self, column, null)
    }
    fn is_numeric(&self, column: usize) -> Result<bool> {
        IndexedDataset::is_numeric(self, column)
    }
    fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        IndexedDataset::numeric_column(self, column)
    }
    fn to_raw(&self) -> Result<RawTable> {
        Ok(IndexedDataset::to_raw(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Frame(FrameDataset),
    Indexed(IndexedDataset),
}

impl Dataset {
    /// Reads a file into a new dataset on the requested engine. The reader is
    /// picked from the file extension.
    pub fn load(path: &Path, engine: EngineKind) -> Result<Self> {
        let file_info = loader::get_file_info(path)?;
        let start_time = Instant::now();
        let dataset = match (engine, file_info.file_type) {
            (EngineKind::Frame, FileType::Csv) => {
                Dataset::Frame(FrameDataset::load_csv(&file_info.path)?)
            }
            (EngineKind::Frame, FileType::Spreadsheet) => {
                Dataset::Frame(FrameDataset::from_raw(loader::read_raw(&file_info)?)?)
            }
            (EngineKind::Indexed, _) => {
                Dataset::Indexed(IndexedDataset::from_raw(loader::read_raw(&file_info)?)?)
            }
        };
        info!(
            "Loaded {} ({} bytes, {:?}) in {}ms: {} rows x {} columns",
            file_info.path.display(),
            file_info.file_size,
            file_info.file_type,
            start_time.elapsed().as_millis(),
            dataset.row_count(),
            dataset.column_count()
        );
        Ok(dataset)
    }

    /// Builds a dataset from in-memory cells.
    pub fn from_raw(raw: RawTable, engine: EngineKind) -> Result<Self> {
        Ok(match engine {
            EngineKind::Frame => Dataset::Frame(FrameDataset::from_raw(raw)?),
            EngineKind::Indexed => Dataset::Indexed(IndexedDataset::from_raw(raw)?),
        })
    }

    pub fn engine(&self) -> EngineKind {
        match self {
            Dataset::Frame(_) => EngineKind::Frame,
            Dataset::Indexed(_) => EngineKind::Indexed,
        }
    }

    fn inner(&self) -> &dyn TabularEngine {
        match self {
            Dataset::Frame(d) => d,
            Dataset::Indexed(d) => d,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names().iter().position(|c| c == name)
    }

    /// Returns a copy with rows reordered by one column. Rows with equal keys
    /// keep their relative order.
    pub fn sorted_by(&self, column: usize, descending: bool) -> Result<Self> {
        debug!("Sort dataset on column {column}, descending: {descending}");
        Ok(match self {
            Dataset::Frame(d) => Dataset::Frame(d.sorted_by(column, descending)?),
            Dataset::Indexed(d) => Dataset::Indexed(d.sorted_by(column, descending)?),
        })
    }

    /// Returns a copy with one column replaced by the given numbers.
    pub fn with_numeric_column(&self, column: usize, values: Vec<Option<f64>>) -> Result<Self> {
        Ok(match self {
            Dataset::Frame(d) => Dataset::Frame(d.with_numeric_column(column, values)?),
            Dataset::Indexed(d) => Dataset::Indexed(d.with_numeric_column(column, values)?),
        })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        loader::write_csv(&self.to_raw()?, path)
    }
}

impl TabularEngine for Dataset {
    fn row_count(&self) -> usize {
        self.inner().row_count()
    }
    fn column_count(&self) -> usize {
        self.inner().column_count()
    }
    fn column_names(&self) -> Vec<String> {
        self.inner().column_names()
    }
    fn row_labels(&self) -> RowLabels {
        self.inner().row_labels()
    }
    fn row_label(&self, row: usize) -> Result<String> {
        self.inner().row_label(row)
    }
    fn cell(&self, row: usize, column: usize, null: &str) -> Result<String> {
        self.inner().cell(row, column, null)
    }
    fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>> {
        self.inner().column_display(column, null)
    }
    fn is_numeric(&self, column: usize) -> Result<bool> {
        self.inner().is_numeric(column)
    }
    fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        self.inner().numeric_column(column)
    }
    fn to_raw(&self) -> Result<RawTable> {
        self.inner().to_raw()
    }
}
