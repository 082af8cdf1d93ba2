use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use thiserror::Error;

/// Glyph shown for missing cells.
pub const NULL_DISPLAY: &str = "∅";

/// Default jitter bound for randomized projections, in percent.
pub const DEFAULT_JITTER_PERCENT: u32 = 15;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("unsupported file format (csv and excel only): {extension:?}")]
    UnsupportedFormat { extension: String },
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },
    #[error("no projections loaded")]
    NoData,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),
    #[error("column \"{0}\" is not numeric")]
    NonNumericColumn(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error(transparent)]
    Io(#[from] Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Spreadsheet(#[from] calamine::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn is_descending(self) -> bool {
        self == SortOrder::Descending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rows => write!(f, "row"),
            Axis::Columns => write!(f, "column"),
        }
    }
}

/// Storage engine backing a dataset.
///
/// `Frame` keeps the data columnar and labels rows by their current position.
/// `Indexed` keeps rows together with the index they were loaded with, so row
/// labels follow the rows through a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Frame,
    Indexed,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct GridConfig {
    pub engine: EngineKind,
    pub jitter_percent: u32,
    #[setters(strip_option)]
    pub seed: Option<u64>,
    #[setters(into)]
    pub null_display: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            engine: EngineKind::Frame,
            jitter_percent: DEFAULT_JITTER_PERCENT,
            seed: None,
            null_display: NULL_DISPLAY.to_string(),
        }
    }
}
