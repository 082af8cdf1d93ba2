use polars::prelude::*;
use std::path::Path;
use tracing::trace;

use crate::dataset::loader::RawTable;
use crate::dataset::value::Value;
use crate::domain::{Axis, GridError, Result};

/// Columnar engine on a polars `DataFrame`.
///
/// Row labels are positional: after any sort, row 0 is labelled "0".
#[derive(Debug, Clone)]
pub struct FrameDataset {
    df: DataFrame,
}

impl PartialEq for FrameDataset {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

impl FrameDataset {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let df = LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()?
            .collect()?;
        Ok(Self { df })
    }

    /// Builds a frame from cells that were already read, e.g. from a workbook.
    pub fn from_raw(raw: RawTable) -> Result<Self> {
        raw.validate()?;
        let columns = raw
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<&Value> = raw.rows.iter().map(|row| &row[idx]).collect();
                Column::from(Self::build_series(name, &cells))
            })
            .collect::<Vec<Column>>();
        let df = DataFrame::new(columns)?;
        Ok(Self { df })
    }

    fn build_series(name: &str, cells: &[&Value]) -> Series {
        let name = PlSmallStr::from(name);
        let non_null = || cells.iter().filter(|v| !v.is_null());
        if non_null().all(|v| matches!(v, Value::Int(_))) && non_null().next().is_some() {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        } else if non_null().all(|v| v.as_f64().is_some()) && non_null().next().is_some() {
            let values: Vec<Option<f64>> = cells.iter().map(|v| v.as_f64()).collect();
            Series::new(name, values)
        } else if non_null().all(|v| matches!(v, Value::Bool(_))) && non_null().next().is_some() {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect();
            Series::new(name, values)
        }
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn row_label(&self, row: usize) -> Result<String> {
        self.check_row(row)?;
        Ok(row.to_string())
    }

    pub fn cell(&self, row: usize, column: usize, null: &str) -> Result<String> {
        self.check_row(row)?;
        let col = self.column_at(column)?;
        let cell = col.slice(row as i64, 1).cast(&DataType::String)?;
        Ok(cell
            .str()?
            .get(0)
            .map(str::to_string)
            .unwrap_or_else(|| null.to_string()))
    }

    /// All cells of one column as display strings.
    pub fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>> {
        let col = self.column_at(column)?.cast(&DataType::String)?;
        let series = col.str()?;
        Ok(series
            .into_iter()
            .map(|value| match value {
                Some(s) => s.to_string(),
                None => null.to_string(),
            })
            .collect())
    }

    pub fn is_numeric(&self, column: usize) -> Result<bool> {
        Ok(Self::is_numeric_type(self.column_at(column)?.dtype()))
    }

    fn is_numeric_type(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64
        )
    }

    pub fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        let col = self.column_at(column)?;
        if !Self::is_numeric_type(col.dtype()) {
            return Err(GridError::NonNumericColumn(col.name().to_string()));
        }
        let col = col.cast(&DataType::Float64)?;
        Ok(col.f64()?.into_iter().collect())
    }

    /// Returns a copy with one column replaced by float values.
    pub fn with_numeric_column(&self, column: usize, values: Vec<Option<f64>>) -> Result<Self> {
        let name = self.column_at(column)?.name().clone();
        let mut df = self.df.clone();
        df.with_column(Series::new(name, values))?;
        Ok(Self { df })
    }

    /// Stable sort on one column; ties keep their current order and nulls go last.
    pub fn sorted_by(&self, column: usize, descending: bool) -> Result<Self> {
        let name = self.column_at(column)?.name().clone();
        trace!("Sorting frame on {name}, descending: {descending}");
        let df = self.df.sort(
            [name],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )?;
        Ok(Self { df })
    }

    pub fn to_raw(&self) -> Result<RawTable> {
        let columns = self.column_names();
        let mut rows = vec![Vec::with_capacity(columns.len()); self.row_count()];
        for col in self.df.get_columns() {
            for (ridx, row) in rows.iter_mut().enumerate() {
                row.push(Self::any_to_value(col.get(ridx)?));
            }
        }
        Ok(RawTable { columns, rows })
    }

    fn any_to_value(value: AnyValue<'_>) -> Value {
        match value {
            AnyValue::Null => Value::Null,
            AnyValue::Boolean(b) => Value::Bool(b),
            AnyValue::Int32(i) => Value::Int(i as i64),
            AnyValue::Int64(i) => Value::Int(i),
            AnyValue::UInt32(i) => Value::Int(i as i64),
            AnyValue::UInt64(i) => Value::Int(i as i64),
            AnyValue::Float32(f) => Value::Float(f as f64),
            AnyValue::Float64(f) => Value::Float(f),
            AnyValue::String(s) => Value::Str(s.to_string()),
            AnyValue::StringOwned(s) => Value::Str(s.to_string()),
            other => Value::Str(other.to_string()),
        }
    }

    fn column_at(&self, column: usize) -> Result<&Column> {
        self.df
            .get_columns()
            .get(column)
            .ok_or(GridError::IndexOutOfRange {
                axis: Axis::Columns,
                index: column,
                len: self.df.width(),
            })
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.df.height() {
            return Err(GridError::IndexOutOfRange {
                axis: Axis::Rows,
                index: row,
                len: self.df.height(),
            });
        }
        Ok(())
    }
}
