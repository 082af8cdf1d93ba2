use std::cmp::Ordering;
use std::sync::Arc;

use crate::dataset::loader::RawTable;
use crate::dataset::value::Value;
use crate::domain::{Axis, GridError, Result};

/// Row-major engine that carries an explicit row index.
///
/// Each row keeps the index it was loaded with (0, 1, 2, ...), and that index
/// travels with the row through every sort. The row label is the index value,
/// not the row's current position.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDataset {
    columns: Arc<Vec<String>>,
    index: Vec<usize>,
    rows: Vec<Vec<Value>>,
}

impl IndexedDataset {
    pub fn from_raw(raw: RawTable) -> Result<Self> {
        raw.validate()?;
        let index = (0..raw.rows.len()).collect();
        Ok(Self {
            columns: Arc::new(raw.columns),
            index,
            rows: raw.rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.to_vec()
    }

    pub fn row_label(&self, row: usize) -> Result<String> {
        self.check_row(row)?;
        Ok(self.index[row].to_string())
    }

    pub fn value(&self, row: usize, column: usize) -> Result<&Value> {
        self.check_row(row)?;
        self.check_column(column)?;
        Ok(&self.rows[row][column])
    }

    pub fn cell(&self, row: usize, column: usize, null: &str) -> Result<String> {
        Ok(self.value(row, column)?.display(null))
    }

    pub fn column_display(&self, column: usize, null: &str) -> Result<Vec<String>> {
        self.check_column(column)?;
        Ok(self.rows.iter().map(|row| row[column].display(null)).collect())
    }

    /// A column is numeric when it holds at least one number and nothing but
    /// numbers and nulls.
    pub fn is_numeric(&self, column: usize) -> Result<bool> {
        self.check_column(column)?;
        let mut cells = self.rows.iter().map(|row| &row[column]).filter(|v| !v.is_null());
        let mut any = false;
        let all = cells.all(|v| {
            any = true;
            v.as_f64().is_some()
        });
        Ok(any && all)
    }

    pub fn numeric_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        if !self.is_numeric(column)? {
            return Err(GridError::NonNumericColumn(self.columns[column].clone()));
        }
        Ok(self.rows.iter().map(|row| row[column].as_f64()).collect())
    }

    pub fn with_numeric_column(&self, column: usize, values: Vec<Option<f64>>) -> Result<Self> {
        self.check_column(column)?;
        if values.len() != self.rows.len() {
            return Err(GridError::LoadingFailed(format!(
                "expected {} values for column \"{}\", got {}",
                self.rows.len(),
                self.columns[column],
                values.len()
            )));
        }
        let mut rows = self.rows.clone();
        for (row, value) in rows.iter_mut().zip(values) {
            row[column] = value.map(Value::Float).unwrap_or(Value::Null);
        }
        Ok(Self {
            columns: Arc::clone(&self.columns),
            index: self.index.clone(),
            rows,
        })
    }

    /// Stable sort on one column; ties keep their current order and nulls go last.
    pub fn sorted_by(&self, column: usize, descending: bool) -> Result<Self> {
        self.check_column(column)?;
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let (va, vb) = (&self.rows[a][column], &self.rows[b][column]);
            match (va.is_null(), vb.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if descending => vb.compare(va),
                (false, false) => va.compare(vb),
            }
        });

        Ok(Self {
            columns: Arc::clone(&self.columns),
            index: order.iter().map(|&i| self.index[i]).collect(),
            rows: order.iter().map(|&i| self.rows[i].clone()).collect(),
        })
    }

    pub fn to_raw(&self) -> RawTable {
        RawTable {
            columns: self.column_names(),
            rows: self.rows.clone(),
        }
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows.len() {
            return Err(GridError::IndexOutOfRange {
                axis: Axis::Rows,
                index: row,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn check_column(&self, column: usize) -> Result<()> {
        if column >= self.columns.len() {
            return Err(GridError::IndexOutOfRange {
                axis: Axis::Columns,
                index: column,
                len: self.columns.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projections() -> IndexedDataset {
        IndexedDataset::from_raw(RawTable {
            columns: vec!["name".into(), "proj".into()],
            rows: vec![
                vec![Value::Str("A".into()), Value::Float(10.0)],
                vec![Value::Str("B".into()), Value::Null],
                vec![Value::Str("C".into()), Value::Float(20.0)],
                vec![Value::Str("D".into()), Value::Float(10.0)],
            ],
        })
        .unwrap()
    }

    #[test]
    fn row_labels_follow_their_rows() {
        let sorted = projections().sorted_by(1, true).unwrap();
        assert_eq!(sorted.column_display(0, "").unwrap(), vec!["C", "A", "D", "B"]);
        assert_eq!(sorted.row_label(0).unwrap(), "2");
        assert_eq!(sorted.row_label(3).unwrap(), "1");
    }

    #[test]
    fn nulls_go_last_in_both_directions() {
        let sorted = projections().sorted_by(1, false).unwrap();
        assert_eq!(sorted.column_display(0, "").unwrap(), vec!["A", "D", "C", "B"]);
        assert_eq!(sorted.cell(3, 1, "∅").unwrap(), "∅");
    }

    #[test]
    fn nan_cells_sort_above_numbers() {
        let rows: Vec<Vec<Value>> = (0..2000)
            .map(|i| {
                let v = if i % 3 == 0 {
                    f64::NAN
                } else {
                    ((i * 7919) % 1000) as f64
                };
                vec![Value::Int(i as i64), Value::Float(v)]
            })
            .collect();
        let data = IndexedDataset::from_raw(RawTable {
            columns: vec!["id".into(), "proj".into()],
            rows,
        })
        .unwrap();

        let values = |d: &IndexedDataset| -> Vec<f64> {
            d.rows.iter().map(|r| r[1].as_f64().unwrap()).collect()
        };
        let asc = values(&data.sorted_by(1, false).unwrap());
        let split = asc.iter().position(|v| v.is_nan()).unwrap();
        assert!(asc[..split].windows(2).all(|w| w[0] <= w[1]));
        assert!(asc[split..].iter().all(|v| v.is_nan()));

        let desc = values(&data.sorted_by(1, true).unwrap());
        let split = desc.iter().position(|v| !v.is_nan()).unwrap();
        assert!(desc[..split].iter().all(|v| v.is_nan()));
        assert!(desc[split..].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn ragged_rows_fail_to_load() {
        let raw = RawTable {
            columns: vec!["name".into(), "proj".into()],
            rows: vec![vec![Value::Str("A".into())]],
        };
        assert!(matches!(
            IndexedDataset::from_raw(raw),
            Err(GridError::LoadingFailed(_))
        ));
    }

    #[test]
    fn replacing_a_column_keeps_the_rest() {
        let data = projections();
        let updated = data
            .with_numeric_column(1, vec![Some(1.0), None, Some(2.0), Some(3.0)])
            .unwrap();
        assert_eq!(updated.column_display(0, "").unwrap(), data.column_display(0, "").unwrap());
        assert_eq!(updated.cell(3, 1, "").unwrap(), "3.0");
        assert_eq!(data.cell(3, 1, "").unwrap(), "10.0");
    }

    #[test]
    fn numeric_detection() {
        let data = projections();
        assert!(!data.is_numeric(0).unwrap());
        assert!(data.is_numeric(1).unwrap());
        assert!(data.is_numeric(2).is_err());
    }
}
