use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::dataset::{Dataset, TabularEngine};
use crate::domain::{Axis, EngineKind, GridError, NULL_DISPLAY, Result, SortOrder};

/// Display strings of one column, computed once per installed dataset.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&TabularModel)>;

/// Adapts a [`Dataset`] to what a table widget asks for: shape, cell and
/// header text, and sorting.
///
/// Every replacement of the dataset rebuilds the display cache first and only
/// then notifies subscribers, so a listener always reads a cache that matches
/// the installed dataset. Listeners get the model itself and re-query it.
pub struct TabularModel {
    engine: EngineKind,
    null_display: String,
    dataset: Option<Dataset>,
    data: Vec<Column>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl TabularModel {
    pub fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            null_display: NULL_DISPLAY.to_string(),
            dataset: None,
            data: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_null_display(mut self, null_display: impl Into<String>) -> Self {
        self.null_display = null_display.into();
        self
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, |d| d.row_count())
    }

    pub fn column_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, |d| d.column_count())
    }

    /// Cell text at a position. An empty model answers with an empty string;
    /// only an installed dataset can be out of range.
    pub fn cell_at(&self, row: usize, column: usize) -> Result<String> {
        if self.dataset.is_none() {
            return Ok(String::new());
        }
        let col = self.data.get(column).ok_or(GridError::IndexOutOfRange {
            axis: Axis::Columns,
            index: column,
            len: self.data.len(),
        })?;
        col.data
            .get(row)
            .cloned()
            .ok_or(GridError::IndexOutOfRange {
                axis: Axis::Rows,
                index: row,
                len: col.data.len(),
            })
    }

    /// Column name for `Axis::Columns`, row label for `Axis::Rows`. Which row
    /// label comes back depends on the engine, see [`crate::dataset::RowLabels`].
    pub fn header_label(&self, index: usize, axis: Axis) -> Result<String> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Ok(String::new());
        };
        match axis {
            Axis::Columns => self
                .data
                .get(index)
                .map(|c| c.name.clone())
                .ok_or(GridError::IndexOutOfRange {
                    axis,
                    index,
                    len: self.data.len(),
                }),
            Axis::Rows => dataset.row_label(index),
        }
    }

    /// Replaces the dataset with a copy sorted on `column`. Sorting an empty
    /// model does nothing.
    pub fn sort(&mut self, column: usize, order: SortOrder) -> Result<()> {
        let Some(dataset) = self.dataset.as_ref() else {
            trace!("Ignoring sort on empty model");
            return Ok(());
        };
        let sorted = dataset.sorted_by(column, order.is_descending())?;
        self.install(sorted)
    }

    /// Loads a file with this model's engine and installs it. On any error the
    /// current dataset stays in place.
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        let dataset = Dataset::load(path, self.engine)?;
        self.install(dataset)
    }

    /// Installs a new dataset and notifies subscribers once the cache matches it.
    pub fn install(&mut self, dataset: Dataset) -> Result<()> {
        let data = self.build_cache(&dataset)?;
        self.dataset = Some(dataset);
        self.data = data;
        self.data_changed();
        Ok(())
    }

    /// Drops the dataset, leaving an empty model.
    pub fn clear(&mut self) -> Option<Dataset> {
        let previous = self.dataset.take();
        self.data.clear();
        self.data_changed();
        previous
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TabularModel) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // The list is taken out while listeners run so each one can borrow the model.
    fn data_changed(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        trace!("Notifying {} listeners", listeners.len());
        for (_, listener) in listeners.iter_mut() {
            listener(self);
        }
        self.listeners = listeners;
    }

    // Each column is rendered to strings on its own rayon task.
    fn build_cache(&self, dataset: &Dataset) -> Result<Vec<Column>> {
        let start_time = Instant::now();
        let names = dataset.column_names();
        let null = self.null_display.as_str();
        let columns: Result<Vec<Column>> = names
            .par_iter()
            .enumerate()
            .map(|(idx, name)| Self::load_column(dataset, idx, name, null))
            .collect();
        let columns = columns?;

        info!(
            "Building display cache took {}ms ...",
            start_time.elapsed().as_millis()
        );
        for c in columns.iter() {
            debug!("Column: \"{}\", # rows {}", c.name, c.data.len());
        }
        Ok(columns)
    }

    fn load_column(dataset: &Dataset, idx: usize, name: &str, null: &str) -> Result<Column> {
        Ok(Column {
            name: name.to_string(),
            data: dataset.column_display(idx, null)?,
        })
    }
}
