use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, info};

use crate::dataset::loader::{self, FileType};
use crate::dataset::value::round1;
use crate::dataset::{Dataset, TabularEngine};
use crate::domain::{GridConfig, GridError, Result};
use crate::model::TabularModel;

/// Open / randomize / undo on top of one [`TabularModel`].
///
/// The current dataset is whatever the model has installed, so sorts made
/// through the header carry into the next randomize. History is a single
/// snapshot: each mutation overwrites `previous`, and [`undo`](Self::undo)
/// swaps it with the current dataset.
pub struct ProjectionsWorkflow {
    model: TabularModel,
    previous: Option<Dataset>,
    loaded: Option<Dataset>,
    jitter_percent: i64,
    rng: StdRng,
}

impl ProjectionsWorkflow {
    pub fn new(config: &GridConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            model: TabularModel::new(config.engine).with_null_display(config.null_display.clone()),
            previous: None,
            loaded: None,
            jitter_percent: i64::from(config.jitter_percent),
            rng,
        }
    }

    pub fn model(&self) -> &TabularModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut TabularModel {
        &mut self.model
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.model.dataset()
    }

    pub fn previous(&self) -> Option<&Dataset> {
        self.previous.as_ref()
    }

    /// Loads a projections file. The current dataset becomes `previous` only
    /// once the new one is installed; a failed load changes nothing.
    pub fn open_projections(&mut self, path: &Path) -> Result<()> {
        let dataset = Dataset::load(path, self.model.engine())?;
        let prior = self.model.dataset().cloned();
        self.model.install(dataset.clone())?;
        if prior.is_some() {
            self.previous = prior;
        }
        self.loaded = Some(dataset);
        info!("Opened projections {}", path.display());
        Ok(())
    }

    /// Adds a random jitter of up to `jitter_percent` to every value of one
    /// numeric column, the last column by default.
    ///
    /// `new = old + round(old * j / 100, 1)` with `j` drawn per row from the
    /// inclusive range `[-jitter_percent, jitter_percent]`. Nulls stay null.
    /// The upper bound is reachable: the desktop tool this replaces drew with
    /// numpy's `randint(-15, 15)`, which stops at +14.
    pub fn randomize_projections(&mut self, column: Option<&str>) -> Result<()> {
        let current = self.model.dataset().ok_or(GridError::NoData)?;
        let idx = match column {
            Some(name) => current
                .column_index(name)
                .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?,
            None => current
                .column_count()
                .checked_sub(1)
                .ok_or(GridError::NoData)?,
        };

        let bound = self.jitter_percent;
        let values: Vec<Option<f64>> = current
            .numeric_column(idx)?
            .into_iter()
            .map(|value| {
                let jitter = self.rng.random_range(-bound..=bound) as f64 / 100.0;
                value.map(|v| v + round1(v * jitter))
            })
            .collect();
        let randomized = current.with_numeric_column(idx, values)?;
        debug!("Randomized column {idx} with jitter of {bound}%");

        let prior = current.clone();
        self.model.install(randomized)?;
        self.previous = Some(prior);
        Ok(())
    }

    /// Swaps the current dataset with the previous snapshot. Calling it twice
    /// restores the state before the first call.
    pub fn undo(&mut self) -> Result<()> {
        let previous = self.previous.take().ok_or(GridError::NothingToUndo)?;
        let current = self.model.dataset().cloned();
        if let Err(e) = self.model.install(previous.clone()) {
            self.previous = Some(previous);
            return Err(e);
        }
        self.previous = current;
        info!("Undo applied");
        Ok(())
    }

    /// Restores the dataset as it was when the file was opened.
    pub fn reset_projections(&mut self) -> Result<()> {
        let loaded = self.loaded.clone().ok_or(GridError::NoData)?;
        let prior = self.model.dataset().cloned();
        self.model.install(loaded)?;
        self.previous = prior;
        Ok(())
    }

    /// Empties the model and forgets all history.
    pub fn close_projections(&mut self) {
        self.model.clear();
        self.previous = None;
        self.loaded = None;
    }

    /// Writes the current dataset as CSV.
    pub fn save_projections(&self, path: &Path) -> Result<()> {
        let current = self.model.dataset().ok_or(GridError::NoData)?;
        if loader::detect_file_type(path)? != FileType::Csv {
            return Err(GridError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
            });
        }
        current.write_csv(path)?;
        info!("Saved projections to {}", path.display());
        Ok(())
    }
}
