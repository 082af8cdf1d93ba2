//! Table model, sortable header and projection workflow for browsing and
//! perturbing daily-fantasy projection files.

pub mod dataset;
pub mod domain;
pub mod header;
pub mod logging;
pub mod model;
pub mod workflow;

pub use dataset::{Dataset, RowLabels, TabularEngine};
pub use domain::{Axis, EngineKind, GridConfig, GridError, Result, SortOrder};
pub use header::{SortState, SortableColumnHeader};
pub use model::TabularModel;
pub use workflow::ProjectionsWorkflow;
