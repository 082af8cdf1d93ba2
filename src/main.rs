use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use projview::logging::init_logging;
use projview::{Axis, EngineKind, GridConfig, GridError, ProjectionsWorkflow, SortOrder, TabularModel};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    Frame,
    Indexed,
}

impl From<Engine> for EngineKind {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::Frame => EngineKind::Frame,
            Engine::Indexed => EngineKind::Indexed,
        }
    }
}

/// Browse, sort and randomize a projections file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Projections file (.csv or .excel/.xlsx/.xls)
    path: String,

    /// Storage engine
    #[arg(long, value_enum, default_value_t = Engine::Frame)]
    engine: Engine,

    /// Sort by this column
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    descending: bool,

    /// Randomize a column; defaults to the last column when no name is given
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    randomize: Option<String>,

    /// Maximum jitter in percent
    #[arg(long, default_value_t = projview::domain::DEFAULT_JITTER_PERCENT)]
    jitter: u32,

    /// Seed for reproducible randomization
    #[arg(long)]
    seed: Option<u64>,

    /// Undo the last change before printing
    #[arg(long)]
    undo: bool,

    /// Write the resulting table as CSV
    #[arg(short, long)]
    output: Option<String>,

    /// Number of rows to print
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand(path: &str) -> Result<PathBuf, GridError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| GridError::LoadingFailed(e.to_string()))
}

fn run(args: Args) -> Result<(), GridError> {
    let mut cfg = GridConfig::default()
        .with_engine(args.engine.into())
        .with_jitter_percent(args.jitter);
    if let Some(seed) = args.seed {
        cfg = cfg.with_seed(seed);
    }

    let mut workflow = ProjectionsWorkflow::new(&cfg);
    workflow.open_projections(&expand(&args.path)?)?;

    if let Some(name) = args.sort.as_deref() {
        let column = workflow
            .current()
            .and_then(|d| d.column_index(name))
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?;
        let order = if args.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        workflow.model_mut().sort(column, order)?;
    }

    if let Some(column) = args.randomize.as_deref() {
        let column = (!column.is_empty()).then_some(column);
        workflow.randomize_projections(column)?;
    }

    if args.undo {
        workflow.undo()?;
    }

    print_table(workflow.model(), args.rows)?;

    if let Some(output) = args.output.as_deref() {
        workflow.save_projections(&expand(output)?)?;
    }
    info!("Done");
    Ok(())
}

fn print_table(model: &TabularModel, max_rows: usize) -> Result<(), GridError> {
    let nrows = model.row_count().min(max_rows);
    let ncols = model.column_count();

    let mut table: Vec<Vec<String>> = Vec::with_capacity(nrows + 1);
    let mut header = vec![String::new()];
    for c in 0..ncols {
        header.push(model.header_label(c, Axis::Columns)?);
    }
    table.push(header);
    for r in 0..nrows {
        let mut line = vec![model.header_label(r, Axis::Rows)?];
        for c in 0..ncols {
            line.push(model.cell_at(r, c)?);
        }
        table.push(line);
    }

    let widths: Vec<usize> = (0..=ncols)
        .map(|c| table.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
        .collect();
    for line in &table {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
    if model.row_count() > nrows {
        println!("... {} more rows", model.row_count() - nrows);
    }
    Ok(())
}
