use std::fs;
use std::path::{Path, PathBuf};

use projview::{
    Axis, EngineKind, GridConfig, ProjectionsWorkflow, SortOrder, TabularEngine,
};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const ENGINES: [EngineKind; 2] = [EngineKind::Frame, EngineKind::Indexed];

const PLAYERS: [(&str, &str, f64, f64); 4] = [
    ("A", "QB", 7000.0, 10.0),
    ("B", "RB", 6500.0, 20.0),
    ("C", "WR", 5000.0, 15.5),
    ("D", "TE", 4000.0, 20.0),
];

fn write_workbook(dir: &TempDir, name: &str) -> PathBuf {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in ["name", "pos", "salary", "proj"].iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, (name, pos, salary, proj)) in PLAYERS.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, *name).unwrap();
        worksheet.write_string(row, 1, *pos).unwrap();
        worksheet.write_number(row, 2, *salary).unwrap();
        worksheet.write_number(row, 3, *proj).unwrap();
    }
    let path = dir.path().join(name);
    fs::write(&path, workbook.save_to_buffer().unwrap()).unwrap();
    path
}

fn open(engine: EngineKind, path: &Path) -> ProjectionsWorkflow {
    let mut wf =
        ProjectionsWorkflow::new(&GridConfig::default().with_engine(engine).with_seed(7));
    wf.open_projections(path).unwrap();
    wf
}

fn column(wf: &ProjectionsWorkflow, c: usize) -> Vec<String> {
    let model = wf.model();
    (0..model.row_count())
        .map(|r| model.cell_at(r, c).unwrap())
        .collect()
}

#[test]
fn workbook_loads_with_file_order_and_types() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["proj.excel", "proj.xlsx"] {
        let path = write_workbook(&dir, name);
        for engine in ENGINES {
            let wf = open(engine, &path);
            let model = wf.model();
            assert_eq!(model.row_count(), 4, "{name} on {engine:?}");
            let headers: Vec<String> = (0..model.column_count())
                .map(|c| model.header_label(c, Axis::Columns).unwrap())
                .collect();
            assert_eq!(headers, vec!["name", "pos", "salary", "proj"]);
            assert_eq!(column(&wf, 0), vec!["A", "B", "C", "D"]);
            assert_eq!(column(&wf, 1), vec!["QB", "RB", "WR", "TE"]);

            let current = wf.current().unwrap();
            assert!(!current.is_numeric(0).unwrap());
            assert!(current.is_numeric(2).unwrap());
            assert_eq!(
                current.numeric_column(3).unwrap(),
                vec![Some(10.0), Some(20.0), Some(15.5), Some(20.0)]
            );
            let proj: Vec<f64> = column(&wf, 3).iter().map(|v| v.parse().unwrap()).collect();
            assert_eq!(proj, vec![10.0, 20.0, 15.5, 20.0]);
        }
    }
}

#[test]
fn workbook_projections_can_be_randomized_and_undone() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(&dir, "proj.excel");
    for engine in ENGINES {
        let mut wf = open(engine, &path);
        let loaded = wf.current().cloned();

        wf.randomize_projections(None).unwrap();
        let current = wf.current().unwrap();
        assert_eq!(column(&wf, 0), vec!["A", "B", "C", "D"]);
        assert_eq!(
            current.numeric_column(2).unwrap(),
            loaded.as_ref().unwrap().numeric_column(2).unwrap()
        );
        for (value, (_, _, _, proj)) in current.numeric_column(3).unwrap().iter().zip(PLAYERS) {
            let value = value.unwrap();
            assert!((value - proj).abs() <= proj * 0.15 + 0.05 + 1e-9, "{value} vs {proj}");
        }

        wf.undo().unwrap();
        assert_eq!(wf.current().cloned(), loaded);
    }
}

#[test]
fn workbook_sorts_through_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(&dir, "proj.xlsx");
    for engine in ENGINES {
        let mut wf = open(engine, &path);
        wf.model_mut().sort(2, SortOrder::Ascending).unwrap();
        assert_eq!(column(&wf, 0), vec!["D", "C", "B", "A"]);
    }
}
