use tracing::{debug, trace};

use crate::domain::{Result, SortOrder};
use crate::model::TabularModel;

/// Active sort column and direction shown by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<usize>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    column: usize,
    order: SortOrder,
}

/// Clickable horizontal header that turns press/release pairs into sort
/// requests.
///
/// Sections are laid out left to right with the given widths. The rightmost
/// strip of each section, as wide as the header is tall, is the sort
/// indicator.
///
/// | state        | press on      | release on   | new state          |
/// |--------------|---------------|--------------|--------------------|
/// | any          | column c      | outside      | unchanged          |
/// | {c, o}       | c, indicator  | c            | {c, !o}            |
/// | {c, o}       | c, elsewhere  | c            | {c, o} (no sort)   |
/// | {c, o}/none  | d != c        | d            | {d, Ascending}     |
/// | any          | column p      | r != p       | {r, Ascending}     |
///
/// `model.sort` runs only when the resolved state differs from the current one.
#[derive(Debug, Clone)]
pub struct SortableColumnHeader {
    widths: Vec<f64>,
    height: f64,
    state: SortState,
    pressed: Option<Press>,
}

impl SortableColumnHeader {
    pub fn new(widths: Vec<f64>, height: f64) -> Self {
        Self {
            widths,
            height,
            state: SortState::default(),
            pressed: None,
        }
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    pub fn set_widths(&mut self, widths: Vec<f64>) {
        self.widths = widths;
        if self.state.column.is_some_and(|c| c >= self.widths.len()) {
            self.state.column = None;
        }
    }

    pub fn section_position(&self, column: usize) -> f64 {
        self.widths.iter().take(column).sum()
    }

    pub fn section_size(&self, column: usize) -> f64 {
        self.widths.get(column).copied().unwrap_or(0.0)
    }

    pub fn logical_index_at(&self, x: f64) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let mut left = 0.0;
        for (idx, width) in self.widths.iter().enumerate() {
            if x < left + width {
                return Some(idx);
            }
            left += width;
        }
        None
    }

    /// True when `x` lies in the indicator strip at the right edge of `column`.
    pub fn in_indicator(&self, column: usize, x: f64) -> bool {
        let x_right = self.section_position(column) + self.section_size(column);
        x_right - self.height <= x && x <= x_right
    }

    pub fn press(&mut self, x: f64) {
        self.pressed = self.logical_index_at(x).map(|column| {
            let order = match self.state.column {
                Some(active) if active == column && self.in_indicator(column, x) => {
                    self.state.order.toggled()
                }
                Some(active) if active == column => self.state.order,
                _ => SortOrder::Ascending,
            };
            Press { column, order }
        });
        trace!("Header press at {x}: {:?}", self.pressed);
    }

    /// Resolves the pending press and sorts the model if the sort state
    /// changed. Returns the state that was applied, if any.
    pub fn release(&mut self, x: f64, model: &mut TabularModel) -> Result<Option<SortState>> {
        let Some(press) = self.pressed.take() else {
            return Ok(None);
        };
        let Some(column) = self.logical_index_at(x) else {
            trace!("Header release outside of any section, press cancelled");
            return Ok(None);
        };
        let order = if column == press.column {
            press.order
        } else {
            SortOrder::Ascending
        };
        self.set_sort_indicator(column, order, model)
    }

    pub fn click(&mut self, x: f64, model: &mut TabularModel) -> Result<Option<SortState>> {
        self.press(x);
        self.release(x, model)
    }

    /// Moves the indicator to `column` and sorts the model, unless the header
    /// already shows exactly that.
    pub fn set_sort_indicator(
        &mut self,
        column: usize,
        order: SortOrder,
        model: &mut TabularModel,
    ) -> Result<Option<SortState>> {
        let next = SortState {
            column: Some(column),
            order,
        };
        if next == self.state {
            return Ok(None);
        }
        debug!("Sort indicator: column {column}, {order:?}");
        model.sort(column, order)?;
        self.state = next;
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::dataset::loader::RawTable;
    use crate::dataset::value::Value;
    use crate::domain::EngineKind;

    // Two 100px sections, 20px tall: indicators at [80, 100] and [180, 200].
    fn setup() -> (SortableColumnHeader, TabularModel) {
        let mut model = TabularModel::new(EngineKind::Indexed);
        let raw = RawTable {
            columns: vec!["name".into(), "proj".into()],
            rows: vec![
                vec![Value::Str("A".into()), Value::Float(10.0)],
                vec![Value::Str("B".into()), Value::Float(20.0)],
            ],
        };
        model
            .install(Dataset::from_raw(raw, EngineKind::Indexed).unwrap())
            .unwrap();
        (SortableColumnHeader::new(vec![100.0, 100.0], 20.0), model)
    }

    fn names(model: &TabularModel) -> Vec<String> {
        (0..model.row_count())
            .map(|r| model.cell_at(r, 0).unwrap())
            .collect()
    }

    #[test]
    fn geometry() {
        let (header, _) = setup();
        assert_eq!(header.logical_index_at(0.0), Some(0));
        assert_eq!(header.logical_index_at(150.0), Some(1));
        assert_eq!(header.logical_index_at(200.0), None);
        assert!(header.in_indicator(0, 80.0));
        assert!(header.in_indicator(0, 100.0));
        assert!(!header.in_indicator(0, 79.5));
    }

    #[test]
    fn first_click_sorts_ascending() {
        let (mut header, mut model) = setup();
        let applied = header.click(190.0, &mut model).unwrap();
        assert_eq!(
            applied,
            Some(SortState {
                column: Some(1),
                order: SortOrder::Ascending
            })
        );
        assert_eq!(names(&model), vec!["A", "B"]);
    }

    #[test]
    fn indicator_click_toggles_order() {
        let (mut header, mut model) = setup();
        header.click(150.0, &mut model).unwrap();
        header.click(190.0, &mut model).unwrap();
        assert_eq!(header.state().order, SortOrder::Descending);
        assert_eq!(names(&model), vec!["B", "A"]);
        header.click(190.0, &mut model).unwrap();
        assert_eq!(header.state().order, SortOrder::Ascending);
        assert_eq!(names(&model), vec!["A", "B"]);
    }

    #[test]
    fn body_click_on_active_column_is_a_no_op() {
        let (mut header, mut model) = setup();
        header.click(190.0, &mut model).unwrap();
        header.click(190.0, &mut model).unwrap();
        assert_eq!(header.click(120.0, &mut model).unwrap(), None);
        assert_eq!(header.state().order, SortOrder::Descending);
    }

    #[test]
    fn changing_column_resets_to_ascending() {
        let (mut header, mut model) = setup();
        header.click(150.0, &mut model).unwrap();
        header.click(190.0, &mut model).unwrap();
        let applied = header.click(90.0, &mut model).unwrap();
        assert_eq!(
            applied,
            Some(SortState {
                column: Some(0),
                order: SortOrder::Ascending
            })
        );
    }

    #[test]
    fn dragging_to_another_column_resets_to_ascending() {
        let (mut header, mut model) = setup();
        header.click(150.0, &mut model).unwrap();
        header.press(190.0);
        let applied = header.release(10.0, &mut model).unwrap();
        assert_eq!(
            applied,
            Some(SortState {
                column: Some(0),
                order: SortOrder::Ascending
            })
        );
    }

    #[test]
    fn release_outside_cancels() {
        let (mut header, mut model) = setup();
        header.press(50.0);
        assert_eq!(header.release(500.0, &mut model).unwrap(), None);
        assert_eq!(header.state(), SortState::default());
        assert_eq!(header.release(50.0, &mut model).unwrap(), None);
    }

    #[test]
    fn programmatic_indicator_sorts() {
        let (mut header, mut model) = setup();
        header
            .set_sort_indicator(1, SortOrder::Descending, &mut model)
            .unwrap();
        assert_eq!(names(&model), vec!["B", "A"]);
    }
}
