//! Fixed-capacity cell store.
//!
//! A [`Sheet`] owns every [`Cell`] of the grid in one row-major `Vec`. Writes
//! go through [`Sheet::set`], which classifies the input and evaluates
//! formulas eagerly. Reads during evaluation go through [`Sheet::value_of`],
//! which recomputes a formula cell first when it is marked dirty.

use super::cell::{Cell, bound_content, parse_number};
use super::eval::{EvalContext, evaluate};
use super::format::format_cell;
use super::{CellRef, SheetSize};

/// The spreadsheet grid.
#[derive(Clone, Debug)]
pub struct Sheet {
    size: SheetSize,
    cells: Vec<Cell>,
}

impl Sheet {
    pub fn new(size: SheetSize) -> Self {
        Sheet {
            size,
            cells: vec![Cell::default(); size.cell_count()],
        }
    }

    pub fn size(&self) -> SheetSize {
        self.size
    }

    fn index(&self, cell: &CellRef) -> Option<usize> {
        self.size
            .contains(cell)
            .then(|| cell.row * self.size.cols + cell.col)
    }

    fn position(&self, idx: usize) -> CellRef {
        CellRef::new(idx / self.size.cols, idx % self.size.cols)
    }

    pub fn get(&self, cell: CellRef) -> Option<&Cell> {
        self.index(&cell).map(|idx| &self.cells[idx])
    }

    /// Store `text` in a cell.
    ///
    /// Formulas are evaluated immediately. Other input is a number when the
    /// whole text parses as one, otherwise text. Returns false (and does
    /// nothing) when the cell is outside the sheet.
    pub fn set(&mut self, cell: CellRef, text: &str) -> bool {
        if !self.store_raw(cell, text) {
            return false;
        }
        self.value_of(cell);
        true
    }

    /// Store `text` in a cell without evaluating it.
    ///
    /// Numbers and text are classified as in [`Sheet::set`]. A formula is
    /// left dirty with no value until something reads it.
    pub fn store_raw(&mut self, cell: CellRef, text: &str) -> bool {
        let Some(idx) = self.index(&cell) else {
            return false;
        };

        let content = bound_content(text);
        let number = parse_number(&content);
        let mut stored = Cell {
            content,
            cached_value: number.unwrap_or(0.0),
            is_numeric: number.is_some(),
            dirty: false,
        };
        stored.dirty = stored.is_formula();
        self.cells[idx] = stored;
        true
    }

    /// Current numeric value of a cell, recomputing a dirty formula first.
    /// Cells outside the sheet and non-numeric cells read as 0.
    pub fn value_of(&mut self, cell: CellRef) -> f64 {
        let Some(idx) = self.index(&cell) else {
            return 0.0;
        };

        if self.cells[idx].dirty {
            // Cleared before evaluating so a formula that reaches itself
            // reads its previous value instead of recursing.
            self.cells[idx].dirty = false;
            if let Some(body) = self.cells[idx].formula_body().map(str::to_string) {
                let value = evaluate(&body, self);
                self.store_result(idx, value);
            }
        }

        let cell = &self.cells[idx];
        if cell.is_numeric { cell.cached_value } else { 0.0 }
    }

    fn store_result(&mut self, idx: usize, value: f64) {
        let cell = &mut self.cells[idx];
        cell.cached_value = value;
        cell.is_numeric = value.is_finite();
        cell.dirty = false;
    }

    /// Mark every formula cell stale. Returns how many were marked.
    pub(crate) fn mark_formulas_dirty(&mut self) -> usize {
        let mut marked = 0;
        for cell in self.cells.iter_mut().filter(|c| c.is_formula()) {
            cell.dirty = true;
            marked += 1;
        }
        marked
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Non-empty cells in row-major order.
    pub fn non_empty(&self) -> impl Iterator<Item = (CellRef, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(idx, cell)| (self.position(idx), cell))
    }

    /// Display string for a cell. Reads the cached value without recomputing.
    pub fn display(&self, cell: CellRef, width: usize) -> String {
        self.get(cell)
            .map(|c| format_cell(c, width))
            .unwrap_or_default()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new(SheetSize::default())
    }
}

impl EvalContext for Sheet {
    fn size(&self) -> SheetSize {
        self.size
    }

    fn value_of(&mut self, cell: CellRef) -> f64 {
        Sheet::value_of(self, cell)
    }

    fn has_content(&self, cell: CellRef) -> bool {
        self.get(cell).is_some_and(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DEFAULT_COLUMN_WIDTH;

    fn at(name: &str) -> CellRef {
        name.parse().unwrap()
    }

    fn show(sheet: &Sheet, name: &str) -> String {
        sheet.display(at(name), DEFAULT_COLUMN_WIDTH)
    }

    #[test]
    fn test_set_number_and_text() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "5");
        assert_eq!(show(&sheet, "A1"), "5.00");
        let cell = sheet.get(at("A1")).unwrap();
        assert!(cell.is_numeric);
        assert_eq!(cell.cached_value, 5.0);

        sheet.set(at("A1"), "hello");
        assert_eq!(show(&sheet, "A1"), "hello");
        assert!(!sheet.get(at("A1")).unwrap().is_numeric);
        assert_eq!(sheet.value_of(at("A1")), 0.0);
    }

    #[test]
    fn test_empty_cell_is_never_numeric() {
        let mut sheet = Sheet::default();
        sheet.set(at("B2"), "3");
        sheet.set(at("B2"), "");
        let cell = sheet.get(at("B2")).unwrap();
        assert!(cell.is_empty());
        assert!(!cell.is_numeric);
        assert_eq!(cell.cached_value, 0.0);
        assert_eq!(show(&sheet, "B2"), "");
    }

    #[test]
    fn test_formula_is_evaluated_on_set() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "10");
        sheet.set(at("A2"), "20");
        sheet.set(at("A3"), "=A1+A2");
        let cell = sheet.get(at("A3")).unwrap();
        assert!(cell.is_numeric);
        assert!(!cell.dirty);
        assert_eq!(cell.cached_value, 30.0);
        assert_eq!(show(&sheet, "A3"), "30.00");
    }

    #[test]
    fn test_formula_content_is_kept_verbatim() {
        let mut sheet = Sheet::default();
        sheet.set(at("C1"), "=2+3*4");
        let cell = sheet.get(at("C1")).unwrap();
        assert_eq!(cell.content, "=2+3*4");
        assert_eq!(cell.cached_value, 20.0);
    }

    #[test]
    fn test_dirty_formula_recomputes_on_read() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "1");
        sheet.set(at("B1"), "=A1*2");
        // Changing A1 does not touch B1 until it is marked dirty.
        sheet.set(at("A1"), "4");
        assert_eq!(sheet.get(at("B1")).unwrap().cached_value, 2.0);
        sheet.mark_formulas_dirty();
        assert_eq!(sheet.value_of(at("B1")), 8.0);
        assert!(!sheet.get(at("B1")).unwrap().dirty);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut sheet = Sheet::new(SheetSize::new(2, 2));
        assert!(!sheet.set(CellRef::new(2, 0), "1"));
        assert!(!sheet.set(CellRef::new(0, 2), "1"));
        assert!(sheet.is_empty());
        assert_eq!(sheet.value_of(CellRef::new(5, 5)), 0.0);
        assert!(sheet.get(CellRef::new(5, 5)).is_none());
        assert_eq!(sheet.display(CellRef::new(5, 5), 10), "");
    }

    #[test]
    fn test_non_finite_formula_displays_error() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "1e308");
        sheet.set(at("A2"), "=A1*10");
        assert!(!sheet.get(at("A2")).unwrap().is_numeric);
        assert_eq!(show(&sheet, "A2"), "ERROR");
        assert_eq!(sheet.value_of(at("A2")), 0.0);
    }

    #[test]
    fn test_long_content_is_truncated() {
        let mut sheet = Sheet::default();
        let long = "x".repeat(1000);
        sheet.set(at("A1"), &long);
        assert_eq!(
            sheet.get(at("A1")).unwrap().content.len(),
            crate::engine::MAX_CONTENT_LEN
        );
        assert_eq!(show(&sheet, "A1"), "x".repeat(DEFAULT_COLUMN_WIDTH));
    }

    #[test]
    fn test_non_empty_is_row_major() {
        let mut sheet = Sheet::default();
        sheet.set(at("B2"), "3");
        sheet.set(at("A1"), "1");
        sheet.set(at("C1"), "2");
        let cells: Vec<_> = sheet.non_empty().map(|(c, _)| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "C1", "B2"]);
    }

    #[test]
    fn test_clear_resets_every_cell() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "1");
        sheet.set(at("A2"), "=A1");
        sheet.clear();
        assert!(sheet.is_empty());
        assert_eq!(sheet.non_empty().count(), 0);
    }

    #[test]
    fn test_store_raw_leaves_formula_unevaluated() {
        let mut sheet = Sheet::default();
        sheet.store_raw(at("A1"), "4");
        sheet.store_raw(at("A2"), "=A1*2");
        let cell = sheet.get(at("A2")).unwrap();
        assert!(cell.dirty);
        assert!(!cell.is_numeric);
        assert_eq!(cell.cached_value, 0.0);
        assert!(sheet.get(at("A1")).unwrap().is_numeric);

        assert_eq!(sheet.value_of(at("A2")), 8.0);
        assert!(!sheet.get(at("A2")).unwrap().dirty);
        assert!(!sheet.store_raw(CellRef::new(500, 0), "1"));
    }

    #[test]
    fn test_self_reference_on_set_reads_previous_value() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "=A1+1");
        assert_eq!(sheet.get(at("A1")).unwrap().cached_value, 1.0);
    }
}
