//! Whole-sheet recalculation.
//!
//! There is no dependency graph. Every formula is marked dirty, then the grid
//! is swept a fixed number of times in row-major order, reading every cell so
//! that dirty formulas are recomputed. Reads are lazy, so a formula that
//! depends on a dirty cell recomputes that cell first. Cycles settle on
//! whatever values remain after the sweeps instead of being detected.

use log::{debug, warn};
use std::thread;

use super::{CellRef, Sheet};

/// Number of row-major sweeps performed by [`Sheet::recalculate_all`].
pub const RECALC_PASSES: usize = 3;

/// Stack reserved for each dirty formula on the sweep thread. Reading a dirty
/// formula recurses into the dirty formulas it reads, at most once per cell.
const STACK_PER_FORMULA: usize = 16 * 1024;
const BASE_SWEEP_STACK: usize = 2 * 1024 * 1024;

impl Sheet {
    /// Recompute every formula in the sheet.
    ///
    /// The sweeps run on a helper thread whose stack grows with the number of
    /// formulas, and the call returns once they are done.
    pub fn recalculate_all(&mut self) {
        let marked = self.mark_formulas_dirty();
        let stack_size =
            BASE_SWEEP_STACK.saturating_add(marked.saturating_mul(STACK_PER_FORMULA));

        let sheet = &mut *self;
        let swept = thread::scope(|scope| {
            thread::Builder::new()
                .name("tabula-recalc".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, move || sheet.sweep())
                .map(|handle| handle.join())
        });
        match swept {
            Ok(Ok(())) => {}
            Ok(Err(payload)) => std::panic::resume_unwind(payload),
            Err(err) => {
                warn!("cannot spawn recalculation thread ({}), sweeping in place", err);
                self.sweep();
            }
        }

        debug!(
            "recalculated {} formula cells in {} passes",
            marked, RECALC_PASSES
        );
    }

    fn sweep(&mut self) {
        let size = self.size();
        for _ in 0..RECALC_PASSES {
            for row in 0..size.rows {
                for col in 0..size.cols {
                    self.value_of(CellRef::new(row, col));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SheetSize;

    fn at(name: &str) -> CellRef {
        name.parse().unwrap()
    }

    fn value(sheet: &Sheet, name: &str) -> f64 {
        sheet.get(at(name)).unwrap().cached_value
    }

    #[test]
    fn test_sum_after_recalculation() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "10");
        sheet.set(at("A2"), "20");
        sheet.set(at("A3"), "=SUM(A1:A2)");
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "A3"), 30.0);
    }

    #[test]
    fn test_reversed_range_with_empty_cell() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "=SUM(A2:A1)");
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "A1"), 0.0);
    }

    #[test]
    fn test_average_of_empty_range() {
        let mut sheet = Sheet::default();
        sheet.set(at("B1"), "=AVG(C1:C5)");
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "B1"), 0.0);
        assert!(sheet.get(at("B1")).unwrap().is_numeric);
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut sheet = Sheet::default();
        // A1 depends on cells later in row-major order.
        sheet.set(at("A1"), "=B5*2");
        sheet.set(at("B5"), "=C9+1");
        sheet.set(at("C9"), "4");
        assert_eq!(value(&sheet, "A1"), 0.0);
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "B5"), 5.0);
        assert_eq!(value(&sheet, "A1"), 10.0);
    }

    #[test]
    fn test_edit_propagates_after_recalculation() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "1");
        sheet.set(at("A2"), "=A1+1");
        sheet.set(at("A3"), "=SUM(A1:A2)");
        sheet.set(at("A1"), "5");
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "A2"), 6.0);
        assert_eq!(value(&sheet, "A3"), 11.0);
    }

    #[test]
    fn test_no_cell_is_dirty_afterwards() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "=B1");
        sheet.set(at("B1"), "=A1");
        sheet.recalculate_all();
        assert!(sheet.non_empty().all(|(_, cell)| !cell.dirty));
    }

    #[test]
    fn test_direct_cycle_terminates() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "=A1+1");
        sheet.recalculate_all();
        let first = value(&sheet, "A1");
        assert!(first.is_finite());

        // Same starting state, same result.
        let mut again = Sheet::default();
        again.set(at("A1"), "=A1+1");
        again.recalculate_all();
        assert_eq!(value(&again, "A1"), first);
    }

    #[test]
    fn test_range_that_includes_itself_terminates() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "2");
        sheet.set(at("A2"), "=SUM(A1:A3)");
        sheet.set(at("A3"), "=A2");
        sheet.recalculate_all();
        assert!(value(&sheet, "A2").is_finite());
        assert!(value(&sheet, "A3").is_finite());
    }

    #[test]
    fn test_count_sees_text_and_formulas() {
        let mut sheet = Sheet::default();
        sheet.set(at("A1"), "label");
        sheet.set(at("A2"), "3");
        sheet.set(at("A3"), "=A2");
        sheet.set(at("B1"), "=COUNT(A1:A5)");
        sheet.recalculate_all();
        assert_eq!(value(&sheet, "B1"), 3.0);
    }

    #[test]
    fn test_long_chain_on_largest_sheet() {
        // Every cell reads the next one in row-major order, so the first
        // sweep recurses through the whole grid.
        let mut sheet = Sheet::new(SheetSize::new(999, 26));
        let size = sheet.size();
        let cells: Vec<CellRef> = (0..size.rows)
            .flat_map(|row| (0..size.cols).map(move |col| CellRef::new(row, col)))
            .collect();
        for pair in cells.windows(2) {
            sheet.store_raw(pair[0], &format!("={}+1", pair[1]));
        }
        sheet.store_raw(cells[cells.len() - 1], "1");

        sheet.recalculate_all();
        assert_eq!(value(&sheet, "A1"), size.cell_count() as f64);
        assert_eq!(sheet.get(CellRef::new(998, 24)).unwrap().cached_value, 2.0);
    }
}
