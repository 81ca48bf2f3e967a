use super::Document;
use crate::error::{Result, TabulaError};
use tabula_engine::engine::{CellRef, FORMULA_MARKER, evaluate};

impl Document {
    /// Set cell contents from input and recalculate the sheet.
    /// Returns false when the cell is outside the sheet.
    pub fn set_cell(&mut self, cell_ref: CellRef, input: &str) -> bool {
        if !self.sheet.set(cell_ref, input) {
            self.set_status(format!("{} is outside the sheet", cell_ref));
            return false;
        }
        self.sheet.recalculate_all();
        self.modified = true;
        true
    }

    /// Set a cell named in A1 notation, e.g. `set_cell_by_name("B3", "=A1*2")`.
    pub fn set_cell_by_name(&mut self, name: &str, input: &str) -> Result<CellRef> {
        let cell_ref = CellRef::parse(name.trim(), self.sheet.size())
            .ok_or_else(|| TabulaError::InvalidReference(name.to_string()))?;
        self.set_cell(cell_ref, input);
        Ok(cell_ref)
    }

    /// Clear a cell and recalculate the sheet.
    pub fn clear_cell(&mut self, cell_ref: CellRef) -> bool {
        self.set_cell(cell_ref, "")
    }

    /// Get the display value for a cell
    pub fn cell_display(&self, cell_ref: CellRef) -> String {
        self.sheet.display(cell_ref, self.column_width)
    }

    /// Get the raw content of a cell (what the user typed)
    pub fn cell_content(&self, cell_ref: CellRef) -> &str {
        self.sheet
            .get(cell_ref)
            .map(|cell| cell.content.as_str())
            .unwrap_or("")
    }

    /// Evaluate an expression against the sheet without storing it.
    /// The leading `=` is optional.
    pub fn evaluate_expression(&mut self, expr: &str) -> f64 {
        let expr = expr.trim();
        let body = expr.strip_prefix(FORMULA_MARKER).unwrap_or(expr);
        evaluate(body, &mut self.sheet)
    }
}
