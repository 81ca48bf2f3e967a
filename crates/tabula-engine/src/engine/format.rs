use super::Cell;

/// Width, in characters, of a rendered column.
pub const DEFAULT_COLUMN_WIDTH: usize = 10;

/// Shown for a formula that did not produce a number.
pub const ERROR_MARKER: &str = "ERROR";

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    format!("{:.2}", n)
}

/// Format a cell for display in a column `width` characters wide.
/// Only text is truncated; numbers always keep two decimals.
pub fn format_cell(cell: &Cell, width: usize) -> String {
    if cell.is_empty() {
        String::new()
    } else if cell.is_numeric {
        format_number(cell.cached_value)
    } else if cell.is_formula() {
        ERROR_MARKER.to_string()
    } else {
        cell.content.chars().take(width).collect()
    }
}
