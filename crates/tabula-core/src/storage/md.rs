//! Markdown export functionality

use crate::document::Document;
use std::path::Path;
use tabula_engine::engine::CellRef;

/// Write the sheet to a markdown file
pub fn write_markdown(path: &Path, doc: &Document) -> std::io::Result<()> {
    std::fs::write(path, write_markdown_content(doc))
}

/// Render the populated part of the sheet as a markdown table
pub fn write_markdown_content(doc: &Document) -> String {
    let mut out = String::from("# Sheet\n\n");

    let Some((min_row, min_col, max_row, max_col)) = find_grid_bounds(doc) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };

    // Header with column letters
    out.push_str("|   |");
    for col in min_col..=max_col {
        out.push_str(&format!(" {} |", CellRef::col_to_letter(col)));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in min_col..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in min_row..=max_row {
        out.push_str(&format!("| {} |", row + 1)); // 1-based row numbers
        for col in min_col..=max_col {
            let display = doc.cell_display(CellRef::new(row, col));
            out.push_str(&format!(" {} |", escape_markdown(&display)));
        }
        out.push('\n');
    }

    out
}

/// Smallest (min_row, min_col, max_row, max_col) box holding every non-empty cell
fn find_grid_bounds(doc: &Document) -> Option<(usize, usize, usize, usize)> {
    doc.sheet.non_empty().fold(None, |bounds, (cell, _)| {
        Some(match bounds {
            None => (cell.row, cell.col, cell.row, cell.col),
            Some((r0, c0, r1, c1)) => (
                r0.min(cell.row),
                c0.min(cell.col),
                r1.max(cell.row),
                c1.max(cell.col),
            ),
        })
    })
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|")
}
