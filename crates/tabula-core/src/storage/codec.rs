//! Reader and writer for the cell file format.
//!
//! One line per non-empty cell, `<row>,<col>,<content>`, with 0-based
//! coordinates and no header. Content is written as-is: a newline inside a
//! cell cannot be represented, and there is no escaping.

use crate::error::Result;
use log::warn;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use tabula_engine::engine::{CellRef, Sheet};

/// What happened while loading a sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Lines stored into the sheet.
    pub loaded: usize,
    /// Malformed or out-of-bounds lines that were ignored.
    pub skipped: usize,
}

/// Write a sheet to a file.
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_sheet_content(sheet);
    fs::write(path, content)?;
    Ok(())
}

/// Serialize the non-empty cells in row-major order.
pub fn write_sheet_content(sheet: &Sheet) -> String {
    let mut out = String::new();
    for (cell_ref, cell) in sheet.non_empty() {
        out.push_str(&format!("{},{},{}\n", cell_ref.row, cell_ref.col, cell.content));
    }
    out
}

/// Replace the contents of `sheet` with the lines of `content`, then
/// recalculate.
pub fn parse_sheet_content(content: &str, sheet: &mut Sheet) -> LoadSummary {
    sheet.clear();
    let mut summary = LoadSummary::default();
    for (line_num, line) in content.lines().enumerate() {
        load_line(line, line_num + 1, sheet, &mut summary);
    }
    sheet.recalculate_all();
    summary
}

/// Replace the contents of `sheet` with lines read from `reader`, then
/// recalculate.
///
/// A line that is not valid UTF-8 is skipped like any other malformed line.
/// A read error stops loading: the lines read so far stay in the sheet, it is
/// recalculated, and the error is returned.
pub fn read_sheet<R: BufRead>(mut reader: R, sheet: &mut Sheet) -> Result<LoadSummary> {
    sheet.clear();
    let mut summary = LoadSummary::default();
    let mut buf = Vec::new();
    let mut line_num = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!("read failed at line {}: {}", line_num + 1, err);
                sheet.recalculate_all();
                return Err(err.into());
            }
        }
        line_num += 1;

        let bytes = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        match std::str::from_utf8(bytes) {
            Ok(line) => load_line(line, line_num, sheet, &mut summary),
            Err(_) => {
                warn!("line {}: not valid UTF-8, skipped", line_num);
                summary.skipped += 1;
            }
        }
    }
    sheet.recalculate_all();
    Ok(summary)
}

fn load_line(line: &str, line_num: usize, sheet: &mut Sheet, summary: &mut LoadSummary) {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return;
    }

    let Some((row, rest)) = line.split_once(',') else {
        warn!("line {}: missing column separator, skipped", line_num);
        summary.skipped += 1;
        return;
    };
    let Some((col, content)) = rest.split_once(',') else {
        warn!("line {}: missing content separator, skipped", line_num);
        summary.skipped += 1;
        return;
    };
    let (Ok(row), Ok(col)) = (row.trim().parse::<usize>(), col.trim().parse::<usize>()) else {
        warn!("line {}: invalid coordinates, skipped", line_num);
        summary.skipped += 1;
        return;
    };

    if sheet.store_raw(CellRef::new(row, col), content) {
        summary.loaded += 1;
    } else {
        warn!("line {}: cell ({}, {}) is outside the sheet, skipped", line_num, row, col);
        summary.skipped += 1;
    }
}
