//! Cell reference parsing and formatting.
//!
//! Converts between spreadsheet-style cell references (e.g., "A1", "B12")
//! and zero-indexed row/column coordinates. A column is always a single
//! letter, so a sheet never has more than 26 columns.
//!
//! # Examples
//!
//! ```
//! use tabula_engine::engine::{CellRef, SheetSize};
//!
//! let cell = CellRef::parse("B3", SheetSize::default()).unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Largest column count a sheet can have (one letter per column).
pub const MAX_COLS: usize = 26;

/// Dimensions of a sheet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SheetSize {
    pub rows: usize,
    pub cols: usize,
}

impl SheetSize {
    pub const DEFAULT_ROWS: usize = 100;
    pub const DEFAULT_COLS: usize = MAX_COLS;

    /// Create a size, clamping the column count to [`MAX_COLS`].
    pub fn new(rows: usize, cols: usize) -> SheetSize {
        SheetSize {
            rows,
            cols: cols.min(MAX_COLS),
        }
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for SheetSize {
    fn default() -> Self {
        SheetSize::new(Self::DEFAULT_ROWS, Self::DEFAULT_COLS)
    }
}

/// A reference to a cell by row and column indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a reference such as "A1" or "b12" and check it against `size`.
    /// Returns None if the text is malformed or the cell lies outside the sheet.
    pub fn parse(text: &str, size: SheetSize) -> Option<CellRef> {
        let caps = a1_re().captures(text)?;
        let letter = caps["letter"].as_bytes()[0].to_ascii_uppercase();
        let col = (letter - b'A') as usize;
        let row = caps["number"].parse::<usize>().ok()?.checked_sub(1)?;

        let cell = CellRef::new(row, col);
        size.contains(&cell).then_some(cell)
    }

    /// Convert a column index to its letter (0 -> A, 25 -> Z).
    /// Returns '?' for indices past the last column.
    pub fn col_to_letter(col: usize) -> char {
        if col < MAX_COLS {
            (b'A' + col as u8) as char
        } else {
            '?'
        }
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Za-z])(?<number>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    /// Parses against the default sheet size.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, SheetSize::default()).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col), self.row + 1)
    }
}
