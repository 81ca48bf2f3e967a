//! Cell records stored in the sheet grid.

/// Content prefix that marks a formula.
pub const FORMULA_MARKER: char = '=';

/// Longest content (in characters) a cell keeps; longer input is truncated.
pub const MAX_CONTENT_LEN: usize = 255;

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Raw text as entered. Empty means the cell is unset.
    pub content: String,
    /// Last computed number, only meaningful when `is_numeric` is set.
    pub cached_value: f64,
    pub is_numeric: bool,
    /// The cached value must be recomputed before it is read again.
    pub dirty: bool,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_formula(&self) -> bool {
        self.content.starts_with(FORMULA_MARKER)
    }

    /// The formula text after the marker, if this is a formula cell.
    pub fn formula_body(&self) -> Option<&str> {
        self.content.strip_prefix(FORMULA_MARKER)
    }
}

/// Parse a non-formula input as a number.
/// The whole text must be consumed; empty and non-finite input is rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Truncate `text` to [`MAX_CONTENT_LEN`] characters.
pub(crate) fn bound_content(text: &str) -> String {
    match text.char_indices().nth(MAX_CONTENT_LEN) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
