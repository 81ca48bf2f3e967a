//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`CellRef`], [`SheetSize`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`Cell`], [`Sheet`] - The fixed-size grid and its cell records
//! - [`evaluate`] - Formula evaluation (range functions and arithmetic chains)
//! - [`Sheet::recalculate_all`] - Bounded multi-pass recalculation
//! - [`format_cell`] - Format values for display

mod cell;
mod cell_ref;
mod eval;
mod format;
mod recalc;
mod sheet;

pub use cell::{Cell, FORMULA_MARKER, MAX_CONTENT_LEN, parse_number};
pub use cell_ref::{CellRef, MAX_COLS, SheetSize};
pub use eval::{Aggregate, EvalContext, EvalError, Span, evaluate, parse_range_arg};
pub use format::{DEFAULT_COLUMN_WIDTH, ERROR_MARKER, format_cell, format_number};
pub use recalc::RECALC_PASSES;
pub use sheet::Sheet;
