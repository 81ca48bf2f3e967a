//! tabula_engine - Spreadsheet cell store, formula evaluation and recalculation.

pub mod engine;
