//! tabula-core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::Document;
pub use error::{Result, TabulaError};

pub use tabula_engine::engine::{CellRef, SheetSize};
