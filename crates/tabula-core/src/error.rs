//! Error types for Tabula core.

use thiserror::Error;

/// Errors that can occur while working with a document
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file path set")]
    NoFilePath,

    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, TabulaError>;
