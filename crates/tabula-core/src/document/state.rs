use crate::error::Result;
use std::path::PathBuf;
use tabula_engine::engine::{DEFAULT_COLUMN_WIDTH, Sheet, SheetSize};

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The spreadsheet grid
    pub sheet: Sheet,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since the last load/save
    pub modified: bool,
    /// Width used when rendering text cells
    pub column_width: usize,
    /// Last status message for the presentation layer
    pub(crate) status: Option<String>,
}

impl Document {
    /// Create an empty document with the default sheet size.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_size(SheetSize::default())
    }

    pub fn with_size(size: SheetSize) -> Self {
        Document {
            sheet: Sheet::new(size),
            file_path: None,
            modified: false,
            column_width: DEFAULT_COLUMN_WIDTH,
            status: None,
        }
    }

    /// Create a new document and load a file if provided.
    /// A path that does not exist yet just becomes the save target.
    pub fn with_file(path: Option<PathBuf>, size: SheetSize) -> Result<Self> {
        let mut doc = Self::with_size(size);
        if let Some(p) = path {
            if p.exists() {
                doc.load_file(&p)?;
            } else {
                doc.status = Some(format!("New file {}", p.display()));
                doc.file_path = Some(p);
            }
        }
        Ok(doc)
    }

    /// The most recent status message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Take the status message, leaving none behind.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
