use super::Document;
use crate::error::{Result, TabulaError};
use crate::storage::{read_sheet, write_sheet};
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

impl Document {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            self.set_status("No file name");
            return Err(TabulaError::NoFilePath);
        };
        self.save_as(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        if let Err(err) = write_sheet(path, &self.sheet) {
            warn!("saving {} failed: {}", path.display(), err);
            self.set_status(format!("Could not save {}: {}", path.display(), err));
            return Err(err);
        }
        debug!("saved {}", path.display());
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        self.set_status(format!("Saved {}", path.display()));
        Ok(())
    }

    /// Load from file, replacing the sheet.
    ///
    /// If the file cannot be opened the sheet is left untouched. If reading
    /// fails part-way, the cells read before the failure are kept, the file
    /// path is not changed and the document is marked modified.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!("opening {} failed: {}", path.display(), err);
                self.set_status(format!("Could not open {}: {}", path.display(), err));
                return Err(err.into());
            }
        };

        match read_sheet(BufReader::new(file), &mut self.sheet) {
            Ok(summary) => {
                self.file_path = Some(path.to_path_buf());
                self.modified = false;
                debug!(
                    "loaded {}: {} cells, {} lines skipped",
                    path.display(),
                    summary.loaded,
                    summary.skipped
                );
                let mut status = format!("Loaded {} ({} cells)", path.display(), summary.loaded);
                if summary.skipped > 0 {
                    status.push_str(&format!(", skipped {} lines", summary.skipped));
                }
                self.set_status(status);
                Ok(())
            }
            Err(err) => {
                self.modified = true;
                self.set_status(format!("Error reading {}: {}", path.display(), err));
                Err(err)
            }
        }
    }
}
