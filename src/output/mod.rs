//! Output writers for assembled records.

mod csv;
mod json;

pub use self::csv::{outline_cell, CsvWriter, CSV_FILE_NAME};
pub use self::json::{to_json, write_aggregate, JsonFormat, JsonWriter, AGGREGATE_FILE_NAME};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Which artifacts to produce per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormats {
    /// One `<stem>.json` per document
    pub json: bool,
    /// One aggregate `records.csv` per run
    pub csv: bool,
}

impl OutputFormats {
    pub const JSON: Self = Self {
        json: true,
        csv: false,
    };
    pub const CSV: Self = Self {
        json: false,
        csv: true,
    };
    pub const BOTH: Self = Self {
        json: true,
        csv: true,
    };
}

impl Default for OutputFormats {
    fn default() -> Self {
        Self::JSON
    }
}

/// Write bytes to a temporary sibling, then rename into place.
///
/// On failure the temporary file is removed and nothing exists at `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::write(path, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::write(path, e));
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
