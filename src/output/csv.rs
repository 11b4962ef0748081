//! Aggregate CSV output.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{OutlineEntry, Record};

/// File name of the per-run CSV.
pub const CSV_FILE_NAME: &str = "records.csv";

/// Appends one row per record to a CSV file.
///
/// The file is created with its header on the first record, so a run that
/// writes no record leaves no CSV behind. Each row is flushed immediately.
#[derive(Debug)]
pub struct CsvWriter {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows: usize,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            rows: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Append a record.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        let path = self.path.clone();

        let writer = match &mut self.writer {
            Some(writer) => writer,
            slot => {
                let file = File::create(&path).map_err(|e| Error::write(&path, e))?;
                let mut writer = csv::Writer::from_writer(file);
                writer
                    .write_record(Record::COLUMNS)
                    .map_err(|e| csv_error(&path, e))?;
                slot.insert(writer)
            }
        };

        writer
            .write_record(row(record))
            .map_err(|e| csv_error(&path, e))?;
        writer.flush().map_err(|e| Error::write(&path, e))?;
        self.rows += 1;

        Ok(())
    }
}

fn row(record: &Record) -> [String; 9] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        record.source_file.clone(),
        record.page_count.to_string(),
        opt(&record.title),
        opt(&record.author),
        opt(&record.date),
        opt(&record.email),
        opt(&record.phone),
        opt(&record.url),
        outline_cell(&record.outline),
    ]
}

/// Outline as a single cell: `H1:Intro@1; H2:Scope@2`.
pub fn outline_cell(outline: &[OutlineEntry]) -> String {
    outline
        .iter()
        .map(|e| format!("{}:{}@{}", e.level.as_str(), e.text, e.page))
        .collect::<Vec<_>>()
        .join("; ")
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::write(path, e),
        other => Error::Serialize(format!("CSV error: {:?}", other)),
    }
}
