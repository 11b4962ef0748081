//! JSON output for records.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::write_atomic;
use crate::error::{Error, Result};
use crate::model::Record;

/// File name of the aggregate JSON array.
pub const AGGREGATE_FILE_NAME: &str = "records.json";

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a value (a record or a list of records) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
}

/// Writes one `<stem>.json` per record into an output directory.
#[derive(Debug)]
pub struct JsonWriter {
    dir: PathBuf,
    format: JsonFormat,
    /// Lowercased file names handed out during this run
    claimed: HashSet<String>,
}

impl JsonWriter {
    pub fn new(dir: impl Into<PathBuf>, format: JsonFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            claimed: HashSet::new(),
        }
    }

    /// Keep `name` away from per-record files, e.g. the aggregate file.
    pub fn reserve(mut self, name: &str) -> Self {
        self.claimed.insert(name.to_lowercase());
        self
    }

    /// Write a record and return the path written.
    pub fn write(&mut self, record: &Record) -> Result<PathBuf> {
        let json = to_json(record, self.format)?;
        let path = self.output_path(&record.source_file);
        write_atomic(&path, json.as_bytes())?;
        self.claim(&path);
        Ok(path)
    }

    /// Path a record for `source_file` would be written to.
    ///
    /// `<stem>.json`, or `<file name>.json` when an earlier file of this run
    /// already took the stem.
    pub fn output_path(&self, source_file: &str) -> PathBuf {
        let stem = Path::new(source_file)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| source_file.to_string());

        let mut name = format!("{}.json", stem);
        if self.is_claimed(&name) {
            name = format!("{}.json", source_file);
        }
        let mut n = 2;
        while self.is_claimed(&name) {
            name = format!("{}-{}.json", source_file, n);
            n += 1;
        }

        self.dir.join(name)
    }

    fn is_claimed(&self, name: &str) -> bool {
        self.claimed.contains(&name.to_lowercase())
    }

    fn claim(&mut self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.claimed.insert(name.to_string_lossy().to_lowercase());
        }
    }
}

/// Write every record as one JSON array.
pub fn write_aggregate(path: &Path, records: &[Record], format: JsonFormat) -> Result<()> {
    let json = to_json(records, format)?;
    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    fn sample() -> Record {
        let mut record = Record::new("resume1.pdf", 1);
        record.email = Some("a@b.com".to_string());
        record.outline.push(OutlineEntry {
            level: HeadingLevel::H1,
            text: "Experience".to_string(),
            page: 1,
        });
        record
    }

    #[test]
    fn test_to_json_key_order_and_nulls() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"source_file":"resume1.pdf","page_count":1,"title":null,"author":null,"date":null,"email":"a@b.com","phone":null,"url":null,"outline":[{"level":"H1","text":"Experience","page":1}]}"#
        );
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["email"], "a@b.com");
    }

    #[test]
    fn test_writer_stem_collision() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = JsonWriter::new(dir.path(), JsonFormat::Pretty);

        let first = writer.write(&Record::new("a.PDF", 1)).unwrap();
        let second = writer.write(&Record::new("a.pdf", 1)).unwrap();

        assert_eq!(first, dir.path().join("a.json"));
        assert_eq!(second, dir.path().join("a.pdf.json"));
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_writer_skips_reserved_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            JsonWriter::new(dir.path(), JsonFormat::Pretty).reserve(AGGREGATE_FILE_NAME);

        let path = writer.write(&Record::new("RECORDS.PDF", 1)).unwrap();
        assert_eq!(path, dir.path().join("RECORDS.PDF.json"));
    }

    #[test]
    fn test_write_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AGGREGATE_FILE_NAME);
        write_aggregate(&path, &[sample(), Record::new("b.pdf", 2)], JsonFormat::Compact).unwrap();

        let records: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source_file, "b.pdf");
    }
}
