//! Batch driver: discovers PDFs in a directory, runs the pipeline on each
//! and writes the results.
//!
//! # Example
//!
//! ```no_run
//! use pdfsift::batch::{BatchConfig, BatchDriver};
//! use pdfsift::output::OutputFormats;
//!
//! fn main() -> pdfsift::Result<()> {
//!     let config = BatchConfig::new("./input", "./output").with_formats(OutputFormats::BOTH);
//!     let report = BatchDriver::new(config)?.run()?;
//!     println!("{} succeeded, {} failed", report.succeeded, report.failed);
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assemble::assemble;
use crate::error::{Error, ErrorKind, Result};
use crate::extract::{DocumentText, FieldExtractor};
use crate::model::{file_name_of, Record};
use crate::normalize::{NormalizeOptions, Normalizer};
use crate::output::{
    to_json, write_aggregate, CsvWriter, JsonFormat, JsonWriter, OutputFormats,
    AGGREGATE_FILE_NAME, CSV_FILE_NAME,
};
use crate::source::{LopdfSource, SourceOptions, TextSource};

/// Default input directory.
pub const DEFAULT_INPUT_DIR: &str = "/app/input";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "/app/output";

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for PDFs (not recursive)
    pub input_dir: PathBuf,

    /// Directory receiving the artifacts; created if missing
    pub output_dir: PathBuf,

    /// Artifacts to produce
    pub formats: OutputFormats,

    /// Layout of JSON artifacts
    pub json_format: JsonFormat,

    /// Also write every record into one `records.json`
    pub aggregate: bool,

    /// Where to write the run report, if anywhere
    pub report_path: Option<PathBuf>,

    /// Text normalization settings
    pub normalize: NormalizeOptions,

    /// PDF reading settings
    pub source: SourceOptions,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_formats(mut self, formats: OutputFormats) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    pub fn with_aggregate(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn with_normalize(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }

    pub fn with_source_options(mut self, options: SourceOptions) -> Self {
        self.source = options;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: OutputFormats::default(),
            json_format: JsonFormat::default(),
            aggregate: false,
            report_path: None,
            normalize: NormalizeOptions::default(),
            source: SourceOptions::default(),
        }
    }
}

/// Processing state of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Discovered,
    Read,
    Extracted,
    Written,
    Failed,
}

/// Final outcome for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    pub path: PathBuf,
    pub state: FileState,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
    /// Per-file artifacts written
    pub outputs: Vec<PathBuf>,
    #[serde(skip)]
    pub record: Option<Record>,
}

impl FileOutcome {
    fn new(path: &Path) -> Self {
        Self {
            file_name: file_name_of(path),
            path: path.to_path_buf(),
            state: FileState::Discovered,
            error_kind: None,
            message: None,
            outputs: Vec::new(),
            record: None,
        }
    }

    fn advance(&mut self, state: FileState) {
        log::debug!("{}: {:?} -> {:?}", self.file_name, self.state, state);
        self.state = state;
    }

    fn fail(&mut self, err: &Error) {
        self.advance(FileState::Failed);
        self.error_kind = Some(err.kind());
        self.message = Some(err.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.state == FileState::Written
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<FileOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    /// Run-level artifacts (`records.csv`, `records.json`)
    pub artifacts: Vec<PathBuf>,
    /// Run-level write problems that did not stop the batch
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_success())
    }

    /// Records of successful files, in processing order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.files.iter().filter_map(|f| f.record.as_ref())
    }

    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }

    fn push(&mut self, outcome: FileOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.files.push(outcome);
    }
}

/// Progress notifications from [`BatchDriver::run_with`].
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Discovery finished.
    Discovered { total: usize },
    /// A file is about to be processed.
    Started(&'a Path),
    /// A file reached its final state.
    Finished(&'a FileOutcome),
}

struct Sinks {
    json: Option<JsonWriter>,
    csv: Option<CsvWriter>,
}

/// Runs the pipeline over every PDF of the input directory.
pub struct BatchDriver {
    config: BatchConfig,
    source: Box<dyn TextSource>,
    normalizer: Normalizer,
    extractor: FieldExtractor,
}

impl BatchDriver {
    /// Build the driver with the lopdf source and the default rules.
    pub fn new(config: BatchConfig) -> Result<Self> {
        Ok(Self {
            source: Box::new(LopdfSource::with_options(config.source.clone())),
            normalizer: Normalizer::new(config.normalize.clone()),
            extractor: FieldExtractor::with_default_rules()?,
            config,
        })
    }

    /// Replace the text source.
    pub fn with_source(mut self, source: impl TextSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Replace the rule engine.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every file.
    pub fn run(&self) -> Result<BatchReport> {
        self.run_with(|_| {})
    }

    /// Process every file, reporting progress through `on_event`.
    ///
    /// Only startup problems (input or output directory) are returned as
    /// errors; per-file failures are recorded in the report.
    pub fn run_with<F>(&self, mut on_event: F) -> Result<BatchReport>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let files = self.prepare()?;
        log::info!(
            "Found {} PDF file(s) in {} (source: {})",
            files.len(),
            self.config.input_dir.display(),
            self.source.name()
        );
        on_event(BatchEvent::Discovered { total: files.len() });

        let mut report = BatchReport {
            input_dir: self.config.input_dir.clone(),
            output_dir: self.config.output_dir.clone(),
            ..Default::default()
        };
        let mut sinks = Sinks {
            json: self
                .config
                .formats
                .json
                .then(|| self.json_writer()),
            csv: self
                .config
                .formats
                .csv
                .then(|| CsvWriter::new(self.config.output_dir.join(CSV_FILE_NAME))),
        };

        for path in &files {
            on_event(BatchEvent::Started(path));
            let outcome = self.process_file(path, &mut sinks);
            on_event(BatchEvent::Finished(&outcome));
            report.push(outcome);
        }

        if let Some(csv) = &sinks.csv {
            if csv.rows() > 0 {
                report.artifacts.push(csv.path().to_path_buf());
            }
        }
        self.finish(&mut report);

        log::info!("Batch done: {} succeeded, {} failed", report.succeeded, report.failed);
        Ok(report)
    }

    fn json_writer(&self) -> JsonWriter {
        let writer = JsonWriter::new(&self.config.output_dir, self.config.json_format);
        if self.config.aggregate {
            writer.reserve(AGGREGATE_FILE_NAME)
        } else {
            writer
        }
    }

    /// Check the directories and list the input PDFs.
    fn prepare(&self) -> Result<Vec<PathBuf>> {
        let input = &self.config.input_dir;
        let meta = fs::metadata(input).map_err(|e| Error::InputDir {
            path: input.clone(),
            reason: e.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(Error::InputDir {
                path: input.clone(),
                reason: "not a directory".to_string(),
            });
        }

        let output = &self.config.output_dir;
        fs::create_dir_all(output).map_err(|e| Error::OutputDir {
            path: output.clone(),
            source: e,
        })?;

        discover_pdfs(input)
    }

    fn process_file(&self, path: &Path, sinks: &mut Sinks) -> FileOutcome {
        let mut outcome = FileOutcome::new(path);
        log::debug!("{}: {:?}", outcome.file_name, outcome.state);

        match self.try_process(path, sinks, &mut outcome) {
            Ok(()) => log::info!("{}: written", outcome.file_name),
            Err(e) => {
                log::warn!("{}: {}", outcome.file_name, e);
                outcome.fail(&e);
            }
        }

        outcome
    }

    fn try_process(&self, path: &Path, sinks: &mut Sinks, outcome: &mut FileOutcome) -> Result<()> {
        let doc = self.source.load(path)?;
        outcome.advance(FileState::Read);

        let text = DocumentText::from_document(&doc, &self.normalizer);
        let fields = self.extractor.extract(&text);
        let record = assemble(&outcome.file_name, doc.page_count(), &fields);
        outcome.advance(FileState::Extracted);

        if let Some(json) = &mut sinks.json {
            outcome.outputs.push(json.write(&record)?);
        }
        if let Some(csv) = &mut sinks.csv {
            if let Err(e) = csv.write(&record) {
                // A failed file leaves no artifact behind.
                for written in outcome.outputs.drain(..) {
                    if let Err(remove_err) = fs::remove_file(&written) {
                        log::warn!(
                            "Failed to remove {} after CSV error: {}",
                            written.display(),
                            remove_err
                        );
                    }
                }
                return Err(e);
            }
        }

        outcome.record = Some(record);
        outcome.advance(FileState::Written);
        Ok(())
    }

    /// Write the aggregate JSON and the report.
    fn finish(&self, report: &mut BatchReport) {
        if self.config.aggregate && report.succeeded > 0 {
            let path = self.config.output_dir.join(AGGREGATE_FILE_NAME);
            let records: Vec<Record> = report.records().cloned().collect();
            match write_aggregate(&path, &records, self.config.json_format) {
                Ok(()) => report.artifacts.push(path),
                Err(e) => {
                    log::error!("{}", e);
                    report.errors.push(e.to_string());
                }
            }
        }

        if let Some(path) = &self.config.report_path {
            let written = report
                .to_json(JsonFormat::Pretty)
                .and_then(|json| crate::output::write_atomic(path, json.as_bytes()));
            if let Err(e) = written {
                log::error!("{}", e);
                report.errors.push(e.to_string());
            }
        }
    }
}

/// List regular files with a `pdf` extension (any case), sorted by name.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let input_err = |e: std::io::Error| Error::InputDir {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(input_err)? {
        let path = entry.map_err(input_err)?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
