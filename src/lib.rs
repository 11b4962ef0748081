//! # pdfsift
//!
//! Batch extraction of structured fields from PDF documents.
//!
//! Every PDF in an input directory is read, its text normalized and run
//! through an ordered list of heuristic rules; the result is one
//! fixed-schema record per document, written as JSON and/or CSV.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsift::{extract_file, run_batch, BatchConfig};
//!
//! fn main() -> pdfsift::Result<()> {
//!     // A single document
//!     let record = extract_file("resume.pdf")?;
//!     println!("{:?} <{:?}>", record.title, record.email);
//!
//!     // A whole directory
//!     let report = run_batch(BatchConfig::new("./input", "./output"))?;
//!     println!("{} written, {} failed", report.succeeded, report.failed);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`source`]: reads page text and positioned spans from a PDF
//! - [`normalize`]: whitespace, ligature, hyphenation and Unicode cleanup
//! - [`extract`]: first-match-wins rule engine per field
//! - [`assemble`]: builds the [`Record`]
//! - [`output`]: JSON files, aggregate CSV and JSON
//! - [`batch`]: directory discovery, per-file isolation and reporting

pub mod assemble;
pub mod batch;
pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod output;
pub mod source;

// Re-export commonly used types
pub use assemble::assemble;
pub use batch::{BatchConfig, BatchDriver, BatchEvent, BatchReport, FileOutcome, FileState};
pub use detect::{detect_header_from_bytes, detect_header_from_path, is_pdf, PdfHeader};
pub use error::{Error, ErrorKind, Result};
pub use extract::{Candidate, DocumentText, ExtractedField, FieldExtractor, Rule};
pub use model::{Document, DocumentInfo, FieldName, HeadingLevel, OutlineEntry, Page, Record};
pub use normalize::{NormalizeOptions, NormalizedText, Normalizer};
pub use output::{JsonFormat, OutputFormats};
pub use source::{ErrorMode, LopdfSource, SourceOptions, TextSource};

use std::path::Path;

/// Extract the record of a single PDF with the default settings.
///
/// # Example
///
/// ```no_run
/// use pdfsift::extract_file;
///
/// let record = extract_file("report.pdf").unwrap();
/// println!("{}", record.title.unwrap_or_default());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Record> {
    extract_file_with(path.as_ref(), &LopdfSource::new(), &Normalizer::default())
}

/// Extract the record of a single PDF with a custom source and normalizer.
pub fn extract_file_with(
    path: &Path,
    source: &dyn TextSource,
    normalizer: &Normalizer,
) -> Result<Record> {
    let doc = source.load(path)?;
    let text = DocumentText::from_document(&doc, normalizer);
    let fields = FieldExtractor::with_default_rules()?.extract(&text);
    Ok(assemble(&doc.file_name(), doc.page_count(), &fields))
}

/// Convert a PDF to a JSON record.
///
/// # Example
///
/// ```no_run
/// use pdfsift::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let record = extract_file(path)?;
    output::to_json(&record, format)
}

/// Run a batch with the default source and rules.
pub fn run_batch(config: BatchConfig) -> Result<BatchReport> {
    BatchDriver::new(config)?.run()
}
