//! PDF text sources.
//!
//! A [`TextSource`] turns a file path into a [`Document`]: pages in physical
//! order with their raw text and, when available, positioned text spans.
//! [`LopdfSource`] is the implementation backed by `lopdf`.

mod content;
mod lopdf_source;
mod options;

pub use content::decode_text_simple;
pub use lopdf_source::LopdfSource;
pub use options::{ErrorMode, SourceOptions};

use std::path::Path;

use crate::error::Result;
use crate::model::Document;

/// Capability to read the text of a PDF file.
///
/// Implementations must not touch the network. Any file handle opened by
/// [`TextSource::load`] is released before it returns.
pub trait TextSource {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Read a document from disk.
    ///
    /// Fails with [`crate::Error::UnreadablePdf`] when the file is not a
    /// parseable PDF and [`crate::Error::EncryptedPdf`] when its content is
    /// encrypted.
    fn load(&self, path: &Path) -> Result<Document>;
}
