//! Text source backed by lopdf.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::detect_header_from_path;
use crate::error::{Error, Result};
use crate::model::{Document, DocumentInfo, Page, TextSpan};

use super::content::page_spans;
use super::options::{ErrorMode, SourceOptions};
use super::TextSource;

/// Reads PDFs with `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfSource {
    options: SourceOptions,
}

impl LopdfSource {
    /// Create a source with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with custom options.
    pub fn with_options(options: SourceOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Parse an already loaded lopdf document.
    fn read_document(&self, path: &Path, doc: &LopdfDocument) -> Result<Document> {
        let mut document = Document::new(path);
        document.info = read_info(doc);

        for (page_num, page_id) in doc.get_pages() {
            let page = self.read_page(doc, page_num, page_id)?;
            document.add_page(page);
        }

        Ok(document)
    }

    /// Read one page, honouring the error mode for page-level failures.
    fn read_page(&self, doc: &LopdfDocument, page_num: u32, page_id: ObjectId) -> Result<Page> {
        let spans = if self.options.collect_layout {
            match page_spans(doc, page_id) {
                Ok(spans) => spans,
                Err(e) => {
                    self.page_failure(page_num, "layout", e)?;
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let text = match doc.extract_text(&[page_num]) {
            Ok(text) => text,
            Err(e) => {
                self.page_failure(page_num, "text", Error::UnreadablePdf(e.to_string()))?;
                text_from_spans(&spans)
            }
        };

        Ok(Page::new(page_num, text).with_spans(spans))
    }

    fn page_failure(&self, page_num: u32, what: &str, err: Error) -> Result<()> {
        match self.options.error_mode {
            ErrorMode::Strict => Err(Error::UnreadablePdf(format!(
                "page {} {}: {}",
                page_num, what, err
            ))),
            ErrorMode::Lenient => {
                log::warn!("Failed to read {} of page {}: {}", what, page_num, err);
                Ok(())
            }
        }
    }
}

impl TextSource for LopdfSource {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let header = detect_header_from_path(path).map_err(|e| match e {
            Error::Io(io) => Error::UnreadablePdf(io.to_string()),
            other => other,
        })?;
        log::debug!("{}: detected {}", path.display(), header);

        // The parsed document is dropped when this function returns.
        let mut doc = LopdfDocument::load(path)?;
        unlock(path, &mut doc)?;
        self.read_document(path, &doc)
    }
}

/// Open an encrypted document with the empty user password.
///
/// Owner-password-only files open this way; anything else is
/// [`Error::EncryptedPdf`].
fn unlock(path: &Path, doc: &mut LopdfDocument) -> Result<()> {
    if !doc.is_encrypted() {
        return Ok(());
    }
    doc.decrypt("").map_err(|e| {
        log::debug!("{}: cannot decrypt: {}", path.display(), e);
        Error::EncryptedPdf
    })?;
    log::debug!("{}: decrypted with the empty user password", path.display());
    Ok(())
}

/// Rebuild page text from spans, one line per baseline.
fn text_from_spans(spans: &[TextSpan]) -> String {
    crate::layout::group_into_lines(spans)
        .iter()
        .map(|line| line.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read the document information dictionary.
fn read_info(doc: &LopdfDocument) -> DocumentInfo {
    let mut info = DocumentInfo::default();

    let dict = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok(),
        Ok(Object::Dictionary(d)) => Some(d),
        _ => None,
    };

    if let Some(dict) = dict {
        info.title = get_string_from_dict(dict, b"Title");
        info.author = get_string_from_dict(dict, b"Author");
        info.created = get_string_from_dict(dict, b"CreationDate").and_then(|s| parse_pdf_date(&s));
    }

    info
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_info_string(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).to_string(),
        _ => return None,
    };
    let value = value.trim_matches(char::from(0)).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Info strings are UTF-16BE with a BOM or PDFDocEncoding (close to Latin-1).
fn decode_info_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect())
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}
