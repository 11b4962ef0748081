//! Normalized view of a document handed to extraction rules.

use crate::layout::group_into_lines;
use crate::model::{Document, DocumentInfo, Page};
use crate::normalize::{NormalizedText, Normalizer};

/// A positioned line of normalized text.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    /// Dominant font size
    pub font_size: f32,
    /// Top edge in PDF user space (larger is higher on the page)
    pub top: f32,
    pub is_bold: bool,
}

impl LayoutLine {
    pub fn new(text: impl Into<String>, font_size: f32, top: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            top,
            is_bold: false,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// One page of normalized text plus its layout lines, if any.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    /// Page number (1-indexed)
    pub number: u32,
    pub text: NormalizedText,
    /// Lines in reading order; empty when the source had no layout
    pub lines: Vec<LayoutLine>,
}

impl PageText {
    fn from_page(page: &Page, normalizer: &Normalizer) -> Self {
        let lines = group_into_lines(&page.spans)
            .iter()
            .filter_map(|line| {
                let text = normalizer.normalize_line(&line.text());
                (!text.is_empty()).then(|| LayoutLine {
                    text,
                    font_size: line.font_size,
                    top: line.top(),
                    is_bold: line.is_bold(),
                })
            })
            .collect();

        Self {
            number: page.number,
            text: normalizer.normalize(&page.text),
            lines,
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    pub info: DocumentInfo,
    pub pages: Vec<PageText>,
}

impl DocumentText {
    /// Normalize a loaded document.
    pub fn from_document(doc: &Document, normalizer: &Normalizer) -> Self {
        Self {
            info: doc.info.clone(),
            pages: doc
                .pages
                .iter()
                .map(|page| PageText::from_page(page, normalizer))
                .collect(),
        }
    }

    /// Build from plain page texts without layout, numbering pages from 1.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>, normalizer: &Normalizer) -> Self {
        Self {
            info: DocumentInfo::default(),
            pages: texts
                .into_iter()
                .zip(1u32..)
                .map(|(text, number)| PageText {
                    number,
                    text: normalizer.normalize(text),
                    lines: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn first_page(&self) -> Option<&PageText> {
        self.pages.first()
    }

    /// Whether no page holds any text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.is_empty() && p.lines.is_empty())
    }

    /// Every layout line with its page number, in reading order.
    pub fn layout_lines(&self) -> impl Iterator<Item = (u32, &LayoutLine)> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().map(move |line| (page.number, line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextSpan;

    #[test]
    fn test_from_document_normalizes_pages_and_lines() {
        let mut doc = Document::new("/in/a.pdf");
        let spans = vec![
            TextSpan::new("Annual  Report", 72.0, 720.0, 24.0, "Helvetica-Bold"),
            TextSpan::new("body text", 72.0, 690.0, 11.0, "Helvetica"),
        ];
        doc.add_page(Page::new(1, "Annual  Report\r\nbody \u{FB01}le").with_spans(spans));

        let text = DocumentText::from_document(&doc, &Normalizer::default());
        let page = text.first_page().unwrap();
        assert_eq!(page.text.as_str(), "Annual Report\nbody file");
        assert_eq!(page.lines.len(), 2);
        assert_eq!(page.lines[0].text, "Annual Report");
        assert!(page.lines[0].is_bold);
        assert!(page.lines[0].top > page.lines[1].top);
        assert!(!text.is_blank());
    }

    #[test]
    fn test_from_texts_numbers_pages() {
        let text = DocumentText::from_texts(["one", "", "three"], &Normalizer::default());
        let numbers: Vec<u32> = text.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(text.page_count(), 3);
    }

    #[test]
    fn test_blank_document() {
        let text = DocumentText::from_texts([" ", "\n\n"], &Normalizer::default());
        assert!(text.is_blank());
        assert!(DocumentText::default().is_blank());
    }
}
