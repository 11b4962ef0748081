//! Layout analysis over positioned text spans.
//!
//! Groups spans into reading-order lines and gathers font size statistics
//! used to tell headings from body text.

use std::collections::HashMap;

use crate::model::{TextLine, TextSpan};

/// Group spans into lines based on Y position, top to bottom.
pub fn group_into_lines(spans: &[TextSpan]) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    let mut spans = spans.to_vec();
    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Font size statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common, weighted by characters)
    pub body_size: f32,
    /// Observed font sizes (tenths of a point) with character counts
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Add a font size observation covering `chars` characters.
    pub fn add_size(&mut self, size: f32, chars: usize) {
        *self.size_histogram.entry(size_key(size)).or_insert(0) += chars;
    }

    /// Calculate the body size.
    ///
    /// Ties go to the smaller size so the result does not depend on hash order.
    pub fn analyze(&mut self) {
        self.body_size = self
            .size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(key, _)| *key as f32 / 10.0)
            .unwrap_or(12.0);
    }

    /// Whether a size is noticeably larger than body text.
    pub fn is_above_body(&self, font_size: f32) -> bool {
        font_size > self.body_size + 0.5
    }
}

/// Round a font size to 0.1pt precision for grouping.
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}
