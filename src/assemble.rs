//! Assembly of extracted fields into the fixed-schema [`Record`].

use crate::extract::ExtractedField;
use crate::model::{FieldName, HeadingLevel, OutlineEntry, Record};

/// Build the record for one document.
///
/// Single-valued fields take the first candidate of their winning rule.
/// Outline entries keep page order, then in-page order; entries repeating
/// the resolved title are dropped.
pub fn assemble(source_file: &str, page_count: u32, fields: &[ExtractedField]) -> Record {
    let mut record = Record::new(source_file, page_count);

    for name in FieldName::ALL {
        if name.is_multi_valued() {
            continue;
        }
        if let Some(field) = fields.iter().find(|f| f.name == name) {
            record.set(name, field.value.clone());
        }
    }

    let mut outline: Vec<OutlineEntry> = fields
        .iter()
        .filter(|f| f.name == FieldName::Outline)
        .filter(|f| record.title.as_deref() != Some(f.value.as_str()))
        .map(|f| OutlineEntry {
            level: f.level.unwrap_or(HeadingLevel::H1),
            text: f.value.clone(),
            page: f.page.unwrap_or(1),
        })
        .collect();
    outline.sort_by_key(|entry| entry.page);
    record.outline = outline;

    record
}
