//! The fixed-schema record written for each document.

use serde::{Deserialize, Serialize};

/// Names of the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Title,
    Author,
    Date,
    Email,
    Phone,
    Url,
    Outline,
}

impl FieldName {
    /// Every field, in schema order.
    pub const ALL: [FieldName; 7] = [
        FieldName::Title,
        FieldName::Author,
        FieldName::Date,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Url,
        FieldName::Outline,
    ];

    /// Key used in JSON and CSV output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Author => "author",
            FieldName::Date => "date",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::Url => "url",
            FieldName::Outline => "outline",
        }
    }

    /// Whether the field keeps every match rather than the first.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FieldName::Outline)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading level of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a 1-based depth to a level, clamping anything deeper to H3.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

/// One heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Structured result for one input document.
///
/// Every key is always present: single-valued fields serialize as `null`
/// when nothing matched, `outline` as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Source file name
    pub source_file: String,
    /// Number of pages read
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub outline: Vec<OutlineEntry>,
}

impl Record {
    /// Column names, in serialization order.
    pub const COLUMNS: [&'static str; 9] = [
        "source_file",
        "page_count",
        "title",
        "author",
        "date",
        "email",
        "phone",
        "url",
        "outline",
    ];

    /// Create an empty record for a source file.
    pub fn new(source_file: impl Into<String>, page_count: u32) -> Self {
        Self {
            source_file: source_file.into(),
            page_count,
            ..Default::default()
        }
    }

    /// Value of a single-valued field.
    pub fn get(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Title => self.title.as_deref(),
            FieldName::Author => self.author.as_deref(),
            FieldName::Date => self.date.as_deref(),
            FieldName::Email => self.email.as_deref(),
            FieldName::Phone => self.phone.as_deref(),
            FieldName::Url => self.url.as_deref(),
            FieldName::Outline => None,
        }
    }

    /// Set a single-valued field. Ignored for multi-valued fields.
    pub fn set(&mut self, field: FieldName, value: String) {
        let slot = match field {
            FieldName::Title => &mut self.title,
            FieldName::Author => &mut self.author,
            FieldName::Date => &mut self.date,
            FieldName::Email => &mut self.email,
            FieldName::Phone => &mut self.phone,
            FieldName::Url => &mut self.url,
            FieldName::Outline => return,
        };
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_every_key() {
        let record = Record::new("empty.pdf", 0);
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut expected = Record::COLUMNS.to_vec();
        expected.sort_unstable();
        let mut actual = keys.clone();
        actual.sort_unstable();
        assert_eq!(actual, expected);

        assert!(object["title"].is_null());
        assert_eq!(object["outline"], serde_json::json!([]));
    }

    #[test]
    fn test_field_columns_follow_schema() {
        for field in FieldName::ALL {
            assert!(Record::COLUMNS.contains(&field.as_str()));
        }
        assert!(FieldName::Outline.is_multi_valued());
        assert!(!FieldName::Email.is_multi_valued());
    }

    #[test]
    fn test_get_and_set() {
        let mut record = Record::new("a.pdf", 1);
        record.set(FieldName::Email, "a@b.com".to_string());
        record.set(FieldName::Outline, "ignored".to_string());
        assert_eq!(record.get(FieldName::Email), Some("a@b.com"));
        assert_eq!(record.get(FieldName::Outline), None);
        assert!(record.outline.is_empty());
    }

    #[test]
    fn test_heading_level_from_depth() {
        assert_eq!(HeadingLevel::from_depth(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_depth(5), HeadingLevel::H3);
        assert_eq!(
            serde_json::to_string(&HeadingLevel::H2).unwrap(),
            "\"H2\""
        );
    }
}
