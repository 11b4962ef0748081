//! Built-in extraction rules.

use chrono::NaiveDate;
use regex::Regex;

use super::heading::{is_heading_text, SECTION_WORDS};
use super::text::{DocumentText, LayoutLine};
use super::{Candidate, Rule};
use crate::error::Result;
use crate::layout::{size_key, FontStatistics};
use crate::model::{FieldName, HeadingLevel};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Longest line considered by the title and heading rules.
const MAX_TITLE_CHARS: usize = 200;
const MAX_HEADING_CHARS: usize = 120;

/// Build the default rule list, in evaluation order.
pub fn default_rules() -> Result<Vec<Box<dyn Rule>>> {
    const EMAIL: &str = r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}";
    const MONTH: &str =
        r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";

    let rules: Vec<Box<dyn Rule>> = vec![
        // title
        Box::new(MetadataRule::new("metadata-title", FieldName::Title, InfoKey::Title)),
        Box::new(LargestFontTitleRule),
        Box::new(FirstLineTitleRule),
        // author
        Box::new(MetadataRule::new("metadata-author", FieldName::Author, InfoKey::Author)),
        Box::new(
            RegexRule::new(
                "labeled-author",
                FieldName::Author,
                r"(?im)^(?:authors?|written by|prepared by|by)\b\s*[:\-]?\s*(\S.{1,99})$",
            )?
            .capture(1)
            .refine(clean_author)
            .with_confidence(0.8),
        ),
        // date
        Box::new(
            RegexRule::new("date-iso", FieldName::Date, r"\b\d{4}-\d{2}-\d{2}\b")?
                .refine(valid_iso_date)
                .with_confidence(0.8),
        ),
        Box::new(
            RegexRule::new(
                "date-long",
                FieldName::Date,
                &format!(
                    r"(?i)\b(?:{month}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}|\d{{1,2}}(?:st|nd|rd|th)?\s+{month},?\s+\d{{4}})\b",
                    month = MONTH
                ),
            )?
            .refine(valid_long_date)
            .with_confidence(0.7),
        ),
        Box::new(
            RegexRule::new(
                "date-numeric",
                FieldName::Date,
                r"\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}\b",
            )?
            .refine(valid_numeric_date)
            .with_confidence(0.5),
        ),
        Box::new(MetadataRule::new("metadata-date", FieldName::Date, InfoKey::CreationDate)),
        // email
        Box::new(
            RegexRule::new(
                "labeled-email",
                FieldName::Email,
                &format!(
                    r"(?i)\be-?mail(?:\s+address)?\s*[:\-]?\s*({email})",
                    email = EMAIL
                ),
            )?
            .capture(1)
            .with_confidence(0.9),
        ),
        Box::new(RegexRule::new("email", FieldName::Email, EMAIL)?.with_confidence(0.7)),
        // phone
        Box::new(
            RegexRule::new(
                "labeled-phone",
                FieldName::Phone,
                r"(?i)\b(?:phone|tel|telephone|mobile|mob|cell)\b\.?\s*[:\-]?\s*(\+?\(?\d[\d ().\-]{5,}\d)",
            )?
            .capture(1)
            .refine(clean_phone)
            .with_confidence(0.9),
        ),
        Box::new(
            RegexRule::new(
                "phone",
                FieldName::Phone,
                r"(?:\+\d{1,3}[ .\-]?)?(?:\(\d{2,4}\)|\d{2,4})[ .\-]\d{3,4}[ .\-]?\d{3,4}",
            )?
            .refine(clean_phone)
            .with_confidence(0.5),
        ),
        // url
        Box::new(
            RegexRule::new(
                "url",
                FieldName::Url,
                r#"(?i)\b(?:https?://|www\.)[^\s<>"'()\[\]{}]+"#,
            )?
            .refine(clean_url)
            .with_confidence(0.8),
        ),
        // outline
        Box::new(FontSizeHeadingRule),
        Box::new(NumberedHeadingRule::new()?),
    ];
    Ok(rules)
}

/// Pattern-based rule over the normalized text of every page.
#[derive(Clone)]
pub struct RegexRule {
    id: &'static str,
    field: FieldName,
    regex: Regex,
    group: usize,
    refine: Option<fn(&str) -> Option<String>>,
    confidence: f32,
}

impl RegexRule {
    /// Compile a rule; the whole match is the value unless a capture group
    /// is selected.
    pub fn new(id: &'static str, field: FieldName, pattern: &str) -> Result<Self> {
        Ok(Self {
            id,
            field,
            regex: Regex::new(pattern)?,
            group: 0,
            refine: None,
            confidence: 0.6,
        })
    }

    /// Use a capture group as the value.
    pub fn capture(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Validate and clean each match; `None` drops the match.
    pub fn refine(mut self, refine: fn(&str) -> Option<String>) -> Self {
        self.refine = Some(refine);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl std::fmt::Debug for RegexRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexRule")
            .field("id", &self.id)
            .field("field", &self.field)
            .field("pattern", &self.regex.as_str())
            .field("group", &self.group)
            .field("refined", &self.refine.is_some())
            .finish()
    }
}

impl Rule for RegexRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn field(&self) -> FieldName {
        self.field
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for page in &doc.pages {
            for caps in self.regex.captures_iter(&page.text) {
                let Some(m) = caps.get(self.group) else {
                    continue;
                };
                let value = match self.refine {
                    Some(refine) => match refine(m.as_str()) {
                        Some(value) => value,
                        None => {
                            log::trace!("Rule '{}' rejected {:?}", self.id, m.as_str());
                            continue;
                        }
                    },
                    None => m.as_str().to_string(),
                };
                candidates.push(
                    Candidate::new(value)
                        .on_page(page.number)
                        .with_confidence(self.confidence),
                );
            }
        }

        Ok(candidates)
    }
}

/// Entry of the document information dictionary read by a [`MetadataRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKey {
    Title,
    Author,
    CreationDate,
}

/// Rule reading a document information entry.
#[derive(Debug, Clone)]
pub struct MetadataRule {
    id: &'static str,
    field: FieldName,
    key: InfoKey,
}

impl MetadataRule {
    pub fn new(id: &'static str, field: FieldName, key: InfoKey) -> Self {
        Self { id, field, key }
    }
}

impl Rule for MetadataRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn field(&self) -> FieldName {
        self.field
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let info = &doc.info;
        let value = match self.key {
            InfoKey::Title => info.title.clone().filter(|t| !is_placeholder_title(t)),
            InfoKey::Author => info.author.clone(),
            InfoKey::CreationDate => info.created.map(|d| d.format("%Y-%m-%d").to_string()),
        };
        Ok(value
            .into_iter()
            .map(|v| Candidate::new(v).with_confidence(0.95))
            .collect())
    }
}

fn is_placeholder_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();
    title.is_empty() || title == "untitled" || title == "unknown"
}

/// Title from the largest text on the first page.
///
/// Among the five largest lines (ties broken top first), takes the first
/// heading-like line longer than three characters, else the largest line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFontTitleRule;

impl Rule for LargestFontTitleRule {
    fn id(&self) -> &'static str {
        "largest-font-title"
    }

    fn field(&self) -> FieldName {
        FieldName::Title
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let Some(page) = doc.first_page() else {
            return Ok(Vec::new());
        };

        let mut lines: Vec<&LayoutLine> = page
            .lines
            .iter()
            .filter(|l| l.char_count() <= MAX_TITLE_CHARS)
            .collect();
        lines.sort_by(|a, b| {
            b.font_size
                .total_cmp(&a.font_size)
                .then(b.top.total_cmp(&a.top))
        });
        lines.truncate(5);

        let pick = lines
            .iter()
            .find(|l| l.char_count() > 3 && is_heading_text(&l.text))
            .or_else(|| lines.first());

        Ok(pick
            .map(|l| {
                Candidate::new(l.text.clone())
                    .on_page(page.number)
                    .with_confidence(0.8)
            })
            .into_iter()
            .collect())
    }
}

/// Title from the first line of text in the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLineTitleRule;

impl Rule for FirstLineTitleRule {
    fn id(&self) -> &'static str {
        "first-line-title"
    }

    fn field(&self) -> FieldName {
        FieldName::Title
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let first = doc
            .pages
            .iter()
            .find_map(|page| page.text.lines().next().map(|line| (page.number, line)));

        Ok(first
            .filter(|(_, line)| line.chars().count() <= MAX_TITLE_CHARS)
            .map(|(page, line)| Candidate::new(line).on_page(page).with_confidence(0.4))
            .into_iter()
            .collect())
    }
}

/// Outline from font sizes.
///
/// Heading-like lines set above the body size are headings; the three
/// largest sizes among them become H1, H2 and H3.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontSizeHeadingRule;

impl Rule for FontSizeHeadingRule {
    fn id(&self) -> &'static str {
        "font-size-headings"
    }

    fn field(&self) -> FieldName {
        FieldName::Outline
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let mut stats = FontStatistics::default();
        for (_, line) in doc.layout_lines() {
            stats.add_size(line.font_size, line.char_count());
        }
        stats.analyze();

        let headings: Vec<(u32, &LayoutLine)> = doc
            .layout_lines()
            .filter(|(_, l)| {
                stats.is_above_body(l.font_size)
                    && l.char_count() <= MAX_HEADING_CHARS
                    && is_heading_text(&l.text)
            })
            .collect();

        let mut sizes: Vec<i32> = headings.iter().map(|(_, l)| size_key(l.font_size)).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        sizes.truncate(3);
        log::trace!("Body size {:.1}pt, heading sizes {:?}", stats.body_size, sizes);

        Ok(headings
            .into_iter()
            .filter_map(|(page, line)| {
                let rank = sizes.iter().position(|k| *k == size_key(line.font_size))?;
                Some(
                    Candidate::new(line.text.clone())
                        .on_page(page)
                        .with_level(HeadingLevel::from_depth(rank + 1))
                        .with_confidence(0.8),
                )
            })
            .collect())
    }
}

/// Outline from numbered lines ("2.1 Scope") and section words.
#[derive(Debug, Clone)]
pub struct NumberedHeadingRule {
    numbered: Regex,
}

impl NumberedHeadingRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            numbered: Regex::new(r"^(\d{1,2}(?:\.\d{1,2}){0,3})\.?\s+(\p{Lu}.*)$")?,
        })
    }

    fn level_of(&self, line: &str) -> Option<HeadingLevel> {
        if let Some(caps) = self.numbered.captures(line) {
            let heading = &caps[2];
            let is_sentence = heading.chars().count() > 80
                || heading.ends_with(|c: char| matches!(c, '.' | ',' | ';' | ':'));
            if is_sentence {
                return None;
            }
            return Some(HeadingLevel::from_depth(caps[1].split('.').count()));
        }
        is_section_line(line).then_some(HeadingLevel::H1)
    }
}

impl Rule for NumberedHeadingRule {
    fn id(&self) -> &'static str {
        "numbered-headings"
    }

    fn field(&self) -> FieldName {
        FieldName::Outline
    }

    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for page in &doc.pages {
            for line in page.text.lines() {
                if let Some(level) = self.level_of(line) {
                    candidates.push(
                        Candidate::new(line)
                            .on_page(page.number)
                            .with_level(level)
                            .with_confidence(0.5),
                    );
                }
            }
        }
        Ok(candidates)
    }
}

/// A short capitalized line opening with a section word ("Appendix B").
fn is_section_line(line: &str) -> bool {
    if line.chars().count() > 60 || line.split_whitespace().count() > 6 {
        return false;
    }
    if !line.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    let first = line
        .split(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default()
        .to_lowercase();
    SECTION_WORDS.contains(&first.as_str())
}

fn clean_author(value: &str) -> Option<String> {
    let value = value.trim().trim_end_matches(|c: char| matches!(c, ',' | ';'));
    let plausible = value.chars().next().is_some_and(char::is_uppercase)
        && value.split_whitespace().count() <= 8
        && !value.contains('@');
    plausible.then(|| value.to_string())
}

fn clean_phone(value: &str) -> Option<String> {
    let value = value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, '.' | '-' | '('))
        .to_string();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits).then_some(value)
}

fn clean_url(value: &str) -> Option<String> {
    let value = value.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));
    let host = value
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(value)
        .trim_start_matches("www.")
        .trim_start_matches("WWW.");
    host.contains('.').then(|| value.to_string())
}

fn valid_iso_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|_| value.to_string())
}

/// "January 5, 2024", "5th Jan. 2024" and similar.
fn valid_long_date(value: &str) -> Option<String> {
    let tokens: Vec<String> = value
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    let [a, b, year] = tokens.as_slice() else {
        return None;
    };
    let (month, day) = if a.starts_with(|c: char| c.is_ascii_digit()) {
        (b, a)
    } else {
        (a, b)
    };

    let month = month_number(month)?;
    let day: u32 = day.trim_end_matches(char::is_alphabetic).parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|_| value.trim().to_string())
}

/// Month number for a full or abbreviated (at least three letters) name.
fn month_number(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(token))
        .map(|i| i as u32 + 1)
}

/// "MM/DD/YYYY" or "DD/MM/YYYY"; either reading must be a real date.
fn valid_numeric_date(value: &str) -> Option<String> {
    let parts: Vec<&str> = value.split(|c: char| matches!(c, '/' | '.' | '-')).collect();
    let [a, b, year] = parts.as_slice() else {
        return None;
    };
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, a, b)
        .or_else(|| NaiveDate::from_ymd_opt(year, b, a))
        .map(|_| value.to_string())
}
