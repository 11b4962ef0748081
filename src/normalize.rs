//! Text normalization applied to raw page text before field extraction.
//!
//! Every step is a pure function of its input and the pipeline is
//! idempotent: normalizing already normalized text returns it unchanged.

use std::ops::Deref;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Ligatures expanded to their letter sequences.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Options for text normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Rejoin words hyphenated at line breaks
    pub fix_hyphenation: bool,

    /// Drop U+FFFD, soft hyphens and control characters
    pub strip_control: bool,
}

impl NormalizeOptions {
    /// All steps enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only whitespace handling, which is always applied.
    pub fn whitespace_only() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            fix_hyphenation: false,
            strip_control: false,
        }
    }

    pub fn with_unicode(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    pub fn with_ligatures(mut self, enabled: bool) -> Self {
        self.fix_ligatures = enabled;
        self
    }

    pub fn with_hyphenation(mut self, enabled: bool) -> Self {
        self.fix_hyphenation = enabled;
        self
    }

    pub fn with_control_stripping(mut self, enabled: bool) -> Self {
        self.strip_control = enabled;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            fix_hyphenation: true,
            strip_control: true,
        }
    }
}

/// Text produced by the [`Normalizer`].
///
/// Lines are trimmed with single spaces between words; paragraphs are
/// separated by exactly one blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty lines, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines().filter(|line| !line.is_empty())
    }

    /// Paragraphs (blocks separated by blank lines).
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.0.split("\n\n").filter(|p| !p.is_empty())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text normalization pipeline.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a block of text.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        // Composition runs last among the character passes: removing a
        // character or expanding a ligature can expose a composable pair.
        let mut result = self.clean_chars(text);

        if self.options.fix_ligatures {
            result = expand_ligatures(&result);
        }

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        let mut lines: Vec<String> = result.split('\n').map(collapse_spaces).collect();

        if self.options.fix_hyphenation {
            lines = join_hyphenated(lines);
        }

        NormalizedText(join_paragraphs(&lines))
    }

    /// Normalize a single line of text (no line breaks survive).
    pub fn normalize_line(&self, text: &str) -> String {
        self.normalize(text)
            .lines()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Unify line endings, map whitespace to spaces and drop control characters.
    fn clean_chars(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        text.chars()
            .filter_map(|c| match c {
                '\n' => Some('\n'),
                c if c.is_whitespace() => Some(' '),
                '\u{FFFD}' | '\u{00AD}' if self.options.strip_control => None,
                c if c.is_control() && self.options.strip_control => None,
                c if c.is_control() => Some(' '),
                c => Some(c),
            })
            .collect()
    }
}

fn expand_ligatures(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, replacement)) => result.push_str(replacement),
            None => result.push(c),
        }
    }
    result
}

fn collapse_spaces(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join "infor-" + "mation" into "information" across adjacent lines.
fn join_hyphenated(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let starts_lower = line.chars().next().is_some_and(char::is_lowercase);
        match out.last_mut() {
            Some(prev) if starts_lower && ends_with_word_hyphen(prev) => {
                prev.pop();
                prev.push_str(&line);
            }
            _ => out.push(line),
        }
    }
    out
}

fn ends_with_word_hyphen(line: &str) -> bool {
    let mut chars = line.chars().rev();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_alphabetic)
}

/// Keep single line breaks, collapse blank runs to one blank line, trim ends.
fn join_paragraphs(lines: &[String]) -> String {
    let mut result = String::new();
    let mut pending_break = false;

    for line in lines {
        if line.is_empty() {
            pending_break = !result.is_empty();
            continue;
        }
        if !result.is_empty() {
            result.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        result.push_str(line);
        pending_break = false;
    }

    result
}
