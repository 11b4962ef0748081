//! Heuristic field extraction.
//!
//! A [`FieldExtractor`] holds an ordered list of [`Rule`]s. Rules are tried
//! in declared order; for each field the first rule that produces at least
//! one non-blank candidate wins and every later rule for that field is
//! skipped. Rules for different fields never interact, so the relative order
//! of rules for different fields does not change the outcome.
//!
//! A rule that fails (returns an error or panics) counts as "no match" for
//! that rule only.
//!
//! # Example
//!
//! ```no_run
//! use pdfsift::extract::{DocumentText, FieldExtractor};
//! use pdfsift::normalize::Normalizer;
//! use pdfsift::source::{LopdfSource, TextSource};
//!
//! fn main() -> pdfsift::Result<()> {
//!     let doc = LopdfSource::new().load("resume.pdf".as_ref())?;
//!     let text = DocumentText::from_document(&doc, &Normalizer::default());
//!     let fields = FieldExtractor::with_default_rules()?.extract(&text);
//!     for field in fields {
//!         println!("{} = {} ({})", field.name, field.value, field.rule);
//!     }
//!     Ok(())
//! }
//! ```

mod heading;
mod rules;
mod text;

pub use heading::is_heading_text;
pub use rules::{
    default_rules, FirstLineTitleRule, FontSizeHeadingRule, InfoKey, LargestFontTitleRule,
    MetadataRule, NumberedHeadingRule, RegexRule,
};
pub use text::{DocumentText, LayoutLine, PageText};

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{FieldName, HeadingLevel};

/// A value proposed by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Proposed value
    pub value: String,
    /// Page number the value was found on (1-indexed)
    pub page: Option<u32>,
    /// Rule-specific confidence in `[0, 1]`
    pub confidence: f32,
    /// Heading level, for outline candidates
    pub level: Option<HeadingLevel>,
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            page: None,
            confidence: 1.0,
            level: None,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_level(mut self, level: HeadingLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// A candidate accepted by the extractor, tagged with its field and rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedField {
    pub name: FieldName,
    pub value: String,
    pub page: Option<u32>,
    pub rule: &'static str,
    pub confidence: f32,
    pub level: Option<HeadingLevel>,
}

/// A heuristic that proposes values for one field.
pub trait Rule {
    /// Stable identifier used in logs and in [`ExtractedField::rule`].
    fn id(&self) -> &'static str;

    /// The field this rule proposes values for.
    fn field(&self) -> FieldName;

    /// Inspect the document and return zero or more candidates, in page
    /// order and then in-page order.
    fn apply(&self, doc: &DocumentText) -> Result<Vec<Candidate>>;
}

/// Ordered rule engine.
#[derive(Default)]
pub struct FieldExtractor {
    rules: Vec<Box<dyn Rule>>,
}

impl FieldExtractor {
    /// Create an extractor without rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the built-in rule list.
    pub fn with_default_rules() -> Result<Self> {
        Ok(Self {
            rules: default_rules()?,
        })
    }

    /// Append a rule; it runs after every rule already registered.
    pub fn push(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Builder form of [`FieldExtractor::push`].
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Rule ids in evaluation order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run the rules against a document.
    ///
    /// The result holds only the candidates of winning rules, grouped by
    /// rule in evaluation order.
    pub fn extract(&self, doc: &DocumentText) -> Vec<ExtractedField> {
        let mut resolved = BTreeSet::new();
        let mut fields = Vec::new();

        for rule in &self.rules {
            let name = rule.field();
            if resolved.contains(&name) {
                log::trace!("Skipping rule '{}': {} already resolved", rule.id(), name);
                continue;
            }

            let candidates = match run_isolated(rule.as_ref(), doc) {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("{}; treating as no match", e);
                    continue;
                }
            };

            let accepted: Vec<ExtractedField> = candidates
                .into_iter()
                .filter_map(|c| {
                    let value = c.value.trim();
                    (!value.is_empty()).then(|| ExtractedField {
                        name,
                        value: value.to_string(),
                        page: c.page,
                        rule: rule.id(),
                        confidence: c.confidence,
                        level: c.level,
                    })
                })
                .collect();

            if accepted.is_empty() {
                continue;
            }

            log::debug!(
                "Field '{}' resolved by rule '{}' ({} match{})",
                name,
                rule.id(),
                accepted.len(),
                if accepted.len() == 1 { "" } else { "es" }
            );
            resolved.insert(name);
            fields.extend(accepted);
        }

        fields
    }
}

/// Apply a rule, converting errors and panics into [`Error::RuleExecution`].
fn run_isolated(rule: &dyn Rule, doc: &DocumentText) -> Result<Vec<Candidate>> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.apply(doc)));
    match outcome {
        Ok(Ok(candidates)) => Ok(candidates),
        Ok(Err(e @ Error::RuleExecution { .. })) => Err(e),
        Ok(Err(e)) => Err(Error::RuleExecution {
            rule: rule.id(),
            message: e.to_string(),
        }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panicked".to_string());
            Err(Error::RuleExecution {
                rule: rule.id(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rule returning fixed values, for exercising the engine.
    struct FixedRule {
        id: &'static str,
        field: FieldName,
        values: Vec<&'static str>,
    }

    impl Rule for FixedRule {
        fn id(&self) -> &'static str {
            self.id
        }

        fn field(&self) -> FieldName {
            self.field
        }

        fn apply(&self, _doc: &DocumentText) -> Result<Vec<Candidate>> {
            Ok(self.values.iter().map(|v| Candidate::new(*v).on_page(1)).collect())
        }
    }

    struct FailingRule;

    impl Rule for FailingRule {
        fn id(&self) -> &'static str {
            "failing"
        }

        fn field(&self) -> FieldName {
            FieldName::Email
        }

        fn apply(&self, _doc: &DocumentText) -> Result<Vec<Candidate>> {
            Err(Error::Serialize("internal".to_string()))
        }
    }

    struct PanickingRule;

    impl Rule for PanickingRule {
        fn id(&self) -> &'static str {
            "panicking"
        }

        fn field(&self) -> FieldName {
            FieldName::Title
        }

        fn apply(&self, _doc: &DocumentText) -> Result<Vec<Candidate>> {
            panic!("index out of bounds")
        }
    }

    fn fixed(id: &'static str, field: FieldName, values: Vec<&'static str>) -> FixedRule {
        FixedRule { id, field, values }
    }

    #[test]
    fn test_first_match_wins() {
        let extractor = FieldExtractor::new()
            .with_rule(fixed("a", FieldName::Email, vec!["first@x.com"]))
            .with_rule(fixed("b", FieldName::Email, vec!["second@x.com"]));

        let fields = extractor.extract(&DocumentText::default());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "first@x.com");
        assert_eq!(fields[0].rule, "a");
    }

    #[test]
    fn test_empty_match_falls_through() {
        let extractor = FieldExtractor::new()
            .with_rule(fixed("empty", FieldName::Email, vec![]))
            .with_rule(fixed("blank", FieldName::Email, vec!["   "]))
            .with_rule(fixed("real", FieldName::Email, vec![" a@b.com "]));

        let fields = extractor.extract(&DocumentText::default());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].rule, "real");
        assert_eq!(fields[0].value, "a@b.com");
    }

    #[test]
    fn test_fields_resolve_independently() {
        let forward = FieldExtractor::new()
            .with_rule(fixed("t", FieldName::Title, vec!["Title"]))
            .with_rule(fixed("e", FieldName::Email, vec!["a@b.com"]));
        let reversed = FieldExtractor::new()
            .with_rule(fixed("e", FieldName::Email, vec!["a@b.com"]))
            .with_rule(fixed("t", FieldName::Title, vec!["Title"]));

        let doc = DocumentText::default();
        let mut a = forward.extract(&doc);
        let mut b = reversed.extract(&doc);
        a.sort_by_key(|f| f.name);
        b.sort_by_key(|f| f.name);
        assert_eq!(a, b);
    }

    #[test]
    fn test_failing_rule_is_isolated() {
        let extractor = FieldExtractor::new()
            .with_rule(FailingRule)
            .with_rule(fixed("fallback", FieldName::Email, vec!["a@b.com"]))
            .with_rule(fixed("title", FieldName::Title, vec!["Report"]));

        let fields = extractor.extract(&DocumentText::default());
        let rules: Vec<&str> = fields.iter().map(|f| f.rule).collect();
        assert_eq!(rules, vec!["fallback", "title"]);
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let extractor = FieldExtractor::new()
            .with_rule(PanickingRule)
            .with_rule(fixed("fallback", FieldName::Title, vec!["Recovered"]));

        let fields = extractor.extract(&DocumentText::default());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "Recovered");
    }

    #[test]
    fn test_run_isolated_wraps_errors() {
        let err = run_isolated(&FailingRule, &DocumentText::default()).unwrap_err();
        match err {
            Error::RuleExecution { rule, message } => {
                assert_eq!(rule, "failing");
                assert!(message.contains("internal"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multi_valued_keeps_all_candidates() {
        let extractor = FieldExtractor::new()
            .with_rule(fixed("outline", FieldName::Outline, vec!["Intro", "Scope"]))
            .with_rule(fixed("later", FieldName::Outline, vec!["Ignored"]));

        let fields = extractor.extract(&DocumentText::default());
        let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["Intro", "Scope"]);
    }

    #[test]
    fn test_default_rules_compile() {
        let extractor = FieldExtractor::with_default_rules().unwrap();
        let ids = extractor.rule_ids();
        assert!(ids.contains(&"labeled-email"));
        let labeled = ids.iter().position(|id| *id == "labeled-email").unwrap();
        let generic = ids.iter().position(|id| *id == "email").unwrap();
        assert!(labeled < generic);
    }
}
