//! Rule table for shipping label fields.
//!
//! A rule names a field, an anchor pattern with a single capture group, how
//! many values the field may hold and whether a label without it is rejected.
//! New fields only need a new row in the table.

pub mod patterns;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ExtractionError;
use patterns::{DUE_DATE, ORDER_ID, TRACKING_ID, TRADE_IN};

/// Fields read from a shipping label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Order identifier (`SA` + 9 digits).
    OrderId,
    /// Tracking identifier (12 digits).
    TrackingId,
    /// Ship-by deadline text.
    DueDate,
    /// Trade-in device description.
    TradeIn,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::OrderId, Field::TrackingId, Field::DueDate, Field::TradeIn];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::OrderId => "order identifier",
            Field::TrackingId => "tracking identifier",
            Field::DueDate => "due date",
            Field::TradeIn => "trade-in device",
        };
        f.write_str(name)
    }
}

/// How many matches a rule collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// First match only.
    Single,
    /// Every non-overlapping match, in text order.
    Multi,
}

/// One row of the extraction rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: Field,
    pub pattern: String,
    pub cardinality: Cardinality,
    pub required: bool,
}

impl FieldRule {
    pub fn new(field: Field, pattern: impl Into<String>, cardinality: Cardinality, required: bool) -> Self {
        Self {
            field,
            pattern: pattern.into(),
            cardinality,
            required,
        }
    }

    /// The built-in rule table.
    pub fn defaults() -> Vec<FieldRule> {
        vec![
            FieldRule::new(Field::OrderId, patterns::ORDER_ID_PATTERN, Cardinality::Single, true),
            FieldRule::new(Field::TrackingId, patterns::TRACKING_ID_PATTERN, Cardinality::Multi, true),
            FieldRule::new(Field::DueDate, patterns::DUE_DATE_PATTERN, Cardinality::Single, false),
            FieldRule::new(Field::TradeIn, patterns::TRADE_IN_PATTERN, Cardinality::Single, false),
        ]
    }
}

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A captured value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range of the value in the source text.
    pub position: Option<(usize, usize)>,
    /// Full text matched by the anchor pattern.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    rule: FieldRule,
    regex: Regex,
}

impl RuleExtractor {
    /// Compile a rule, checking it has exactly one capture group.
    pub fn compile(rule: FieldRule) -> Result<Self, ExtractionError> {
        let regex = Regex::new(&rule.pattern).map_err(|e| ExtractionError::InvalidRule {
            field: rule.field,
            reason: e.to_string(),
        })?;
        Self::with_regex(rule, regex)
    }

    /// Rule for `field` from the built-in table, sharing the precompiled pattern.
    pub fn builtin(field: Field) -> Self {
        let regex = match field {
            Field::OrderId => ORDER_ID.clone(),
            Field::TrackingId => TRACKING_ID.clone(),
            Field::DueDate => DUE_DATE.clone(),
            Field::TradeIn => TRADE_IN.clone(),
        };
        let rule = FieldRule::defaults()
            .into_iter()
            .find(|r| r.field == field)
            .unwrap_or_else(|| FieldRule::new(field, regex.as_str(), Cardinality::Single, false));
        Self { rule, regex }
    }

    fn with_regex(rule: FieldRule, regex: Regex) -> Result<Self, ExtractionError> {
        // Group 0 is the whole match.
        if regex.captures_len() != 2 {
            return Err(ExtractionError::InvalidRule {
                field: rule.field,
                reason: format!(
                    "pattern must have exactly one capture group, found {}",
                    regex.captures_len() - 1
                ),
            });
        }
        Ok(Self { rule, regex })
    }

    pub fn field(&self) -> Field {
        self.rule.field
    }

    pub fn rule(&self) -> &FieldRule {
        &self.rule
    }

    /// Apply the rule's cardinality and requirement to `text`.
    ///
    /// A required rule with no match fails with [`ExtractionError::FieldNotFound`];
    /// an optional one yields an empty list.
    pub fn apply(&self, text: &str) -> Result<Vec<ExtractionMatch<String>>, ExtractionError> {
        let matches = match self.rule.cardinality {
            Cardinality::Single => self.extract(text).into_iter().collect(),
            Cardinality::Multi => self.extract_all(text),
        };

        if matches.is_empty() && self.rule.required {
            return Err(ExtractionError::FieldNotFound { field: self.rule.field });
        }
        Ok(matches)
    }

    fn to_match(&self, caps: regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
        let full = caps.get(0)?;
        let value = caps.get(1)?;
        let m = ExtractionMatch::new(value.as_str().to_string(), full.as_str())
            .with_position(value.start(), value.end());
        trace!(
            "{} matched {:?} at {}..{} in {:?}",
            self.rule.field,
            m.value,
            value.start(),
            value.end(),
            m.source
        );
        Some(m)
    }
}

impl FieldExtractor for RuleExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.regex.captures(text).and_then(|caps| self.to_match(caps))
    }

    /// Resumes after the captured value rather than the whole match, so a
    /// trailing guard such as `(?:\D|$)` does not swallow the next anchor.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut matches = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            let Some(caps) = self.regex.captures_at(text, pos) else {
                break;
            };
            let Some(full) = caps.get(0) else {
                break;
            };
            let resume = caps.get(1).map_or(full.end(), |value| value.end());
            pos = if resume > pos {
                resume
            } else {
                // Empty match at the cursor: step over one character.
                full.end() + text[full.end()..].chars().next().map_or(1, char::len_utf8)
            };

            if let Some(m) = self.to_match(caps) {
                matches.push(m);
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LABEL: &str = "Order ID: SA123456789\n\
        Tracking ID: 111111111111\n\
        Tracking ID: 222222222222\n\
        Be sure to ship your package by October 25, 2024.\n";

    #[test]
    fn test_multi_collects_all_in_order() {
        let rule = RuleExtractor::builtin(Field::TrackingId);
        let values: Vec<String> = rule.apply(LABEL).unwrap().into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["111111111111", "222222222222"]);
    }

    #[test]
    fn test_multi_with_run_together_anchors() {
        let rule = RuleExtractor::builtin(Field::TrackingId);
        let text = "Tracking ID: 111111111111Tracking ID: 222222222222Tracking ID: 3333333333334";
        let values: Vec<String> = rule.apply(text).unwrap().into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["111111111111", "222222222222"]);
    }

    #[test]
    fn test_single_takes_first() {
        let rule = RuleExtractor::compile(FieldRule::new(
            Field::TrackingId,
            patterns::TRACKING_ID_PATTERN,
            Cardinality::Single,
            true,
        ))
        .unwrap();
        let matches = rule.apply(LABEL).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, "111111111111");
    }

    #[test]
    fn test_required_missing_fails() {
        let rule = RuleExtractor::builtin(Field::TrackingId);
        let err = rule.apply("Order ID: SA123456789").unwrap_err();
        assert!(matches!(err, ExtractionError::FieldNotFound { field: Field::TrackingId }));
    }

    #[test]
    fn test_optional_missing_is_empty() {
        let rule = RuleExtractor::builtin(Field::TradeIn);
        assert!(rule.apply(LABEL).unwrap().is_empty());
    }

    #[test]
    fn test_match_position() {
        let rule = RuleExtractor::builtin(Field::OrderId);
        let m = rule.extract(LABEL).unwrap();
        assert_eq!(m.value, "SA123456789");
        assert_eq!(m.position, Some((10, 21)));
        assert_eq!(&LABEL[10..21], "SA123456789");
        assert_eq!(m.source, "Order ID: SA123456789\n");
    }

    #[test]
    fn test_compile_rejects_bad_patterns() {
        let no_group = FieldRule::new(Field::DueDate, r"ship by \S+", Cardinality::Single, false);
        assert!(matches!(
            RuleExtractor::compile(no_group),
            Err(ExtractionError::InvalidRule { field: Field::DueDate, .. })
        ));

        let two_groups = FieldRule::new(Field::DueDate, r"(ship) by (\S+)", Cardinality::Single, false);
        assert!(RuleExtractor::compile(two_groups).is_err());

        let broken = FieldRule::new(Field::DueDate, r"ship by (\S+", Cardinality::Single, false);
        assert!(RuleExtractor::compile(broken).is_err());
    }

    #[test]
    fn test_rule_table_serializes_by_name() {
        let json = serde_json::to_value(FieldRule::defaults()).unwrap();
        assert_eq!(json[1]["field"], "tracking_id");
        assert_eq!(json[1]["cardinality"], "multi");
        assert_eq!(json[3]["required"], false);
    }
}
