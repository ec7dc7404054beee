//! Table-driven label parser.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::shipment::{DueDate, OrderId, ShipmentEntry, TrackingId, TradeInDescription};

use super::rules::{Field, FieldRule, RuleExtractor};
use super::{LabelExtractor, Result};

/// Fields extracted from one label, keyed by its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingLabel {
    pub order_id: OrderId,
    pub entry: ShipmentEntry,
}

/// Label parser applying a compiled rule table.
#[derive(Debug, Clone)]
pub struct RuleLabelParser {
    rules: Vec<RuleExtractor>,
}

impl RuleLabelParser {
    /// Create a parser with the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: Field::ALL.iter().map(|&f| RuleExtractor::builtin(f)).collect(),
        }
    }

    /// Compile a parser from a rule table.
    ///
    /// Each field may appear at most once. Order and tracking identifiers must
    /// be present and required, since an entry cannot be keyed without them.
    pub fn from_rules(rules: &[FieldRule]) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in rules {
            if !seen.insert(rule.field) {
                return Err(ExtractionError::InvalidRule {
                    field: rule.field,
                    reason: "field appears more than once in the rule table".to_string(),
                });
            }
        }

        for key in [Field::OrderId, Field::TrackingId] {
            match rules.iter().find(|r| r.field == key) {
                Some(rule) if rule.required => {}
                Some(_) => {
                    return Err(ExtractionError::InvalidRule {
                        field: key,
                        reason: "must be required".to_string(),
                    });
                }
                None => {
                    return Err(ExtractionError::InvalidRule {
                        field: key,
                        reason: "missing from the rule table".to_string(),
                    });
                }
            }
        }

        let rules = rules
            .iter()
            .cloned()
            .map(RuleExtractor::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter().map(|r| r.rule())
    }

    /// Values captured for `field`, honoring the rule's cardinality.
    ///
    /// Fields without a rule yield nothing.
    pub fn extract_field(&self, field: Field, text: &str) -> Result<Vec<String>> {
        match self.rules.iter().find(|r| r.field() == field) {
            Some(rule) => Ok(rule.apply(text)?.into_iter().map(|m| m.value).collect()),
            None => Ok(Vec::new()),
        }
    }

    /// First non-empty value of an optional field.
    fn optional(&self, field: Field, text: &str) -> Result<Option<String>> {
        let value = self
            .extract_field(field, text)?
            .into_iter()
            .find(|v| !v.is_empty());
        if value.is_none() {
            debug!("No {} on label", field);
        }
        Ok(value)
    }
}

impl Default for RuleLabelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelExtractor for RuleLabelParser {
    fn parse(&self, text: &str) -> Result<ShippingLabel> {
        let order_id = self
            .extract_field(Field::OrderId, text)?
            .into_iter()
            .next()
            .map(OrderId::from)
            .ok_or(ExtractionError::FieldNotFound { field: Field::OrderId })?;

        let tracking_ids: Vec<TrackingId> = self
            .extract_field(Field::TrackingId, text)?
            .into_iter()
            .map(TrackingId::from)
            .collect();
        if tracking_ids.is_empty() {
            return Err(ExtractionError::FieldNotFound { field: Field::TrackingId });
        }

        let entry = ShipmentEntry {
            tracking_ids,
            due_date: self.optional(Field::DueDate, text)?.map(DueDate::from),
            trade_in: self.optional(Field::TradeIn, text)?.map(TradeInDescription::from),
        };

        debug!(
            "Extracted order {} with {} tracking number(s)",
            order_id,
            entry.tracking_ids.len()
        );

        Ok(ShippingLabel { order_id, entry })
    }
}
