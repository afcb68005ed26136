//! Custom scoring rule evaluation.
//!
//! # Overview
//!
//! Rules are configuration: they arrive from callers, so evaluation never
//! errors. A malformed condition (bad regex, type-mismatched comparison)
//! is treated as a non-match and logged, keeping scoring total.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use stratus_core::{ConditionOperator, Evidence, EvidenceKind, MetaValue, ScoringCondition,
    ScoringRule};

/// One rule's outcome against a relationship's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rule_id: String,
    /// Evidence items that satisfied every condition.
    pub matched_count: usize,
    /// `base_score * multiplier * matched_count`.
    pub contribution: f64,
}

/// Evaluate `rules` against `evidence`, highest priority first.
///
/// Only rules with at least one matching evidence item are returned. Ties
/// on priority order by rule id for determinism.
#[must_use]
pub fn evaluate(evidence: &[Evidence], rules: &[ScoringRule]) -> Vec<RuleMatch> {
    let mut ordered: Vec<&ScoringRule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

    ordered
        .into_iter()
        .filter_map(|rule| {
            let matched_count = evidence
                .iter()
                .filter(|item| {
                    rule.applies_to.contains(&item.kind)
                        && rule
                            .conditions
                            .iter()
                            .all(|condition| matches_condition(item, condition))
                })
                .count();
            (matched_count > 0).then(|| RuleMatch {
                rule_id: rule.id.clone(),
                matched_count,
                contribution: rule.base_score * rule.multiplier * to_f64(matched_count),
            })
        })
        .collect()
}

/// Rules whose `applies_to` includes `kind`.
#[must_use]
pub fn applicable_rules<'a>(kind: EvidenceKind, rules: &'a [ScoringRule]) -> Vec<&'a ScoringRule> {
    rules
        .iter()
        .filter(|rule| rule.applies_to.contains(&kind))
        .collect()
}

/// Whether one condition holds for one evidence item.
#[must_use]
pub fn matches_condition(evidence: &Evidence, condition: &ScoringCondition) -> bool {
    let field = resolve_field(evidence, &condition.field);

    if condition.operator == ConditionOperator::Exists {
        return field.is_some();
    }
    let Some(field) = field else {
        return false;
    };

    match condition.operator {
        ConditionOperator::Equals => match (&field, &condition.value) {
            (FieldValue::Str(actual), MetaValue::Str(expected)) => actual == expected,
            (FieldValue::Num(actual), MetaValue::Num(expected)) => {
                (actual - expected).abs() < f64::EPSILON
            }
            _ => false,
        },
        ConditionOperator::Contains => match (&field, &condition.value) {
            (FieldValue::Str(actual), MetaValue::Str(expected)) => actual.contains(expected),
            _ => false,
        },
        ConditionOperator::Matches => match (&field, &condition.value) {
            (FieldValue::Str(actual), MetaValue::Str(pattern)) => Regex::new(pattern)
                .map_or_else(
                    |error| {
                        warn!(%pattern, %error, "invalid regex in scoring condition; treating as non-match");
                        false
                    },
                    |regex| regex.is_match(actual),
                ),
            _ => false,
        },
        ConditionOperator::Gt => match (&field, &condition.value) {
            (FieldValue::Num(actual), MetaValue::Num(expected)) => actual > expected,
            _ => false,
        },
        ConditionOperator::Lt => match (&field, &condition.value) {
            (FieldValue::Num(actual), MetaValue::Num(expected)) => actual < expected,
            _ => false,
        },
        ConditionOperator::Exists => unreachable!("handled above"),
    }
}

enum FieldValue<'a> {
    Str(&'a str),
    Num(f64),
}

/// Dotted-path lookup into an evidence item. Unknown paths resolve to
/// `None`, which every operator except an inverted `exists` reads as a
/// non-match.
fn resolve_field<'a>(evidence: &'a Evidence, path: &str) -> Option<FieldValue<'a>> {
    match path {
        "id" => Some(FieldValue::Str(&evidence.id)),
        // `type` kept as an alias for callers with serialized rule sets.
        "kind" | "type" => Some(FieldValue::Str(evidence.kind.as_str())),
        "description" => Some(FieldValue::Str(&evidence.description)),
        "category" => Some(FieldValue::Str(evidence.category.as_str())),
        "confidence" => Some(FieldValue::Num(f64::from(evidence.confidence))),
        "method" => Some(FieldValue::Str(&evidence.method)),
        "raw" => evidence.raw.as_deref().map(FieldValue::Str),
        "location.file" => Some(FieldValue::Str(&evidence.location.file)),
        "location.start_line" => Some(FieldValue::Num(f64::from(evidence.location.start_line))),
        "location.end_line" => Some(FieldValue::Num(f64::from(evidence.location.end_line))),
        "location.start_column" => evidence
            .location
            .start_column
            .map(|column| FieldValue::Num(f64::from(column))),
        "location.end_column" => evidence
            .location
            .end_column
            .map(|column| FieldValue::Num(f64::from(column))),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(count: usize) -> f64 {
    count as f64
}
