use serde::{Deserialize, Serialize};

use crate::model::evidence::EvidenceKind;
use crate::model::metadata::MetaValue;

/// Comparison operator applied by a [`ScoringCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Strict value equality.
    Equals,
    /// Substring containment on string fields.
    Contains,
    /// Regular-expression test on string fields.
    Matches,
    /// Numeric greater-than.
    Gt,
    /// Numeric less-than.
    Lt,
    /// Field is present (the condition value is ignored).
    Exists,
}

/// One predicate over an evidence item.
///
/// `field` is a dotted path into the evidence, e.g. `location.file` or
/// `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCondition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: MetaValue,
}

impl ScoringCondition {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<MetaValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// A configurable scoring rule evaluated against a relationship's evidence.
///
/// A rule matches an evidence item when the item's kind is in `applies_to`
/// and every condition holds. Its score contribution is
/// `base_score * multiplier * matched_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub applies_to: Vec<EvidenceKind>,
    pub base_score: f64,
    pub multiplier: f64,
    /// Conditions are evaluated in order; all must hold.
    #[serde(default)]
    pub conditions: Vec<ScoringCondition>,
    /// Higher priority evaluates first.
    #[serde(default)]
    pub priority: i32,
}

impl ScoringRule {
    /// Create a rule with neutral scoring terms; chain `with_*` to refine.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            applies_to: Vec::new(),
            base_score: 0.0,
            multiplier: 1.0,
            conditions: Vec::new(),
            priority: 0,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn applies_to(mut self, kinds: impl IntoIterator<Item = EvidenceKind>) -> Self {
        self.applies_to = kinds.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_base_score(mut self, base_score: f64) -> Self {
        self.base_score = base_score;
        self
    }

    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: ScoringCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
