//! Evidence-based confidence scoring.
//!
//! # Overview
//!
//! [`calculate`] folds a relationship's evidence into one
//! [`ConfidenceScore`]: a category-weighted base, a diminishing-returns
//! multiplier over evidence count, flat bonuses/penalties for explicit and
//! heuristic-only signal sets, a bonus for category diversity, and custom
//! rule contributions. Scoring has no failure mode; empty evidence is a
//! zero score, not an error.
//!
//! ## Diminishing returns
//!
//! `multiplier(n) = min(1 + 0.15 * sqrt(n - 1), 1.5)`: monotonic in the
//! evidence count, sub-linear (three items reach x1.21, nowhere near x3),
//! and capped so evidence spam cannot dominate the weighted base.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use stratus_core::{
    ConfidenceLevel, ConfidenceScore, Evidence, EvidenceCategory, ScoreBreakdown, ScoringRule,
};

use crate::rules;

const MULTIPLIER_STEP: f64 = 0.15;
const MULTIPLIER_CAP: f64 = 1.5;
const PATTERN_CATEGORY_MIN: usize = 3;

/// Per-category weights and flat adjustments.
///
/// Explicit signal is trusted fully; the weights decay toward heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub explicit_weight: f64,
    pub syntax_weight: f64,
    pub semantic_weight: f64,
    pub structural_weight: f64,
    pub heuristic_weight: f64,
    /// Flat addition when any evidence is explicit.
    pub explicit_bonus: f64,
    /// Flat subtraction when all evidence is heuristic.
    pub heuristic_penalty: f64,
    /// Addition when evidence spans three or more distinct categories.
    pub pattern_bonus: f64,
    pub enable_diminishing_returns: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            explicit_weight: 1.0,
            syntax_weight: 0.9,
            semantic_weight: 0.8,
            structural_weight: 0.7,
            heuristic_weight: 0.5,
            explicit_bonus: 10.0,
            heuristic_penalty: 10.0,
            pattern_bonus: 5.0,
            enable_diminishing_returns: true,
        }
    }
}

impl ScoringConfig {
    #[must_use]
    pub const fn category_weight(&self, category: EvidenceCategory) -> f64 {
        match category {
            EvidenceCategory::Explicit => self.explicit_weight,
            EvidenceCategory::Syntax => self.syntax_weight,
            EvidenceCategory::Semantic => self.semantic_weight,
            EvidenceCategory::Structural => self.structural_weight,
            EvidenceCategory::Heuristic => self.heuristic_weight,
        }
    }
}

/// The evidence-count multiplier. `1.0` when diminishing returns are
/// disabled or there is no evidence.
#[must_use]
pub fn evidence_multiplier(count: usize, enable_diminishing_returns: bool) -> f64 {
    if !enable_diminishing_returns || count == 0 {
        return 1.0;
    }
    let extra = to_f64(count - 1).sqrt().mul_add(MULTIPLIER_STEP, 1.0);
    extra.min(MULTIPLIER_CAP)
}

/// Score one relationship's evidence.
///
/// Every call returns a well-formed score; the level is always derived
/// from the final value.
#[must_use]
#[instrument(skip(evidence, config, custom_rules), fields(items = evidence.len()))]
pub fn calculate(
    evidence: &[Evidence],
    config: &ScoringConfig,
    custom_rules: &[ScoringRule],
) -> ConfidenceScore {
    if evidence.is_empty() {
        return ConfidenceScore::zero("no evidence provided");
    }

    let mut positive_factors: Vec<String> = Vec::new();
    let mut negative_factors: Vec<String> = Vec::new();

    let weighted_sum: f64 = evidence
        .iter()
        .map(|item| f64::from(item.confidence) * config.category_weight(item.category))
        .sum();
    let base_score = weighted_sum / to_f64(evidence.len());

    let multiplier = evidence_multiplier(evidence.len(), config.enable_diminishing_returns);
    if evidence.len() > 1 {
        positive_factors.push(format!("{} corroborating evidence items", evidence.len()));
    }

    let has_explicit = evidence
        .iter()
        .any(|item| item.category == EvidenceCategory::Explicit);
    let explicit_bonus = if has_explicit {
        positive_factors.push("explicit evidence present".to_string());
        config.explicit_bonus
    } else {
        0.0
    };

    let all_heuristic = evidence
        .iter()
        .all(|item| item.category == EvidenceCategory::Heuristic);
    let heuristic_penalty = if all_heuristic {
        negative_factors.push("all evidence is heuristic".to_string());
        config.heuristic_penalty
    } else {
        0.0
    };

    let categories: BTreeSet<EvidenceCategory> =
        evidence.iter().map(|item| item.category).collect();
    let pattern_bonus = if categories.len() >= PATTERN_CATEGORY_MIN {
        positive_factors.push(format!(
            "evidence spans {} distinct categories",
            categories.len()
        ));
        config.pattern_bonus
    } else {
        0.0
    };

    let rule_matches = rules::evaluate(evidence, custom_rules);
    let rule_contribution: f64 = rule_matches.iter().map(|m| m.contribution).sum();
    for matched in &rule_matches {
        positive_factors.push(format!(
            "rule `{}` matched {} item(s)",
            matched.rule_id, matched.matched_count
        ));
    }

    let raw = base_score.mul_add(multiplier, explicit_bonus + pattern_bonus)
        - heuristic_penalty
        + rule_contribution;
    let value = normalize_value(raw);

    ConfidenceScore {
        value,
        breakdown: ScoreBreakdown {
            base_score,
            evidence_multiplier: multiplier,
            explicit_bonus,
            heuristic_penalty,
            pattern_bonus,
            rule_contribution,
        },
        level: ConfidenceLevel::for_value(value),
        positive_factors,
        negative_factors,
    }
}

/// True iff the value is in range and the level matches it.
#[must_use]
pub fn validate_score(score: &ConfidenceScore) -> bool {
    score.value <= 100 && score.level == ConfidenceLevel::for_value(score.value)
}

/// Merge several scores into one.
///
/// Empty input is the zero score; a single input is returned unchanged.
/// Otherwise the value is a confidence-weighted average (each score
/// weighted by its own value, so higher-confidence scores dominate),
/// factors are deduplicated unions, and breakdown terms add.
#[must_use]
pub fn merge_scores(scores: &[ConfidenceScore]) -> ConfidenceScore {
    if scores.is_empty() {
        return ConfidenceScore::zero("no scores to merge");
    }
    if let [single] = scores {
        return single.clone();
    }

    let total_weight: f64 = scores.iter().map(|score| f64::from(score.value)).sum();
    let value = if total_weight > 0.0 {
        let weighted: f64 = scores
            .iter()
            .map(|score| f64::from(score.value) * f64::from(score.value))
            .sum();
        normalize_value(weighted / total_weight)
    } else {
        0
    };

    let mut breakdown = ScoreBreakdown::default();
    for score in scores {
        breakdown.base_score += score.breakdown.base_score;
        breakdown.evidence_multiplier += score.breakdown.evidence_multiplier;
        breakdown.explicit_bonus += score.breakdown.explicit_bonus;
        breakdown.heuristic_penalty += score.breakdown.heuristic_penalty;
        breakdown.pattern_bonus += score.breakdown.pattern_bonus;
        breakdown.rule_contribution += score.breakdown.rule_contribution;
    }

    ConfidenceScore {
        value,
        breakdown,
        level: ConfidenceLevel::for_value(value),
        positive_factors: dedup_union(scores.iter().map(|s| s.positive_factors.iter())),
        negative_factors: dedup_union(scores.iter().map(|s| s.negative_factors.iter())),
    }
}

fn dedup_union<'a>(
    factor_lists: impl Iterator<Item = std::slice::Iter<'a, String>>,
) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut union: Vec<String> = Vec::new();
    for factors in factor_lists {
        for factor in factors {
            if seen.insert(factor.as_str()) {
                union.push(factor.clone());
            }
        }
    }
    union
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_value(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(count: usize) -> f64 {
    count as f64
}
