use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification bands for a confidence value.
///
/// Always derived from the numeric value via [`ConfidenceLevel::for_value`];
/// a level stored independently of its value is invalid by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Certain,
    High,
    Medium,
    Low,
    Uncertain,
}

impl ConfidenceLevel {
    /// Map a confidence value to its band.
    ///
    /// `certain >= 95`, `high 80..=94`, `medium 60..=79`, `low 40..=59`,
    /// `uncertain < 40`.
    #[must_use]
    pub const fn for_value(value: u8) -> Self {
        match value {
            95.. => Self::Certain,
            80..=94 => Self::High,
            60..=79 => Self::Medium,
            40..=59 => Self::Low,
            _ => Self::Uncertain,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Certain => "certain",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The individual terms that produced a score, kept for explainability.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub evidence_multiplier: f64,
    pub explicit_bonus: f64,
    pub heuristic_penalty: f64,
    pub pattern_bonus: f64,
    /// Total contribution from custom scoring rules.
    pub rule_contribution: f64,
}

/// The aggregated, leveled trust value for one relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Final confidence in `0..=100`.
    pub value: u8,
    pub breakdown: ScoreBreakdown,
    pub level: ConfidenceLevel,
    /// Human-readable reasons the score went up.
    pub positive_factors: Vec<String>,
    /// Human-readable reasons the score went down.
    pub negative_factors: Vec<String>,
}

impl ConfidenceScore {
    /// The degenerate all-zero score, with one explanatory factor.
    ///
    /// "Low confidence" is data, not an error; this is what empty evidence
    /// produces.
    #[must_use]
    pub fn zero(reason: impl Into<String>) -> Self {
        Self {
            value: 0,
            breakdown: ScoreBreakdown::default(),
            level: ConfidenceLevel::Uncertain,
            positive_factors: Vec::new(),
            negative_factors: vec![reason.into()],
        }
    }
}
