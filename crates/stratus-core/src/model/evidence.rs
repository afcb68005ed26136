//! Observed signals supporting the existence of a relationship.
//!
//! # Overview
//!
//! Detectors emit one [`Evidence`] per observed signal (a `depends_on`
//! entry, an interpolation, a label selector match, a naming similarity).
//! The scoring engine aggregates a relationship's evidence into a single
//! confidence value; [`EvidenceCollection`] is the intermediate view with
//! per-kind and per-category counts.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::location::SourceLocation;

/// Broad trust category of a signal, from declared to guessed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    Explicit,
    Syntax,
    Semantic,
    Structural,
    Heuristic,
}

impl EvidenceCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Syntax => "syntax",
            Self::Semantic => "semantic",
            Self::Structural => "structural",
            Self::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for EvidenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The specific signal a detector observed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    ExplicitReference,
    DependsOnDirective,
    Interpolation,
    ModuleSourcePath,
    VariableUsage,
    OutputUsage,
    DataSourceLink,
    ProviderInheritance,
    RemoteStateLink,
    LabelSelector,
    NamespaceMatch,
    EnvVarReference,
    VolumeMount,
    ServiceDnsName,
    ImageReference,
    NamingConvention,
    FileProximity,
    AttributeSimilarity,
    Unknown,
}

impl EvidenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExplicitReference => "explicit_reference",
            Self::DependsOnDirective => "depends_on_directive",
            Self::Interpolation => "interpolation",
            Self::ModuleSourcePath => "module_source_path",
            Self::VariableUsage => "variable_usage",
            Self::OutputUsage => "output_usage",
            Self::DataSourceLink => "data_source_link",
            Self::ProviderInheritance => "provider_inheritance",
            Self::RemoteStateLink => "remote_state_link",
            Self::LabelSelector => "label_selector",
            Self::NamespaceMatch => "namespace_match",
            Self::EnvVarReference => "env_var_reference",
            Self::VolumeMount => "volume_mount",
            Self::ServiceDnsName => "service_dns_name",
            Self::ImageReference => "image_reference",
            Self::NamingConvention => "naming_convention",
            Self::FileProximity => "file_proximity",
            Self::AttributeSimilarity => "attribute_similarity",
            Self::Unknown => "unknown",
        }
    }

    /// The category this kind of signal falls into by default.
    ///
    /// Detectors may override the category on individual evidence items
    /// when context warrants (e.g. an interpolation inside a comment).
    #[must_use]
    pub const fn default_category(self) -> EvidenceCategory {
        match self {
            Self::ExplicitReference | Self::DependsOnDirective => EvidenceCategory::Explicit,
            Self::Interpolation
            | Self::VariableUsage
            | Self::OutputUsage
            | Self::EnvVarReference => EvidenceCategory::Syntax,
            Self::ModuleSourcePath
            | Self::DataSourceLink
            | Self::ProviderInheritance
            | Self::RemoteStateLink
            | Self::ServiceDnsName
            | Self::ImageReference => EvidenceCategory::Semantic,
            Self::LabelSelector | Self::NamespaceMatch | Self::VolumeMount => {
                EvidenceCategory::Structural
            }
            Self::NamingConvention
            | Self::FileProximity
            | Self::AttributeSimilarity
            | Self::Unknown => EvidenceCategory::Heuristic,
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observed signal supporting a candidate relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub kind: EvidenceKind,
    pub description: String,
    pub category: EvidenceCategory,
    #[serde(default)]
    pub location: SourceLocation,
    /// Detector-assigned confidence in `0..=100`.
    pub confidence: u8,
    /// Raw matched text, when the detector captured it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub collected_at: DateTime<Utc>,
    /// Name of the detection method that produced this item.
    pub method: String,
}

impl Evidence {
    /// Create evidence with the kind's default category and a fresh
    /// collection timestamp. Confidence above 100 is clamped.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: EvidenceKind,
        description: impl Into<String>,
        confidence: u8,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            category: kind.default_category(),
            location: SourceLocation::default(),
            confidence: confidence.min(100),
            raw: None,
            collected_at: Utc::now(),
            method: String::new(),
        }
    }

    #[must_use]
    pub const fn with_category(mut self, category: EvidenceCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// A relationship's evidence with aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCollection {
    pub items: Vec<Evidence>,
    /// Arithmetic mean of item confidences, rounded. Zero when empty.
    pub aggregated_confidence: u8,
    pub count_by_kind: BTreeMap<EvidenceKind, usize>,
    pub count_by_category: BTreeMap<EvidenceCategory, usize>,
}

impl EvidenceCollection {
    #[must_use]
    pub fn from_items(items: Vec<Evidence>) -> Self {
        let mut count_by_kind: BTreeMap<EvidenceKind, usize> = BTreeMap::new();
        let mut count_by_category: BTreeMap<EvidenceCategory, usize> = BTreeMap::new();
        let mut total: u64 = 0;

        for item in &items {
            *count_by_kind.entry(item.kind).or_default() += 1;
            *count_by_category.entry(item.category).or_default() += 1;
            total += u64::from(item.confidence);
        }

        let aggregated_confidence = if items.is_empty() {
            0
        } else {
            mean_rounded(total, items.len())
        };

        Self {
            items,
            aggregated_confidence,
            count_by_kind,
            count_by_category,
        }
    }

    /// The max-confidence item, or `None` when empty. Ties keep the
    /// earliest item.
    #[must_use]
    pub fn primary(&self) -> Option<&Evidence> {
        self.items.iter().reduce(|best, item| {
            if item.confidence > best.confidence {
                item
            } else {
                best
            }
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn mean_rounded(total: u64, count: usize) -> u8 {
    // Confidences are clamped to 100, so the mean always fits in u8.
    ((total as f64) / (count as f64)).round() as u8
}
