use std::fmt;

use serde::{Deserialize, Serialize};

/// The relationship kind carried by a directed edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    References,
    DependsOn,
    ModuleCall,
    ModuleOutput,
    DataReference,
    VariableReference,
    LocalReference,
    OutputReference,
    ProviderReference,
    RemoteState,
    SelectorMatch,
    NamespaceScope,
    ConfigMapRef,
    SecretRef,
    VolumeRef,
    ServiceRef,
    IngressBackend,
    HelmValuesRef,
    ChartDependency,
    ImageRef,
    Contains,
    Unknown,
}

impl EdgeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::References => "references",
            Self::DependsOn => "depends_on",
            Self::ModuleCall => "module_call",
            Self::ModuleOutput => "module_output",
            Self::DataReference => "data_reference",
            Self::VariableReference => "variable_reference",
            Self::LocalReference => "local_reference",
            Self::OutputReference => "output_reference",
            Self::ProviderReference => "provider_reference",
            Self::RemoteState => "remote_state",
            Self::SelectorMatch => "selector_match",
            Self::NamespaceScope => "namespace_scope",
            Self::ConfigMapRef => "config_map_ref",
            Self::SecretRef => "secret_ref",
            Self::VolumeRef => "volume_ref",
            Self::ServiceRef => "service_ref",
            Self::IngressBackend => "ingress_backend",
            Self::HelmValuesRef => "helm_values_ref",
            Self::ChartDependency => "chart_dependency",
            Self::ImageRef => "image_ref",
            Self::Contains => "contains",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-edge metadata: provenance flag, confidence, and the attribute the
/// relationship was observed on.
///
/// Confidence is always within `0..=100`; constructors clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    /// True when the relationship was inferred rather than declared.
    pub implicit: bool,
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl EdgeMetadata {
    #[must_use]
    pub const fn new(implicit: bool, confidence: u8) -> Self {
        Self {
            implicit,
            confidence: if confidence > 100 { 100 } else { confidence },
            attribute: None,
        }
    }

    /// A declared relationship (e.g. a `depends_on` entry).
    #[must_use]
    pub const fn declared(confidence: u8) -> Self {
        Self::new(false, confidence)
    }

    /// An inferred relationship (e.g. a selector match).
    #[must_use]
    pub const fn inferred(confidence: u8) -> Self {
        Self::new(true, confidence)
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl Default for EdgeMetadata {
    /// An explicit edge at full confidence.
    fn default() -> Self {
        Self::new(false, 100)
    }
}

/// A typed, directed, confidence-bearing relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

impl GraphEdge {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            label: None,
            metadata: EdgeMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
