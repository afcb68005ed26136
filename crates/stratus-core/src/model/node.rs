use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::location::SourceLocation;
use crate::model::metadata::Metadata;

/// The kind of infrastructure construct a node represents.
///
/// Closed enum with an explicit [`NodeKind::Unknown`] catch-all so parsers
/// for new ecosystems can emit nodes before this enum learns their kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TerraformResource,
    TerraformData,
    TerraformModule,
    TerraformVariable,
    TerraformOutput,
    TerraformLocal,
    TerraformProvider,
    TerraformBackend,
    TerragruntConfig,
    TerragruntInclude,
    TerragruntDependency,
    K8sDeployment,
    K8sService,
    K8sPod,
    K8sConfigMap,
    K8sSecret,
    K8sIngress,
    K8sStatefulSet,
    K8sDaemonSet,
    K8sJob,
    K8sCronJob,
    K8sNamespace,
    K8sServiceAccount,
    K8sPersistentVolume,
    K8sPersistentVolumeClaim,
    K8sCustomResource,
    HelmRelease,
    HelmChart,
    HelmValues,
    File,
    Unknown,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerraformResource => "terraform_resource",
            Self::TerraformData => "terraform_data",
            Self::TerraformModule => "terraform_module",
            Self::TerraformVariable => "terraform_variable",
            Self::TerraformOutput => "terraform_output",
            Self::TerraformLocal => "terraform_local",
            Self::TerraformProvider => "terraform_provider",
            Self::TerraformBackend => "terraform_backend",
            Self::TerragruntConfig => "terragrunt_config",
            Self::TerragruntInclude => "terragrunt_include",
            Self::TerragruntDependency => "terragrunt_dependency",
            Self::K8sDeployment => "k8s_deployment",
            Self::K8sService => "k8s_service",
            Self::K8sPod => "k8s_pod",
            Self::K8sConfigMap => "k8s_config_map",
            Self::K8sSecret => "k8s_secret",
            Self::K8sIngress => "k8s_ingress",
            Self::K8sStatefulSet => "k8s_stateful_set",
            Self::K8sDaemonSet => "k8s_daemon_set",
            Self::K8sJob => "k8s_job",
            Self::K8sCronJob => "k8s_cron_job",
            Self::K8sNamespace => "k8s_namespace",
            Self::K8sServiceAccount => "k8s_service_account",
            Self::K8sPersistentVolume => "k8s_persistent_volume",
            Self::K8sPersistentVolumeClaim => "k8s_persistent_volume_claim",
            Self::K8sCustomResource => "k8s_custom_resource",
            Self::HelmRelease => "helm_release",
            Self::HelmChart => "helm_chart",
            Self::HelmValues => "helm_values",
            Self::File => "file",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource-specific payload for `terraform_resource` / `terraform_data`
/// nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Provider-qualified resource type, e.g. `aws_vpc`.
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Module-specific payload for `terraform_module` nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module source address (registry, git, or local path).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One infrastructure construct in a dependency graph.
///
/// `id` is globally unique within a graph; re-adding the same id replaces
/// the prior node (last-write-wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleInfo>,
}

impl Node {
    /// Create a node with no location, metadata, or variant payload.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            location: SourceLocation::default(),
            metadata: Metadata::new(),
            resource: None,
            module: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource_type: impl Into<String>) -> Self {
        self.resource = Some(ResourceInfo {
            resource_type: resource_type.into(),
            provider: None,
        });
        self
    }

    #[must_use]
    pub fn with_module(mut self, source: impl Into<String>, version: Option<String>) -> Self {
        self.module = Some(ModuleInfo {
            source: source.into(),
            version,
        });
        self
    }
}
