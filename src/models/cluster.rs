//! Cluster and project models
//!
//! A cluster opts in to templates and supplies the value and override layers
//! that cascade over template defaults. A project carries defaults shared by
//! every cluster.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Metadata;
use super::template::PreservationPolicy;

/// A concrete deployment target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_cluster_kind")]
    pub kind: String,

    pub metadata: Metadata,

    pub spec: ClusterSpec,
}

impl Cluster {
    /// Create a git-mode cluster with no templates
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_cluster_kind(),
            metadata: Metadata::named(name),
            spec: ClusterSpec {
                git: Some(GitConfig::default()),
                ..Default::default()
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Per-template configuration, if the template is listed
    pub fn template_config(&self, template: &str) -> Option<&TemplateConfig> {
        self.spec.templates.iter().find(|t| t.name == template)
    }

    /// Whether the template is opted in. Listing is the only enablement signal.
    pub fn is_template_enabled(&self, template: &str) -> bool {
        self.template_config(template).is_some()
    }

    /// Whether the cluster publishes manifests as OCI artifacts
    pub fn is_oci_mode(&self) -> bool {
        self.spec.oci.is_some()
    }
}

/// Cluster specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClusterSpec {
    /// Exhaustive, opt-in list of templates deployed to this cluster
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,

    /// Cluster-global substitution values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci: Option<OciConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitConfig>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

/// A template opted in by a cluster, with its overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TemplateConfig {
    pub name: String,

    /// Template-scoped values, winning over cluster values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,

    /// Overrides keyed by kustomization name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kustomizations: BTreeMap<String, KustomizationOverride>,
}

impl TemplateConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Cluster-level override for a single kustomization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KustomizationOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preservation: Option<PreservationPolicy>,
}

/// OCI artifact source settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OciConfig {
    /// Registry host, e.g. `ghcr.io`
    pub registry: String,

    /// Repository path within the registry
    pub repository: String,

    #[serde(default)]
    pub tag_strategy: TagStrategy,

    /// Explicit tag, wins over the strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Cloud provider used by Flux for registry auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,

    #[serde(default)]
    pub insecure: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TagStrategy {
    /// Tag with the cluster name
    Cluster,
    #[default]
    GitSha,
    Version,
    Manual,
}

/// Git source settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Defaults shared by projects and clusters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// A cluster node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub name: String,

    #[serde(default = "default_role")]
    pub role: String,

    /// Name of a node profile supplying shared labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Reusable node settings referenced by `Node::profile`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeProfile {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Project-wide settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_project_kind")]
    pub kind: String,

    pub metadata: Metadata,

    #[serde(default)]
    pub spec: ProjectSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectSpec {
    #[serde(default)]
    pub defaults: Defaults,
}

fn default_api_version() -> String {
    "kustodian.io/v1".to_string()
}

fn default_cluster_kind() -> String {
    "Cluster".to_string()
}

fn default_project_kind() -> String {
    "Project".to_string()
}

fn default_role() -> String {
    "worker".to_string()
}
