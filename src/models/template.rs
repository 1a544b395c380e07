//! Template model
//!
//! A template is a reusable bundle of kustomizations. Templates are loaded once
//! and never mutated by the generator.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// A reusable, versioned bundle of kustomizations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_template_kind")]
    pub kind: String,

    pub metadata: Metadata,

    pub spec: TemplateSpec,
}

impl Template {
    /// Create a template with the given kustomizations
    pub fn new(name: impl Into<String>, kustomizations: Vec<Kustomization>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_template_kind(),
            metadata: Metadata::named(name),
            spec: TemplateSpec {
                kustomizations,
                versions: Vec::new(),
                requirements: Vec::new(),
            },
        }
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Look up a kustomization by name
    pub fn kustomization(&self, name: &str) -> Option<&Kustomization> {
        self.spec.kustomizations.iter().find(|k| k.name == name)
    }
}

/// Template specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TemplateSpec {
    /// Kustomizations in declaration order
    pub kustomizations: Vec<Kustomization>,

    /// Template-level version trackers, shared by every kustomization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<VersionEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<Requirement>,
}

/// One deployable unit of a template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kustomization {
    /// Unique within the owning template
    pub name: String,

    /// Kustomize overlay path, relative to the template directory
    pub path: String,

    #[serde(default = "default_true")]
    pub prune: bool,

    #[serde(default = "default_true")]
    pub wait: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutions: Vec<Substitution>,

    /// Raw dependency references (`kustomization` or `template/kustomization`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preservation: Option<PreservationPolicy>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_checks: Vec<HealthCheck>,
}

impl Kustomization {
    /// Create a kustomization with default flags and no optional settings
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            prune: true,
            wait: true,
            namespace: None,
            substitutions: Vec::new(),
            depends_on: Vec::new(),
            preservation: None,
            health_checks: Vec::new(),
        }
    }

    /// Default namespace declared by this kustomization, if any
    pub fn default_namespace(&self) -> Option<&str> {
        self.namespace.as_ref().map(|ns| ns.default.as_str())
    }
}

/// Namespace settings for a kustomization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespaceConfig {
    pub default: String,

    /// Whether the namespace should be created by the generator
    #[serde(default = "default_true")]
    pub create: bool,
}

/// A named placeholder resolved to a concrete string value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Substitution {
    Generic {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Version {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        registry: Option<RegistryRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<String>,
    },
    Namespace {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

impl Substitution {
    pub fn generic(name: impl Into<String>, default: Option<&str>) -> Self {
        Substitution::Generic {
            name: name.into(),
            default: default.map(str::to_string),
            description: None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Substitution::Generic { name, .. }
            | Substitution::Version { name, .. }
            | Substitution::Namespace { name, .. } => name,
        }
    }

    pub fn default_value(&self) -> Option<&str> {
        match self {
            Substitution::Generic { default, .. }
            | Substitution::Version { default, .. }
            | Substitution::Namespace { default, .. } => default.as_deref(),
        }
    }
}

/// Template-level version tracker (image tag or Helm chart version)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

/// Where a tracked version is published
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryRef {
    pub image: String,

    #[serde(rename = "type", default)]
    pub registry_type: RegistryType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistryType {
    #[default]
    Container,
    Helm,
}

/// Cluster capability a template needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// At least `min_nodes` nodes carrying `node_label` (optionally with a given value)
    NodeCount {
        node_label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_label_value: Option<String>,
        min_nodes: usize,
    },
}

/// Which resources survive when a kustomization is disabled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreservationPolicy {
    pub mode: PreservationMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_resources: Option<Vec<String>>,
}

impl PreservationPolicy {
    pub fn new(mode: PreservationMode) -> Self {
        Self {
            mode,
            keep_resources: None,
        }
    }

    pub fn custom(keep_resources: Vec<String>) -> Self {
        Self {
            mode: PreservationMode::Custom,
            keep_resources: Some(keep_resources),
        }
    }
}

impl Default for PreservationPolicy {
    fn default() -> Self {
        Self::new(PreservationMode::Stateful)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreservationMode {
    None,
    #[default]
    Stateful,
    Custom,
}

/// Health check entry for a Flux Kustomization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheck {
    pub kind: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

fn default_api_version() -> String {
    "kustodian.io/v1".to_string()
}

fn default_template_kind() -> String {
    "Template".to_string()
}

fn default_true() -> bool {
    true
}
