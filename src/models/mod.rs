//! Kustodian model layer
//!
//! Structure:
//! - `template.rs` - Templates, kustomizations and their policies
//! - `cluster.rs` - Clusters, projects, nodes and profiles
//! - `resolved.rs` - Intermediate and final generator outputs
//! - `flux_resource_kind.rs` - Flux kinds referenced by generated manifests

pub mod cluster;
pub mod flux_resource_kind;
pub mod resolved;
pub mod template;

pub use cluster::{
    Cluster, ClusterSpec, Defaults, GitConfig, KustomizationOverride, Node, NodeProfile, OciConfig,
    Project, ProjectSpec, TagStrategy, TemplateConfig,
};
pub use flux_resource_kind::FluxResourceKind;
pub use resolved::{GeneratedKustomization, GenerationResult, ResolvedKustomization, ResolvedTemplate};
pub use template::{
    HealthCheck, Kustomization, NamespaceConfig, PreservationMode, PreservationPolicy, RegistryRef,
    RegistryType, Requirement, Substitution, Template, TemplateSpec, VersionEntry,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Object metadata shared by templates, clusters and projects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Metadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }
}
