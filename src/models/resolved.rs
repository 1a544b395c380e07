//! Resolution and generation outputs

use k8s_openapi::api::core::v1::Namespace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::template::{Kustomization, Template};
use crate::flux::{FluxKustomization, OciRepository};

/// A template after the cluster's value layers have been applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTemplate {
    pub template: Template,
    /// Cluster values overlaid with the cluster's template-scoped values
    pub values: BTreeMap<String, String>,
    pub enabled: bool,
}

/// A kustomization with every substitution resolved to a concrete value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedKustomization {
    /// Owning template name
    pub template: String,
    pub kustomization: Kustomization,
    pub values: BTreeMap<String, String>,
    pub namespace: Option<String>,
}

/// One compiled Flux Kustomization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedKustomization {
    /// Flux resource name (`<template>-<kustomization>`)
    pub name: String,
    pub template: String,
    /// Overlay path inside the source artifact
    pub path: String,
    pub flux_kustomization: FluxKustomization,
}

/// Everything generated for one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub cluster: String,
    pub output_dir: PathBuf,
    pub kustomizations: Vec<GeneratedKustomization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oci_repository: Option<OciRepository>,
    pub namespaces: Vec<Namespace>,
}

impl GenerationResult {
    /// Look up a generated kustomization by its Flux name
    pub fn kustomization(&self, name: &str) -> Option<&GeneratedKustomization> {
        self.kustomizations.iter().find(|k| k.name == name)
    }
}
