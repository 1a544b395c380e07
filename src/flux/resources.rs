//! Flux CRD models emitted by the generator
//!
//! Only the fields the generator sets are modelled. Types derive
//! `CustomResource` so the root objects carry `apiVersion`/`kind` and standard
//! object metadata.

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::preservation::PreservationPatch;

/// `kustomize.toolkit.fluxcd.io/v1` Kustomization spec
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[kube(
    group = "kustomize.toolkit.fluxcd.io",
    version = "v1",
    kind = "Kustomization",
    root = "FluxKustomization",
    namespaced,
    schema = "disabled",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct FluxKustomizationSpec {
    pub interval: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    pub path: String,

    pub prune: bool,

    #[serde(default)]
    pub wait: bool,

    pub source_ref: SourceReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<DependencyReference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_checks: Option<Vec<HealthCheckReference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches: Option<Vec<PreservationPatch>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_build: Option<PostBuild>,
}

/// Reference to the Flux source a Kustomization reconciles from
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SourceReference {
    pub kind: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// `spec.dependsOn` entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DependencyReference {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// `spec.healthChecks` entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// Post-build variable substitution
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PostBuild {
    #[serde(default)]
    pub substitute: BTreeMap<String, String>,
}

/// `source.toolkit.fluxcd.io/v1` OCIRepository spec
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1",
    kind = "OCIRepository",
    root = "OciRepository",
    namespaced,
    schema = "disabled",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct OciRepositorySpec {
    pub interval: String,

    pub url: String,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<OciRepositoryRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct OciRepositoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LocalObjectReference {
    pub name: String,
}
