//! Preservation policy engine
//!
//! Decides which resource kinds survive when a kustomization is disabled and
//! emits the patches that label them. Flux is configured elsewhere to skip
//! pruning anything carrying [`PRESERVE_LABEL`].

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{PreservationMode, PreservationPolicy};

/// Label marking a resource as exempt from pruning
pub const PRESERVE_LABEL: &str = "kustodian.io/preserve";

/// Kinds kept by the `stateful` mode
pub const STATEFUL_RESOURCE_TYPES: &[&str] = &["PersistentVolumeClaim", "Secret", "ConfigMap"];

/// A Kustomize patch targeting every resource of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservationPatch {
    /// JSON6902 patch document
    pub patch: String,
    pub target: PatchTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTarget {
    pub kind: String,
}

/// Resource kinds protected by `policy`
pub fn get_preserved_resource_types(policy: &PreservationPolicy) -> Vec<String> {
    match policy.mode {
        PreservationMode::None => Vec::new(),
        PreservationMode::Stateful => STATEFUL_RESOURCE_TYPES
            .iter()
            .map(|kind| kind.to_string())
            .collect(),
        PreservationMode::Custom => policy.keep_resources.clone().unwrap_or_default(),
    }
}

/// One label patch per resource kind
pub fn generate_preservation_patches(resource_types: &[String]) -> Vec<PreservationPatch> {
    // `/` in the label key is escaped as `~1` per RFC 6901
    let path = format!("/metadata/labels/{}", PRESERVE_LABEL.replace('/', "~1"));
    let patch = json!([{ "op": "add", "path": path, "value": "true" }]).to_string();

    resource_types
        .iter()
        .map(|kind| PreservationPatch {
            patch: patch.clone(),
            target: PatchTarget { kind: kind.clone() },
        })
        .collect()
}

/// Whether resources of `kind` are protected by `policy`
pub fn should_preserve_resource(kind: &str, policy: &PreservationPolicy) -> bool {
    get_preserved_resource_types(policy)
        .iter()
        .any(|preserved| preserved == kind)
}
