//! Namespace collection
//!
//! Gathers the namespaces enabled kustomizations deploy into and turns the
//! non-system ones into `Namespace` objects.

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::ResolvedTemplate;

/// Namespaces that always exist and are never generated
const SYSTEM_NAMESPACES: &[&str] = &["default", "kube-system", "kube-public", "kube-node-lease"];

/// Whether `namespace` is managed by Kubernetes or Flux itself
pub fn is_system_namespace(namespace: &str, flux_namespace: &str) -> bool {
    namespace == flux_namespace
        || SYSTEM_NAMESPACES.contains(&namespace)
        || namespace.starts_with("kube-")
}

/// Sorted, deduplicated default namespaces of every enabled template
pub fn collect_namespaces(resolved_templates: &[ResolvedTemplate]) -> Vec<String> {
    let namespaces: BTreeSet<String> = resolved_templates
        .iter()
        .filter(|resolved| resolved.enabled)
        .flat_map(|resolved| resolved.template.spec.kustomizations.iter())
        .filter_map(|kustomization| kustomization.namespace.as_ref())
        .filter(|namespace| namespace.create)
        .map(|namespace| namespace.default.clone())
        .collect();

    namespaces.into_iter().collect()
}

/// `Namespace` objects for every non-system namespace
pub fn generate_namespace_resources(
    namespaces: &[String],
    flux_namespace: &str,
    labels: Option<&BTreeMap<String, String>>,
) -> Vec<Namespace> {
    namespaces
        .iter()
        .filter(|name| !is_system_namespace(name, flux_namespace))
        .map(|name| Namespace {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                labels: labels.filter(|l| !l.is_empty()).cloned(),
                ..Default::default()
            },
            ..Default::default()
        })
        .collect()
}
