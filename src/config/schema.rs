//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::flux::{
    DEFAULT_FLUX_NAMESPACE, DEFAULT_INTERVAL, DEFAULT_SOURCE_REPOSITORY, DEFAULT_TEMPLATES_BASE_PATH,
    DEFAULT_TIMEOUT,
};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Namespace Flux runs in and generated Kustomizations are placed in
    #[serde(default = "default_flux_namespace")]
    pub flux_namespace: String,

    /// Name of the GitRepository/OCIRepository every Kustomization sources from
    #[serde(default = "default_source_repository_name")]
    pub source_repository_name: String,

    /// Directory templates live under inside the source artifact
    #[serde(default = "default_templates_base_path")]
    pub templates_base_path: String,

    /// Reconciliation interval
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Reconciliation timeout
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Labels applied to every generated Namespace
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_labels: BTreeMap<String, String>,
}

// Default value functions
fn default_flux_namespace() -> String {
    DEFAULT_FLUX_NAMESPACE.to_string()
}

fn default_source_repository_name() -> String {
    DEFAULT_SOURCE_REPOSITORY.to_string()
}

fn default_templates_base_path() -> String {
    DEFAULT_TEMPLATES_BASE_PATH.to_string()
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flux_namespace: default_flux_namespace(),
            source_repository_name: default_source_repository_name(),
            templates_base_path: default_templates_base_path(),
            interval: default_interval(),
            timeout: default_timeout(),
            namespace_labels: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_yaml::from_str("fluxNamespace: gitops\n").unwrap();
        assert_eq!(config.flux_namespace, "gitops");
        assert_eq!(config.source_repository_name, "flux-system");
        assert_eq!(config.templates_base_path, "./templates");
        assert_eq!(config.interval, "10m");
        assert!(config.namespace_labels.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut config = Config::default();
        config
            .namespace_labels
            .insert("team".to_string(), "platform".to_string());

        insta::assert_snapshot!(serde_yaml::to_string(&config).unwrap(), @r"
        fluxNamespace: flux-system
        sourceRepositoryName: flux-system
        templatesBasePath: ./templates
        interval: 10m
        timeout: 5m
        namespaceLabels:
          team: platform
        ");
    }
}
