//! Generator settings and per-run options

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cascade::ResolvedDefaults;
use crate::config::Config;
use crate::flux::{
    DEFAULT_FLUX_NAMESPACE, DEFAULT_INTERVAL, DEFAULT_SOURCE_REPOSITORY, DEFAULT_TIMEOUT,
    DEFAULT_TEMPLATES_BASE_PATH,
};
use crate::models::{NodeProfile, Project};

/// Settings a generator is constructed with
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Namespace generated Flux objects are placed in unless project or
    /// cluster defaults say otherwise
    pub flux_namespace: String,
    pub source_repository_name: String,
    pub templates_base_path: String,
    pub interval: String,
    pub timeout: String,
    /// Labels added to every generated `Namespace`
    pub namespace_labels: BTreeMap<String, String>,
}

impl GeneratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            flux_namespace: config.flux_namespace.clone(),
            source_repository_name: config.source_repository_name.clone(),
            templates_base_path: config.templates_base_path.clone(),
            interval: config.interval.clone(),
            timeout: config.timeout.clone(),
            namespace_labels: config.namespace_labels.clone(),
        }
    }

    /// Base layer of the defaults cascade
    pub fn defaults(&self) -> ResolvedDefaults {
        ResolvedDefaults {
            flux_namespace: self.flux_namespace.clone(),
            interval: self.interval.clone(),
            timeout: self.timeout.clone(),
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            flux_namespace: DEFAULT_FLUX_NAMESPACE.to_string(),
            source_repository_name: DEFAULT_SOURCE_REPOSITORY.to_string(),
            templates_base_path: DEFAULT_TEMPLATES_BASE_PATH.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            timeout: DEFAULT_TIMEOUT.to_string(),
            namespace_labels: BTreeMap::new(),
        }
    }
}

/// Options for one `generate` call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub skip_validation: bool,
    pub project: Option<Project>,
    /// Node profiles by name
    pub profiles: BTreeMap<String, NodeProfile>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            skip_validation: false,
            project: None,
            profiles: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            flux_namespace: "gitops".to_string(),
            interval: "1m".to_string(),
            ..Default::default()
        };
        let settings = GeneratorSettings::from_config(&config);
        assert_eq!(settings.flux_namespace, "gitops");
        assert_eq!(settings.source_repository_name, "flux-system");

        let defaults = settings.defaults();
        assert_eq!(defaults.flux_namespace, "gitops");
        assert_eq!(defaults.interval, "1m");
        assert_eq!(defaults.timeout, "5m");
    }

    #[test]
    fn test_default_settings_match_builtin_defaults() {
        assert_eq!(GeneratorSettings::default().defaults(), ResolvedDefaults::builtin());
        assert_eq!(
            GeneratorSettings::from_config(&Config::default()),
            GeneratorSettings::default()
        );
    }
}
