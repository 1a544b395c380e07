//! Configuration system for kustodian
//!
//! Built-in defaults, an optional YAML file in the config directory, and
//! environment overrides, merged in that order.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "fluxNamespace" => Ok(config.flux_namespace.clone()),
        "sourceRepositoryName" => Ok(config.source_repository_name.clone()),
        "templatesBasePath" => Ok(config.templates_base_path.clone()),
        "interval" => Ok(config.interval.clone()),
        "timeout" => Ok(config.timeout.clone()),
        "namespaceLabels" => serde_yaml::to_string(&config.namespace_labels)
            .map_err(|e| anyhow::anyhow!("Failed to serialize namespaceLabels: {}", e)),
        _ => match key.strip_prefix("namespaceLabels.") {
            Some(label) => config
                .namespace_labels
                .get(label)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Namespace label not set: {}", label)),
            None => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
        },
    }
}

/// Set a configuration value by key (dot notation)
///
/// `namespaceLabels.<label>` sets one label; an empty value removes it.
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "fluxNamespace" => {
            config.flux_namespace = value.to_string();
        }
        "sourceRepositoryName" => {
            config.source_repository_name = value.to_string();
        }
        "templatesBasePath" => {
            config.templates_base_path = value.to_string();
        }
        "interval" => {
            config.interval = value.to_string();
        }
        "timeout" => {
            config.timeout = value.to_string();
        }
        "namespaceLabels" => {
            config.namespace_labels = serde_yaml::from_str(value)
                .context("namespaceLabels must be a YAML map (e.g., '{team: platform}')")?;
        }
        _ => {
            let Some(label) = key.strip_prefix("namespaceLabels.") else {
                return Err(anyhow::anyhow!("Unknown configuration key: {}", key));
            };
            if label.is_empty() {
                return Err(anyhow::anyhow!("Namespace label name cannot be empty"));
            }
            if value.is_empty() {
                config.namespace_labels.remove(label);
            } else {
                config
                    .namespace_labels
                    .insert(label.to_string(), value.to_string());
            }
        }
    }

    Ok(())
}
