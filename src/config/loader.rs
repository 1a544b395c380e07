//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `fluxNamespace`
pub const FLUX_NAMESPACE_ENV: &str = "KUSTODIAN_FLUX_NAMESPACE";
/// Environment variable overriding `sourceRepositoryName`
pub const SOURCE_REPOSITORY_ENV: &str = "KUSTODIAN_SOURCE_REPOSITORY";
/// Environment variable overriding `templatesBasePath`
pub const TEMPLATES_BASE_PATH_ENV: &str = "KUSTODIAN_TEMPLATES_BASE_PATH";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Load configuration using `path` as the config file
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: &Path) -> Result<Config> {
        let config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::load_defaults()
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    pub fn validate(path: &Path) -> Result<()> {
        let config = Self::load_from(path).context("Failed to load configuration")?;

        for (key, value) in [
            ("fluxNamespace", &config.flux_namespace),
            ("sourceRepositoryName", &config.source_repository_name),
            ("interval", &config.interval),
            ("timeout", &config.timeout),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("{} cannot be empty", key));
            }
        }

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(namespace) = std::env::var(FLUX_NAMESPACE_ENV) {
            config.flux_namespace = namespace;
        }

        if let Ok(repository) = std::env::var(SOURCE_REPOSITORY_ENV) {
            config.source_repository_name = repository;
        }

        if let Ok(base_path) = std::env::var(TEMPLATES_BASE_PATH_ENV) {
            config.templates_base_path = base_path;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
