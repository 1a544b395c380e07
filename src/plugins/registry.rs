//! Plugin registry
//!
//! Holds resource generator plugins in registration order.

use std::sync::Arc;

use super::validator::PluginValidator;
use super::{PluginError, PluginResult, ResourceGenerator};

/// Plugin registry holds all registered generators
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ResourceGenerator>>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a plugin after validating its name
    pub fn register(&mut self, plugin: Arc<dyn ResourceGenerator>) -> PluginResult<()> {
        PluginValidator::validate_name(plugin.name())?;
        if self.contains(plugin.name()) {
            return Err(PluginError::Conflict(format!(
                "a plugin named '{}' is already registered",
                plugin.name()
            )));
        }
        tracing::debug!("Registered plugin {}", plugin.name());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceGenerator>> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// All plugins in registration order
    pub fn all(&self) -> &[Arc<dyn ResourceGenerator>] {
        &self.plugins
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Remove a plugin by name
    pub fn remove(&mut self, name: &str) -> PluginResult<Arc<dyn ResourceGenerator>> {
        let index = self
            .plugins
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        Ok(self.plugins.remove(index))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
