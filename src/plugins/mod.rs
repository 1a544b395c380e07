// Resource generator plugins for kustodian
//
// Plugins contribute extra Kubernetes objects for every enabled template of a
// cluster, next to the Flux Kustomizations the core generator emits.

pub mod registry;
pub mod validator;

pub use registry::PluginRegistry;
pub use validator::PluginValidator;

use anyhow::Result;
use async_trait::async_trait;
use kube::core::DynamicObject;
use serde::Serialize;

use crate::models::{Cluster, ResolvedTemplate};

/// Plugin errors
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Invalid plugin name: {0}")]
    InvalidName(String),

    #[error("Plugin conflict: {0}")]
    Conflict(String),

    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Invalid resource from plugin '{plugin}': {reason}")]
    InvalidResource { plugin: String, reason: String },
}

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// What a plugin sees for one template
#[derive(Debug, Clone, Copy)]
pub struct PluginContext<'a> {
    pub cluster: &'a Cluster,
    pub template: &'a ResolvedTemplate,
}

/// An object produced by a plugin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedResource {
    pub plugin: String,
    pub template: String,
    pub object: DynamicObject,
}

/// Resource generator plugin
#[async_trait]
pub trait ResourceGenerator: Send + Sync {
    /// Registry name; alphanumeric with `-` and `_`
    fn name(&self) -> &str;

    /// Generate objects for one enabled template
    async fn generate(&self, context: PluginContext<'_>) -> Result<Vec<DynamicObject>>;
}
