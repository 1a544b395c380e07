//! Plugin validation
//!
//! Checks plugin names at registration and the objects plugins return.

use kube::core::DynamicObject;

use super::{PluginError, PluginResult};

/// Plugin validator
pub struct PluginValidator;

impl PluginValidator {
    /// Validate plugin name
    pub fn validate_name(name: &str) -> PluginResult<()> {
        if name.is_empty() {
            return Err(PluginError::InvalidName(
                "Plugin name cannot be empty".to_string(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PluginError::InvalidName(format!(
                "Plugin name '{}' contains invalid characters. Use only alphanumeric, hyphens, and underscores",
                name
            )));
        }

        Ok(())
    }

    /// Validate an object returned by a plugin
    ///
    /// Objects need `apiVersion`, `kind` and `metadata.name` to be written out.
    pub fn validate_resource(plugin: &str, object: &DynamicObject) -> PluginResult<()> {
        let invalid = |reason: &str| PluginError::InvalidResource {
            plugin: plugin.to_string(),
            reason: reason.to_string(),
        };

        let types = object
            .types
            .as_ref()
            .ok_or_else(|| invalid("object has no apiVersion/kind"))?;
        if types.api_version.is_empty() {
            return Err(invalid("object has an empty apiVersion"));
        }
        if types.kind.is_empty() {
            return Err(invalid("object has an empty kind"));
        }
        if object.metadata.name.as_deref().unwrap_or_default().is_empty() {
            return Err(invalid(&format!("{} has no metadata.name", types.kind)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::{ApiResource, GroupVersionKind};

    fn config_map(name: &str) -> DynamicObject {
        let resource = ApiResource::from_gvk(&GroupVersionKind::gvk("", "v1", "ConfigMap"));
        DynamicObject::new(name, &resource)
    }

    #[test]
    fn test_validate_name() {
        assert!(PluginValidator::validate_name("secret-sync").is_ok());
        assert!(PluginValidator::validate_name("network_policies2").is_ok());
        assert!(matches!(
            PluginValidator::validate_name(""),
            Err(PluginError::InvalidName(_))
        ));

        let err = PluginValidator::validate_name("bad name!").unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn test_validate_resource() {
        assert!(PluginValidator::validate_resource("p", &config_map("settings")).is_ok());

        let unnamed = config_map("");
        let err = PluginValidator::validate_resource("p", &unnamed).unwrap_err();
        assert!(err.to_string().contains("ConfigMap has no metadata.name"));

        let mut untyped = config_map("settings");
        untyped.types = None;
        assert!(PluginValidator::validate_resource("p", &untyped).is_err());
    }
}
