//! Enablement dependency validation
//!
//! Every `depends_on` edge of an enabled template must point into a template
//! that is also enabled. Templates the cluster does not list are never
//! inspected.

use super::find_template;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::{Cluster, Template};
use crate::references::{NodeId, parse_dependency_ref};

pub fn validate_enablement_dependencies(
    cluster: &Cluster,
    templates: &[Template],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for config in &cluster.spec.templates {
        let Some(template) = find_template(templates, &config.name) else {
            continue;
        };

        for kustomization in &template.spec.kustomizations {
            let source = NodeId::new(template.name(), kustomization.name.as_str());

            for raw in &kustomization.depends_on {
                let target = match parse_dependency_ref(raw) {
                    Ok(reference) => reference.resolve(template.name()),
                    Err(err) => {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::InvalidReference,
                            cluster.name(),
                            format!("Kustomization '{}': {}", source, err),
                        ));
                        continue;
                    }
                };

                if !cluster.is_template_enabled(&target.template) {
                    tracing::debug!("{} depends on disabled template {}", source, target.template);
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingDependency,
                        cluster.name(),
                        format!(
                            "Kustomization '{}' depends on '{}', but template '{}' is not enabled for this cluster. Enable the target or remove the dependency.",
                            source, target, target.template
                        ),
                    ));
                }
            }
        }
    }

    errors
}
