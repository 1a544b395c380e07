//! Cluster validation
//!
//! Validators are pure functions over the loaded model that return every
//! problem they find. [`validate_cluster`] runs them as stages and stops at
//! the first stage that reports anything; [`validate_all`] runs every stage
//! for reporting.

mod cross_references;
mod enablement;
mod graph;
mod requirements;

use std::collections::BTreeMap;

pub use cross_references::{
    validate_cross_references, validate_flux_names, validate_kustomization_overrides,
    validate_node_profiles, validate_source, validate_substitutions,
    validate_template_references, validate_unique_templates,
};
pub use enablement::validate_enablement_dependencies;
pub use graph::{DependencyGraph, validate_dependency_graph};
pub use requirements::{effective_node_labels, validate_requirements};

use crate::error::ValidationError;
use crate::models::{Cluster, NodeProfile, Template};

pub(crate) fn find_template<'a>(templates: &'a [Template], name: &str) -> Option<&'a Template> {
    templates.iter().find(|t| t.name() == name)
}

type Stage = fn(&Cluster, &[Template], &BTreeMap<String, NodeProfile>) -> Vec<ValidationError>;

fn enablement_stage(
    cluster: &Cluster,
    templates: &[Template],
    _profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    validate_enablement_dependencies(cluster, templates)
}

fn graph_stage(
    cluster: &Cluster,
    templates: &[Template],
    _profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    validate_dependency_graph(cluster, templates)
}

const STAGES: &[(&str, Stage)] = &[
    ("cross-reference", validate_cross_references),
    ("enablement", enablement_stage),
    ("dependency graph", graph_stage),
    ("requirements", validate_requirements),
];

/// Run the validation stages in order, returning the first non-empty error set
pub fn validate_cluster(
    cluster: &Cluster,
    templates: &[Template],
    profiles: &BTreeMap<String, NodeProfile>,
) -> Result<(), Vec<ValidationError>> {
    for (stage, validate) in STAGES {
        let errors = validate(cluster, templates, profiles);
        if !errors.is_empty() {
            tracing::warn!(
                "{} validation failed for cluster {} with {} error(s)",
                stage,
                cluster.name(),
                errors.len()
            );
            return Err(errors);
        }
        tracing::debug!("{} validation passed for cluster {}", stage, cluster.name());
    }
    Ok(())
}

/// Run every stage and collect all errors
pub fn validate_all(
    cluster: &Cluster,
    templates: &[Template],
    profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    STAGES
        .iter()
        .flat_map(|(_, validate)| validate(cluster, templates, profiles))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use crate::models::{Kustomization, TemplateConfig};

    fn fixture() -> (Cluster, Vec<Template>) {
        let mut api = Kustomization::new("api", "./api");
        api.depends_on = vec!["database/postgres".to_string()];
        let app = Template::new("app", vec![api]);

        let mut cluster = Cluster::new("prod");
        cluster.spec.templates = vec![TemplateConfig::new("app"), TemplateConfig::new("ghost")];
        (cluster, vec![app])
    }

    #[test]
    fn test_validate_cluster_fails_fast() {
        let (cluster, templates) = fixture();
        let errors = validate_cluster(&cluster, &templates, &BTreeMap::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingTemplate);
    }

    #[test]
    fn test_validate_all_reports_every_stage() {
        let (cluster, templates) = fixture();
        let kinds: Vec<_> = validate_all(&cluster, &templates, &BTreeMap::new())
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::MissingTemplate,
                ValidationErrorKind::MissingDependency
            ]
        );
    }

    #[test]
    fn test_valid_cluster_passes() {
        let mut cluster = Cluster::new("prod");
        cluster.spec.templates = vec![TemplateConfig::new("app")];
        let templates = vec![Template::new("app", vec![Kustomization::new("api", "./api")])];
        assert!(validate_cluster(&cluster, &templates, &BTreeMap::new()).is_ok());
    }
}
