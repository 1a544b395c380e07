//! Cross-reference validation
//!
//! Checks that everything a cluster names actually exists. Each check is
//! independent and every problem is reported, so one run shows the user the
//! whole list.

use std::collections::{BTreeMap, BTreeSet};

use super::find_template;
use crate::cascade::merge_template_values;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::flux::generate_flux_name;
use crate::models::{Cluster, NodeProfile, Template};
use crate::references::NodeId;

/// Every listed template must be loaded
pub fn validate_template_references(cluster: &Cluster, templates: &[Template]) -> Vec<ValidationError> {
    cluster
        .spec
        .templates
        .iter()
        .filter(|config| find_template(templates, &config.name).is_none())
        .map(|config| {
            ValidationError::new(
                ValidationErrorKind::MissingTemplate,
                cluster.name(),
                format!("Template '{}' referenced by the cluster was not found", config.name),
            )
        })
        .collect()
}

/// A template may be listed at most once
pub fn validate_unique_templates(cluster: &Cluster) -> Vec<ValidationError> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();

    cluster
        .spec
        .templates
        .iter()
        .filter(|config| {
            !seen.insert(config.name.as_str()) && reported.insert(config.name.as_str())
        })
        .map(|config| {
            ValidationError::new(
                ValidationErrorKind::DuplicateTemplate,
                cluster.name(),
                format!("Template '{}' is listed more than once", config.name),
            )
        })
        .collect()
}

/// Generated Flux names must not collide across listed templates
///
/// `a-b`/`c` and `a`/`b-c` both become `a-b-c`. Templates listed twice are
/// reported by [`validate_unique_templates`] and only checked once here.
pub fn validate_flux_names(cluster: &Cluster, templates: &[Template]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut listed = BTreeSet::new();
    let mut seen: BTreeMap<String, NodeId> = BTreeMap::new();

    for config in &cluster.spec.templates {
        if !listed.insert(config.name.as_str()) {
            continue;
        }
        let Some(template) = find_template(templates, &config.name) else {
            continue;
        };
        for kustomization in &template.spec.kustomizations {
            let node = NodeId::new(template.name(), kustomization.name.as_str());
            let name = generate_flux_name(template.name(), &kustomization.name);
            match seen.get(&name) {
                Some(first) => errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateName,
                    cluster.name(),
                    format!(
                        "Flux resource name '{}' is generated by both {} and {}",
                        name, first, node
                    ),
                )),
                None => {
                    seen.insert(name, node);
                }
            }
        }
    }

    errors
}

/// Substitutions and versions without a default must receive a value
pub fn validate_substitutions(cluster: &Cluster, templates: &[Template]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for config in &cluster.spec.templates {
        let Some(template) = find_template(templates, &config.name) else {
            continue;
        };
        let values = merge_template_values(cluster, Some(config));

        for version in &template.spec.versions {
            if version.default.is_none() && !values.contains_key(&version.name) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingSubstitution,
                    cluster.name(),
                    format!(
                        "Version '{}' of template '{}' has no default and no value was provided",
                        version.name,
                        template.name()
                    ),
                ));
            }
        }

        for kustomization in &template.spec.kustomizations {
            for substitution in &kustomization.substitutions {
                if substitution.default_value().is_none()
                    && !values.contains_key(substitution.name())
                {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingSubstitution,
                        cluster.name(),
                        format!(
                            "Substitution '{}' in '{}/{}' has no default and no value was provided",
                            substitution.name(),
                            template.name(),
                            kustomization.name
                        ),
                    ));
                }
            }
        }
    }

    errors
}

/// Override keys must name kustomizations of the referenced template
pub fn validate_kustomization_overrides(
    cluster: &Cluster,
    templates: &[Template],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for config in &cluster.spec.templates {
        let Some(template) = find_template(templates, &config.name) else {
            continue;
        };
        for key in config.kustomizations.keys() {
            if template.kustomization(key).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidKustomizationOverride,
                    cluster.name(),
                    format!(
                        "Override for kustomization '{}' does not match any kustomization in template '{}'",
                        key,
                        template.name()
                    ),
                ));
            }
        }
    }

    errors
}

/// Node profile references must resolve
pub fn validate_node_profiles(
    cluster: &Cluster,
    profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    cluster
        .spec
        .nodes
        .iter()
        .filter_map(|node| {
            let profile = node.profile.as_ref()?;
            (!profiles.contains_key(profile)).then(|| {
                ValidationError::new(
                    ValidationErrorKind::MissingProfile,
                    cluster.name(),
                    format!(
                        "Node '{}' references profile '{}' which was not found",
                        node.name, profile
                    ),
                )
            })
        })
        .collect()
}

/// Exactly one of `spec.oci` and `spec.git` must be set
pub fn validate_source(cluster: &Cluster) -> Vec<ValidationError> {
    let message = match (&cluster.spec.oci, &cluster.spec.git) {
        (Some(_), Some(_)) => "Cluster sets both 'oci' and 'git'; exactly one source is allowed",
        (None, None) => "Cluster sets neither 'oci' nor 'git'; exactly one source is required",
        _ => return Vec::new(),
    };
    vec![ValidationError::new(
        ValidationErrorKind::InvalidSource,
        cluster.name(),
        message,
    )]
}

/// Run every cross-reference check and collect all errors
pub fn validate_cross_references(
    cluster: &Cluster,
    templates: &[Template],
    profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    let mut errors = validate_template_references(cluster, templates);
    errors.extend(validate_unique_templates(cluster));
    errors.extend(validate_flux_names(cluster, templates));
    errors.extend(validate_substitutions(cluster, templates));
    errors.extend(validate_kustomization_overrides(cluster, templates));
    errors.extend(validate_node_profiles(cluster, profiles));
    errors.extend(validate_source(cluster));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Kustomization, KustomizationOverride, Node, OciConfig, Substitution, TemplateConfig,
        VersionEntry,
    };

    fn template_with_substitution(default: Option<&str>) -> Template {
        let mut kustomization = Kustomization::new("api", "./api");
        kustomization.substitutions = vec![Substitution::generic("domain", default)];
        Template::new("app", vec![kustomization])
    }

    fn cluster_listing(names: &[&str]) -> Cluster {
        let mut cluster = Cluster::new("prod");
        cluster.spec.templates = names.iter().map(|n| TemplateConfig::new(*n)).collect();
        cluster
    }

    #[test]
    fn test_missing_template() {
        let cluster = cluster_listing(&["app", "redis", "kafka"]);
        let errors = validate_template_references(&cluster, &[template_with_substitution(Some("x"))]);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::MissingTemplate));
        assert!(errors[0].message.contains("redis"));
        assert!(errors[1].message.contains("kafka"));
    }

    #[test]
    fn test_template_listed_twice() {
        let cluster = cluster_listing(&["app", "redis", "app", "app"]);
        let errors = validate_unique_templates(&cluster);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateTemplate);
        assert!(errors[0].message.contains("'app'"));

        assert!(validate_unique_templates(&cluster_listing(&["app", "redis"])).is_empty());
    }

    #[test]
    fn test_colliding_flux_names() {
        let templates = [
            Template::new("a-b", vec![Kustomization::new("c", "./c")]),
            Template::new("a", vec![Kustomization::new("b-c", "./bc")]),
        ];
        let errors = validate_flux_names(&cluster_listing(&["a-b", "a"]), &templates);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateName);
        assert!(errors[0].message.contains("'a-b-c'"));
        assert!(errors[0].message.contains("a-b/c and a/b-c"));

        assert!(validate_flux_names(&cluster_listing(&["a-b"]), &templates).is_empty());
    }

    #[test]
    fn test_repeated_listing_is_not_a_name_collision() {
        let cluster = cluster_listing(&["app", "app"]);
        assert!(validate_flux_names(&cluster, &[template_with_substitution(Some("x"))]).is_empty());
    }

    #[test]
    fn test_missing_substitution() {
        let cluster = cluster_listing(&["app"]);
        let errors = validate_substitutions(&cluster, &[template_with_substitution(None)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingSubstitution);
        assert!(errors[0].message.contains("domain"));
        assert!(errors[0].message.contains("app/api"));
    }

    #[test]
    fn test_substitution_satisfied_by_any_layer() {
        let templates = [template_with_substitution(None)];

        let mut cluster = cluster_listing(&["app"]);
        cluster.spec.values.insert("domain".to_string(), "example.com".to_string());
        assert!(validate_substitutions(&cluster, &templates).is_empty());

        let mut cluster = cluster_listing(&["app"]);
        cluster.spec.templates[0]
            .values
            .insert("domain".to_string(), "example.com".to_string());
        assert!(validate_substitutions(&cluster, &templates).is_empty());

        let cluster = cluster_listing(&["app"]);
        assert!(validate_substitutions(&cluster, &[template_with_substitution(Some("d"))]).is_empty());
    }

    #[test]
    fn test_unlisted_template_substitutions_ignored() {
        let cluster = cluster_listing(&[]);
        assert!(validate_substitutions(&cluster, &[template_with_substitution(None)]).is_empty());
    }

    #[test]
    fn test_missing_version_value() {
        let mut template = template_with_substitution(Some("x"));
        template.spec.versions.push(VersionEntry {
            name: "app_version".to_string(),
            default: None,
            registry: None,
            constraint: None,
        });
        let cluster = cluster_listing(&["app"]);
        let errors = validate_substitutions(&cluster, &[template]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("app_version"));
    }

    #[test]
    fn test_invalid_kustomization_override() {
        let mut cluster = cluster_listing(&["app"]);
        cluster.spec.templates[0]
            .kustomizations
            .insert("api".to_string(), KustomizationOverride::default());
        cluster.spec.templates[0]
            .kustomizations
            .insert("worker".to_string(), KustomizationOverride::default());

        let errors =
            validate_kustomization_overrides(&cluster, &[template_with_substitution(Some("x"))]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidKustomizationOverride);
        assert!(errors[0].message.contains("worker"));
    }

    #[test]
    fn test_missing_profile() {
        let mut cluster = cluster_listing(&[]);
        cluster.spec.nodes = vec![
            Node {
                name: "node-1".to_string(),
                role: "controller".to_string(),
                profile: Some("storage".to_string()),
                labels: BTreeMap::new(),
            },
            Node {
                name: "node-2".to_string(),
                role: "worker".to_string(),
                profile: Some("gpu".to_string()),
                labels: BTreeMap::new(),
            },
            Node {
                name: "node-3".to_string(),
                role: "worker".to_string(),
                profile: None,
                labels: BTreeMap::new(),
            },
        ];
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "storage".to_string(),
            NodeProfile {
                name: "storage".to_string(),
                labels: BTreeMap::new(),
            },
        );

        let errors = validate_node_profiles(&cluster, &profiles);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingProfile);
        assert!(errors[0].message.contains("gpu"));
    }

    #[test]
    fn test_source_must_be_exclusive() {
        let mut cluster = cluster_listing(&[]);
        assert!(validate_source(&cluster).is_empty());

        cluster.spec.oci = Some(OciConfig::default());
        assert_eq!(validate_source(&cluster)[0].kind, ValidationErrorKind::InvalidSource);

        cluster.spec.oci = None;
        cluster.spec.git = None;
        assert_eq!(validate_source(&cluster).len(), 1);
    }

    #[test]
    fn test_cross_references_accumulate() {
        let mut cluster = cluster_listing(&["app", "missing"]);
        cluster.spec.templates[0]
            .kustomizations
            .insert("nope".to_string(), KustomizationOverride::default());

        let errors = validate_cross_references(
            &cluster,
            &[template_with_substitution(None)],
            &BTreeMap::new(),
        );
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::MissingTemplate,
                ValidationErrorKind::MissingSubstitution,
                ValidationErrorKind::InvalidKustomizationOverride,
            ]
        );
    }
}
