//! Template requirement checks against the cluster's nodes

use std::collections::BTreeMap;

use super::find_template;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::{Cluster, Node, NodeProfile, Requirement, Template};

/// Profile labels overlaid with the node's own labels
pub fn effective_node_labels(
    node: &Node,
    profiles: &BTreeMap<String, NodeProfile>,
) -> BTreeMap<String, String> {
    let mut labels = node
        .profile
        .as_ref()
        .and_then(|name| profiles.get(name))
        .map(|profile| profile.labels.clone())
        .unwrap_or_default();
    labels.extend(node.labels.clone());
    labels
}

fn count_matching_nodes(
    cluster: &Cluster,
    profiles: &BTreeMap<String, NodeProfile>,
    label: &str,
    value: Option<&str>,
) -> usize {
    cluster
        .spec
        .nodes
        .iter()
        .filter(|node| {
            let labels = effective_node_labels(node, profiles);
            match (labels.get(label), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
        .count()
}

pub fn validate_requirements(
    cluster: &Cluster,
    templates: &[Template],
    profiles: &BTreeMap<String, NodeProfile>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for config in &cluster.spec.templates {
        let Some(template) = find_template(templates, &config.name) else {
            continue;
        };

        for requirement in &template.spec.requirements {
            match requirement {
                Requirement::NodeCount {
                    node_label,
                    node_label_value,
                    min_nodes,
                } => {
                    let found = count_matching_nodes(
                        cluster,
                        profiles,
                        node_label,
                        node_label_value.as_deref(),
                    );
                    if found < *min_nodes {
                        let selector = match node_label_value {
                            Some(value) => format!("{}={}", node_label, value),
                            None => node_label.clone(),
                        };
                        errors.push(ValidationError::new(
                            ValidationErrorKind::RequirementNotMet,
                            cluster.name(),
                            format!(
                                "Template '{}' requires at least {} node(s) labeled '{}', found {}",
                                template.name(),
                                min_nodes,
                                selector,
                                found
                            ),
                        ));
                    }
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Kustomization, TemplateConfig};

    fn node(name: &str, profile: Option<&str>, labels: &[(&str, &str)]) -> Node {
        Node {
            name: name.to_string(),
            role: "worker".to_string(),
            profile: profile.map(str::to_string),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn storage_template(value: Option<&str>, min_nodes: usize) -> Template {
        let mut template = Template::new("ceph", vec![Kustomization::new("operator", "./operator")]);
        template.spec.requirements.push(Requirement::NodeCount {
            node_label: "storage".to_string(),
            node_label_value: value.map(str::to_string),
            min_nodes,
        });
        template
    }

    fn profiles() -> BTreeMap<String, NodeProfile> {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "storage".to_string(),
            NodeProfile {
                name: "storage".to_string(),
                labels: [("storage".to_string(), "ssd".to_string())].into(),
            },
        );
        profiles
    }

    #[test]
    fn test_effective_labels_prefer_node_labels() {
        let n = node("n1", Some("storage"), &[("storage", "hdd")]);
        let labels = effective_node_labels(&n, &profiles());
        assert_eq!(labels["storage"], "hdd");
    }

    #[test]
    fn test_requirement_met_through_profiles() {
        let mut cluster = Cluster::new("prod");
        cluster.spec.templates.push(TemplateConfig::new("ceph"));
        cluster.spec.nodes = vec![
            node("n1", Some("storage"), &[]),
            node("n2", Some("storage"), &[]),
            node("n3", None, &[("storage", "ssd")]),
        ];

        let errors = validate_requirements(&cluster, &[storage_template(Some("ssd"), 3)], &profiles());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_requirement_not_met() {
        let mut cluster = Cluster::new("prod");
        cluster.spec.templates.push(TemplateConfig::new("ceph"));
        cluster.spec.nodes = vec![
            node("n1", Some("storage"), &[]),
            node("n2", Some("storage"), &[("storage", "hdd")]),
            node("n3", None, &[]),
        ];

        let errors = validate_requirements(&cluster, &[storage_template(Some("ssd"), 2)], &profiles());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::RequirementNotMet);
        assert_eq!(
            errors[0].message,
            "Template 'ceph' requires at least 2 node(s) labeled 'storage=ssd', found 1"
        );

        // Presence alone satisfies a label without a value
        assert!(
            validate_requirements(&cluster, &[storage_template(None, 2)], &profiles()).is_empty()
        );
    }

    #[test]
    fn test_disabled_template_requirements_ignored() {
        let cluster = Cluster::new("prod");
        assert!(validate_requirements(&cluster, &[storage_template(None, 5)], &profiles()).is_empty());
    }
}
