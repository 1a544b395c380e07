//! Dependency graph validation
//!
//! Builds a directed graph over every kustomization of every enabled template
//! and reports dangling edges and cycles. Edges into disabled templates are
//! the enablement validator's concern and are skipped here.

use std::collections::BTreeMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::find_template;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::{Cluster, Template};
use crate::references::{NodeId, parse_dependency_ref};

/// Kustomization dependency graph of a cluster's enabled templates
pub struct DependencyGraph {
    graph: DiGraph<NodeId, ()>,
    indices: BTreeMap<NodeId, NodeIndex>,
    unknown: Vec<(NodeId, NodeId)>,
}

impl DependencyGraph {
    pub fn build(cluster: &Cluster, templates: &[Template]) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = BTreeMap::new();

        let enabled: Vec<&Template> = cluster
            .spec
            .templates
            .iter()
            .filter_map(|config| find_template(templates, &config.name))
            .collect();

        for template in &enabled {
            for kustomization in &template.spec.kustomizations {
                let node = NodeId::new(template.name(), kustomization.name.as_str());
                indices
                    .entry(node.clone())
                    .or_insert_with(|| graph.add_node(node));
            }
        }

        let mut unknown = Vec::new();
        for template in &enabled {
            for kustomization in &template.spec.kustomizations {
                let source = NodeId::new(template.name(), kustomization.name.as_str());
                let source_index = indices[&source];

                for raw in &kustomization.depends_on {
                    // Malformed references are reported by the enablement check
                    let Ok(reference) = parse_dependency_ref(raw) else {
                        continue;
                    };
                    let target = reference.resolve(template.name());
                    if !cluster.is_template_enabled(&target.template) {
                        continue;
                    }
                    match indices.get(&target) {
                        Some(&target_index) => {
                            graph.update_edge(source_index, target_index, ());
                        }
                        None => unknown.push((source.clone(), target)),
                    }
                }
            }
        }

        Self {
            graph,
            indices,
            unknown,
        }
    }

    pub fn node_count(&self) -> usize {
        self.indices.len()
    }

    /// Edges whose target kustomization does not exist
    pub fn unknown_dependencies(&self) -> &[(NodeId, NodeId)] {
        &self.unknown
    }

    /// Strongly connected components that form cycles, members sorted
    ///
    /// A single node only counts when it depends on itself.
    pub fn cycles(&self) -> Vec<Vec<NodeId>> {
        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut members: Vec<NodeId> = component
                    .into_iter()
                    .map(|index| self.graph[index].clone())
                    .collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }
}

pub fn validate_dependency_graph(cluster: &Cluster, templates: &[Template]) -> Vec<ValidationError> {
    let graph = DependencyGraph::build(cluster, templates);
    tracing::debug!(
        "Built dependency graph with {} nodes for cluster {}",
        graph.node_count(),
        cluster.name()
    );

    let mut errors: Vec<ValidationError> = graph
        .unknown_dependencies()
        .iter()
        .map(|(source, target)| {
            ValidationError::new(
                ValidationErrorKind::UnknownDependency,
                cluster.name(),
                format!(
                    "Kustomization '{}' depends on '{}', but template '{}' has no kustomization named '{}'",
                    source, target, target.template, target.kustomization
                ),
            )
        })
        .collect();

    for cycle in graph.cycles() {
        let members: Vec<String> = cycle.iter().map(ToString::to_string).collect();
        errors.push(ValidationError::new(
            ValidationErrorKind::DependencyCycle,
            cluster.name(),
            format!("Dependency cycle detected between: {}", members.join(", ")),
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Kustomization, TemplateConfig};

    fn kustomization(name: &str, depends_on: &[&str]) -> Kustomization {
        let mut k = Kustomization::new(name, format!("./{}", name));
        k.depends_on = depends_on.iter().map(|d| d.to_string()).collect();
        k
    }

    fn cluster_listing(names: &[&str]) -> Cluster {
        let mut cluster = Cluster::new("prod");
        cluster.spec.templates = names.iter().map(|n| TemplateConfig::new(*n)).collect();
        cluster
    }

    #[test]
    fn test_acyclic_graph_is_valid() {
        let app = Template::new(
            "app",
            vec![
                kustomization("database", &[]),
                kustomization("api", &["database", "infra/network"]),
            ],
        );
        let infra = Template::new("infra", vec![kustomization("network", &[])]);
        let cluster = cluster_listing(&["app", "infra"]);

        let graph = DependencyGraph::build(&cluster, &[app.clone(), infra.clone()]);
        assert_eq!(graph.node_count(), 3);
        assert!(graph.cycles().is_empty());
        assert!(validate_dependency_graph(&cluster, &[app, infra]).is_empty());
    }

    #[test]
    fn test_unknown_dependency() {
        let app = Template::new("app", vec![kustomization("api", &["cache"])]);
        let cluster = cluster_listing(&["app"]);

        let errors = validate_dependency_graph(&cluster, &[app]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownDependency);
        assert!(errors[0].message.contains("'app/cache'"));
    }

    #[test]
    fn test_disabled_targets_are_skipped() {
        let app = Template::new("app", vec![kustomization("api", &["database/postgres"])]);
        let cluster = cluster_listing(&["app"]);
        assert!(validate_dependency_graph(&cluster, &[app]).is_empty());
    }

    #[test]
    fn test_cross_template_cycle() {
        let a = Template::new("a", vec![kustomization("one", &["b/two"])]);
        let b = Template::new("b", vec![kustomization("two", &["a/one"])]);
        let cluster = cluster_listing(&["b", "a"]);

        let errors = validate_dependency_graph(&cluster, &[a, b]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DependencyCycle);
        assert_eq!(
            errors[0].message,
            "Dependency cycle detected between: a/one, b/two"
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let app = Template::new("app", vec![kustomization("api", &["api"])]);
        let cluster = cluster_listing(&["app"]);

        let errors = validate_dependency_graph(&cluster, &[app]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DependencyCycle);
        assert!(errors[0].message.contains("app/api"));
    }

    #[test]
    fn test_one_error_per_cycle() {
        let app = Template::new(
            "app",
            vec![
                kustomization("a", &["b"]),
                kustomization("b", &["a"]),
                kustomization("c", &["d"]),
                kustomization("d", &["c"]),
                kustomization("e", &["a"]),
            ],
        );
        let cluster = cluster_listing(&["app"]);

        let graph = DependencyGraph::build(&cluster, std::slice::from_ref(&app));
        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(
            cycles[0],
            vec![NodeId::new("app", "a"), NodeId::new("app", "b")]
        );
        assert_eq!(
            cycles[1],
            vec![NodeId::new("app", "c"), NodeId::new("app", "d")]
        );
    }
}
