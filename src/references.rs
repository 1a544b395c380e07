//! Dependency reference parsing
//!
//! A `depends_on` entry is either `kustomization` (same template) or
//! `template/kustomization` (cross-template). Once resolved against the owning
//! template it becomes a [`NodeId`], the canonical `template/kustomization`
//! string identifying a node of the dependency graph.

use std::fmt;

use crate::error::InvalidReference;

/// Parsed form of a `depends_on` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRef {
    /// Target template; `None` means the referencing template
    pub template: Option<String>,
    pub kustomization: String,
}

impl DependencyRef {
    pub fn within(kustomization: impl Into<String>) -> Self {
        Self {
            template: None,
            kustomization: kustomization.into(),
        }
    }

    pub fn cross(template: impl Into<String>, kustomization: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            kustomization: kustomization.into(),
        }
    }

    pub fn is_cross_template(&self) -> bool {
        self.template.is_some()
    }

    /// Resolve against the template that declared the reference
    pub fn resolve(&self, current_template: &str) -> NodeId {
        NodeId::new(
            self.template.as_deref().unwrap_or(current_template),
            self.kustomization.as_str(),
        )
    }
}

/// Canonical dependency graph node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub template: String,
    pub kustomization: String,
}

impl NodeId {
    pub fn new(template: impl Into<String>, kustomization: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            kustomization: kustomization.into(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.template, self.kustomization)
    }
}

/// Parse a raw dependency reference
pub fn parse_dependency_ref(reference: &str) -> Result<DependencyRef, InvalidReference> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(InvalidReference::new(reference, "reference is empty"));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    match segments.as_slice() {
        [kustomization] => Ok(DependencyRef::within(*kustomization)),
        [template, kustomization] => {
            if template.is_empty() || kustomization.is_empty() {
                return Err(InvalidReference::new(
                    reference,
                    "expected 'template/kustomization' with both parts non-empty",
                ));
            }
            Ok(DependencyRef::cross(*template, *kustomization))
        }
        _ => Err(InvalidReference::new(
            reference,
            "expected 'kustomization' or 'template/kustomization'",
        )),
    }
}

/// Parse a reference and resolve it against the declaring template
pub fn resolve_dependency_ref(
    reference: &str,
    current_template: &str,
) -> Result<NodeId, InvalidReference> {
    Ok(parse_dependency_ref(reference)?.resolve(current_template))
}

/// Build the canonical `template/kustomization` string
pub fn create_node_id(template: &str, kustomization: &str) -> String {
    format!("{}/{}", template, kustomization)
}

/// Split a node id on its first `/`. Without a `/` the template is empty.
pub fn parse_node_id(node_id: &str) -> NodeId {
    match node_id.split_once('/') {
        Some((template, kustomization)) => NodeId::new(template, kustomization),
        None => NodeId::new("", node_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_within_template() {
        assert_eq!(
            parse_dependency_ref("api").unwrap(),
            DependencyRef::within("api")
        );
    }

    #[test]
    fn test_parse_cross_template() {
        let parsed = parse_dependency_ref("secrets/vault").unwrap();
        assert!(parsed.is_cross_template());
        assert_eq!(parsed, DependencyRef::cross("secrets", "vault"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            parse_dependency_ref("  db/postgres \n").unwrap(),
            DependencyRef::cross("db", "postgres")
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "a/b/c", "/vault", "secrets/", "/"] {
            let err = parse_dependency_ref(bad).unwrap_err();
            assert_eq!(err.reference, bad);
        }
    }

    #[test]
    fn test_resolve_defaults_template() {
        assert_eq!(
            resolve_dependency_ref("database", "app").unwrap().to_string(),
            "app/database"
        );
        assert_eq!(
            resolve_dependency_ref("db/postgres", "app").unwrap().to_string(),
            "db/postgres"
        );
    }

    #[test]
    fn test_node_id_round_trip() {
        let id = create_node_id("nginx", "deployment");
        assert_eq!(id, "nginx/deployment");
        assert_eq!(parse_node_id(&id), NodeId::new("nginx", "deployment"));
    }

    #[test]
    fn test_parse_node_id_without_separator() {
        assert_eq!(parse_node_id("standalone"), NodeId::new("", "standalone"));
    }

    #[test]
    fn test_parse_node_id_splits_on_first_separator() {
        assert_eq!(parse_node_id("a/b/c"), NodeId::new("a", "b/c"));
    }
}
