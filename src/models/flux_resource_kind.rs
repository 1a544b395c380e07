//! Flux source kinds a generated Kustomization can reconcile from

use serde::Serialize;
use std::fmt;

use super::Cluster;

/// Kind written to `spec.sourceRef.kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FluxResourceKind {
    #[default]
    GitRepository,
    OCIRepository,
}

impl FluxResourceKind {
    /// Source kind for a cluster: OCI artifacts when `spec.oci` is set, git otherwise
    pub fn for_cluster(cluster: &Cluster) -> Self {
        if cluster.is_oci_mode() {
            FluxResourceKind::OCIRepository
        } else {
            FluxResourceKind::GitRepository
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FluxResourceKind::GitRepository => "GitRepository",
            FluxResourceKind::OCIRepository => "OCIRepository",
        }
    }
}

impl fmt::Display for FluxResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OciConfig;

    #[test]
    fn test_kind_names() {
        assert_eq!(FluxResourceKind::GitRepository.to_string(), "GitRepository");
        assert_eq!(FluxResourceKind::OCIRepository.as_str(), "OCIRepository");
        assert_eq!(FluxResourceKind::default(), FluxResourceKind::GitRepository);
    }

    #[test]
    fn test_for_cluster() {
        let mut cluster = Cluster::new("prod");
        assert_eq!(
            FluxResourceKind::for_cluster(&cluster),
            FluxResourceKind::GitRepository
        );

        cluster.spec.git = None;
        cluster.spec.oci = Some(OciConfig::default());
        assert_eq!(
            FluxResourceKind::for_cluster(&cluster),
            FluxResourceKind::OCIRepository
        );
    }
}
