//! OCIRepository generation for clusters publishing manifests as OCI artifacts

use url::Url;

use super::resources::{LocalObjectReference, OciRepository, OciRepositoryRef, OciRepositorySpec};
use crate::error::{GeneratorError, GeneratorResult};
use crate::models::{Cluster, OciConfig, TagStrategy};

/// `oci://<registry>/<repository>`, validated
pub fn oci_repository_url(cluster: &str, oci: &OciConfig) -> GeneratorResult<String> {
    let registry = oci.registry.trim_matches('/');
    let repository = oci.repository.trim_matches('/');

    if registry.is_empty() || repository.is_empty() {
        return Err(GeneratorError::InvalidOciSource {
            cluster: cluster.to_string(),
            reason: "registry and repository must both be set".to_string(),
        });
    }

    let raw = format!("oci://{}/{}", registry, repository);
    let parsed = Url::parse(&raw).map_err(|e| GeneratorError::InvalidOciSource {
        cluster: cluster.to_string(),
        reason: format!("'{}' is not a valid URL: {}", raw, e),
    })?;
    if parsed.host_str().is_none() {
        return Err(GeneratorError::InvalidOciSource {
            cluster: cluster.to_string(),
            reason: format!("'{}' has no registry host", raw),
        });
    }

    Ok(raw)
}

/// Tag the cluster's artifact is pulled by
///
/// An explicit tag always wins. Otherwise the `cluster` strategy tags with the
/// cluster name and every other strategy follows `latest`, since the concrete
/// SHA or version is only known at push time.
pub fn resolve_oci_tag(cluster: &Cluster, oci: &OciConfig) -> String {
    if let Some(tag) = &oci.tag {
        return tag.clone();
    }
    match oci.tag_strategy {
        TagStrategy::Cluster => cluster.name().to_string(),
        TagStrategy::GitSha | TagStrategy::Version | TagStrategy::Manual => "latest".to_string(),
    }
}

/// The cluster's OCIRepository, or `None` for git-mode clusters
pub fn generate_oci_repository(
    cluster: &Cluster,
    name: &str,
    namespace: &str,
    interval: &str,
) -> GeneratorResult<Option<OciRepository>> {
    let Some(oci) = cluster.spec.oci.as_ref() else {
        return Ok(None);
    };

    let spec = OciRepositorySpec {
        interval: interval.to_string(),
        url: oci_repository_url(cluster.name(), oci)?,
        reference: Some(OciRepositoryRef {
            tag: Some(resolve_oci_tag(cluster, oci)),
            ..Default::default()
        }),
        provider: oci.provider.clone(),
        secret_ref: oci
            .secret_ref
            .clone()
            .map(|name| LocalObjectReference { name }),
        insecure: oci.insecure.then_some(true),
    };

    let mut repository = OciRepository::new(name, spec);
    repository.metadata.namespace = Some(namespace.to_string());

    tracing::debug!(
        "Generated OCIRepository {} for cluster {}",
        name,
        cluster.name()
    );

    Ok(Some(repository))
}
