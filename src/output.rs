//! Writing generated resources to disk
//!
//! Layout under the output directory:
//! - `templates/<template>/<kustomization>.yaml` for each Flux Kustomization
//! - `flux-system/oci-repository.yaml` and `flux-system/namespaces.yaml`
//! - `plugins/<plugin>/<template>-<kind>-<name>.yaml` for plugin objects

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::paths::ensure_dir;
use crate::models::{GeneratedKustomization, GenerationResult};
use crate::plugins::GeneratedResource;

const CLUSTER_RESOURCES_DIR: &str = "flux-system";

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_file(path, &yaml)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Path of a generated kustomization relative to the output directory
pub fn kustomization_path(generated: &GeneratedKustomization) -> PathBuf {
    let prefix = format!("{}-", generated.template);
    let file_stem = generated
        .name
        .strip_prefix(&prefix)
        .unwrap_or(&generated.name);
    PathBuf::from("templates")
        .join(&generated.template)
        .join(format!("{}.yaml", file_stem))
}

/// Write every resource of a generation result under `result.output_dir`
///
/// Returns the written paths in write order.
pub fn write_generation_result(result: &GenerationResult) -> Result<Vec<PathBuf>> {
    let root = &result.output_dir;
    let mut written = Vec::new();

    for generated in &result.kustomizations {
        let path = root.join(kustomization_path(generated));
        write_yaml(&path, &generated.flux_kustomization)?;
        written.push(path);
    }

    if let Some(repository) = &result.oci_repository {
        let path = root.join(CLUSTER_RESOURCES_DIR).join("oci-repository.yaml");
        write_yaml(&path, repository)?;
        written.push(path);
    }

    if !result.namespaces.is_empty() {
        let documents = result
            .namespaces
            .iter()
            .map(serde_yaml::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to serialize namespaces")?;
        let path = root.join(CLUSTER_RESOURCES_DIR).join("namespaces.yaml");
        write_file(&path, &documents.join("---\n"))?;
        written.push(path);
    }

    tracing::info!(
        "Wrote {} file(s) for cluster {} to {}",
        written.len(),
        result.cluster,
        root.display()
    );
    Ok(written)
}

/// Write plugin objects under `<output_dir>/plugins`
pub fn write_plugin_resources(output_dir: &Path, resources: &[GeneratedResource]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for resource in resources {
        let kind = resource
            .object
            .types
            .as_ref()
            .map(|t| t.kind.to_lowercase())
            .unwrap_or_else(|| "object".to_string());
        let name = resource.object.metadata.name.as_deref().unwrap_or("unnamed");
        let path = output_dir
            .join("plugins")
            .join(&resource.plugin)
            .join(format!("{}-{}-{}.yaml", resource.template, kind, name));
        write_yaml(&path, &resource.object)?;
        written.push(path);
    }

    Ok(written)
}
