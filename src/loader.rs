//! Reading clusters, projects, templates and node profiles from disk
//!
//! Every document is one YAML file. Templates are discovered in a catalog
//! directory either as `<dir>/<name>.yaml` or as `<dir>/<name>/template.yaml`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::{Cluster, NodeProfile, Project, Template};

const TEMPLATE_FILE_NAMES: &[&str] = &["template.yaml", "template.yml"];

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse one YAML document, checking its `kind`
fn load_document<T: DeserializeOwned>(path: &Path, expected_kind: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let raw: serde_yaml::Value = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if let Some(kind) = raw.get("kind").and_then(|k| k.as_str()) {
        if kind != expected_kind {
            anyhow::bail!(
                "{} has kind '{}', expected '{}'",
                path.display(),
                kind,
                expected_kind
            );
        }
    }

    serde_yaml::from_value(raw)
        .with_context(|| format!("Invalid {} document: {}", expected_kind, path.display()))
}

pub fn load_cluster(path: &Path) -> Result<Cluster> {
    let cluster: Cluster = load_document(path, "Cluster")?;
    tracing::debug!("Loaded cluster {} from {}", cluster.name(), path.display());
    Ok(cluster)
}

pub fn load_project(path: &Path) -> Result<Project> {
    load_document(path, "Project")
}

pub fn load_template(path: &Path) -> Result<Template> {
    let template: Template = load_document(path, "Template")?;
    tracing::debug!("Loaded template {} from {}", template.name(), path.display());
    Ok(template)
}

/// Sorted directory entries
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Every template of a catalog directory, sorted by path
///
/// Two documents declaring the same template name are an error.
pub fn load_templates(dir: &Path) -> Result<Vec<Template>> {
    let mut templates: Vec<Template> = Vec::new();
    let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in read_dir_sorted(dir)? {
        let path = if entry.is_dir() {
            match TEMPLATE_FILE_NAMES
                .iter()
                .map(|name| entry.join(name))
                .find(|candidate| candidate.is_file())
            {
                Some(path) => path,
                None => continue,
            }
        } else if is_yaml(&entry) {
            entry
        } else {
            continue;
        };

        let template = load_template(&path)?;
        if let Some(previous) = sources.get(template.name()) {
            anyhow::bail!(
                "Template '{}' is defined twice: {} and {}",
                template.name(),
                previous.display(),
                path.display()
            );
        }
        sources.insert(template.name().to_string(), path);
        templates.push(template);
    }

    tracing::info!("Loaded {} template(s) from {}", templates.len(), dir.display());
    Ok(templates)
}

/// Node profiles of a directory, keyed by profile name
pub fn load_profiles(dir: &Path) -> Result<BTreeMap<String, NodeProfile>> {
    let mut profiles = BTreeMap::new();

    for path in read_dir_sorted(dir)?.into_iter().filter(|p| is_yaml(p)) {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let profile: NodeProfile = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid node profile: {}", path.display()))?;
        profiles.insert(profile.name.clone(), profile);
    }

    Ok(profiles)
}
