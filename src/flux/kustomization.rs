//! Flux Kustomization generation

use std::collections::BTreeMap;

use super::resources::{
    DependencyReference, FluxKustomization, FluxKustomizationSpec, HealthCheckReference, PostBuild,
    SourceReference,
};
use super::{
    DEFAULT_FLUX_NAMESPACE, DEFAULT_HEALTH_CHECK_API_VERSION, DEFAULT_INTERVAL,
    DEFAULT_SOURCE_REPOSITORY, DEFAULT_TEMPLATES_BASE_PATH, DEFAULT_TIMEOUT,
};
use crate::cascade;
use crate::error::InvalidReference;
use crate::models::{
    Cluster, FluxResourceKind, Kustomization, PreservationMode, PreservationPolicy,
    ResolvedKustomization, Template,
};
use crate::preservation::{generate_preservation_patches, get_preserved_resource_types};
use crate::references::parse_dependency_ref;

/// Flux resource name for a template's kustomization
pub fn generate_flux_name(template: &str, kustomization: &str) -> String {
    format!("{}-{}", template, kustomization)
}

/// Path of a kustomization inside the source artifact
///
/// `base` defaults to `./templates`. A leading `./` on `path` is dropped.
pub fn generate_flux_path(template: &str, path: &str, base: Option<&str>) -> String {
    let base = base
        .unwrap_or(DEFAULT_TEMPLATES_BASE_PATH)
        .trim_end_matches('/');
    let normalized = path.strip_prefix("./").unwrap_or(path).trim_end_matches('/');

    if normalized.is_empty() || normalized == "." {
        format!("{}/{}", base, template)
    } else {
        format!("{}/{}/{}", base, template, normalized)
    }
}

/// `spec.dependsOn` entries; `None` when there are no dependencies
pub fn generate_depends_on(
    template: &str,
    depends_on: &[String],
) -> Result<Option<Vec<DependencyReference>>, InvalidReference> {
    if depends_on.is_empty() {
        return Ok(None);
    }

    let references = depends_on
        .iter()
        .map(|raw| {
            let node = parse_dependency_ref(raw)?.resolve(template);
            Ok(DependencyReference {
                name: generate_flux_name(&node.template, &node.kustomization),
                namespace: None,
            })
        })
        .collect::<Result<Vec<_>, InvalidReference>>()?;

    Ok(Some(references))
}

/// `spec.healthChecks` entries; `None` when the kustomization declares none
pub fn generate_health_checks(
    kustomization: &Kustomization,
    namespace: &str,
) -> Option<Vec<HealthCheckReference>> {
    if kustomization.health_checks.is_empty() {
        return None;
    }

    Some(
        kustomization
            .health_checks
            .iter()
            .map(|check| HealthCheckReference {
                api_version: check
                    .api_version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HEALTH_CHECK_API_VERSION.to_string()),
                kind: check.kind.clone(),
                name: check.name.clone(),
                namespace: check
                    .namespace
                    .clone()
                    .unwrap_or_else(|| namespace.to_string()),
            })
            .collect(),
    )
}

/// Apply the value cascade to every substitution of a kustomization
///
/// Without a cluster only substitution defaults apply.
pub fn resolve_kustomization(
    template: &Template,
    kustomization: &Kustomization,
    cluster: Option<&Cluster>,
) -> ResolvedKustomization {
    let values = match cluster {
        Some(cluster) => cascade::resolve_substitution_values(template, kustomization, cluster),
        None => template
            .spec
            .versions
            .iter()
            .filter_map(|v| v.default.clone().map(|d| (v.name.clone(), d)))
            .chain(kustomization.substitutions.iter().filter_map(|s| {
                s.default_value()
                    .map(|d| (s.name().to_string(), d.to_string()))
            }))
            .collect::<BTreeMap<_, _>>(),
    };

    ResolvedKustomization {
        template: template.name().to_string(),
        kustomization: kustomization.clone(),
        values,
        namespace: kustomization.default_namespace().map(str::to_string),
    }
}

/// Settings for [`generate_flux_kustomization`]
#[derive(Debug, Clone, PartialEq)]
pub struct FluxKustomizationOptions {
    pub source_repository_name: String,
    pub source_kind: FluxResourceKind,
    /// Effective preservation policy; `None` generates no patches
    pub preservation: Option<PreservationPolicy>,
    /// Base path overriding `./templates`, for templates pulled from elsewhere
    pub template_source_path: Option<String>,
    pub interval: String,
    pub timeout: String,
}

impl Default for FluxKustomizationOptions {
    fn default() -> Self {
        Self {
            source_repository_name: DEFAULT_SOURCE_REPOSITORY.to_string(),
            source_kind: FluxResourceKind::GitRepository,
            preservation: None,
            template_source_path: None,
            interval: DEFAULT_INTERVAL.to_string(),
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }
}

/// Build the Flux Kustomization for a resolved kustomization
///
/// The object is placed in `flux-system`; callers relocate it to the
/// cluster's Flux namespace.
pub fn generate_flux_kustomization(
    resolved: &ResolvedKustomization,
    options: &FluxKustomizationOptions,
) -> Result<FluxKustomization, InvalidReference> {
    let kustomization = &resolved.kustomization;
    let name = generate_flux_name(&resolved.template, &kustomization.name);

    let health_namespace = resolved.namespace.as_deref().unwrap_or("default");
    let patches = options
        .preservation
        .as_ref()
        .filter(|policy| policy.mode != PreservationMode::None)
        .map(|policy| generate_preservation_patches(&get_preserved_resource_types(policy)))
        .filter(|patches| !patches.is_empty());

    let post_build = (!resolved.values.is_empty()).then(|| PostBuild {
        substitute: resolved.values.clone(),
    });

    let spec = FluxKustomizationSpec {
        interval: options.interval.clone(),
        timeout: Some(options.timeout.clone()),
        path: generate_flux_path(
            &resolved.template,
            &kustomization.path,
            options.template_source_path.as_deref(),
        ),
        prune: kustomization.prune,
        wait: kustomization.wait,
        source_ref: SourceReference {
            kind: options.source_kind.to_string(),
            name: options.source_repository_name.clone(),
            namespace: None,
        },
        target_namespace: resolved.namespace.clone(),
        depends_on: generate_depends_on(&resolved.template, &kustomization.depends_on)?,
        health_checks: generate_health_checks(kustomization, health_namespace),
        patches,
        post_build,
    };

    let mut flux_kustomization = FluxKustomization::new(&name, spec);
    flux_kustomization.metadata.namespace = Some(DEFAULT_FLUX_NAMESPACE.to_string());

    tracing::debug!(
        "Generated Flux Kustomization {} (path {})",
        name,
        flux_kustomization.spec.path
    );

    Ok(flux_kustomization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HealthCheck, NamespaceConfig, Substitution, TemplateConfig};

    #[test]
    fn test_generate_flux_name() {
        assert_eq!(generate_flux_name("nginx", "deployment"), "nginx-deployment");
    }

    #[test]
    fn test_generate_flux_path() {
        assert_eq!(
            generate_flux_path("nginx", "deployment", None),
            "./templates/nginx/deployment"
        );
        assert_eq!(
            generate_flux_path("nginx", "./deployment", None),
            "./templates/nginx/deployment"
        );
        assert_eq!(
            generate_flux_path("nginx", "config", Some("./custom")),
            "./custom/nginx/config"
        );
        assert_eq!(generate_flux_path("nginx", "./", None), "./templates/nginx");
    }

    #[test]
    fn test_generate_depends_on() {
        assert_eq!(generate_depends_on("app", &[]).unwrap(), None);

        let deps = generate_depends_on(
            "app",
            &["database".to_string(), "secrets/vault".to_string()],
        )
        .unwrap()
        .unwrap();
        assert_eq!(deps[0].name, "app-database");
        assert_eq!(deps[1].name, "secrets-vault");
    }

    #[test]
    fn test_generate_depends_on_rejects_bad_reference() {
        let err = generate_depends_on("app", &["a/b/c".to_string()]).unwrap_err();
        assert_eq!(err.reference, "a/b/c");
    }

    #[test]
    fn test_generate_health_checks() {
        let mut kustomization = Kustomization::new("api", "./api");
        assert!(generate_health_checks(&kustomization, "apps").is_none());

        kustomization.health_checks = vec![
            HealthCheck {
                kind: "Deployment".to_string(),
                name: "api".to_string(),
                api_version: None,
                namespace: None,
            },
            HealthCheck {
                kind: "HelmRelease".to_string(),
                name: "db".to_string(),
                api_version: Some("helm.toolkit.fluxcd.io/v2".to_string()),
                namespace: Some("data".to_string()),
            },
        ];

        let checks = generate_health_checks(&kustomization, "apps").unwrap();
        assert_eq!(checks[0].api_version, "apps/v1");
        assert_eq!(checks[0].namespace, "apps");
        assert_eq!(checks[1].api_version, "helm.toolkit.fluxcd.io/v2");
        assert_eq!(checks[1].namespace, "data");
    }

    #[test]
    fn test_resolve_kustomization_without_cluster_uses_defaults() {
        let mut kustomization = Kustomization::new("api", "./api");
        kustomization.substitutions = vec![
            Substitution::generic("replicas", Some("2")),
            Substitution::generic("domain", None),
        ];
        kustomization.namespace = Some(NamespaceConfig {
            default: "apps".to_string(),
            create: true,
        });
        let template = Template::new("app", vec![kustomization.clone()]);

        let resolved = resolve_kustomization(&template, &kustomization, None);
        assert_eq!(resolved.template, "app");
        assert_eq!(resolved.namespace.as_deref(), Some("apps"));
        assert_eq!(resolved.values.len(), 1);
        assert_eq!(resolved.values["replicas"], "2");
    }

    #[test]
    fn test_resolve_kustomization_with_cluster_values() {
        let mut kustomization = Kustomization::new("api", "./api");
        kustomization.substitutions = vec![Substitution::generic("replicas", Some("2"))];
        let template = Template::new("app", vec![kustomization.clone()]);

        let mut cluster = Cluster::new("prod");
        let mut config = TemplateConfig::new("app");
        config.values.insert("replicas".to_string(), "6".to_string());
        cluster.spec.templates.push(config);

        let resolved = resolve_kustomization(&template, &kustomization, Some(&cluster));
        assert_eq!(resolved.values["replicas"], "6");
    }

    #[test]
    fn test_generate_flux_kustomization_defaults() {
        let kustomization = Kustomization::new("deployment", "./deployment");
        let template = Template::new("nginx", vec![kustomization.clone()]);
        let resolved = resolve_kustomization(&template, &kustomization, None);

        let flux =
            generate_flux_kustomization(&resolved, &FluxKustomizationOptions::default()).unwrap();
        assert_eq!(flux.metadata.name.as_deref(), Some("nginx-deployment"));
        assert_eq!(flux.metadata.namespace.as_deref(), Some("flux-system"));
        assert_eq!(flux.spec.path, "./templates/nginx/deployment");
        assert_eq!(flux.spec.source_ref.kind, "GitRepository");
        assert_eq!(flux.spec.source_ref.name, "flux-system");
        assert_eq!(flux.spec.interval, "10m");
        assert_eq!(flux.spec.timeout.as_deref(), Some("5m"));
        assert!(flux.spec.prune);
        assert!(flux.spec.wait);
        assert!(flux.spec.depends_on.is_none());
        assert!(flux.spec.health_checks.is_none());
        assert!(flux.spec.patches.is_none());
        assert!(flux.spec.post_build.is_none());
        assert!(flux.spec.target_namespace.is_none());
    }

    #[test]
    fn test_generate_flux_kustomization_with_preservation() {
        let kustomization = Kustomization::new("db", "./db");
        let template = Template::new("data", vec![kustomization.clone()]);
        let resolved = resolve_kustomization(&template, &kustomization, None);

        let options = FluxKustomizationOptions {
            preservation: Some(PreservationPolicy::default()),
            ..Default::default()
        };
        let flux = generate_flux_kustomization(&resolved, &options).unwrap();
        let patches = flux.spec.patches.unwrap();
        assert_eq!(patches.len(), 3);

        let options = FluxKustomizationOptions {
            preservation: Some(PreservationPolicy::new(PreservationMode::None)),
            ..Default::default()
        };
        let flux = generate_flux_kustomization(&resolved, &options).unwrap();
        assert!(flux.spec.patches.is_none());
    }

    #[test]
    fn test_generated_yaml_uses_flux_field_names() {
        let mut kustomization = Kustomization::new("api", "./api");
        kustomization.depends_on = vec!["database".to_string()];
        kustomization.substitutions = vec![Substitution::generic("replicas", Some("2"))];
        let template = Template::new("app", vec![kustomization.clone()]);
        let resolved = resolve_kustomization(&template, &kustomization, None);

        let flux =
            generate_flux_kustomization(&resolved, &FluxKustomizationOptions::default()).unwrap();
        let value = serde_json::to_value(&flux).unwrap();
        assert_eq!(value["apiVersion"], "kustomize.toolkit.fluxcd.io/v1");
        assert_eq!(value["kind"], "Kustomization");
        assert_eq!(value["spec"]["sourceRef"]["kind"], "GitRepository");
        assert_eq!(value["spec"]["dependsOn"][0]["name"], "app-database");
        assert_eq!(value["spec"]["postBuild"]["substitute"]["replicas"], "2");
        assert!(value["spec"].get("healthChecks").is_none());
    }
}
