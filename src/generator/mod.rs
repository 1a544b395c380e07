//! Generation pipeline
//!
//! A [`Generator`] owns its settings, hook dispatcher and plugin registry and
//! turns one cluster plus its template catalog into Flux resources:
//! validate, resolve templates, build one Flux Kustomization per
//! kustomization of every enabled template, then attach namespaces and the
//! OCI source. Hooks run at each stage and may rewrite what flows through.

mod settings;

pub use settings::{GenerateOptions, GeneratorSettings};

use std::collections::BTreeMap;

use crate::cascade::{merge_template_values, resolve_defaults, resolve_preservation};
use crate::error::{GeneratorError, GeneratorResult};
use crate::flux::{
    FluxKustomizationOptions, generate_flux_kustomization, generate_oci_repository,
    resolve_kustomization,
};
use crate::hooks::{HookContext, HookDispatcher, HookEvent};
use crate::models::{
    Cluster, FluxResourceKind, GeneratedKustomization, GenerationResult, ResolvedTemplate,
    Template,
};
use crate::namespaces::{collect_namespaces, generate_namespace_resources};
use crate::plugins::{GeneratedResource, PluginContext, PluginRegistry, PluginValidator};
use crate::references::NodeId;
use crate::validation::validate_cluster;

/// Compiles clusters into Flux resources
#[derive(Debug, Clone, Default)]
pub struct Generator {
    settings: GeneratorSettings,
    hooks: HookDispatcher,
    plugins: PluginRegistry,
}

impl Generator {
    pub fn new(settings: GeneratorSettings, hooks: HookDispatcher, plugins: PluginRegistry) -> Self {
        Self {
            settings,
            hooks,
            plugins,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn hooks(&self) -> &HookDispatcher {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookDispatcher {
        &mut self.hooks
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Templates the cluster lists, in listing order, with their merged values
    ///
    /// Listed templates missing from `templates` are skipped; validation
    /// reports them.
    pub fn resolve_templates(&self, cluster: &Cluster, templates: &[Template]) -> Vec<ResolvedTemplate> {
        cluster
            .spec
            .templates
            .iter()
            .filter_map(|config| {
                let template = templates.iter().find(|t| t.name() == config.name)?;
                Some(ResolvedTemplate {
                    template: template.clone(),
                    values: merge_template_values(cluster, Some(config)),
                    enabled: true,
                })
            })
            .collect()
    }

    /// Run every validation stage, failing on the first stage with errors
    pub fn validate(
        &self,
        cluster: &Cluster,
        templates: &[Template],
        options: &GenerateOptions,
    ) -> GeneratorResult<()> {
        validate_cluster(cluster, templates, &options.profiles).map_err(GeneratorError::Validation)
    }

    /// Generate the Flux resources of one cluster
    pub async fn generate(
        &self,
        cluster: &Cluster,
        templates: &[Template],
        options: &GenerateOptions,
    ) -> GeneratorResult<GenerationResult> {
        Ok(self.compile(cluster, templates, options).await?.result)
    }

    /// Generate the Flux resources and the plugin resources of one cluster
    ///
    /// Plugins see the cluster and resolved templates as the hooks left them.
    /// Nothing is returned unless every plugin succeeds.
    pub async fn generate_with_plugins(
        &self,
        cluster: &Cluster,
        templates: &[Template],
        options: &GenerateOptions,
    ) -> GeneratorResult<(GenerationResult, Vec<GeneratedResource>)> {
        let compiled = self.compile(cluster, templates, options).await?;
        let resources = self
            .generate_plugin_resources(&compiled.cluster, &compiled.resolved_templates)
            .await?;
        Ok((compiled.result, resources))
    }

    async fn compile(
        &self,
        cluster: &Cluster,
        templates: &[Template],
        options: &GenerateOptions,
    ) -> GeneratorResult<Compiled> {
        tracing::info!("Generating Flux resources for cluster {}", cluster.name());

        if !options.skip_validation {
            self.validate(cluster, templates, options)?;
        }

        let (cluster, templates) = match self
            .run_hooks(HookContext::BeforeGenerate {
                cluster: cluster.clone(),
                templates: templates.to_vec(),
            })
            .await?
        {
            HookContext::BeforeGenerate { cluster, templates } => (cluster, templates),
            other => return Err(unexpected_context(HookEvent::BeforeGenerate, &other)),
        };

        let defaults = resolve_defaults(self.settings.defaults(), options.project.as_ref(), &cluster);
        tracing::debug!(
            "Resolved defaults for cluster {}: namespace={}, interval={}, timeout={}",
            cluster.name(),
            defaults.flux_namespace,
            defaults.interval,
            defaults.timeout
        );

        let mut resolved_templates = Vec::new();
        for resolved in self.resolve_templates(&cluster, &templates) {
            let resolved = match self
                .run_hooks(HookContext::AfterResolveTemplate {
                    cluster: cluster.clone(),
                    resolved,
                })
                .await?
            {
                HookContext::AfterResolveTemplate { resolved, .. } => resolved,
                other => return Err(unexpected_context(HookEvent::AfterResolveTemplate, &other)),
            };
            resolved_templates.push(resolved);
        }

        let source_kind = FluxResourceKind::for_cluster(&cluster);

        let mut kustomizations = Vec::new();
        let mut seen: BTreeMap<String, NodeId> = BTreeMap::new();

        for resolved_template in resolved_templates.iter().filter(|r| r.enabled) {
            let template = &resolved_template.template;

            for kustomization in &template.spec.kustomizations {
                let node = NodeId::new(template.name(), kustomization.name.as_str());
                let resolved = resolve_kustomization(template, kustomization, Some(&cluster));
                let options = FluxKustomizationOptions {
                    source_repository_name: self.settings.source_repository_name.clone(),
                    source_kind,
                    preservation: Some(resolve_preservation(template, kustomization, &cluster)),
                    template_source_path: Some(self.settings.templates_base_path.clone()),
                    interval: defaults.interval.clone(),
                    timeout: defaults.timeout.clone(),
                };

                let mut flux_kustomization = generate_flux_kustomization(&resolved, &options)?;
                flux_kustomization.metadata.namespace = Some(defaults.flux_namespace.clone());

                let name = flux_kustomization.metadata.name.clone().unwrap_or_default();
                if let Some(first) = seen.get(&name) {
                    return Err(GeneratorError::DuplicateName {
                        name,
                        first: first.to_string(),
                        second: node.to_string(),
                    });
                }
                seen.insert(name.clone(), node);

                let generated = GeneratedKustomization {
                    name: name.clone(),
                    template: template.name().to_string(),
                    path: flux_kustomization.spec.path.clone(),
                    flux_kustomization,
                };

                let generated = match self
                    .run_hooks(HookContext::AfterGenerateKustomization {
                        cluster: cluster.clone(),
                        template: template.name().to_string(),
                        kustomization: generated,
                    })
                    .await?
                {
                    HookContext::AfterGenerateKustomization { kustomization, .. } => kustomization,
                    other => {
                        return Err(unexpected_context(
                            HookEvent::AfterGenerateKustomization,
                            &other,
                        ));
                    }
                };
                kustomizations.push(generated);
            }
        }

        let namespaces = generate_namespace_resources(
            &collect_namespaces(&resolved_templates),
            &defaults.flux_namespace,
            Some(&self.settings.namespace_labels),
        );

        let oci_repository = generate_oci_repository(
            &cluster,
            &self.settings.source_repository_name,
            &defaults.flux_namespace,
            &defaults.interval,
        )?;

        let result = GenerationResult {
            cluster: cluster.name().to_string(),
            output_dir: options.output_dir.clone(),
            kustomizations,
            oci_repository,
            namespaces,
        };

        let result = match self
            .run_hooks(HookContext::AfterGenerate {
                cluster: cluster.clone(),
                result,
            })
            .await?
        {
            HookContext::AfterGenerate { result, .. } => result,
            other => return Err(unexpected_context(HookEvent::AfterGenerate, &other)),
        };

        tracing::info!(
            "Generated {} Flux Kustomization(s) and {} namespace(s) for cluster {}",
            result.kustomizations.len(),
            result.namespaces.len(),
            result.cluster
        );

        Ok(Compiled {
            cluster,
            resolved_templates,
            result,
        })
    }

    /// Run every registered plugin over every enabled template
    ///
    /// Plugins run in registration order; the first failure aborts.
    pub async fn generate_plugin_resources(
        &self,
        cluster: &Cluster,
        resolved_templates: &[ResolvedTemplate],
    ) -> GeneratorResult<Vec<GeneratedResource>> {
        let mut resources = Vec::new();

        for plugin in self.plugins.all() {
            for template in resolved_templates.iter().filter(|r| r.enabled) {
                let objects = plugin
                    .generate(PluginContext { cluster, template })
                    .await
                    .map_err(GeneratorError::Plugin)?;

                for object in objects {
                    PluginValidator::validate_resource(plugin.name(), &object)
                        .map_err(|e| GeneratorError::Plugin(e.into()))?;
                    resources.push(GeneratedResource {
                        plugin: plugin.name().to_string(),
                        template: template.template.name().to_string(),
                        object,
                    });
                }
            }
            tracing::debug!("Plugin {} finished for cluster {}", plugin.name(), cluster.name());
        }

        Ok(resources)
    }

    async fn run_hooks(&self, context: HookContext) -> GeneratorResult<HookContext> {
        let event = context.event();
        if !self.hooks.has_hooks(event) {
            return Ok(context);
        }
        self.hooks
            .dispatch(event, context)
            .await
            .map_err(GeneratorError::Hook)
    }
}

/// One generation run with the post-hook state plugins need
struct Compiled {
    cluster: Cluster,
    resolved_templates: Vec<ResolvedTemplate>,
    result: GenerationResult,
}

fn unexpected_context(event: HookEvent, returned: &HookContext) -> GeneratorError {
    GeneratorError::Hook(anyhow::anyhow!(
        "{} hook returned a {} context",
        event,
        returned.event()
    ))
}
