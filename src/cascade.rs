//! Configuration cascade resolution
//!
//! Every override chain is an explicit [`Cascade`]: an ordered list of named
//! steps applied left to right, each taking the accumulated value and the next
//! layer and returning the new accumulated value. Later layers win.
//!
//! | What         | Layers (lowest → highest)                                      |
//! |--------------|----------------------------------------------------------------|
//! | values       | substitution default → cluster values → template values        |
//! | preservation | kustomization policy → cluster kustomization override          |
//! | defaults     | built-in → project defaults → cluster defaults                 |
//!
//! Enablement is not a cascade: a template is enabled iff the cluster lists it.

use std::collections::BTreeMap;

use crate::flux::{DEFAULT_FLUX_NAMESPACE, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
use crate::models::{
    Cluster, Defaults, Kustomization, PreservationPolicy, Project, Template, TemplateConfig,
};

struct CascadeStep<'a, T> {
    layer: &'static str,
    apply: Box<dyn Fn(T) -> T + 'a>,
}

/// Ordered list of resolver steps
pub struct Cascade<'a, T> {
    steps: Vec<CascadeStep<'a, T>>,
}

impl<'a, T> Cascade<'a, T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a layer; it runs after (and wins over) every layer added before it
    pub fn layer(mut self, layer: &'static str, apply: impl Fn(T) -> T + 'a) -> Self {
        self.steps.push(CascadeStep {
            layer,
            apply: Box::new(apply),
        });
        self
    }

    /// Layer names in application order
    pub fn layers(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.layer).collect()
    }

    /// Fold the initial value through every layer
    pub fn resolve(&self, initial: T) -> T {
        self.steps
            .iter()
            .fold(initial, |accumulated, step| (step.apply)(accumulated))
    }
}

impl<T> Default for Cascade<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the accumulated value when the layer defines `name`
fn overlay_value(
    accumulated: Option<String>,
    layer: Option<&BTreeMap<String, String>>,
    name: &str,
) -> Option<String> {
    layer
        .and_then(|values| values.get(name))
        .cloned()
        .or(accumulated)
}

/// Value cascade for one substitution name
pub fn value_cascade<'a>(
    name: &'a str,
    default: Option<&'a str>,
    cluster: &'a Cluster,
    template_config: Option<&'a TemplateConfig>,
) -> Cascade<'a, Option<String>> {
    Cascade::new()
        .layer("default", move |accumulated: Option<String>| {
            default.map(str::to_string).or(accumulated)
        })
        .layer("cluster", move |accumulated: Option<String>| {
            overlay_value(accumulated, Some(&cluster.spec.values), name)
        })
        .layer("template", move |accumulated: Option<String>| {
            overlay_value(accumulated, template_config.map(|c| &c.values), name)
        })
}

/// Resolve a single substitution value
pub fn resolve_value(
    name: &str,
    default: Option<&str>,
    cluster: &Cluster,
    template_config: Option<&TemplateConfig>,
) -> Option<String> {
    value_cascade(name, default, cluster, template_config).resolve(None)
}

/// Resolve every template version and kustomization substitution
///
/// Names with no value at any layer are left out.
pub fn resolve_substitution_values(
    template: &Template,
    kustomization: &Kustomization,
    cluster: &Cluster,
) -> BTreeMap<String, String> {
    let template_config = cluster.template_config(template.name());
    let mut values = BTreeMap::new();

    let declared = template
        .spec
        .versions
        .iter()
        .map(|v| (v.name.as_str(), v.default.as_deref()))
        .chain(
            kustomization
                .substitutions
                .iter()
                .map(|s| (s.name(), s.default_value())),
        );

    for (name, default) in declared {
        if let Some(value) = resolve_value(name, default, cluster, template_config) {
            values.insert(name.to_string(), value);
        }
    }

    values
}

/// Cluster values overlaid with the template-scoped values of `template_config`
pub fn merge_template_values(
    cluster: &Cluster,
    template_config: Option<&TemplateConfig>,
) -> BTreeMap<String, String> {
    let mut values = cluster.spec.values.clone();
    if let Some(config) = template_config {
        values.extend(config.values.clone());
    }
    values
}

/// Partial override: `mode` always wins, `keep_resources` only when present
fn overlay_preservation(
    accumulated: PreservationPolicy,
    layer: Option<&PreservationPolicy>,
) -> PreservationPolicy {
    match layer {
        Some(over) => PreservationPolicy {
            mode: over.mode,
            keep_resources: over
                .keep_resources
                .clone()
                .or(accumulated.keep_resources),
        },
        None => accumulated,
    }
}

/// Preservation cascade for one kustomization of a cluster
pub fn preservation_cascade<'a>(
    template: &'a str,
    kustomization: &'a str,
    cluster: &'a Cluster,
) -> Cascade<'a, PreservationPolicy> {
    Cascade::new().layer("cluster", move |accumulated: PreservationPolicy| {
        let over = cluster
            .template_config(template)
            .and_then(|config| config.kustomizations.get(kustomization))
            .and_then(|o| o.preservation.as_ref());
        overlay_preservation(accumulated, over)
    })
}

/// Effective preservation policy; a kustomization without one is `stateful`
pub fn resolve_preservation(
    template: &Template,
    kustomization: &Kustomization,
    cluster: &Cluster,
) -> PreservationPolicy {
    let initial = kustomization.preservation.clone().unwrap_or_default();
    preservation_cascade(template.name(), &kustomization.name, cluster).resolve(initial)
}

/// A template is enabled iff the cluster lists it
pub fn is_template_enabled(cluster: &Cluster, template: &str) -> bool {
    cluster.is_template_enabled(template)
}

/// Defaults after every layer has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDefaults {
    pub flux_namespace: String,
    pub interval: String,
    pub timeout: String,
}

impl ResolvedDefaults {
    pub fn builtin() -> Self {
        Self {
            flux_namespace: DEFAULT_FLUX_NAMESPACE.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }

    fn overlay(self, layer: &Defaults) -> Self {
        Self {
            flux_namespace: layer.flux_namespace.clone().unwrap_or(self.flux_namespace),
            interval: layer.interval.clone().unwrap_or(self.interval),
            timeout: layer.timeout.clone().unwrap_or(self.timeout),
        }
    }
}

impl Default for ResolvedDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Defaults cascade: project, then cluster
pub fn defaults_cascade<'a>(
    project: Option<&'a Project>,
    cluster: &'a Cluster,
) -> Cascade<'a, ResolvedDefaults> {
    Cascade::new()
        .layer("project", move |accumulated: ResolvedDefaults| match project {
            Some(project) => accumulated.overlay(&project.spec.defaults),
            None => accumulated,
        })
        .layer("cluster", move |accumulated: ResolvedDefaults| {
            accumulated.overlay(&cluster.spec.defaults)
        })
}

/// Resolve defaults starting from `base`
pub fn resolve_defaults(
    base: ResolvedDefaults,
    project: Option<&Project>,
    cluster: &Cluster,
) -> ResolvedDefaults {
    defaults_cascade(project, cluster).resolve(base)
}
