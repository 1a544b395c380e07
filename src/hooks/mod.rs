//! Generation lifecycle hooks
//!
//! Hooks observe and may rewrite the data flowing through the generator.
//! Each handler receives an owned [`HookContext`] and returns the context the
//! next handler (and eventually the generator) continues with.

mod dispatcher;

pub use dispatcher::{DEFAULT_HOOK_PRIORITY, HookDispatcher, HookRegistration};

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Cluster, GeneratedKustomization, GenerationResult, ResolvedTemplate, Template};

/// Points in the pipeline where hooks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    BeforeGenerate,
    AfterResolveTemplate,
    AfterGenerateKustomization,
    AfterGenerate,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforeGenerate => "before_generate",
            HookEvent::AfterResolveTemplate => "after_resolve_template",
            HookEvent::AfterGenerateKustomization => "after_generate_kustomization",
            HookEvent::AfterGenerate => "after_generate",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to hooks, one variant per [`HookEvent`]
#[derive(Debug, Clone, PartialEq)]
pub enum HookContext {
    BeforeGenerate {
        cluster: Cluster,
        templates: Vec<Template>,
    },
    AfterResolveTemplate {
        cluster: Cluster,
        resolved: ResolvedTemplate,
    },
    AfterGenerateKustomization {
        cluster: Cluster,
        template: String,
        kustomization: GeneratedKustomization,
    },
    AfterGenerate {
        cluster: Cluster,
        result: GenerationResult,
    },
}

impl HookContext {
    /// Event this payload belongs to
    pub fn event(&self) -> HookEvent {
        match self {
            HookContext::BeforeGenerate { .. } => HookEvent::BeforeGenerate,
            HookContext::AfterResolveTemplate { .. } => HookEvent::AfterResolveTemplate,
            HookContext::AfterGenerateKustomization { .. } => HookEvent::AfterGenerateKustomization,
            HookContext::AfterGenerate { .. } => HookEvent::AfterGenerate,
        }
    }

    pub fn cluster(&self) -> &Cluster {
        match self {
            HookContext::BeforeGenerate { cluster, .. }
            | HookContext::AfterResolveTemplate { cluster, .. }
            | HookContext::AfterGenerateKustomization { cluster, .. }
            | HookContext::AfterGenerate { cluster, .. } => cluster,
        }
    }
}

/// A lifecycle hook
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HookHandler: Send + Sync {
    async fn handle(&self, context: HookContext) -> Result<HookContext>;
}

/// Adapts a synchronous closure into a [`HookHandler`]
pub struct FnHook<F>(F);

impl<F> FnHook<F>
where
    F: Fn(HookContext) -> Result<HookContext> + Send + Sync,
{
    pub fn new(hook: F) -> Self {
        Self(hook)
    }
}

#[async_trait]
impl<F> HookHandler for FnHook<F>
where
    F: Fn(HookContext) -> Result<HookContext> + Send + Sync,
{
    async fn handle(&self, context: HookContext) -> Result<HookContext> {
        (self.0)(context)
    }
}
