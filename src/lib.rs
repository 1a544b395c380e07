//! Kustodian Library
//!
//! Compiles templates, clusters and projects into Flux CD `Kustomization`
//! resources. The binary wraps this library; tests use it directly.

pub mod cascade;
pub mod cli;
pub mod config;
pub mod error;
pub mod flux;
pub mod generator;
pub mod hooks;
pub mod loader;
pub mod models;
pub mod namespaces;
pub mod output;
pub mod plugins;
pub mod preservation;
pub mod references;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::{GeneratorError, GeneratorResult, InvalidReference, ValidationError, ValidationErrorKind};
pub use generator::{GenerateOptions, Generator, GeneratorSettings};
pub use hooks::{FnHook, HookContext, HookDispatcher, HookEvent, HookHandler, HookRegistration};
pub use plugins::{GeneratedResource, PluginContext, PluginRegistry, ResourceGenerator};
pub use references::{DependencyRef, NodeId, parse_dependency_ref, resolve_dependency_ref};
