//! Error types for the generator
//!
//! Validation problems are collected as [`ValidationError`] values so a single
//! pass reports everything wrong with a cluster. Hook and plugin failures are
//! opaque `anyhow` errors carried through unchanged.

use serde::Serialize;
use std::fmt;

/// A malformed dependency reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid dependency reference '{reference}': {reason}")]
pub struct InvalidReference {
    pub reference: String,
    pub reason: String,
}

impl InvalidReference {
    pub fn new(reference: &str, reason: &str) -> Self {
        Self {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Category of a validation problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MissingTemplate,
    MissingSubstitution,
    InvalidKustomizationOverride,
    MissingProfile,
    MissingDependency,
    InvalidReference,
    UnknownDependency,
    DependencyCycle,
    RequirementNotMet,
    InvalidSource,
    DuplicateTemplate,
    DuplicateName,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingTemplate => "missing_template",
            ValidationErrorKind::MissingSubstitution => "missing_substitution",
            ValidationErrorKind::InvalidKustomizationOverride => "invalid_kustomization_override",
            ValidationErrorKind::MissingProfile => "missing_profile",
            ValidationErrorKind::MissingDependency => "missing_dependency",
            ValidationErrorKind::InvalidReference => "invalid_reference",
            ValidationErrorKind::UnknownDependency => "unknown_dependency",
            ValidationErrorKind::DependencyCycle => "dependency_cycle",
            ValidationErrorKind::RequirementNotMet => "requirement_not_met",
            ValidationErrorKind::InvalidSource => "invalid_source",
            ValidationErrorKind::DuplicateTemplate => "duplicate_template",
            ValidationErrorKind::DuplicateName => "duplicate_name",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One cross-object consistency problem found in a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub cluster: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, cluster: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            cluster: cluster.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.cluster, self.message)
    }
}

/// Failure of a generation run
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Validation failed with {} error(s):\n{}", .0.len(), format_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    InvalidReference(#[from] InvalidReference),

    #[error("Duplicate Flux resource name '{name}' generated by {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid OCI source for cluster '{cluster}': {reason}")]
    InvalidOciSource { cluster: String, reason: String },

    /// A hook handler failed; the handler's error is carried unchanged
    #[error(transparent)]
    Hook(anyhow::Error),

    /// A resource generator plugin failed; the plugin's error is carried unchanged
    #[error(transparent)]
    Plugin(anyhow::Error),
}

impl GeneratorError {
    /// Validation errors, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            GeneratorError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
