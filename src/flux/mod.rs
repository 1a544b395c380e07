//! Flux resource generation
//!
//! Turns resolved kustomizations into Flux `Kustomization` objects and cluster
//! OCI settings into an `OCIRepository`.

mod kustomization;
mod oci;
mod resources;

pub use kustomization::{
    FluxKustomizationOptions, generate_depends_on, generate_flux_kustomization, generate_flux_name,
    generate_flux_path, generate_health_checks, resolve_kustomization,
};
pub use oci::{generate_oci_repository, oci_repository_url, resolve_oci_tag};
pub use resources::{
    DependencyReference, FluxKustomization, FluxKustomizationSpec, HealthCheckReference,
    LocalObjectReference, OciRepository, OciRepositoryRef, OciRepositorySpec, PostBuild,
    SourceReference,
};

/// Namespace Flux controllers and generated objects live in by default
pub const DEFAULT_FLUX_NAMESPACE: &str = "flux-system";

/// Name of the source repository generated Kustomizations reference by default
pub const DEFAULT_SOURCE_REPOSITORY: &str = "flux-system";

/// Base directory templates are published under inside the source artifact
pub const DEFAULT_TEMPLATES_BASE_PATH: &str = "./templates";

pub const DEFAULT_INTERVAL: &str = "10m";

pub const DEFAULT_TIMEOUT: &str = "5m";

/// `apiVersion` used when a health check does not name one
pub const DEFAULT_HEALTH_CHECK_API_VERSION: &str = "apps/v1";
