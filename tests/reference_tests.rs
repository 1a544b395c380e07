//! Dependency reference, naming and preservation tests
//!
//! Exercises the pure building blocks through the public library API.

use kustodian::flux::{generate_depends_on, generate_flux_name, generate_flux_path};
use kustodian::models::{PreservationMode, PreservationPolicy};
use kustodian::preservation::{
    PRESERVE_LABEL, generate_preservation_patches, get_preserved_resource_types,
    should_preserve_resource,
};
use kustodian::references::{create_node_id, parse_node_id};
use kustodian::{DependencyRef, NodeId, parse_dependency_ref, resolve_dependency_ref};

#[test]
fn test_parse_within_template_reference() {
    let reference = parse_dependency_ref("api").unwrap();
    assert_eq!(reference, DependencyRef::within("api"));
    assert!(!reference.is_cross_template());
}

#[test]
fn test_parse_cross_template_reference() {
    let reference = parse_dependency_ref("secrets/vault").unwrap();
    assert_eq!(reference, DependencyRef::cross("secrets", "vault"));
    assert!(reference.is_cross_template());
}

#[test]
fn test_parse_invalid_references() {
    for raw in ["a/b/c", "", "/vault", "secrets/"] {
        let err = parse_dependency_ref(raw).unwrap_err();
        assert_eq!(err.reference, raw, "reference {:?} should be rejected", raw);
    }
}

#[test]
fn test_resolve_against_current_template() {
    assert_eq!(
        resolve_dependency_ref("database", "app").unwrap(),
        NodeId::new("app", "database")
    );
    assert_eq!(
        resolve_dependency_ref("secrets/vault", "app").unwrap(),
        NodeId::new("secrets", "vault")
    );
    assert!(resolve_dependency_ref("a/b/c", "app").is_err());
}

#[test]
fn test_node_id_round_trip() {
    let id = create_node_id("app", "api");
    assert_eq!(id, "app/api");
    assert_eq!(parse_node_id(&id), NodeId::new("app", "api"));
    assert_eq!(NodeId::new("app", "api").to_string(), id);
}

#[test]
fn test_flux_names_and_paths() {
    assert_eq!(generate_flux_name("nginx", "deployment"), "nginx-deployment");
    assert_eq!(
        generate_flux_path("nginx", "deployment", None),
        "./templates/nginx/deployment"
    );
    assert_eq!(
        generate_flux_path("nginx", "config", Some("./custom")),
        "./custom/nginx/config"
    );
}

#[test]
fn test_depends_on_is_omitted_when_empty() {
    assert!(generate_depends_on("app", &[]).unwrap().is_none());

    let deps = generate_depends_on("app", &["secrets/vault".to_string()])
        .unwrap()
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].name, "secrets-vault");
}

#[test]
fn test_preserved_types_by_mode() {
    assert!(get_preserved_resource_types(&PreservationPolicy::new(PreservationMode::None)).is_empty());

    let stateful = get_preserved_resource_types(&PreservationPolicy::new(PreservationMode::Stateful));
    for kind in ["PersistentVolumeClaim", "Secret", "ConfigMap"] {
        assert!(stateful.iter().any(|k| k == kind), "{} should be preserved", kind);
    }

    let custom = PreservationPolicy::custom(vec!["Certificate".to_string()]);
    assert_eq!(get_preserved_resource_types(&custom), vec!["Certificate"]);
    assert!(
        get_preserved_resource_types(&PreservationPolicy::new(PreservationMode::Custom)).is_empty()
    );
}

#[test]
fn test_preservation_patches_label_each_kind() {
    let patches =
        generate_preservation_patches(&["Secret".to_string(), "ConfigMap".to_string()]);
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0].target.kind, "Secret");
    assert_eq!(patches[1].target.kind, "ConfigMap");

    let operations: serde_json::Value = serde_json::from_str(&patches[0].patch).unwrap();
    assert_eq!(operations[0]["op"], "add");
    assert_eq!(operations[0]["path"], "/metadata/labels/kustodian.io~1preserve");
    assert_eq!(operations[0]["value"], "true");
    assert_eq!(PRESERVE_LABEL, "kustodian.io/preserve");
}

#[test]
fn test_should_preserve_resource() {
    let stateful = PreservationPolicy::default();
    assert!(should_preserve_resource("Secret", &stateful));
    assert!(!should_preserve_resource("Deployment", &stateful));
    assert!(!should_preserve_resource(
        "Secret",
        &PreservationPolicy::new(PreservationMode::None)
    ));
}
