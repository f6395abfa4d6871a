#![cfg(test)]

use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{ManifestBuilder, PluginManifest};

#[test]
fn test_minimal_manifest_uses_defaults() {
    let manifest = PluginManifest::parse(r#"{ "name": "audit", "entryPoint": "libaudit.so" }"#, "/opt/plugins/audit")
        .expect("minimal manifest should parse");

    assert_eq!(manifest.name, "audit");
    assert_eq!(manifest.version, "1.0.0");
    assert!(manifest.description.is_empty());
    assert!(manifest.authors.is_empty());
    assert!(manifest.additional_files.is_empty());
    assert!(manifest.tags.is_empty());
    assert_eq!(manifest.base_dir, PathBuf::from("/opt/plugins/audit"));
}

#[test]
fn test_full_manifest_reads_camel_case_keys() {
    let json = r#"{
        "name": "billing",
        "version": "2.3.1",
        "description": "Invoices and payments",
        "authors": ["Ledger Team"],
        "entryPoint": "bin/libbilling.so",
        "additionalFiles": ["bin/libbilling_tax.so"],
        "tags": ["finance", "core"]
    }"#;
    let manifest = PluginManifest::parse(json, "plugins/billing").unwrap();

    assert_eq!(manifest.semver().unwrap().minor, 3);
    assert_eq!(manifest.authors, vec!["Ledger Team".to_string()]);
    assert!(manifest.has_tag("finance"));
    assert!(!manifest.has_tag("beta"));
    assert_eq!(
        manifest.entry_point_path().unwrap(),
        Path::new("plugins/billing/bin/libbilling.so")
    );
    let additional = manifest.additional_file_paths();
    assert_eq!(additional.len(), 1);
    assert_eq!(additional[0].0, "bin/libbilling_tax.so");
    assert_eq!(
        additional[0].1.as_ref().unwrap(),
        Path::new("plugins/billing/bin/libbilling_tax.so")
    );
}

#[test]
fn test_entry_point_is_required() {
    assert!(PluginManifest::parse(r#"{ "name": "nameless-entry" }"#, ".").is_err());
}

#[test]
fn test_paths_resolve_against_the_manifest_directory() {
    let manifest = ManifestBuilder::new("sibling", "../bin/libsibling.so")
        .additional_file("nested/../libshared.so")
        .additional_file("  ")
        .additional_file("ok/libfine.so")
        .base_dir("/srv/plugins/manifests")
        .build();

    assert_eq!(
        manifest.entry_point_path().unwrap(),
        Path::new("/srv/plugins/manifests/../bin/libsibling.so")
    );

    let resolved: Vec<Option<PathBuf>> = manifest
        .additional_file_paths()
        .into_iter()
        .map(|(_, result)| result.ok())
        .collect();
    assert_eq!(
        resolved,
        vec![
            Some(PathBuf::from("/srv/plugins/manifests/nested/../libshared.so")),
            None,
            Some(PathBuf::from("/srv/plugins/manifests/ok/libfine.so")),
        ]
    );

    let blank = ManifestBuilder::new("blank", "").base_dir("/srv").build();
    assert!(matches!(
        blank.entry_point_path(),
        Err(PluginSystemError::ManifestError { .. })
    ));
}

#[test]
fn test_builder_matches_parsed_manifest() {
    let built = ManifestBuilder::new("search", "libsearch.so")
        .version("0.4.0")
        .description("Full text search")
        .author("Index Team")
        .additional_file("libsearch_stemmer.so")
        .tag("search")
        .base_dir("plugins/search")
        .build();

    let parsed = PluginManifest::parse(
        r#"{
            "name": "search",
            "version": "0.4.0",
            "description": "Full text search",
            "authors": ["Index Team"],
            "entryPoint": "libsearch.so",
            "additionalFiles": ["libsearch_stemmer.so"],
            "tags": ["search"]
        }"#,
        "plugins/search",
    )
    .unwrap();

    assert_eq!(built, parsed);
}

#[test]
fn test_invalid_version_is_reported() {
    let manifest = ManifestBuilder::new("odd", "libodd.so").version("one.two").build();
    assert!(manifest.semver().is_err());
}

#[tokio::test]
async fn test_load_resolves_against_manifest_directory() {
    let dir = tempdir().unwrap();
    let plugin_dir = dir.path().join("reports");
    std::fs::create_dir(&plugin_dir).unwrap();
    let path = plugin_dir.join("manifest.json");
    std::fs::write(&path, r#"{ "name": "reports", "entryPoint": "libreports.so" }"#).unwrap();

    let manifest = PluginManifest::load(&path).await.unwrap();
    assert_eq!(manifest.base_dir, plugin_dir);
    assert_eq!(manifest.entry_point_path().unwrap(), plugin_dir.join("libreports.so"));
}

#[tokio::test]
async fn test_load_failures_name_the_manifest() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("absent.json");
    let err = PluginManifest::load(&missing).await.unwrap_err();
    assert!(matches!(err, PluginSystemError::ManifestError { .. }));
    assert_eq!(err.path(), Some(&missing));

    let malformed = dir.path().join("manifest.json");
    std::fs::write(&malformed, "{ not json").unwrap();
    let err = PluginManifest::load(&malformed).await.unwrap_err();
    assert_eq!(err.path(), Some(&malformed));
    assert!(err.to_string().contains("invalid manifest document"));
}
