#![cfg(test)]

use std::path::{Path, PathBuf};

use crate::utils::fs::{has_extension, normalize_path};

#[test]
fn test_normalize_folds_current_and_parent_components() {
    assert_eq!(
        normalize_path(Path::new("/srv/plugins/manifests/./../bin/libx.so")),
        PathBuf::from("/srv/plugins/bin/libx.so")
    );
    assert_eq!(normalize_path(Path::new("a/b/../../c")), PathBuf::from("c"));
}

#[test]
fn test_normalize_keeps_leading_parent_of_relative_path() {
    assert_eq!(normalize_path(Path::new("../a/../b")), PathBuf::from("../b"));
    assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
}

#[test]
fn test_extension_check_ignores_case() {
    assert!(has_extension(Path::new("libx.SO"), "so"));
    assert!(!has_extension(Path::new("libx"), "so"));
}
