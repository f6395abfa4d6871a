/// Version of the module API exported to plugin packages
pub const API_VERSION: &str = "0.1.0";

/// Symbol every plugin package exports, see [`export_modules!`](crate::export_modules)
pub const PACKAGE_DECLARATION_SYMBOL: &[u8] = b"STRATA_PACKAGE_DECLARATION\0";

/// File name looked up when a folder source discovers manifests
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Version assumed when a manifest does not declare one
pub const DEFAULT_MANIFEST_VERSION: &str = "1.0.0";

/// Platform extension for loadable packages
pub const DLL_EXTENSION: &str = std::env::consts::DLL_EXTENSION;
