use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::kernel::constants::{DLL_EXTENSION, MANIFEST_FILE_NAME};
use crate::kernel::error::Result;
use crate::module_system::module_type::ModuleType;
use crate::plugin_system::error::{PluginLoadWarning, PluginSystemError};
use crate::plugin_system::loader::PackageLoader;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::manifest_source::load_manifest_packages;
use crate::plugin_system::source::{PluginSource, WarningLog};
use crate::utils::fs::{find_files, find_files_shallow, has_extension, normalize_path};

/// Every package found in a directory.
///
/// A missing directory aborts discovery; a package or manifest that fails to
/// load is skipped with a warning.
#[derive(Debug)]
pub struct FolderSource {
    folder: PathBuf,
    recursive: bool,
    discover_manifests: bool,
    warnings: WarningLog,
}

impl FolderSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            recursive: false,
            discover_manifests: false,
            warnings: WarningLog::default(),
        }
    }

    /// Scan subdirectories too.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Also load every `manifest.json` in the scanned tree.
    pub fn discover_manifests(mut self, discover: bool) -> Self {
        self.discover_manifests = discover;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn scan(&self, predicate: &dyn Fn(&Path) -> bool) -> std::result::Result<Vec<PathBuf>, PluginSystemError> {
        let found = if self.recursive {
            find_files(&self.folder, predicate)
        } else {
            find_files_shallow(&self.folder, predicate)
        };
        let mut found = found.map_err(|e| PluginSystemError::LoadingError {
            path: self.folder.clone(),
            message: "failed to scan plugin directory".to_string(),
            source: Some(Box::new(e)),
        })?;
        found.sort();
        Ok(found)
    }

    async fn manifest_modules(&self, claimed: &mut HashSet<PathBuf>) -> std::result::Result<Vec<ModuleType>, PluginSystemError> {
        let manifest_paths = self.scan(&|path| {
            path.file_name()
                .map(|name| name == MANIFEST_FILE_NAME)
                .unwrap_or(false)
        })?;

        let mut module_types = Vec::new();
        for manifest_path in manifest_paths {
            let manifest = match PluginManifest::load(&manifest_path).await {
                Ok(manifest) => manifest,
                Err(e) => {
                    self.warnings.record(PluginLoadWarning::new(&manifest_path, e.to_string()));
                    continue;
                }
            };
            claimed.extend(manifest.entry_point_path().ok().map(|path| normalize_path(&path)));
            claimed.extend(
                manifest
                    .additional_file_paths()
                    .into_iter()
                    .filter_map(|(_, resolved)| resolved.ok())
                    .map(|path| normalize_path(&path)),
            );
            match load_manifest_packages(&manifest, &self.warnings).await {
                Ok(types) => module_types.extend(types),
                Err(e) => self.warnings.record(PluginLoadWarning::new(&manifest_path, e.to_string())),
            }
        }
        Ok(module_types)
    }
}

#[async_trait]
impl PluginSource for FolderSource {
    async fn get_modules(&self) -> Result<Vec<ModuleType>> {
        self.warnings.reset();
        let is_dir = tokio::fs::metadata(&self.folder)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(PluginSystemError::DirectoryNotFound {
                path: self.folder.clone(),
            }
            .into());
        }

        let mut module_types = Vec::new();
        let mut claimed = HashSet::new();
        if self.discover_manifests {
            module_types.extend(self.manifest_modules(&mut claimed).await?);
        }

        for path in self.scan(&|path| has_extension(path, DLL_EXTENSION))? {
            if claimed.contains(&normalize_path(&path)) {
                continue;
            }
            match PackageLoader::load(&path).await {
                Ok(package) => module_types.extend(package.module_types()),
                Err(e) => self.warnings.record(PluginLoadWarning::new(&path, e.to_string())),
            }
        }
        Ok(module_types)
    }

    fn warnings(&self) -> Vec<PluginLoadWarning> {
        self.warnings.snapshot()
    }

    fn describe(&self) -> String {
        format!("folder({})", self.folder.display())
    }
}
