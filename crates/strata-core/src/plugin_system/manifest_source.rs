use std::path::PathBuf;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::module_system::module_type::ModuleType;
use crate::plugin_system::error::{PluginLoadWarning, PluginSystemError};
use crate::plugin_system::loader::PackageLoader;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::source::{PluginSource, WarningLog};

#[derive(Debug, Clone)]
enum ManifestEntry {
    File(PathBuf),
    Loaded(PluginManifest),
}

/// Packages described by manifest documents.
///
/// A manifest that cannot be read, or whose entry point cannot be loaded, aborts
/// discovery. Additional files that are missing or fail to load are skipped
/// with a warning.
#[derive(Debug, Default)]
pub struct ManifestSource {
    entries: Vec<ManifestEntry>,
    warnings: WarningLog,
}

impl ManifestSource {
    pub fn new<I, P>(manifest_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: manifest_paths
                .into_iter()
                .map(|path| ManifestEntry::File(path.into()))
                .collect(),
            warnings: WarningLog::default(),
        }
    }

    pub fn from_manifests(manifests: impl IntoIterator<Item = PluginManifest>) -> Self {
        Self {
            entries: manifests.into_iter().map(ManifestEntry::Loaded).collect(),
            warnings: WarningLog::default(),
        }
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.entries.push(ManifestEntry::File(path.into()));
        self
    }

    pub fn add_manifest(&mut self, manifest: PluginManifest) -> &mut Self {
        self.entries.push(ManifestEntry::Loaded(manifest));
        self
    }
}

#[async_trait]
impl PluginSource for ManifestSource {
    async fn get_modules(&self) -> Result<Vec<ModuleType>> {
        self.warnings.reset();
        let mut module_types = Vec::new();
        for entry in &self.entries {
            let manifest = match entry {
                ManifestEntry::File(path) => PluginManifest::load(path).await?,
                ManifestEntry::Loaded(manifest) => manifest.clone(),
            };
            module_types.extend(load_manifest_packages(&manifest, &self.warnings).await?);
        }
        Ok(module_types)
    }

    fn warnings(&self) -> Vec<PluginLoadWarning> {
        self.warnings.snapshot()
    }

    fn describe(&self) -> String {
        format!("manifests({})", self.entries.len())
    }
}

/// Load a manifest's entry point, then each additional file.
pub(crate) async fn load_manifest_packages(
    manifest: &PluginManifest,
    warnings: &WarningLog,
) -> std::result::Result<Vec<ModuleType>, PluginSystemError> {
    let entry_point = manifest.entry_point_path()?;
    let package = PackageLoader::load(&entry_point).await?;
    let mut module_types = package.module_types();

    for (file, resolved) in manifest.additional_file_paths() {
        let path = match resolved {
            Ok(path) => path,
            Err(e) => {
                warnings.record(PluginLoadWarning::new(manifest.base_dir.join(&file), e.to_string()));
                continue;
            }
        };
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warnings.record(PluginLoadWarning::new(
                &path,
                format!("additional file of plugin '{}' not found", manifest.name),
            ));
            continue;
        }
        match PackageLoader::load(&path).await {
            Ok(package) => module_types.extend(package.module_types()),
            Err(e) => warnings.record(PluginLoadWarning::new(&path, e.to_string())),
        }
    }

    log::debug!(
        "Plugin '{}' v{} provided {} module type(s)",
        manifest.name,
        manifest.version,
        module_types.len()
    );
    Ok(module_types)
}
