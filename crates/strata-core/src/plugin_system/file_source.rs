use std::path::PathBuf;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::module_system::module_type::ModuleType;
use crate::plugin_system::loader::PackageLoader;
use crate::plugin_system::source::PluginSource;

/// Explicitly listed package files. Any package that fails to load aborts discovery.
#[derive(Debug, Default, Clone)]
pub struct FileSource {
    paths: Vec<PathBuf>,
}

impl FileSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[async_trait]
impl PluginSource for FileSource {
    async fn get_modules(&self) -> Result<Vec<ModuleType>> {
        let mut module_types = Vec::new();
        for path in &self.paths {
            let package = PackageLoader::load(path).await?;
            module_types.extend(package.module_types());
        }
        Ok(module_types)
    }

    fn describe(&self) -> String {
        format!("files({})", self.paths.len())
    }
}
