use std::path::{Path, PathBuf};

use semver::Version;
use serde::Deserialize;

use crate::kernel::constants::DEFAULT_MANIFEST_VERSION;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::{VersionError, parse_version};

fn default_version() -> String {
    DEFAULT_MANIFEST_VERSION.to_string()
}

/// On-disk form of a manifest document
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPluginManifest {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    authors: Vec<String>,
    entry_point: String,
    #[serde(default)]
    additional_files: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Declarative description of a loadable plugin package.
///
/// Relative paths resolve against `base_dir`, the directory the manifest was
/// read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub authors: Vec<String>,
    pub entry_point: String,
    pub additional_files: Vec<String>,
    pub tags: Vec<String>,
    pub base_dir: PathBuf,
}

impl PluginManifest {
    /// Read and parse a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PluginSystemError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PluginSystemError::ManifestError {
                path: path.to_path_buf(),
                message: "failed to read manifest".to_string(),
                source: Some(Box::new(e)),
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        Self::parse(&content, base_dir).map_err(|e| PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: "invalid manifest document".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Parse a manifest document whose relative paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, serde_json::Error> {
        let raw: RawPluginManifest = serde_json::from_str(content)?;
        Ok(Self {
            name: raw.name,
            version: raw.version,
            description: raw.description,
            authors: raw.authors,
            entry_point: raw.entry_point,
            additional_files: raw.additional_files,
            tags: raw.tags,
            base_dir: base_dir.into(),
        })
    }

    pub fn semver(&self) -> Result<Version, VersionError> {
        parse_version(&self.version)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn entry_point_path(&self) -> Result<PathBuf, PluginSystemError> {
        self.resolve(&self.entry_point)
    }

    /// Resolved additional files, each with the error for blank entries.
    pub fn additional_file_paths(&self) -> Vec<(String, Result<PathBuf, PluginSystemError>)> {
        self.additional_files
            .iter()
            .map(|file| (file.clone(), self.resolve(file)))
            .collect()
    }

    /// Resolve a path against the manifest directory. Only blank paths are
    /// rejected; whether the target exists is left to the loader.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, PluginSystemError> {
        if relative.trim().is_empty() {
            return Err(PluginSystemError::ManifestError {
                path: self.base_dir.clone(),
                message: format!("manifest '{}' lists an empty path", self.name),
                source: None,
            });
        }
        Ok(self.base_dir.join(relative))
    }
}

/// Builds a [`PluginManifest`] in code, for hosts that do not ship manifest files.
pub struct ManifestBuilder {
    manifest: PluginManifest,
}

impl ManifestBuilder {
    pub fn new(name: &str, entry_point: &str) -> Self {
        Self {
            manifest: PluginManifest {
                name: name.to_string(),
                version: default_version(),
                description: String::new(),
                authors: Vec::new(),
                entry_point: entry_point.to_string(),
                additional_files: Vec::new(),
                tags: Vec::new(),
                base_dir: PathBuf::new(),
            },
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.manifest.version = version.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.manifest.description = description.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.manifest.authors.push(author.to_string());
        self
    }

    pub fn additional_file(mut self, file: &str) -> Self {
        self.manifest.additional_files.push(file.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.manifest.tags.push(tag.to_string());
        self
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.manifest.base_dir = base_dir.into();
        self
    }

    pub fn build(self) -> PluginManifest {
        self.manifest
    }
}
