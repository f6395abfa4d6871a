//! # Strata Core Plugin System Errors
//!
//! [`PluginSystemError`] covers hard failures that abort discovery.
//! [`PluginLoadWarning`] records a soft failure a source skipped over.
use std::fmt;
use std::path::PathBuf;

use crate::kernel::error::BoxError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin loading failed for '{}': {message}", path.display())]
    LoadingError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Plugin manifest error for '{}': {message}", path.display())]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Package '{}' targets module API {plugin_api}, host provides {host_api}", path.display())]
    IncompatibleApiVersion {
        path: PathBuf,
        plugin_api: String,
        host_api: String,
    },

    #[error("Plugin directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

impl PluginSystemError {
    pub(crate) fn loading(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PluginSystemError::LoadingError {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Path of the package or manifest at fault, if the error names one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            PluginSystemError::LoadingError { path, .. }
            | PluginSystemError::ManifestError { path, .. }
            | PluginSystemError::IncompatibleApiVersion { path, .. }
            | PluginSystemError::DirectoryNotFound { path } => Some(path),
            PluginSystemError::VersionParsing(_) => None,
        }
    }
}

/// A package or file a source skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLoadWarning {
    pub path: PathBuf,
    pub message: String,
}

impl PluginLoadWarning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PluginLoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped '{}': {}", self.path.display(), self.message)
    }
}
