//! # Strata Core Plugin System
//!
//! Runtime-loaded packages of modules.
//!
//! A package is a dynamic library built with [`export_modules!`](crate::export_modules).
//! [`PackageLoader`](loader::PackageLoader) maps one library and reads its module
//! types. Plugin sources decide which libraries to load and how strictly:
//!
//! - [`FileSource`]: explicit paths, every failure is fatal.
//! - [`FolderSource`]: a scanned directory, broken packages are skipped with a warning.
//! - [`ManifestSource`]: `manifest.json` documents naming an entry point and
//!   optional additional files.
//! - [`TypeSource`]: statically linked module types, for hosts that want one
//!   registration path for both.
pub mod error;
pub mod file_source;
pub mod folder_source;
pub mod loader;
pub mod manifest;
pub mod manifest_source;
pub mod source;
pub mod version;

pub use error::{PluginLoadWarning, PluginSystemError};
pub use file_source::FileSource;
pub use folder_source::FolderSource;
pub use loader::{LoadedPackage, ModuleRegistrar, PackageDeclaration, PackageLoader};
pub use manifest::{ManifestBuilder, PluginManifest};
pub use manifest_source::ManifestSource;
pub use source::{PluginSource, TypeSource};
pub use version::VersionRange;

#[cfg(test)]
mod tests;
