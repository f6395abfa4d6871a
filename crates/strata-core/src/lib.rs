//! # Strata Core
//!
//! Module discovery, dependency ordering and lifecycle orchestration for
//! applications assembled from independently-authored modules.
//!
//! A host names one root module type. The [`ModuleCatalog`](module_system::ModuleCatalog)
//! walks its declared dependencies and any plugin sources, the
//! [`graph`](module_system::graph) builder orders the result, the
//! [`ModuleActivator`](module_system::ModuleActivator) creates each module once,
//! and the [`LifecycleOrchestrator`](lifecycle::LifecycleOrchestrator) drives every
//! module through the seven lifecycle phases. [`Application`] wires these together
//! for a single bootstrap run.
pub mod config;
pub mod kernel;
pub mod lifecycle;
pub mod module_system;
pub mod plugin_system;
pub mod utils;

pub use async_trait::async_trait;
pub use kernel::error::{BoxError, Error, Result};
pub use kernel::{Application, ApplicationBuilder, ServiceContainer};
pub use lifecycle::{
    ApplicationContext, ConfigureContext, LifecyclePhase, LifecycleState, PostConfigureContext,
    PreConfigureContext,
};
pub use module_system::{HookResult, Module, ModuleDefinition, ModuleDescriptor, ModuleType, Package};
pub use plugin_system::{FileSource, FolderSource, ManifestSource, PluginManifest, PluginSource, TypeSource};

#[cfg(test)]
mod tests;
