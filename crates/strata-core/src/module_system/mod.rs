//! # Strata Core Module System
//!
//! Discovery, ordering and activation of modules.
//!
//! - [`traits`]: the [`Module`] hook contract and the [`ModuleDefinition`]
//!   declaration every concrete module provides.
//! - [`module_type`]: [`ModuleType`], the cloneable identity of a definition, and
//!   the [`Package`] it came from.
//! - [`descriptor`]: one [`ModuleDescriptor`] per discovered type.
//! - [`catalog`]: depth-first discovery from a root type and plugin sources.
//! - [`graph`]: cycle detection and topological ordering.
//! - [`activator`]: creates each module once and registers it as a service.
pub mod activator;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod module_type;
pub mod traits;

pub use activator::ModuleActivator;
pub use catalog::ModuleCatalog;
pub use descriptor::ModuleDescriptor;
pub use error::ModuleSystemError;
pub use module_type::{ModuleType, Package};
pub use traits::{HookResult, Module, ModuleDefinition};

#[cfg(test)]
mod tests;
