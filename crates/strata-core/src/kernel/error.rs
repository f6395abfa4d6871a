//! # Strata Core Kernel Errors
//!
//! [`Error`] aggregates the typed errors of every subsystem so that a failed
//! bootstrap surfaces as a single value naming the module, type or path at fault.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::kernel::container::ContainerError;
use crate::lifecycle::error::LifecycleError;
use crate::module_system::error::ModuleSystemError;
use crate::plugin_system::error::PluginSystemError;

/// Boxed error returned by module hooks and factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Discovery, ordering or activation failure
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Hard failure loading a plugin package or manifest
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// A lifecycle hook failed, was cancelled, or a phase was run out of order
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service container error: {0}")]
    Container(#[from] ContainerError),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
