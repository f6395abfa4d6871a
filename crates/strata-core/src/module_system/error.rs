//! # Strata Core Module System Errors
use crate::kernel::error::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error("Type '{module}' is not a module: abstract definitions cannot be loaded")]
    NotAModule { module: String },

    #[error("Cyclic module dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("Module '{module}' depends on '{dependency}', which was never discovered")]
    UnknownDependency { module: String, dependency: String },

    #[error("Failed to activate module '{module}': {source}")]
    ActivationFailed {
        module: String,
        #[source]
        source: BoxError,
    },
}
