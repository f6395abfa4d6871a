//! # Strata Core Lifecycle Errors
use crate::kernel::error::BoxError;
use crate::lifecycle::{LifecyclePhase, LifecycleState};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Module '{module}' failed during phase {phase}: {source}")]
    PhaseExecutionFailed {
        module: String,
        phase: LifecyclePhase,
        #[source]
        source: BoxError,
    },

    #[error("Cancelled while running phase {phase} for module '{module}'")]
    Cancelled { module: String, phase: LifecyclePhase },

    #[error("Cannot run {operation} in lifecycle state {actual}, expected {expected}")]
    InvalidState {
        operation: &'static str,
        expected: LifecycleState,
        actual: LifecycleState,
    },

    #[error("Module '{module}' has no instance for phase {phase}")]
    ModuleNotActivated { module: String, phase: LifecyclePhase },
}

impl LifecycleError {
    /// Module the error names, if any.
    pub fn module(&self) -> Option<&str> {
        match self {
            LifecycleError::PhaseExecutionFailed { module, .. }
            | LifecycleError::Cancelled { module, .. }
            | LifecycleError::ModuleNotActivated { module, .. } => Some(module),
            LifecycleError::InvalidState { .. } => None,
        }
    }

    pub fn phase(&self) -> Option<LifecyclePhase> {
        match self {
            LifecycleError::PhaseExecutionFailed { phase, .. }
            | LifecycleError::Cancelled { phase, .. }
            | LifecycleError::ModuleNotActivated { phase, .. } => Some(*phase),
            LifecycleError::InvalidState { .. } => None,
        }
    }
}
