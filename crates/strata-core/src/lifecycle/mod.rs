//! # Strata Core Lifecycle
//!
//! Drives loaded modules through seven phases in a fixed order:
//!
//! 1. `PreConfigure`: register deferred configuration, no service access.
//! 2. `Configure`: register services, build settings from deferred configuration.
//! 3. `PostConfigure`: read what other modules registered.
//! 4. `PreInitialize`, 5. `Initialize`, 6. `PostInitialize`: run against the
//!    built [`ApplicationContext`](context::ApplicationContext).
//! 7. `Shutdown`: reverse load order.
//!
//! Each phase completes for every module before the next phase begins. The
//! first failing hook stops the sweep.
use std::fmt;

pub mod context;
pub mod deferred;
pub mod error;
pub mod orchestrator;

pub use context::{
    ApplicationContext, ConfigurationContext, ConfigureContext, PostConfigureContext,
    PreConfigureContext,
};
pub use deferred::DeferredActionRegistry;
pub use error::LifecycleError;
pub use orchestrator::LifecycleOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    PreConfigure,
    Configure,
    PostConfigure,
    PreInitialize,
    Initialize,
    PostInitialize,
    Shutdown,
}

impl LifecyclePhase {
    pub const ALL: [LifecyclePhase; 7] = [
        LifecyclePhase::PreConfigure,
        LifecyclePhase::Configure,
        LifecyclePhase::PostConfigure,
        LifecyclePhase::PreInitialize,
        LifecyclePhase::Initialize,
        LifecyclePhase::PostInitialize,
        LifecyclePhase::Shutdown,
    ];

    pub const CONFIGURATION: [LifecyclePhase; 3] = [
        LifecyclePhase::PreConfigure,
        LifecyclePhase::Configure,
        LifecyclePhase::PostConfigure,
    ];

    pub const INITIALIZATION: [LifecyclePhase; 3] = [
        LifecyclePhase::PreInitialize,
        LifecyclePhase::Initialize,
        LifecyclePhase::PostInitialize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LifecyclePhase::PreConfigure => "PreConfigure",
            LifecyclePhase::Configure => "Configure",
            LifecyclePhase::PostConfigure => "PostConfigure",
            LifecyclePhase::PreInitialize => "PreInitialize",
            LifecyclePhase::Initialize => "Initialize",
            LifecyclePhase::PostInitialize => "PostInitialize",
            LifecyclePhase::Shutdown => "Shutdown",
        }
    }

    /// State reached once this phase has completed for every module.
    pub fn completed_state(&self) -> LifecycleState {
        match self {
            LifecyclePhase::PreConfigure => LifecycleState::PreConfigured,
            LifecyclePhase::Configure => LifecycleState::Configured,
            LifecyclePhase::PostConfigure => LifecycleState::PostConfigured,
            LifecyclePhase::PreInitialize => LifecycleState::PreInitialized,
            LifecyclePhase::Initialize => LifecycleState::Initialized,
            LifecyclePhase::PostInitialize => LifecycleState::Ready,
            LifecyclePhase::Shutdown => LifecycleState::Stopped,
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress of one bootstrap run through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    PreConfigured,
    Configured,
    PostConfigured,
    PreInitialized,
    Initialized,
    Ready,
    Stopped,
    /// A hook failed or was cancelled during the phase.
    Failed(LifecyclePhase),
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Failed(phase) => write!(f, "Failed({})", phase),
            other => write!(f, "{:?}", other),
        }
    }
}
