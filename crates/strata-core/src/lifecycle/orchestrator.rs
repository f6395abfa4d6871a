use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::lifecycle::context::{
    ApplicationContext, ConfigurationContext, ConfigureContext, PostConfigureContext,
    PreConfigureContext,
};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::{LifecyclePhase, LifecycleState};
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::traits::{HookResult, Module};

type HookFuture<'a> = Pin<Box<dyn Future<Output = HookResult> + Send + 'a>>;
type ConfigurationHook = for<'a> fn(&'a dyn Module, &'a mut ConfigurationContext) -> HookFuture<'a>;
type ApplicationHook = for<'a> fn(&'a dyn Module, &'a ApplicationContext) -> HookFuture<'a>;

fn pre_configure_hook<'a>(module: &'a dyn Module, ctx: &'a mut ConfigurationContext) -> HookFuture<'a> {
    Box::pin(async move {
        let mut view = PreConfigureContext::new(ctx);
        module.pre_configure(&mut view).await
    })
}

fn configure_hook<'a>(module: &'a dyn Module, ctx: &'a mut ConfigurationContext) -> HookFuture<'a> {
    Box::pin(async move {
        let mut view = ConfigureContext::new(ctx);
        module.configure(&mut view).await
    })
}

fn post_configure_hook<'a>(module: &'a dyn Module, ctx: &'a mut ConfigurationContext) -> HookFuture<'a> {
    Box::pin(async move {
        let mut view = PostConfigureContext::new(ctx);
        module.post_configure(&mut view).await
    })
}

fn pre_initialize_hook<'a>(module: &'a dyn Module, ctx: &'a ApplicationContext) -> HookFuture<'a> {
    module.pre_initialize(ctx)
}

fn initialize_hook<'a>(module: &'a dyn Module, ctx: &'a ApplicationContext) -> HookFuture<'a> {
    module.initialize(ctx)
}

fn post_initialize_hook<'a>(module: &'a dyn Module, ctx: &'a ApplicationContext) -> HookFuture<'a> {
    module.post_initialize(ctx)
}

fn shutdown_hook<'a>(module: &'a dyn Module, ctx: &'a ApplicationContext) -> HookFuture<'a> {
    module.shutdown(ctx)
}

const CONFIGURATION_HOOKS: [(LifecyclePhase, ConfigurationHook); 3] = [
    (LifecyclePhase::PreConfigure, pre_configure_hook),
    (LifecyclePhase::Configure, configure_hook),
    (LifecyclePhase::PostConfigure, post_configure_hook),
];

const INITIALIZATION_HOOKS: [(LifecyclePhase, ApplicationHook); 3] = [
    (LifecyclePhase::PreInitialize, pre_initialize_hook),
    (LifecyclePhase::Initialize, initialize_hook),
    (LifecyclePhase::PostInitialize, post_initialize_hook),
];

/// Await a hook unless the token fires first. Completion wins a tie.
async fn guarded(token: &CancellationToken, hook: HookFuture<'_>) -> Option<HookResult> {
    tokio::select! {
        biased;
        result = hook => Some(result),
        _ = token.cancelled() => None,
    }
}

/// Runs lifecycle phases across loaded modules and tracks how far it got.
///
/// Modules run one at a time in the order given, which must be the dependency
/// order produced by [`build_and_sort`](crate::module_system::graph::build_and_sort).
#[derive(Debug)]
pub struct LifecycleOrchestrator {
    state: LifecycleState,
}

impl Default for LifecycleOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleOrchestrator {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Run PreConfigure, Configure and PostConfigure.
    pub async fn run_configuration_phases(
        &mut self,
        modules: &[ModuleDescriptor],
        ctx: &mut ConfigurationContext,
    ) -> Result<(), LifecycleError> {
        self.expect_state("configuration phases", LifecycleState::Uninitialized)?;
        for (phase, hook) in CONFIGURATION_HOOKS {
            self.log_phase_start(phase, modules.len());
            for descriptor in modules {
                let module = self.instance_of(descriptor, phase)?;
                let token = ctx.cancellation_token().clone();
                self.ensure_not_cancelled(&token, descriptor, phase)?;
                log::debug!("{} -> {}", phase, descriptor.name());
                let outcome = guarded(&token, hook(module.as_ref(), ctx)).await;
                self.settle(outcome, descriptor, phase)?;
            }
            self.complete(phase);
        }
        Ok(())
    }

    /// Run PreInitialize, Initialize and PostInitialize. Leaves the state `Ready`.
    pub async fn run_initialization_phases(
        &mut self,
        modules: &[ModuleDescriptor],
        ctx: &ApplicationContext,
    ) -> Result<(), LifecycleError> {
        self.expect_state("initialization phases", LifecycleState::PostConfigured)?;
        for (phase, hook) in INITIALIZATION_HOOKS {
            self.log_phase_start(phase, modules.len());
            for descriptor in modules {
                let module = self.instance_of(descriptor, phase)?;
                self.ensure_not_cancelled(ctx.cancellation_token(), descriptor, phase)?;
                log::debug!("{} -> {}", phase, descriptor.name());
                let outcome = guarded(ctx.cancellation_token(), hook(module.as_ref(), ctx)).await;
                self.settle(outcome, descriptor, phase)?;
            }
            self.complete(phase);
        }
        Ok(())
    }

    /// Run Shutdown in reverse load order. Stops at the first failing or
    /// cancelled hook, like the other sweeps.
    pub async fn shutdown(
        &mut self,
        modules: &[ModuleDescriptor],
        ctx: &ApplicationContext,
    ) -> Result<(), LifecycleError> {
        let phase = LifecyclePhase::Shutdown;
        self.expect_state("shutdown", LifecycleState::Ready)?;
        self.log_phase_start(phase, modules.len());
        for descriptor in modules.iter().rev() {
            let module = self.instance_of(descriptor, phase)?;
            self.ensure_not_cancelled(ctx.cancellation_token(), descriptor, phase)?;
            log::debug!("{} -> {}", phase, descriptor.name());
            let outcome = guarded(ctx.cancellation_token(), shutdown_hook(module.as_ref(), ctx)).await;
            self.settle(outcome, descriptor, phase)?;
        }
        self.complete(phase);
        Ok(())
    }

    fn expect_state(&self, operation: &'static str, expected: LifecycleState) -> Result<(), LifecycleError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                operation,
                expected,
                actual: self.state,
            })
        }
    }

    fn instance_of(
        &mut self,
        descriptor: &ModuleDescriptor,
        phase: LifecyclePhase,
    ) -> Result<Arc<dyn Module>, LifecycleError> {
        match descriptor.instance() {
            Some(instance) => Ok(instance.clone()),
            None => Err(self.fail(LifecycleError::ModuleNotActivated {
                module: descriptor.name().to_string(),
                phase,
            })),
        }
    }

    fn ensure_not_cancelled(
        &mut self,
        token: &CancellationToken,
        descriptor: &ModuleDescriptor,
        phase: LifecyclePhase,
    ) -> Result<(), LifecycleError> {
        if token.is_cancelled() {
            return Err(self.fail(LifecycleError::Cancelled {
                module: descriptor.name().to_string(),
                phase,
            }));
        }
        Ok(())
    }

    fn settle(
        &mut self,
        outcome: Option<HookResult>,
        descriptor: &ModuleDescriptor,
        phase: LifecyclePhase,
    ) -> Result<(), LifecycleError> {
        let module = descriptor.name().to_string();
        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(source)) => Err(self.fail(LifecycleError::PhaseExecutionFailed { module, phase, source })),
            None => Err(self.fail(LifecycleError::Cancelled { module, phase })),
        }
    }

    fn fail(&mut self, error: LifecycleError) -> LifecycleError {
        if let Some(phase) = error.phase() {
            self.state = LifecycleState::Failed(phase);
        }
        log::error!("{}", error);
        error
    }

    fn log_phase_start(&self, phase: LifecyclePhase, module_count: usize) {
        log::debug!("Starting phase {} for {} module(s)", phase, module_count);
    }

    fn complete(&mut self, phase: LifecyclePhase) {
        self.state = phase.completed_state();
        log::debug!("Phase {} complete", phase);
    }
}
