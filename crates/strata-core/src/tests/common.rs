#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::kernel::container::ServiceContainer;
use crate::kernel::error::BoxError;
use crate::lifecycle::{
    ApplicationContext, ConfigureContext, LifecyclePhase, PostConfigureContext, PreConfigureContext,
};
use crate::module_system::{HookResult, Module, ModuleDefinition, ModuleType};

/// Records every hook invocation as `"<Phase>:<Module>"`.
#[derive(Debug, Default)]
pub struct HookLog {
    entries: Mutex<Vec<String>>,
}

impl HookLog {
    pub fn record(&self, phase: LifecyclePhase, module: &str) {
        self.entries.lock().unwrap().push(format!("{}:{}", phase, module));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Modules that ran `phase`, in call order.
    pub fn modules_in(&self, phase: LifecyclePhase) -> Vec<String> {
        let prefix = format!("{}:", phase);
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// Phases that ran at least once, in first-seen order.
    pub fn phases(&self) -> Vec<String> {
        let mut phases: Vec<String> = Vec::new();
        for entry in self.entries() {
            let phase = entry.split(':').next().unwrap_or_default().to_string();
            if !phases.contains(&phase) {
                phases.push(phase);
            }
        }
        phases
    }
}

/// Makes the named module's hook fail in the given phase.
#[derive(Debug)]
pub struct FailOn {
    pub module: &'static str,
    pub phase: LifecyclePhase,
}

/// Container pre-seeded with a fresh [`HookLog`].
pub fn seeded_container() -> (Arc<ServiceContainer>, Arc<HookLog>) {
    let services = Arc::new(ServiceContainer::new());
    let log = Arc::new(HookLog::default());
    services.register_singleton(log.clone());
    (services, log)
}

pub fn seeded_container_failing(module: &'static str, phase: LifecyclePhase) -> (Arc<ServiceContainer>, Arc<HookLog>) {
    let (services, log) = seeded_container();
    services.register(FailOn { module, phase });
    (services, log)
}

/// Shared behaviour of the recording modules below.
pub struct Recorder {
    name: &'static str,
    log: Arc<HookLog>,
    fail_on: Option<Arc<FailOn>>,
}

impl Recorder {
    pub fn new(name: &'static str, services: &ServiceContainer) -> Self {
        Self {
            name,
            log: services.get::<HookLog>().unwrap_or_default(),
            fail_on: services.get::<FailOn>(),
        }
    }

    pub fn hook(&self, phase: LifecyclePhase) -> HookResult {
        self.log.record(phase, self.name);
        match &self.fail_on {
            Some(fail) if fail.module == self.name && fail.phase == phase => {
                Err(format!("{} refused to run {}", self.name, phase).into())
            }
            _ => Ok(()),
        }
    }
}

/// Declares a module that records each hook into the container's [`HookLog`].
macro_rules! recording_module {
    ($name:ident $(=> [$($dep:ty),* $(,)?])?) => {
        pub struct $name {
            recorder: $crate::tests::common::Recorder,
        }

        #[async_trait::async_trait]
        impl $crate::module_system::Module for $name {
            async fn pre_configure(&self, _ctx: &mut $crate::lifecycle::PreConfigureContext<'_>) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::PreConfigure)
            }
            async fn configure(&self, _ctx: &mut $crate::lifecycle::ConfigureContext<'_>) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::Configure)
            }
            async fn post_configure(&self, _ctx: &mut $crate::lifecycle::PostConfigureContext<'_>) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::PostConfigure)
            }
            async fn pre_initialize(&self, _ctx: &$crate::lifecycle::ApplicationContext) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::PreInitialize)
            }
            async fn initialize(&self, _ctx: &$crate::lifecycle::ApplicationContext) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::Initialize)
            }
            async fn post_initialize(&self, _ctx: &$crate::lifecycle::ApplicationContext) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::PostInitialize)
            }
            async fn shutdown(&self, _ctx: &$crate::lifecycle::ApplicationContext) -> $crate::module_system::HookResult {
                self.recorder.hook($crate::lifecycle::LifecyclePhase::Shutdown)
            }
        }

        impl $crate::module_system::ModuleDefinition for $name {
            fn dependencies() -> Vec<$crate::module_system::ModuleType> {
                vec![$($($crate::module_system::ModuleType::of::<$dep>()),*)?]
            }

            fn create(services: &$crate::kernel::container::ServiceContainer) -> ::std::result::Result<Self, $crate::kernel::error::BoxError> {
                Ok(Self {
                    recorder: $crate::tests::common::Recorder::new(stringify!($name), services),
                })
            }
        }
    };
}

// Chain: ModA -> ModB -> ModC
recording_module!(ModA => [ModB]);
recording_module!(ModB => [ModC]);
recording_module!(ModC);

// Two-node cycle
recording_module!(CycleA => [CycleB]);
recording_module!(CycleB => [CycleA]);

recording_module!(SelfLoop => [SelfLoop]);

// Diamond: Top -> Left, Right; Left, Right -> Base
recording_module!(Top => [Left, Right]);
recording_module!(Left => [Base]);
recording_module!(Right => [Base]);
recording_module!(Base);

recording_module!(Lonely);

/// A shared base that must never be loaded on its own.
pub struct AbstractBase;

impl Module for AbstractBase {}

impl ModuleDefinition for AbstractBase {
    const ABSTRACT: bool = true;

    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Err("abstract modules cannot be created".into())
    }
}

/// Root that pulls in the abstract base.
pub struct UsesAbstract;

impl Module for UsesAbstract {}

impl ModuleDefinition for UsesAbstract {
    fn dependencies() -> Vec<ModuleType> {
        vec![ModuleType::of::<AbstractBase>()]
    }

    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Ok(UsesAbstract)
    }
}

/// Settings owned by [`CounterOwner`] and adjusted by [`CounterContributor`],
/// which loads after the owner.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CounterSettings {
    pub counter: u32,
    pub labels: Vec<String>,
}

/// Registers a deferred increment of [`CounterSettings`] during PreConfigure.
pub struct CounterContributor;

#[async_trait]
impl Module for CounterContributor {
    async fn pre_configure(&self, ctx: &mut PreConfigureContext<'_>) -> HookResult {
        ctx.pre_configure::<CounterSettings, _>(|settings| {
            settings.counter += 1;
            settings.labels.push("contributor".to_string());
        });
        Ok(())
    }
}

impl ModuleDefinition for CounterContributor {
    fn dependencies() -> Vec<ModuleType> {
        vec![ModuleType::of::<CounterOwner>()]
    }

    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Ok(CounterContributor)
    }
}

/// Builds [`CounterSettings`] during Configure and registers it as a service.
pub struct CounterOwner;

#[async_trait]
impl Module for CounterOwner {
    async fn configure(&self, ctx: &mut ConfigureContext<'_>) -> HookResult {
        let settings = ctx.build_pre_configured::<CounterSettings>();
        ctx.services().register(settings);
        Ok(())
    }

    async fn post_configure(&self, ctx: &mut PostConfigureContext<'_>) -> HookResult {
        ctx.resolve::<CounterSettings>()?;
        Ok(())
    }

    async fn initialize(&self, ctx: &ApplicationContext) -> HookResult {
        let settings = ctx.resolve::<CounterSettings>()?;
        if settings.counter == 0 {
            return Err("deferred configuration was not applied".into());
        }
        Ok(())
    }
}

impl ModuleDefinition for CounterOwner {
    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Ok(CounterOwner)
    }
}
