use async_trait::async_trait;
use strata_core::{ApplicationContext, BoxError, HookResult, Module, ModuleDefinition, ModuleType, ServiceContainer};

/// Keeps the greeting text. Only reachable as a dependency of [`GreetingModule`].
pub struct GreetingStore {
    greeting: String,
}

impl GreetingStore {
    pub fn greeting(&self) -> &str {
        &self.greeting
    }
}

impl Module for GreetingStore {}

impl ModuleDefinition for GreetingStore {
    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Ok(GreetingStore {
            greeting: "hello from a package".to_string(),
        })
    }
}

pub struct GreetingModule;

#[async_trait]
impl Module for GreetingModule {
    async fn initialize(&self, _ctx: &ApplicationContext) -> HookResult {
        log::info!("greeting module initialized");
        Ok(())
    }
}

impl ModuleDefinition for GreetingModule {
    fn dependencies() -> Vec<ModuleType> {
        vec![ModuleType::of::<GreetingStore>()]
    }

    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Ok(GreetingModule)
    }
}

/// Registered by the package but never loaded.
pub struct Greeter;

impl Module for Greeter {}

impl ModuleDefinition for Greeter {
    const ABSTRACT: bool = true;

    fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
        Err("greeter is abstract".into())
    }
}

strata_core::export_modules!(GreetingModule, Greeter);
