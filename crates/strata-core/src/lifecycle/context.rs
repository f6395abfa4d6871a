use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ConfigData;
use crate::kernel::container::{ContainerError, ServiceContainer};
use crate::lifecycle::deferred::DeferredActionRegistry;

/// State shared by the three configuration phases of one bootstrap run.
///
/// Modules never see this directly; each phase hands out a view exposing only
/// what is legal in that phase.
pub struct ConfigurationContext {
    services: Arc<ServiceContainer>,
    deferred: DeferredActionRegistry,
    items: HashMap<String, Box<dyn Any + Send + Sync>>,
    configuration: Arc<ConfigData>,
    cancellation: CancellationToken,
}

impl ConfigurationContext {
    pub fn new(
        services: Arc<ServiceContainer>,
        configuration: Arc<ConfigData>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            services,
            deferred: DeferredActionRegistry::new(),
            items: HashMap::new(),
            configuration,
            cancellation,
        }
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    pub fn deferred(&self) -> &DeferredActionRegistry {
        &self.deferred
    }

    pub fn configuration(&self) -> &ConfigData {
        &self.configuration
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn item<T: 'static + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.items.get(key).and_then(|item| item.downcast_ref::<T>())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl fmt::Debug for ConfigurationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationContext")
            .field("services", &self.services)
            .field("deferred", &self.deferred)
            .field("items", &self.items.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Accessors every configuration phase view shares: provisional items keyed by
/// name, the application configuration, and cancellation.
macro_rules! shared_accessors {
    () => {
        /// Store a provisional item, replacing any value under the same key.
        pub fn set_item<T: 'static + Send + Sync>(&mut self, key: &str, value: T) {
            self.inner.items.insert(key.to_string(), Box::new(value));
        }

        pub fn item<T: 'static + Send + Sync>(&self, key: &str) -> Option<&T> {
            self.inner.item(key)
        }

        pub fn item_mut<T: 'static + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
            self.inner
                .items
                .get_mut(key)
                .and_then(|item| item.downcast_mut::<T>())
        }

        pub fn has_item(&self, key: &str) -> bool {
            self.inner.items.contains_key(key)
        }

        pub fn configuration(&self) -> &ConfigData {
            &self.inner.configuration
        }

        pub fn cancellation_token(&self) -> &CancellationToken {
            &self.inner.cancellation
        }

        pub fn is_cancelled(&self) -> bool {
            self.inner.cancellation.is_cancelled()
        }
    };
}

/// View handed to `pre_configure` hooks. Services are not reachable.
pub struct PreConfigureContext<'a> {
    inner: &'a mut ConfigurationContext,
}

impl<'a> PreConfigureContext<'a> {
    pub(crate) fn new(inner: &'a mut ConfigurationContext) -> Self {
        Self { inner }
    }

    /// Record an action for settings type `S`, replayed once `S` is built.
    pub fn pre_configure<S, F>(&mut self, action: F)
    where
        S: 'static,
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        self.inner.deferred.add::<S, F>(action);
    }

    shared_accessors!();
}

/// View handed to `configure` hooks.
pub struct ConfigureContext<'a> {
    inner: &'a mut ConfigurationContext,
}

impl<'a> ConfigureContext<'a> {
    pub(crate) fn new(inner: &'a mut ConfigurationContext) -> Self {
        Self { inner }
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.inner.services
    }

    /// Apply every deferred action for `S` to `settings`. Returns how many ran.
    pub fn replay_pre_configured<S: 'static>(&self, settings: &mut S) -> usize {
        self.inner.deferred.replay(settings)
    }

    /// `S::default()` with every deferred action for `S` applied.
    pub fn build_pre_configured<S: Default + 'static>(&self) -> S {
        self.inner.deferred.replay_into_default()
    }

    pub fn pre_configured_count<S: 'static>(&self) -> usize {
        self.inner.deferred.action_count::<S>()
    }

    shared_accessors!();
}

/// View handed to `post_configure` hooks: configure access plus lookups of
/// what other modules registered.
pub struct PostConfigureContext<'a> {
    inner: &'a mut ConfigurationContext,
}

impl<'a> PostConfigureContext<'a> {
    pub(crate) fn new(inner: &'a mut ConfigurationContext) -> Self {
        Self { inner }
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.inner.services
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.inner.services.resolve::<T>()
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.services.get::<T>()
    }

    pub fn replay_pre_configured<S: 'static>(&self, settings: &mut S) -> usize {
        self.inner.deferred.replay(settings)
    }

    pub fn build_pre_configured<S: Default + 'static>(&self) -> S {
        self.inner.deferred.replay_into_default()
    }

    pub fn pre_configured_count<S: 'static>(&self) -> usize {
        self.inner.deferred.action_count::<S>()
    }

    shared_accessors!();
}

/// Context for the initialization phases and shutdown, once every service is
/// registered.
#[derive(Clone, Debug)]
pub struct ApplicationContext {
    services: Arc<ServiceContainer>,
    configuration: Arc<ConfigData>,
    cancellation: CancellationToken,
}

impl ApplicationContext {
    pub fn new(
        services: Arc<ServiceContainer>,
        configuration: Arc<ConfigData>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            services,
            configuration,
            cancellation,
        }
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.services.resolve::<T>()
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services.get::<T>()
    }

    pub fn configuration(&self) -> &ConfigData {
        &self.configuration
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
