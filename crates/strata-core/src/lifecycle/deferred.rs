use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

type DeferredAction = Box<dyn Fn(&mut dyn Any) + Send + Sync>;

struct ActionList {
    type_name: &'static str,
    actions: Vec<DeferredAction>,
}

/// Configuration actions recorded before the settings they target exist.
///
/// Actions are kept per settings type in registration order and are never
/// removed: every replay applies the whole list again, so actions should be
/// idempotent when a settings type is built more than once.
#[derive(Default)]
pub struct DeferredActionRegistry {
    entries: HashMap<TypeId, ActionList>,
}

impl DeferredActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S, F>(&mut self, action: F)
    where
        S: 'static,
        F: Fn(&mut S) + Send + Sync + 'static,
    {
        let erased: DeferredAction = Box::new(move |target: &mut dyn Any| {
            if let Some(settings) = target.downcast_mut::<S>() {
                action(settings);
            }
        });
        self.entries
            .entry(TypeId::of::<S>())
            .or_insert_with(|| ActionList {
                type_name: type_name::<S>(),
                actions: Vec::new(),
            })
            .actions
            .push(erased);
    }

    /// Apply every action registered for `S`, oldest first. Returns how many ran.
    pub fn replay<S: 'static>(&self, settings: &mut S) -> usize {
        let Some(list) = self.entries.get(&TypeId::of::<S>()) else {
            return 0;
        };
        let target: &mut dyn Any = settings;
        for action in &list.actions {
            action(&mut *target);
        }
        log::debug!(
            "Replayed {} deferred action(s) onto '{}'",
            list.actions.len(),
            list.type_name
        );
        list.actions.len()
    }

    /// Build `S` from its default and replay every action onto it.
    pub fn replay_into_default<S: Default + 'static>(&self) -> S {
        let mut settings = S::default();
        self.replay(&mut settings);
        settings
    }

    pub fn action_count<S: 'static>(&self) -> usize {
        self.entries
            .get(&TypeId::of::<S>())
            .map(|list| list.actions.len())
            .unwrap_or(0)
    }

    pub fn contains<S: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<S>())
    }

    /// Number of settings types with at least one action.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DeferredActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for list in self.entries.values() {
            map.entry(&list.type_name, &list.actions.len());
        }
        map.finish()
    }
}
