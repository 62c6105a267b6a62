//! The runtime context owning the object graph and the singleton registry.
//!
//! A [`SingletonContext`] is created explicitly, lives for as long as the
//! application runs, and is torn down with [`SingletonContext::shutdown`].
//! Tests build a fresh context per case; applications that want one
//! process-wide context can generate it with [`define_context!`](crate::define_context).

use std::sync::Arc;

use crate::{
    Activation, Host, ObjectId, RegistryError, RunMode, Singleton, SingletonRegistry, World,
};

/// Startup options of a [`SingletonContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextConfig {
    /// Registration only happens while [`RunMode::Playing`].
    pub mode: RunMode,
}

impl ContextConfig {
    pub fn editing() -> Self {
        Self {
            mode: RunMode::Editing,
        }
    }
}

#[derive(Default)]
pub struct SingletonContext {
    world: World,
    registry: SingletonRegistry,
}

impl SingletonContext {
    pub fn new(config: ContextConfig) -> Self {
        log::info!("Singleton context initialized in {:?} mode", config.mode);
        Self {
            world: World::new(config.mode),
            registry: SingletonRegistry::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn registry(&self) -> &SingletonRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SingletonRegistry {
        &mut self.registry
    }

    pub fn set_mode(&mut self, mode: RunMode) {
        self.world.set_mode(mode);
    }

    pub fn instance<T: Singleton>(&mut self) -> Result<Arc<T>, RegistryError> {
        self.registry.instance(&mut self.world)
    }

    pub fn try_get_instance<T: Singleton>(&self) -> Option<Arc<T>> {
        self.registry.try_get_instance(&self.world)
    }

    pub fn has_instance<T: Singleton>(&self) -> bool {
        self.registry.has_instance::<T, _>(&self.world)
    }

    pub fn start_singleton<T: Singleton>(&mut self) -> Result<(), RegistryError> {
        self.registry.start_singleton::<T, _>(&mut self.world)
    }

    /// Spawns a root object carrying `instance` and activates it, the way a
    /// scene-authored object comes alive.
    pub fn spawn_with<T: Singleton>(
        &mut self,
        name: &str,
        instance: T,
    ) -> Result<(ObjectId, Activation), RegistryError> {
        let object = self.world.spawn(name);
        self.activate_on(object, instance)
    }

    /// Like [`spawn_with`](Self::spawn_with), parented under `parent`.
    pub fn spawn_child_with<T: Singleton>(
        &mut self,
        name: &str,
        parent: ObjectId,
        instance: T,
    ) -> Result<(ObjectId, Activation), RegistryError> {
        let object = self.world.spawn_child(name, parent)?;
        self.activate_on(object, instance)
    }

    fn activate_on<T: Singleton>(
        &mut self,
        object: ObjectId,
        instance: T,
    ) -> Result<(ObjectId, Activation), RegistryError> {
        let instance = Arc::new(instance);
        self.world.attach(object, instance.clone())?;
        let activation = self.registry.activate(&mut self.world, object, instance)?;
        Ok((object, activation))
    }

    /// Reloads the scene: non-persistent objects are destroyed and the slots
    /// they carried are emptied. Returns the number of destroyed objects.
    pub fn load_scene(&mut self) -> usize {
        let destroyed = self.world.load_scene();
        self.registry.prune(&self.world);
        destroyed
    }

    /// Drops every singleton and every object, persistent ones included.
    pub fn shutdown(&mut self) {
        self.registry.clear();
        self.world.clear();
        log::info!("Singleton context shut down");
    }
}
