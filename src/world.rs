//! An in-process object graph implementing [`Host`].
//!
//! `World` is the reference host used by [`SingletonContext`](crate::SingletonContext):
//! objects live in a `BTreeMap` keyed by [`ObjectId`] so traversal order is
//! creation order, children die with their parent, and [`World::load_scene`]
//! tears down everything not marked persistent.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Host, ObjectId, RegistryError, RunMode};

struct HostObject {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    persistent: bool,
    components: Vec<Arc<dyn Any + Send + Sync>>,
}

pub struct World {
    objects: BTreeMap<ObjectId, HostObject>,
    next_id: u64,
    mode: RunMode,
}

impl Default for World {
    fn default() -> Self {
        Self::new(RunMode::default())
    }
}

impl World {
    pub fn new(mode: RunMode) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            mode,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RunMode) {
        self.mode = mode;
    }

    /// Creates an object parented under `parent`.
    pub fn spawn_child(&mut self, name: &str, parent: ObjectId) -> Result<ObjectId, RegistryError> {
        if !self.objects.contains_key(&parent) {
            return Err(RegistryError::ObjectNotFound(parent));
        }
        let id = self.spawn(name);
        if let Some(object) = self.objects.get_mut(&id) {
            object.parent = Some(parent);
        }
        if let Some(parent) = self.objects.get_mut(&parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    pub fn parent(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects.get(&object).and_then(|o| o.parent)
    }

    pub fn name(&self, object: ObjectId) -> Option<&str> {
        self.objects.get(&object).map(|o| o.name.as_str())
    }

    pub fn is_persistent(&self, object: ObjectId) -> bool {
        self.objects.get(&object).is_some_and(|o| o.persistent)
    }

    /// First component of type `T` attached to `object`.
    pub fn component<T: Any + Send + Sync>(&self, object: ObjectId) -> Option<Arc<T>> {
        self.objects
            .get(&object)?
            .components
            .iter()
            .find_map(|c| c.clone().downcast::<T>().ok())
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Simulates a scene reload: every root object not marked persistent is
    /// destroyed together with its descendants. Returns the destroyed count.
    pub fn load_scene(&mut self) -> usize {
        let before = self.objects.len();
        let doomed: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, o)| o.parent.is_none() && !o.persistent)
            .map(|(id, _)| *id)
            .collect();

        for id in doomed {
            self.destroy(id);
        }

        let destroyed = before - self.objects.len();
        log::info!("Scene loaded, {destroyed} objects destroyed");
        destroyed
    }

    /// Destroys every object, persistent or not.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Removes `object` from its parent's child list and clears its parent.
    fn unlink(&mut self, object: ObjectId) {
        let Some(parent) = self.objects.get_mut(&object).and_then(|o| o.parent.take()) else {
            return;
        };
        if let Some(parent) = self.objects.get_mut(&parent) {
            parent.children.retain(|child| *child != object);
        }
    }

    /// Ids of `object`'s direct children.
    pub fn children(&self, object: ObjectId) -> &[ObjectId] {
        self.objects
            .get(&object)
            .map(|o| o.children.as_slice())
            .unwrap_or_default()
    }
}

impl Host for World {
    fn is_playing(&self) -> bool {
        self.mode == RunMode::Playing
    }

    fn find_first<T: Any + Send + Sync>(&self) -> Option<(ObjectId, Arc<T>)> {
        self.objects.iter().find_map(|(id, o)| {
            o.components
                .iter()
                .find_map(|c| c.clone().downcast::<T>().ok())
                .map(|c| (*id, c))
        })
    }

    fn spawn(&mut self, name: &str) -> ObjectId {
        let id = ObjectId::from_raw(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            HostObject {
                name: name.to_string(),
                parent: None,
                children: Vec::new(),
                persistent: false,
                components: Vec::new(),
            },
        );
        log::trace!("Spawned object {id} ({name})");
        id
    }

    fn attach<T: Any + Send + Sync>(
        &mut self,
        object: ObjectId,
        component: Arc<T>,
    ) -> Result<(), RegistryError> {
        let target = self
            .objects
            .get_mut(&object)
            .ok_or(RegistryError::ObjectNotFound(object))?;
        target.components.push(component);
        Ok(())
    }

    fn destroy(&mut self, object: ObjectId) {
        self.unlink(object);

        let mut pending = vec![object];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.objects.remove(&id) {
                log::trace!("Destroyed object {id}");
                pending.extend(removed.children);
            }
        }
    }

    fn is_alive(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }

    fn detach_from_parent(&mut self, object: ObjectId) {
        self.unlink(object);
    }

    fn set_persistent(&mut self, object: ObjectId, persistent: bool) {
        if let Some(o) = self.objects.get_mut(&object) {
            o.persistent = persistent;
        }
    }
}
