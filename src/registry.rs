//! Type-keyed singleton slots with lazy find-or-create semantics.
//!
//! The registry maps each service type (`TypeId`) to at most one live
//! instance. Instances are attached to objects owned by a [`Host`]; the
//! registry only remembers which object carries each instance, and treats a
//! slot whose object has been destroyed as empty.
//!
//! # Examples
//!
//! ```
//! use singleton_runtime::{Singleton, SingletonRegistry, World};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Audio;
//! impl Singleton for Audio {}
//!
//! let mut world = World::default();
//! let mut registry = SingletonRegistry::new();
//!
//! let first: Arc<Audio> = registry.instance(&mut world).unwrap();
//! let second: Arc<Audio> = registry.instance(&mut world).unwrap();
//!
//! assert!(Arc::ptr_eq(&first, &second));
//! assert!(registry.has_instance::<Audio, _>(&world));
//! ```

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use crate::singleton::short_type_name;
use crate::{
    Host, ObjectId, Persistence, RegistryError, RegistryEvent, Singleton, TraceCallback,
};

/// One registered instance and the host object it is attached to.
struct Slot {
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
    object: ObjectId,
    persistence: Persistence,
}

impl Slot {
    fn holds<T: Any>(&self, instance: &Arc<T>) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.instance) as *const (),
            Arc::as_ptr(instance) as *const (),
        )
    }
}

/// Outcome of [`SingletonRegistry::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The instance now owns its type's slot.
    Registered,
    /// The instance already owned the slot; nothing changed.
    AlreadyRegistered,
    /// Another instance owns the slot; this one's host object was destroyed
    /// unless it also carries the owner.
    Rejected,
    /// The host is not playing; nothing was registered.
    Skipped,
}

/// Explicit per-type singleton registry.
///
/// All operations are synchronous and meant to be called from the thread
/// driving the simulation tick. Conflicts are resolved first-come: the first
/// instance registered for a type keeps the slot until its host object is
/// destroyed or the slot is released.
#[derive(Default)]
pub struct SingletonRegistry {
    slots: HashMap<TypeId, Slot>,
    trace: Option<Arc<TraceCallback>>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback invoked for every registry operation.
    ///
    /// Events are also written to the `log` facade regardless of the callback.
    pub fn set_trace_callback(&mut self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace = Some(Arc::new(callback));
    }

    /// Clears the tracing callback. Does not affect registered instances.
    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        match event {
            RegistryEvent::Get { .. } | RegistryEvent::Contains { .. } => log::trace!("{event}"),
            _ => log::debug!("{event}"),
        }
        if let Some(callback) = self.trace.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    fn live_slot<T: Any, H: Host>(&self, host: &H) -> Option<&Slot> {
        self.slots
            .get(&TypeId::of::<T>())
            .filter(|slot| host.is_alive(slot.object))
    }

    fn lookup<T: Singleton, H: Host>(&self, host: &H) -> Option<Arc<T>> {
        // Slots are keyed by `TypeId::of::<T>()`, so the downcast cannot fail.
        self.live_slot::<T, H>(host)
            .and_then(|slot| slot.instance.clone().downcast::<T>().ok())
    }

    /// Returns `true` iff a live instance of `T` is registered.
    pub fn has_instance<T: Singleton, H: Host>(&self, host: &H) -> bool {
        let found = self.live_slot::<T, H>(host).is_some();

        self.emit_event(&RegistryEvent::Contains {
            type_name: short_type_name::<T>(),
            found,
        });

        found
    }

    /// Returns the registered instance without creating one.
    pub fn try_get_instance<T: Singleton, H: Host>(&self, host: &H) -> Option<Arc<T>> {
        let instance = self.lookup::<T, H>(host);

        self.emit_event(&RegistryEvent::Get {
            type_name: short_type_name::<T>(),
            found: instance.is_some(),
        });

        instance
    }

    /// Host object carrying the registered instance of `T`.
    pub fn host_object<T: Singleton, H: Host>(&self, host: &H) -> Option<ObjectId> {
        self.live_slot::<T, H>(host).map(|slot| slot.object)
    }

    // -------------------------------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------------------------------

    /// Returns the instance of `T`, finding or creating it if needed.
    ///
    /// Resolution order:
    /// 1. the registered instance, if its host object is alive;
    /// 2. the first instance of `T` already present in the host, adopted
    ///    without running the creation hook;
    /// 3. a new `T::default()` attached to a freshly spawned object, followed
    ///    by exactly one call to [`Singleton::on_auto_create`].
    ///
    /// Repeated calls return the same `Arc` until the host object is destroyed.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotPlaying`] if nothing is registered and the host
    ///   is not playing; nothing is created in that case.
    /// - [`RegistryError::ObjectNotFound`] if the host refuses the attachment.
    pub fn instance<T: Singleton, H: Host>(&mut self, host: &mut H) -> Result<Arc<T>, RegistryError> {
        if let Some(instance) = self.lookup::<T, H>(host) {
            return Ok(instance);
        }

        let type_name = short_type_name::<T>();

        if !host.is_playing() {
            self.emit_event(&RegistryEvent::Skip { type_name });
            return Err(RegistryError::NotPlaying { type_name });
        }

        self.prune_type::<T, H>(host);

        if let Some((object, instance)) = host.find_first::<T>() {
            self.emit_event(&RegistryEvent::Discover { type_name, object });
            self.adopt(host, object, instance.clone());
            return Ok(instance);
        }

        let object = host.spawn(&T::object_name());
        let instance = Arc::new(T::default());
        if let Err(err) = host.attach(object, instance.clone()) {
            host.destroy(object);
            return Err(err);
        }

        self.emit_event(&RegistryEvent::AutoCreate { type_name, object });
        self.adopt(host, object, instance.clone());
        instance.on_auto_create(host, object);

        Ok(instance)
    }

    /// Forces the instance of `T` to exist, discarding the handle.
    pub fn start_singleton<T: Singleton, H: Host>(&mut self, host: &mut H) -> Result<(), RegistryError> {
        self.instance::<T, H>(host).map(|_| ())
    }

    /// Registers `instance`, which the caller has attached to `object`.
    ///
    /// Unlike [`activate`](Self::activate), a conflict leaves both instances
    /// untouched and is reported to the caller.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotPlaying`] outside play mode
    /// - [`RegistryError::ObjectNotFound`] if `object` is not alive
    /// - [`RegistryError::DuplicateInstance`] if another live instance owns the slot
    pub fn try_register<T: Singleton, H: Host>(
        &mut self,
        host: &mut H,
        object: ObjectId,
        instance: Arc<T>,
    ) -> Result<Arc<T>, RegistryError> {
        let type_name = short_type_name::<T>();

        if !host.is_playing() {
            self.emit_event(&RegistryEvent::Skip { type_name });
            return Err(RegistryError::NotPlaying { type_name });
        }

        if !host.is_alive(object) {
            return Err(RegistryError::ObjectNotFound(object));
        }

        match self.live_slot::<T, H>(host) {
            Some(slot) if slot.holds(&instance) => return Ok(instance),
            Some(slot) => {
                return Err(RegistryError::DuplicateInstance {
                    type_name,
                    existing: slot.object,
                    rejected: object,
                })
            }
            None => {}
        }

        self.prune_type::<T, H>(host);
        self.adopt(host, object, instance.clone());

        Ok(instance)
    }

    /// Activation hook for an instance the host has just enabled.
    ///
    /// The first active instance wins the slot; a later, different instance
    /// has its host object destroyed and its persistence mark removed, in
    /// that order. A duplicate attached to the winner's own object is rejected
    /// but its object is left alone. Outside play mode this is a no-op.
    pub fn activate<T: Singleton, H: Host>(
        &mut self,
        host: &mut H,
        object: ObjectId,
        instance: Arc<T>,
    ) -> Result<Activation, RegistryError> {
        let already = self
            .live_slot::<T, H>(host)
            .is_some_and(|slot| slot.holds(&instance));

        match self.try_register(host, object, instance) {
            Ok(_) if already => Ok(Activation::AlreadyRegistered),
            Ok(_) => Ok(Activation::Registered),
            Err(RegistryError::NotPlaying { .. }) => Ok(Activation::Skipped),
            Err(RegistryError::DuplicateInstance {
                type_name,
                existing,
                rejected,
            }) => {
                self.emit_event(&RegistryEvent::Reject {
                    type_name,
                    object: rejected,
                });
                if rejected == existing {
                    // Destroying the shared object would take the winner with it.
                    log::warn!(
                        "Singleton {type_name} already lives on {existing}, ignoring duplicate on the same object"
                    );
                } else {
                    log::warn!(
                        "Singleton {type_name} already lives on {existing}, destroying duplicate on {rejected}"
                    );
                    host.destroy(rejected);
                    host.set_persistent(rejected, false);
                }
                Ok(Activation::Rejected)
            }
            Err(err) => Err(err),
        }
    }

    fn adopt<T: Singleton, H: Host>(&mut self, host: &mut H, object: ObjectId, instance: Arc<T>) {
        let persistence = T::persistence();
        if let Persistence::Persistent(options) = persistence {
            if options.unparent_on_activate {
                host.detach_from_parent(object);
            }
            host.set_persistent(object, true);
        }

        let type_name = short_type_name::<T>();
        self.slots.insert(
            TypeId::of::<T>(),
            Slot {
                type_name,
                instance,
                object,
                persistence,
            },
        );

        self.emit_event(&RegistryEvent::Register { type_name, object });
    }

    // -------------------------------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------------------------------

    fn prune_type<T: Any, H: Host>(&mut self, host: &H) {
        let key = TypeId::of::<T>();
        let stale = self
            .slots
            .get(&key)
            .is_some_and(|slot| !host.is_alive(slot.object));

        if stale {
            if let Some(slot) = self.slots.remove(&key) {
                self.emit_event(&RegistryEvent::Release {
                    type_name: slot.type_name,
                    object: slot.object,
                });
            }
        }
    }

    /// Drops every slot whose host object is no longer alive.
    ///
    /// Returns the number of slots removed.
    pub fn prune<H: Host>(&mut self, host: &H) -> usize {
        let stale: Vec<TypeId> = self
            .slots
            .iter()
            .filter(|(_, slot)| !host.is_alive(slot.object))
            .map(|(key, _)| *key)
            .collect();

        for key in &stale {
            if let Some(slot) = self.slots.remove(key) {
                self.emit_event(&RegistryEvent::Release {
                    type_name: slot.type_name,
                    object: slot.object,
                });
            }
        }

        stale.len()
    }

    /// Destroys the host object of the registered `T` and empties the slot.
    ///
    /// Returns `false` if no live instance was registered.
    pub fn release<T: Singleton, H: Host>(&mut self, host: &mut H) -> bool {
        let Some(slot) = self.slots.remove(&TypeId::of::<T>()) else {
            return false;
        };

        let alive = host.is_alive(slot.object);
        if slot.persistence.is_persistent() {
            host.set_persistent(slot.object, false);
        }
        host.destroy(slot.object);

        self.emit_event(&RegistryEvent::Release {
            type_name: slot.type_name,
            object: slot.object,
        });

        alive
    }

    /// Removes all slots without touching host objects.
    ///
    /// Already-retrieved `Arc<T>` handles remain valid.
    pub fn clear(&mut self) {
        self.emit_event(&RegistryEvent::Clear {});
        self.slots.clear();
    }

    /// Number of slots, stale ones included until pruned.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RunMode, World};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Audio {
        volume: Mutex<f32>,
    }

    impl Singleton for Audio {}

    #[derive(Default)]
    struct Counted;

    static AUTO_CREATED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Mixer;

    impl Singleton for Mixer {}

    impl Singleton for Counted {
        fn on_auto_create<H: Host>(&self, _host: &mut H, _object: ObjectId) {
            AUTO_CREATED.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_instance_is_stable() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        assert!(!registry.has_instance::<Audio, _>(&world));

        let first: Arc<Audio> = registry.instance(&mut world).unwrap();
        *first.volume.lock().unwrap() = 0.5;
        let second: Arc<Audio> = registry.instance(&mut world).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.volume.lock().unwrap(), 0.5);
        assert!(registry.has_instance::<Audio, _>(&world));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_auto_created_object_name() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        registry.start_singleton::<Audio, _>(&mut world).unwrap();
        let object = registry.host_object::<Audio, _>(&world).unwrap();
        assert_eq!(world.name(object), Some("Audio - AutoCreated"));
    }

    #[test]
    fn test_try_get_does_not_create() {
        let mut world = World::default();
        let registry = SingletonRegistry::new();

        assert!(registry.try_get_instance::<Audio, _>(&world).is_none());
        assert!(world.is_empty());

        world.spawn("unrelated");
        assert!(registry.try_get_instance::<Audio, _>(&world).is_none());
    }

    #[test]
    fn test_creation_hook_runs_once() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();
        let before = AUTO_CREATED.load(Ordering::SeqCst);

        registry.instance::<Counted, _>(&mut world).unwrap();
        registry.instance::<Counted, _>(&mut world).unwrap();
        registry.start_singleton::<Counted, _>(&mut world).unwrap();

        assert_eq!(AUTO_CREATED.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_discovers_existing_instance() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let object = world.spawn("placed");
        let placed = Arc::new(Audio::default());
        world.attach(object, placed.clone()).unwrap();

        let found: Arc<Audio> = registry.instance(&mut world).unwrap();
        assert!(Arc::ptr_eq(&found, &placed));
        assert_eq!(registry.host_object::<Audio, _>(&world), Some(object));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_not_playing_creates_nothing() {
        let mut world = World::new(RunMode::Editing);
        let mut registry = SingletonRegistry::new();

        let result = registry.instance::<Audio, _>(&mut world);
        assert_eq!(
            result.err(),
            Some(RegistryError::NotPlaying { type_name: "Audio" })
        );
        assert!(world.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_destroyed_instance_is_replaced() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let first: Arc<Audio> = registry.instance(&mut world).unwrap();
        let object = registry.host_object::<Audio, _>(&world).unwrap();
        world.destroy(object);

        assert!(!registry.has_instance::<Audio, _>(&world));

        let second: Arc<Audio> = registry.instance(&mut world).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_try_register_rejects_duplicate_without_side_effects() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let a = world.spawn("a");
        let b = world.spawn("b");
        let first = Arc::new(Audio::default());
        let second = Arc::new(Audio::default());
        world.attach(a, first.clone()).unwrap();
        world.attach(b, second.clone()).unwrap();

        registry.try_register(&mut world, a, first).unwrap();
        let err = registry.try_register(&mut world, b, second).unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateInstance {
                type_name: "Audio",
                existing: a,
                rejected: b,
            }
        );
        assert!(world.is_alive(b));
    }

    #[test]
    fn test_try_register_same_instance_is_ok() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let a = world.spawn("a");
        let audio = Arc::new(Audio::default());
        world.attach(a, audio.clone()).unwrap();

        registry.try_register(&mut world, a, audio.clone()).unwrap();
        let again = registry.try_register(&mut world, a, audio.clone()).unwrap();
        assert!(Arc::ptr_eq(&again, &audio));
    }

    #[test]
    fn test_try_register_missing_object() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();
        let ghost = ObjectId::from_raw(42);

        let err = registry
            .try_register(&mut world, ghost, Arc::new(Audio::default()))
            .unwrap_err();
        assert_eq!(err, RegistryError::ObjectNotFound(ghost));
    }

    #[test]
    fn test_activate_first_wins() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let objects: Vec<ObjectId> = (0..4).map(|i| world.spawn(&format!("audio {i}"))).collect();
        let instances: Vec<Arc<Audio>> = objects.iter().map(|_| Arc::new(Audio::default())).collect();

        let outcomes: Vec<Activation> = objects
            .iter()
            .zip(&instances)
            .map(|(object, instance)| {
                registry
                    .activate(&mut world, *object, instance.clone())
                    .unwrap()
            })
            .collect();

        assert_eq!(
            outcomes,
            vec![
                Activation::Registered,
                Activation::Rejected,
                Activation::Rejected,
                Activation::Rejected,
            ]
        );
        assert_eq!(world.len(), 1);
        let survivor: Arc<Audio> = registry.instance(&mut world).unwrap();
        assert!(Arc::ptr_eq(&survivor, &instances[0]));
    }

    #[test]
    fn test_duplicate_on_owner_object_keeps_owner() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let object = world.spawn("audio");
        let owner = Arc::new(Audio::default());
        let extra = Arc::new(Audio::default());
        world.attach(object, owner.clone()).unwrap();
        world.attach(object, extra.clone()).unwrap();

        assert_eq!(
            registry.activate(&mut world, object, owner.clone()),
            Ok(Activation::Registered)
        );
        assert_eq!(
            registry.activate(&mut world, object, extra),
            Ok(Activation::Rejected)
        );

        assert!(world.is_alive(object));
        assert!(registry.has_instance::<Audio, _>(&world));
        let survivor: Arc<Audio> = registry.instance(&mut world).unwrap();
        assert!(Arc::ptr_eq(&survivor, &owner));
    }

    #[test]
    fn test_activate_twice_is_already_registered() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let object = world.spawn("audio");
        let audio = Arc::new(Audio::default());

        assert_eq!(
            registry.activate(&mut world, object, audio.clone()),
            Ok(Activation::Registered)
        );
        assert_eq!(
            registry.activate(&mut world, object, audio),
            Ok(Activation::AlreadyRegistered)
        );
    }

    #[test]
    fn test_activate_outside_play_mode_is_skipped() {
        let mut world = World::new(RunMode::Editing);
        let mut registry = SingletonRegistry::new();

        let object = world.spawn("audio");
        let outcome = registry.activate(&mut world, object, Arc::new(Audio::default()));

        assert_eq!(outcome, Ok(Activation::Skipped));
        assert!(registry.is_empty());
        assert!(world.is_alive(object));
    }

    #[test]
    fn test_prune_and_release() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        registry.start_singleton::<Audio, _>(&mut world).unwrap();
        registry.start_singleton::<Mixer, _>(&mut world).unwrap();

        let audio_object = registry.host_object::<Audio, _>(&world).unwrap();
        world.destroy(audio_object);

        assert_eq!(registry.prune(&world), 1);
        assert_eq!(registry.len(), 1);

        assert!(registry.release::<Mixer, _>(&mut world));
        assert!(!registry.release::<Mixer, _>(&mut world));
        assert!(world.is_empty());
    }

    #[test]
    fn test_clear_keeps_handles_valid() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let audio: Arc<Audio> = registry.instance(&mut world).unwrap();
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(*audio.volume.lock().unwrap(), 0.0);
    }

    #[test]
    fn test_trace_callback_auto_create_events() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        registry.start_singleton::<Audio, _>(&mut world).unwrap();
        let _ = registry.has_instance::<Audio, _>(&world);

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "auto_create { type_name: Audio, object: #1 }",
                "register { type_name: Audio, object: #1 }",
                "contains { type_name: Audio, found: true }",
            ]
        );
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        let mut world = World::default();
        let mut registry = SingletonRegistry::new();

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        registry.set_trace_callback(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let _ = registry.try_get_instance::<Audio, _>(&world);
        registry.clear_trace_callback();
        registry.start_singleton::<Audio, _>(&mut world).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
