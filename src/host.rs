//! The host-runtime surface the registry depends on.
//!
//! A host owns an object graph: objects can be spawned, parented, destroyed,
//! marked to survive scene loads, and carry typed components. The registry
//! never stores objects itself; it only remembers which [`ObjectId`] each
//! singleton is attached to and asks the host whether that object still lives.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifier of an object in the host's graph.
///
/// Ids are handed out in creation order, which is also the traversal order
/// used by [`Host::find_first`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the host is actually executing or only being edited.
///
/// Singleton registration only happens while [`RunMode::Playing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunMode {
    #[default]
    Playing,
    Editing,
}

/// Object-graph primitives consumed by [`SingletonRegistry`](crate::SingletonRegistry).
pub trait Host {
    /// `true` while the host is in an actively executing mode.
    fn is_playing(&self) -> bool;

    /// First live component of type `T`, in traversal order.
    fn find_first<T: Any + Send + Sync>(&self) -> Option<(ObjectId, Arc<T>)>;

    /// Creates a new root object.
    fn spawn(&mut self, name: &str) -> ObjectId;

    /// Attaches a component to a live object.
    fn attach<T: Any + Send + Sync>(
        &mut self,
        object: ObjectId,
        component: Arc<T>,
    ) -> Result<(), crate::RegistryError>;

    /// Destroys an object and all its descendants. Unknown ids are ignored.
    fn destroy(&mut self, object: ObjectId);

    fn is_alive(&self, object: ObjectId) -> bool;

    /// Moves the object to the root of the graph.
    fn detach_from_parent(&mut self, object: ObjectId);

    /// Marks (or unmarks) the object to survive scene loads.
    fn set_persistent(&mut self, object: ObjectId, persistent: bool);
}
