use crate::ObjectId;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the
/// registry is interacted with.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`SingletonRegistry::set_trace_callback`](crate::SingletonRegistry::set_trace_callback)
/// and mirrored to the `log` facade at debug level.
///
/// # Examples
///
/// ```rust
/// use singleton_runtime::{ObjectId, RegistryEvent};
///
/// let event = RegistryEvent::Register {
///     type_name: "Audio",
///     object: ObjectId::from_raw(1),
/// };
/// assert_eq!(event.to_string(), "register { type_name: Audio, object: #1 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// An instance took ownership of its type's slot.
    Register {
        type_name: &'static str,
        object: ObjectId,
    },

    /// An existing instance was found in the host and adopted.
    Discover {
        type_name: &'static str,
        object: ObjectId,
    },

    /// No instance existed, a host object was spawned for a new one.
    AutoCreate {
        type_name: &'static str,
        object: ObjectId,
    },

    /// A second instance activated while the slot was taken.
    Reject {
        type_name: &'static str,
        object: ObjectId,
    },

    /// Activation outside play mode was skipped.
    Skip { type_name: &'static str },

    /// A value was requested without creating one.
    Get { type_name: &'static str, found: bool },

    /// A type existence check was performed.
    Contains { type_name: &'static str, found: bool },

    /// A slot was emptied because its host object is gone or was released.
    Release {
        type_name: &'static str,
        object: ObjectId,
    },

    /// The registry was cleared.
    Clear {},
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register { type_name, object } => {
                write!(f, "register {{ type_name: {type_name}, object: {object} }}")
            }
            RegistryEvent::Discover { type_name, object } => {
                write!(f, "discover {{ type_name: {type_name}, object: {object} }}")
            }
            RegistryEvent::AutoCreate { type_name, object } => {
                write!(f, "auto_create {{ type_name: {type_name}, object: {object} }}")
            }
            RegistryEvent::Reject { type_name, object } => {
                write!(f, "reject {{ type_name: {type_name}, object: {object} }}")
            }
            RegistryEvent::Skip { type_name } => write!(f, "skip {{ type_name: {type_name} }}"),
            RegistryEvent::Get { type_name, found } => {
                write!(f, "get {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::Contains { type_name, found } => {
                write!(f, "contains {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::Release { type_name, object } => {
                write!(f, "release {{ type_name: {type_name}, object: {object} }}")
            }
            RegistryEvent::Clear {} => write!(f, "Clearing the Registry"),
        }
    }
}
