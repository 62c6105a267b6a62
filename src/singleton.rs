//! The contract a service type implements to be managed by the registry.

use std::any::Any;

use crate::{Host, ObjectId};

/// Options for singletons that survive scene loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistentOptions {
    /// Detach the host object from its parent on activation, so that an
    /// ancestor being torn down cannot take the singleton with it.
    pub unparent_on_activate: bool,
}

impl Default for PersistentOptions {
    fn default() -> Self {
        Self {
            unparent_on_activate: true,
        }
    }
}

/// Lifetime policy of a singleton's host object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Persistence {
    /// Torn down with the scene.
    #[default]
    Ephemeral,
    /// Marked to survive scene loads.
    Persistent(PersistentOptions),
}

impl Persistence {
    pub fn persistent() -> Self {
        Self::Persistent(PersistentOptions::default())
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

/// A service type with at most one live instance per registry.
///
/// Auto-created instances are built with [`Default`], attached to a fresh
/// host object named by [`Singleton::object_name`], and then handed to
/// [`Singleton::on_auto_create`] exactly once.
///
/// # Examples
///
/// ```rust
/// use singleton_runtime::{Host, ObjectId, Persistence, Singleton};
///
/// #[derive(Default)]
/// struct AudioMixer;
///
/// impl Singleton for AudioMixer {
///     fn persistence() -> Persistence {
///         Persistence::persistent()
///     }
///
///     fn on_auto_create<H: Host>(&self, _host: &mut H, object: ObjectId) {
///         println!("mixer created on {object}");
///     }
/// }
/// ```
pub trait Singleton: Any + Default + Send + Sync {
    fn persistence() -> Persistence {
        Persistence::Ephemeral
    }

    /// Name given to the host object on the auto-created path.
    fn object_name() -> String {
        format!("{} - AutoCreated", short_type_name::<Self>())
    }

    /// One-time setup on the auto-created path. The instance is already
    /// attached to `object` and registered.
    fn on_auto_create<H: Host>(&self, _host: &mut H, _object: ObjectId) {}
}

/// Last path segment of `T`'s type name, generics included.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FadeScreen;

    impl Singleton for FadeScreen {}

    #[test]
    fn test_default_object_name() {
        assert_eq!(FadeScreen::object_name(), "FadeScreen - AutoCreated");
    }

    #[test]
    fn test_short_type_name_keeps_generics() {
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec<u8>");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_default_persistence_is_ephemeral() {
        assert_eq!(FadeScreen::persistence(), Persistence::Ephemeral);
        assert!(!Persistence::Ephemeral.is_persistent());
    }

    #[test]
    fn test_persistent_options_unparent_by_default() {
        assert_eq!(
            Persistence::persistent(),
            Persistence::Persistent(PersistentOptions {
                unparent_on_activate: true
            })
        );
    }
}
