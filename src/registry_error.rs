use thiserror::Error;

use crate::ObjectId;

/// Errors surfaced by the explicit registry and context APIs.
///
/// The activation path ([`SingletonRegistry::activate`](crate::SingletonRegistry::activate))
/// absorbs `NotPlaying` and `DuplicateInstance` into an
/// [`Activation`](crate::Activation) outcome instead of returning them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registration was attempted while the host is not in play mode.
    #[error("Host is not playing, skipped singleton {type_name}")]
    NotPlaying { type_name: &'static str },

    /// Another instance of the type already owns the slot.
    #[error("Singleton {type_name} already registered on {existing}, rejected {rejected}")]
    DuplicateInstance {
        type_name: &'static str,
        existing: ObjectId,
        rejected: ObjectId,
    },

    /// The host object does not exist (never spawned or already destroyed).
    #[error("Host object {0} not found")]
    ObjectNotFound(ObjectId),

    /// The process-wide context was used before `init` or after `shutdown`.
    #[error("Singleton context is not initialized")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_playing_display() {
        let err = RegistryError::NotPlaying { type_name: "Audio" };
        assert_eq!(err.to_string(), "Host is not playing, skipped singleton Audio");
    }

    #[test]
    fn test_duplicate_display() {
        let err = RegistryError::DuplicateInstance {
            type_name: "Audio",
            existing: ObjectId::from_raw(1),
            rejected: ObjectId::from_raw(4),
        };
        assert_eq!(
            err.to_string(),
            "Singleton Audio already registered on #1, rejected #4"
        );
    }

    #[test]
    fn test_object_not_found_display() {
        let err = RegistryError::ObjectNotFound(ObjectId::from_raw(7));
        assert_eq!(err.to_string(), "Host object #7 not found");
    }

    #[test]
    fn test_equality() {
        assert_eq!(RegistryError::NotInitialized, RegistryError::NotInitialized);
        assert_ne!(
            RegistryError::NotInitialized,
            RegistryError::NotPlaying { type_name: "u8" }
        );
    }

    #[test]
    fn test_error_trait() {
        let err: &dyn std::error::Error = &RegistryError::NotInitialized;
        assert_eq!(err.to_string(), "Singleton context is not initialized");
    }
}
