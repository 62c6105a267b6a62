//! Macro for declaring a process-wide singleton context.

/// Declares a module holding one process-wide [`SingletonContext`](crate::SingletonContext).
///
/// The macro generates a module containing:
/// - a lazily created, mutex-guarded context slot (hidden)
/// - `init` / `init_with` / `shutdown` / `is_initialized` lifecycle functions
/// - `with` for arbitrary access, plus free functions for the common calls
///
/// Every function except the lifecycle ones returns
/// [`RegistryError::NotInitialized`](crate::RegistryError::NotInitialized)
/// before `init` or after `shutdown`.
///
/// # Examples
///
/// ```rust
/// use singleton_runtime::{define_context, Singleton};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Scoreboard;
/// impl Singleton for Scoreboard {}
///
/// define_context!(game);
///
/// game::init();
/// let a: Arc<Scoreboard> = game::instance().unwrap();
/// let b: Arc<Scoreboard> = game::instance().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// game::shutdown();
///
/// assert!(game::instance::<Scoreboard>().is_err());
/// ```
///
/// # Restrictions
///
/// The context lock is held while `with` runs its closure and while
/// [`Singleton::on_auto_create`](crate::Singleton::on_auto_create) runs.
/// Calling back into the same generated module from there deadlocks; use the
/// `host` handed to the hook instead.
#[macro_export]
macro_rules! define_context {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

            // Process-wide context slot (module-private)
            static CONTEXT: LazyLock<Mutex<Option<$crate::SingletonContext>>> =
                LazyLock::new(|| Mutex::new(None));

            fn lock() -> MutexGuard<'static, Option<$crate::SingletonContext>> {
                CONTEXT.lock().unwrap_or_else(|p| p.into_inner())
            }

            /// Creates the context in play mode, replacing any existing one.
            pub fn init() {
                init_with($crate::ContextConfig::default())
            }

            /// Creates the context with `config`, replacing any existing one.
            pub fn init_with(config: $crate::ContextConfig) {
                let previous = lock().replace($crate::SingletonContext::new(config));
                if let Some(mut previous) = previous {
                    previous.shutdown();
                }
            }

            /// Tears the context down. No-op when not initialized.
            pub fn shutdown() {
                let current = lock().take();
                if let Some(mut current) = current {
                    current.shutdown();
                }
            }

            pub fn is_initialized() -> bool {
                lock().is_some()
            }

            /// Runs `f` with exclusive access to the context.
            pub fn with<R>(
                f: impl FnOnce(&mut $crate::SingletonContext) -> R,
            ) -> Result<R, $crate::RegistryError> {
                lock()
                    .as_mut()
                    .map(f)
                    .ok_or($crate::RegistryError::NotInitialized)
            }

            pub fn instance<T: $crate::Singleton>() -> Result<Arc<T>, $crate::RegistryError> {
                with(|ctx| ctx.instance::<T>())?
            }

            pub fn try_get_instance<T: $crate::Singleton>() -> Result<Option<Arc<T>>, $crate::RegistryError> {
                with(|ctx| ctx.try_get_instance::<T>())
            }

            pub fn has_instance<T: $crate::Singleton>() -> bool {
                with(|ctx| ctx.has_instance::<T>()).unwrap_or(false)
            }

            pub fn start_singleton<T: $crate::Singleton>() -> Result<(), $crate::RegistryError> {
                with(|ctx| ctx.start_singleton::<T>())?
            }

            /// Reloads the scene, returning the number of destroyed objects.
            pub fn load_scene() -> Result<usize, $crate::RegistryError> {
                with(|ctx| ctx.load_scene())
            }

            /// Set a tracing callback on the context's registry.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) -> Result<(), $crate::RegistryError> {
                with(|ctx| ctx.registry_mut().set_trace_callback(callback))
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() -> Result<(), $crate::RegistryError> {
                with(|ctx| ctx.registry_mut().clear_trace_callback())
            }
        }
    };
}
