//! # Singleton Runtime
//!
//! Two runtime services for frame-driven, single-threaded applications:
//!
//! - a per-type singleton registry guaranteeing at most one live instance of
//!   each service type, with lazy find-or-create, a one-time creation hook,
//!   first-activated-wins conflict resolution and optional persistence across
//!   scene loads;
//! - cooperative countdown and stopwatch timers advanced once per tick.
//!
//! ## Quick Start
//!
//! ```rust
//! use singleton_runtime::{CountdownTimer, Singleton, SingletonContext};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Fader {
//!     timer: Mutex<Option<CountdownTimer>>,
//! }
//!
//! impl Singleton for Fader {}
//!
//! let mut ctx = SingletonContext::default();
//! let fader: Arc<Fader> = ctx.instance().unwrap();
//!
//! let mut timer = CountdownTimer::new(1.0);
//! timer.start();
//! timer.update(0.5);
//! *fader.timer.lock().unwrap() = Some(timer);
//!
//! let same: Arc<Fader> = ctx.instance().unwrap();
//! assert!(Arc::ptr_eq(&fader, &same));
//! ```
//!
//! ## Main Types
//!
//! - [`Singleton`] - the contract a service type implements
//! - [`SingletonRegistry`] - type-keyed slots over any [`Host`]
//! - [`SingletonContext`] - a [`World`] plus a registry with an explicit lifecycle
//! - [`define_context!`] - a process-wide context behind free functions
//! - [`CountdownTimer`] / [`StopwatchTimer`] - tick-driven timers

mod context;
mod host;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod singleton;
mod timer;
mod world;

pub use context::{ContextConfig, SingletonContext};
pub use host::{Host, ObjectId, RunMode};
pub use registry::{Activation, SingletonRegistry};
pub use registry_error::RegistryError;
pub use registry_event::{RegistryEvent, TraceCallback};
pub use singleton::{Persistence, PersistentOptions, Singleton};
pub use timer::{Countdown, CountdownTimer, Stopwatch, StopwatchTimer, Timer, TimerMode};
pub use world::World;
