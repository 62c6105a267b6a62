//! Cooperative timers driven once per simulation tick.
//!
//! [`Timer`] owns the shared start/stop/pause/resume state machine; the
//! [`TimerMode`] parameter only decides where time starts, how it advances,
//! when it expires and how progress is measured. Nothing here reads a clock:
//! callers feed elapsed seconds through [`Timer::update`].
//!
//! ```
//! use singleton_runtime::CountdownTimer;
//!
//! let mut timer = CountdownTimer::new(2.0);
//! timer.start();
//! timer.update(0.5);
//! assert_eq!(timer.progress(), 0.25);
//! timer.update(1.5);
//! assert!(timer.is_finished());
//! assert!(!timer.is_running());
//! ```

use std::fmt;
use std::marker::PhantomData;

type Callback = Box<dyn FnMut() + Send>;

/// Timing strategy of a [`Timer`].
pub trait TimerMode {
    /// Value the tracked time is reset to by [`Timer::start`].
    fn baseline(initial: f32) -> f32;

    /// Tracked time after `delta` seconds of running.
    fn advance(time: f32, initial: f32, delta: f32) -> f32;

    /// Whether the timer stops on its own at `time`.
    fn expired(time: f32) -> bool;

    /// Normalized progress. Must be finite for every input.
    fn progress(time: f32, initial: f32) -> f32;
}

/// Counts down from the initial duration and stops at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Countdown;

impl TimerMode for Countdown {
    fn baseline(initial: f32) -> f32 {
        initial
    }

    fn advance(time: f32, initial: f32, delta: f32) -> f32 {
        if time > 0.0 {
            (time - delta).clamp(0.0, initial)
        } else {
            time
        }
    }

    fn expired(time: f32) -> bool {
        time <= 0.0
    }

    fn progress(time: f32, initial: f32) -> f32 {
        if initial > 0.0 {
            1.0 - time / initial
        } else {
            1.0
        }
    }
}

/// Counts up without bound; never stops on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch;

impl TimerMode for Stopwatch {
    fn baseline(_initial: f32) -> f32 {
        0.0
    }

    fn advance(time: f32, _initial: f32, delta: f32) -> f32 {
        time + delta.max(0.0)
    }

    fn expired(_time: f32) -> bool {
        false
    }

    fn progress(time: f32, reference: f32) -> f32 {
        if reference > 0.0 {
            time / reference
        } else {
            0.0
        }
    }
}

pub type CountdownTimer = Timer<Countdown>;
pub type StopwatchTimer = Timer<Stopwatch>;

/// A tick-driven timer with start/stop listeners.
///
/// `start` and `stop` fire their listeners once per transition; `pause` and
/// `resume` flip the running flag silently.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct Timer<M> {
    initial: f32,
    time: f32,
    running: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    on_start: Vec<Callback>,
    #[cfg_attr(feature = "serde", serde(skip))]
    on_stop: Vec<Callback>,
    #[cfg_attr(feature = "serde", serde(skip))]
    mode: PhantomData<fn() -> M>,
}

fn clamp_duration(duration: f32) -> f32 {
    if !duration.is_finite() || duration < 0.0 {
        log::warn!("Invalid timer duration {duration}, clamping to 0");
        0.0
    } else {
        duration
    }
}

impl<M: TimerMode> Timer<M> {
    fn with_initial(initial: f32) -> Self {
        Self {
            initial: clamp_duration(initial),
            time: 0.0,
            running: false,
            on_start: Vec::new(),
            on_stop: Vec::new(),
            mode: PhantomData,
        }
    }

    /// Resets time to the baseline and, if stopped, starts running and
    /// fires the start listeners.
    ///
    /// Calling `start` on a running timer resets time without firing them
    /// again; use `stop` then `start` to restart observably.
    pub fn start(&mut self) {
        self.time = M::baseline(self.initial);
        if !self.running {
            self.running = true;
            for callback in &mut self.on_start {
                callback();
            }
        }
    }

    /// Stops a running timer and fires the stop listeners. No-op when stopped.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            for callback in &mut self.on_stop {
                callback();
            }
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Advances the timer by `delta` seconds if it is running.
    ///
    /// A non-finite `delta` is dropped so the tracked time stays finite.
    pub fn update(&mut self, delta: f32) {
        if !self.running {
            return;
        }

        if !delta.is_finite() {
            log::warn!("Ignoring non-finite timer delta {delta}");
            return;
        }

        self.time = M::advance(self.time, self.initial, delta);

        if M::expired(self.time) {
            self.stop();
        }
    }

    pub fn progress(&self) -> f32 {
        M::progress(self.time, self.initial)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn initial_time(&self) -> f32 {
        self.initial
    }

    /// Adds a listener fired on every stopped → running transition via `start`.
    pub fn on_start(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_start.push(Box::new(callback));
    }

    /// Adds a listener fired on every running → stopped transition via `stop`
    /// or expiry.
    pub fn on_stop(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_stop.push(Box::new(callback));
    }

    pub fn clear_listeners(&mut self) {
        self.on_start.clear();
        self.on_stop.clear();
    }
}

impl<M> fmt::Debug for Timer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("mode", &std::any::type_name::<M>())
            .field("initial", &self.initial)
            .field("time", &self.time)
            .field("running", &self.running)
            .field("on_start", &self.on_start.len())
            .field("on_stop", &self.on_stop.len())
            .finish()
    }
}

impl Timer<Countdown> {
    /// A stopped countdown of `duration` seconds.
    ///
    /// Remaining time is zero until the first `start` or `reset`.
    pub fn new(duration: f32) -> Self {
        Self::with_initial(duration)
    }

    pub fn remaining_time(&self) -> f32 {
        self.time
    }

    pub fn is_finished(&self) -> bool {
        self.time <= 0.0
    }

    /// Restores the full duration without touching the running flag.
    pub fn reset(&mut self) {
        self.time = self.initial;
    }

    /// Replaces the duration, restores it, and starts the timer if asked.
    pub fn reset_with(&mut self, duration: f32, start: bool) {
        self.initial = clamp_duration(duration);
        self.reset();
        if start {
            self.start();
        }
    }
}

impl Timer<Stopwatch> {
    pub fn new() -> Self {
        Self::with_initial(0.0)
    }

    /// A stopwatch whose `progress` is measured against `reference` seconds.
    pub fn with_reference(reference: f32) -> Self {
        Self::with_initial(reference)
    }

    pub fn set_reference(&mut self, reference: f32) {
        self.initial = clamp_duration(reference);
    }

    /// Elapsed running time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

impl Default for Timer<Stopwatch> {
    fn default() -> Self {
        Self::new()
    }
}
