//! Fade driver example for singleton-runtime.
//!
//! Demonstrates:
//! - A lazily auto-created service with a creation hook
//! - A countdown timer driven at a fixed simulation step
//! - Cancelling an in-flight fade before starting a new one
//! - A persistent service surviving scene loads
//!
//! Run with: `cargo run --example fade_driver`

use singleton_runtime::{
    CountdownTimer, Host, ObjectId, Persistence, Singleton, SingletonContext, World,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

const FIXED_STEP: f32 = 0.02;

/// Screen overlay whose alpha follows a countdown.
#[derive(Default)]
struct ScreenFade {
    fade: Mutex<Option<(CountdownTimer, bool)>>,
    alpha: Mutex<f32>,
}

impl Singleton for ScreenFade {
    fn on_auto_create<H: Host>(&self, _host: &mut H, object: ObjectId) {
        println!("   [hook] ScreenFade auto-created on {object}");
    }
}

impl ScreenFade {
    /// Starts a fade to black (`to_clear == false`) or to clear.
    fn start(&self, seconds: f32, to_clear: bool) {
        let mut slot = self.fade.lock().unwrap();
        if slot.take().is_some() {
            println!("   cancelled in-flight fade");
        }

        let mut timer = CountdownTimer::new(seconds);
        timer.on_stop(move || println!("   fade finished (to_clear: {to_clear})"));
        timer.start();
        *slot = Some((timer, to_clear));
    }

    fn tick(&self, delta: f32) {
        let mut slot = self.fade.lock().unwrap();
        if let Some((timer, to_clear)) = slot.as_mut() {
            timer.update(delta);
            let progress = timer.progress();
            *self.alpha.lock().unwrap() = if *to_clear { 1.0 - progress } else { progress };
        }
    }

    fn alpha(&self) -> f32 {
        *self.alpha.lock().unwrap()
    }
}

/// Counts loaded levels; lives for the whole session.
#[derive(Default)]
struct Session {
    levels: AtomicU32,
}

impl Singleton for Session {
    fn persistence() -> Persistence {
        Persistence::persistent()
    }
}

fn run_ticks(ctx: &mut SingletonContext, ticks: usize) {
    for _ in 0..ticks {
        ctx.instance::<ScreenFade>().unwrap().tick(FIXED_STEP);
    }
}

fn describe(world: &World) -> String {
    format!("{} objects alive", world.len())
}

fn main() {
    println!("=== singleton-runtime: Fade Driver ===\n");

    let mut ctx = SingletonContext::default();

    // -------------------------------------------------------------------------
    // 1. Lazy creation through the registry
    // -------------------------------------------------------------------------
    println!("1. Fading to black...");
    let fade: Arc<ScreenFade> = ctx.instance().unwrap();
    fade.start(0.5, false);
    run_ticks(&mut ctx, 10);
    println!("   alpha after 10 ticks: {:.2}", fade.alpha());

    // -------------------------------------------------------------------------
    // 2. Restart mid-fade
    // -------------------------------------------------------------------------
    println!("\n2. Switching to a fade to clear mid-way...");
    fade.start(0.5, true);
    run_ticks(&mut ctx, 30);
    println!("   alpha: {:.2}", fade.alpha());

    // -------------------------------------------------------------------------
    // 3. Scene loads
    // -------------------------------------------------------------------------
    println!("\n3. Loading scenes...");
    for level in 1..=3 {
        let session: Arc<Session> = ctx.instance().unwrap();
        session.levels.fetch_add(1, Ordering::SeqCst);
        let destroyed = ctx.load_scene();
        println!(
            "   level {level}: destroyed {destroyed}, {}",
            describe(ctx.world())
        );
    }

    let session: Arc<Session> = ctx.instance().unwrap();
    println!("   session saw {} levels", session.levels.load(Ordering::SeqCst));
    println!(
        "   ScreenFade still registered: {}",
        ctx.has_instance::<ScreenFade>()
    );

    ctx.shutdown();
    println!("\n=== Done ===");
}
