//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes (and bus publishes); we call
//! `world.flush()` after running so queued work is applied before assertions.

use std::time::Duration;

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::common::tunables::Tunables;
use crate::plugins::bus::EventBus;
use crate::plugins::core::{FrameDriver, GameRng, Playfield};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Replace the generic clock with one whose last tick lasted `delta`.
pub fn set_tick(world: &mut World, delta: Duration) {
    let mut t = world.remove_resource::<Time>().unwrap_or_default();
    t.advance_by(delta);
    world.insert_resource(t);
}

/// Bare world with the shared resources most gameplay systems read.
pub fn sim_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(Playfield::new(800.0, 600.0));
    world.insert_resource(GameRng::seeded(7));
    world.insert_resource(FrameDriver::running());
    world.init_resource::<EventBus>();
    world.insert_resource(Time::<()>::default());
    world
}

/// Headless app with every gameplay plugin. Each `update` advances the clock by
/// exactly one simulation tick, so FixedUpdate runs once per frame.
pub fn headless_app(tunables: Tunables) -> App {
    let tick = tunables.tick();
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(tunables)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick));
    crate::game::configure_headless(&mut app);
    app
}

/// Run frames until `state` is current, failing after a handful.
pub fn update_until(app: &mut App, state: crate::common::state::GameState) {
    for _ in 0..8 {
        if *app.world().resource::<State<crate::common::state::GameState>>().get() == state {
            return;
        }
        app.update();
    }
    panic!("never reached {state:?}");
}
