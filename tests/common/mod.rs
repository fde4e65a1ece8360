//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` + `StatesPlugin` provide the ECS runtime and state machine.
//! - `bevy_dodge::game::configure_headless` installs the gameplay plugins.
//! - the clock advances exactly one simulation tick per `app.update()`.

#![allow(dead_code)]

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use bevy_dodge::common::state::GameState;
use bevy_dodge::common::tunables::Tunables;
use bevy_dodge::plugins::input::{ControlInput, ControlKey};

pub fn app_headless(tunables: Tunables) -> App {
    let tick = tunables.tick();
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(tunables)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick));

    bevy_dodge::game::configure_headless(&mut app);
    app
}

pub fn seeded() -> Tunables {
    Tunables { seed: Some(11), ..default() }
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

pub fn update_until(app: &mut App, target: GameState) {
    for _ in 0..8 {
        if state(app) == target {
            return;
        }
        app.update();
    }
    panic!("stuck in {:?}, expected {target:?}", state(app));
}

pub fn press(app: &mut App, key: ControlKey) {
    app.world_mut().write_message(ControlInput::down(key));
}

pub fn release(app: &mut App, key: ControlKey) {
    app.world_mut().write_message(ControlInput::up(key));
}

/// Boot, pass the start screen and return with a live session.
pub fn playing(tunables: Tunables) -> App {
    let mut app = app_headless(tunables);
    update_until(&mut app, GameState::StartScreen);
    press(&mut app, ControlKey::Start);
    update_until(&mut app, GameState::Playing);
    app
}

pub fn count<C: Component>(app: &mut App) -> usize {
    app.world_mut().query::<&C>().iter(app.world()).count()
}
