//! Progression plugin: the `Loading -> StartScreen -> Playing <-> GameOver` machine.
//!
//! ```text
//! Loading ──(visuals resolved)──> StartScreen ──(P)──> Playing ──(GameOver bus event)──> GameOver
//!                                                         ^                                  │
//!                                                         └───────────────(P)────────────────┘
//! ```
//!
//! Entering `Playing` runs three chained sets:
//! 1. `Teardown`: drop session subscriptions, dispose timers, release the trail, reset the score.
//! 2. `Spawn`: plugins build their session entities and scoped subscriptions.
//! 3. `Start`: restart the frame driver and publish `GameStarted`.
//!
//! Entities from the previous session carry `DespawnOnExit(GameOver)` and are gone
//! before `OnEnter(Playing)` runs.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::common::error::TransitionError;
use crate::common::state::GameState;
use crate::common::timers::Disposable;
use crate::plugins::ability::AbilityResource;
use crate::plugins::bus::{self, BusEvent, PublishExt, Topic};
use crate::plugins::core::FrameDriver;
use crate::plugins::input::{ControlInput, ControlKey};
use crate::plugins::projectiles::CooldownGate;
use crate::plugins::score::ScoreBoard;
use crate::plugins::trail::release_trail;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSet {
    Teardown,
    Spawn,
    Start,
}

/// Tracks the last accepted transition request, so that repeated requests made
/// before `StateTransition` runs are validated against the pending target.
#[derive(Resource, Debug, Default)]
pub struct Progression {
    current: GameState,
}

impl Progression {
    #[inline]
    pub fn current(&self) -> GameState {
        self.current
    }

    /// Accepts `next` when the machine allows it, returning the state we left.
    pub fn advance(&mut self, next: GameState) -> Result<GameState, TransitionError> {
        let prev = self.current;
        if !prev.can_transition_to(next) {
            return Err(TransitionError::Invalid { from: prev, to: next });
        }
        self.current = next;
        Ok(prev)
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Progression>()
        .configure_sets(
            OnEnter(GameState::Playing),
            (SessionSet::Teardown, SessionSet::Spawn, SessionSet::Start).chain(),
        )
        .add_systems(
            OnEnter(GameState::Playing),
            (
                (teardown_session, release_trail).chain().in_set(SessionSet::Teardown),
                start_session.in_set(SessionSet::Start),
            ),
        )
        .add_systems(OnEnter(GameState::StartScreen), show_start_prompt)
        .add_systems(OnEnter(GameState::GameOver), stop_session)
        .add_systems(Update, start_trigger);

    let world = app.world_mut();
    bus::subscribe(world, Topic::GameOver, on_game_over);
    bus::subscribe(world, Topic::GameStateChange, log_state_change);
}

/// Validate `next`, queue it on `NextState` and announce it on the bus.
pub fn request_transition(world: &mut World, next: GameState) -> Result<(), TransitionError> {
    let prev = world.get_resource_or_init::<Progression>().advance(next)?;
    if let Some(mut pending) = world.get_resource_mut::<NextState<GameState>>() {
        pending.set(next);
    }
    bus::publish(world, BusEvent::GameStateChange { prev, next });
    Ok(())
}

pub trait TransitionExt {
    fn request_transition(&mut self, next: GameState);
}

impl TransitionExt for Commands<'_, '_> {
    fn request_transition(&mut self, next: GameState) {
        self.queue(move |world: &mut World| {
            if let Err(err) = request_transition(world, next) {
                debug!("ignored: {err}");
            }
        });
    }
}

fn dispose<R: Resource + Disposable>(world: &mut World) {
    if let Some(mut r) = world.get_resource_mut::<R>() {
        r.dispose();
    }
}

fn teardown_session(world: &mut World) {
    let released = bus::release_scoped(world);
    dispose::<AbilityResource>(world);
    dispose::<CooldownGate>(world);
    if let Some(mut score) = world.get_resource_mut::<ScoreBoard>() {
        score.reset();
    }
    info!("session teardown, {released} scoped handlers released");
}

fn start_session(mut commands: Commands, mut driver: ResMut<FrameDriver>) {
    driver.start();
    commands.publish(BusEvent::GameStarted);
    info!("session started");
}

fn stop_session(mut driver: ResMut<FrameDriver>) {
    driver.stop();
    info!("game over, press P to play again");
}

fn show_start_prompt() {
    info!("press P to start");
}

/// Reads every frame so presses made while playing are consumed there. Only
/// the start and game-over screens act on them.
fn start_trigger(
    mut commands: Commands,
    state: Res<State<GameState>>,
    mut controls: MessageReader<ControlInput>,
) {
    let pressed = controls.read().filter(|c| c.is_press(ControlKey::Start)).count() > 0;
    if pressed && matches!(state.get(), GameState::StartScreen | GameState::GameOver) {
        commands.request_transition(GameState::Playing);
    }
}

fn on_game_over(_: In<BusEvent>, mut commands: Commands) {
    commands.request_transition(GameState::GameOver);
}

fn log_state_change(In(event): In<BusEvent>) {
    if let BusEvent::GameStateChange { prev, next } = event {
        info!("state {prev:?} -> {next:?}");
    }
}
