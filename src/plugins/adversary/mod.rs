//! Adversary plugin: a stationary shooter at the playfield centre.
//!
//! ---------------------------
//! BEHAVIOUR
//! ---------------------------
//! - Turns toward the player every tick along the shortest arc.
//! - Owns one cancellable fire timer. `GameStarted` arms it for the first shot;
//!   every shot re-arms it with `interval + U[0, jitter)`.
//! - Telegraphs each shot: during the last `warning_ms` its tint slides from the
//!   base colour toward the warning colour.
//! - A shot launches one hazard from the adversary's position at the player's
//!   current position.
//!
//! ---------------------------
//! TIME MODEL
//! ---------------------------
//! The fire timer ticks on `Time` deltas inside the gated simulation chain, so it
//! freezes with everything else when the frame driver halts.

use std::time::Duration;

use bevy::color::Mix;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::error::InitError;
use crate::common::state::GameState;
use crate::common::timers::{Cadence, TimerSlot};
use crate::common::tunables::{AdversaryTunables, Tunables, hex_color};
use crate::plugins::assets::Visuals;
use crate::plugins::bus::{self, BodyRole, BusEvent, Topic};
use crate::plugins::core::{GameRng, Playfield, SimSet};
use crate::plugins::hazards::spawn_hazard;
use crate::plugins::player::Player;
use crate::plugins::progression::SessionSet;
use crate::plugins::world::{Appearance, MovingBody, heading_of, turn_toward};

// -----------------------------------------------------------------------------
// Newtypes
// -----------------------------------------------------------------------------

/// Value normalised to [0..1]; clamped once on write.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitF32(f32);

impl UnitF32 {
    #[inline]
    pub fn new_clamped(v: f32) -> Self {
        Self(v.clamp(0.0, 1.0))
    }
    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    First,
    Regular,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Adversary {
    fire: TimerSlot<Shot>,
}

impl Adversary {
    /// Time until the next shot, if armed.
    #[inline]
    pub fn next_shot_in(&self) -> Option<Duration> {
        self.fire.remaining()
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.fire.is_pending()
    }

    pub fn arm_first(&mut self, params: &AdversaryTunables) {
        self.fire.schedule(Shot::First, Cadence::Once(Duration::from_millis(params.first_shot_ms)));
    }

    fn arm_next(&mut self, params: &AdversaryTunables, rng: &mut GameRng) {
        let delay = params.shot_interval_ms + rng.millis_upto(params.shot_jitter_ms);
        self.fire.schedule(Shot::Regular, Cadence::Once(Duration::from_millis(delay)));
    }

    /// How far into the warning window we are; zero outside it or when disarmed.
    pub fn warning(&self, params: &AdversaryTunables) -> UnitF32 {
        let window = Duration::from_millis(params.warning_ms);
        match self.fire.remaining() {
            Some(left) if left < window && !window.is_zero() => {
                UnitF32::new_clamped(1.0 - left.as_secs_f32() / window.as_secs_f32())
            }
            _ => UnitF32::default(),
        }
    }
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Playing), spawn_adversary.in_set(SessionSet::Spawn))
        .add_systems(FixedUpdate, fire_at_player.in_set(SimSet::Timers))
        .add_systems(FixedUpdate, track_player.in_set(SimSet::Physics))
        .add_systems(FixedUpdate, warning_tint.in_set(SimSet::Effects));
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

fn spawn_adversary(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Res<Playfield>,
    visuals: Option<Res<Visuals>>,
) {
    if visuals.is_none() {
        error!("adversary spawn skipped: {}", InitError::MissingVisuals);
        return;
    }

    let params = &tunables.adversary;
    commands.spawn((
        Name::new("Adversary"),
        Adversary::default(),
        BodyRole::Adversary,
        MovingBody::new(field.center(), params.size * 0.5),
        Appearance::new(hex_color(params.tint), params.size),
        DespawnOnExit(GameState::GameOver),
    ));

    commands.queue(|world: &mut World| {
        bus::subscribe_scoped(world, Topic::GameStarted, arm_on_start);
    });
}

fn arm_on_start(_: In<BusEvent>, tunables: Res<Tunables>, mut q: Query<&mut Adversary>) {
    for mut adversary in &mut q {
        adversary.arm_first(&tunables.adversary);
        debug!("adversary armed");
    }
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

fn track_player(
    tunables: Res<Tunables>,
    q_player: Query<&MovingBody, (With<Player>, Without<Adversary>)>,
    mut q_adversary: Query<&mut MovingBody, With<Adversary>>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    for mut body in &mut q_adversary {
        let target = heading_of(player.position - body.position, body.facing);
        body.facing = turn_toward(body.facing, target, tunables.adversary.tracking_lerp);
    }
}

fn fire_at_player(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    q_player: Query<&MovingBody, (With<Player>, Without<Adversary>)>,
    mut q_adversary: Query<(&MovingBody, &mut Adversary)>,
) {
    let params = &tunables.adversary;
    for (body, mut adversary) in &mut q_adversary {
        if adversary.fire.tick(time.delta()).is_none() {
            continue;
        }
        if let Ok(player) = q_player.single() {
            spawn_hazard(&mut commands, params, &mut rng, body.position, player.position);
        }
        adversary.arm_next(params, &mut rng);
    }
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

fn warning_tint(tunables: Res<Tunables>, mut q: Query<(&Adversary, &mut Appearance)>) {
    let params = &tunables.adversary;
    let base = hex_color(params.tint).to_srgba();
    let warn = hex_color(params.warning_tint).to_srgba();

    for (adversary, mut look) in &mut q {
        let t = adversary.warning(params).get();
        look.tint = Color::Srgba(base.mix(&warn, t));
    }
}
