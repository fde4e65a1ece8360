//! Player plugin.
//!
//! Pipeline:
//! - OnEnter(Playing) / SessionSet::Spawn: spawn at the centre with a random heading,
//!   register the session's `SpeedChange`/`GameOver` handlers
//! - FixedUpdate / SimSet::Physics: integrate, smooth the facing, reflect off the edges
//!
//! The body's speed always equals the active tier's speed. Bounce perturbations are
//! renormalised in the same tick.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::error::InitError;
use crate::common::state::GameState;
use crate::common::tunables::{Tunables, hex_color};
use crate::plugins::assets::Visuals;
use crate::plugins::bus::{self, BodyRole, BusEvent, PublishExt, Topic};
use crate::plugins::core::{GameRng, Playfield, SimSet};
use crate::plugins::progression::SessionSet;
use crate::plugins::world::{Appearance, MovingBody, heading_of, reflect_inside, turn_toward};

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Playing), spawn.in_set(SessionSet::Spawn))
        .add_systems(FixedUpdate, move_player.in_set(SimSet::Physics));
}

/// Random heading at `speed`, nudged away from the axes so no launch is nearly
/// horizontal or vertical.
pub fn initial_velocity(rng: &mut GameRng, speed: f32, min_axis: f32) -> Vec2 {
    let mut v = Vec2::from_angle(rng.angle()) * speed;
    let min_axis = min_axis.min(speed * std::f32::consts::FRAC_1_SQRT_2);
    for c in [&mut v.x, &mut v.y] {
        if c.abs() < min_axis {
            let sign = if *c == 0.0 {
                if rng.coin() { 1.0 } else { -1.0 }
            } else {
                c.signum()
            };
            *c = sign * min_axis;
        }
    }
    v.normalize_or_zero() * speed
}

fn spawn(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Res<Playfield>,
    visuals: Option<Res<Visuals>>,
    mut rng: ResMut<GameRng>,
) {
    if visuals.is_none() {
        error!("player spawn skipped: {}", InitError::MissingVisuals);
        return;
    }

    let p = &tunables.player;
    let velocity = initial_velocity(&mut rng, tunables.boost.normal_speed, p.min_axis_speed);
    let body = MovingBody::new(field.center(), p.size * 0.5).with_velocity(velocity);
    debug!("player heading {:.1}°", body.facing.to_degrees());

    commands.spawn((
        Name::new("Player"),
        Player,
        BodyRole::Player,
        body,
        Appearance::new(hex_color(p.tint), p.size),
        DespawnOnExit(GameState::GameOver),
    ));

    commands.queue(|world: &mut World| {
        bus::subscribe_scoped(world, Topic::SpeedChange, on_speed_change);
        bus::subscribe_scoped(world, Topic::GameOver, on_game_over);
    });
}

fn move_player(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Res<Playfield>,
    mut rng: ResMut<GameRng>,
    mut q_player: Query<&mut MovingBody, With<Player>>,
) {
    let Ok(mut body) = q_player.single_mut() else {
        return;
    };
    let p = &tunables.player;

    body.integrate();
    let target = heading_of(body.velocity, body.facing);
    body.facing = turn_toward(body.facing, target, p.rotation_lerp);

    let hit = reflect_inside(&mut body, &field);
    if !hit.any() {
        return;
    }

    let speed = body.speed();
    if hit.x {
        body.velocity.y += rng.signed(p.bounce_jitter);
    }
    if hit.y {
        body.velocity.x += rng.signed(p.bounce_jitter);
    }
    body.set_speed(speed);
    body.facing += rng.signed(p.rotation_jitter);

    commands.publish(BusEvent::Bounce { role: BodyRole::Player, position: body.position });
}

fn on_speed_change(In(event): In<BusEvent>, mut q_player: Query<&mut MovingBody, With<Player>>) {
    let BusEvent::SpeedChange(speed) = event else {
        return;
    };
    if let Ok(mut body) = q_player.single_mut() {
        body.set_speed(speed);
    }
}

fn on_game_over(
    _: In<BusEvent>,
    tunables: Res<Tunables>,
    mut q_player: Query<(&mut MovingBody, &mut Appearance), With<Player>>,
) {
    if let Ok((mut body, mut look)) = q_player.single_mut() {
        body.velocity = Vec2::ZERO;
        look.tint = hex_color(tunables.player.dead_tint);
    }
}
