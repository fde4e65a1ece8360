use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::{Tunables, hex_color};
use crate::plugins::bus::BodyRole;
use crate::plugins::core::Playfield;
use crate::plugins::input::{ControlInput, ControlKey, KeyAction};
use crate::plugins::player::Player;
use crate::plugins::world::{Appearance, MovingBody};

use super::{CooldownGate, Projectile};

/// Spawn a shot on the attack key.
///
/// Auto-repeat counts as a trigger; the gate limits the rate. With no player body
/// (headless, or between sessions) the trigger is dropped without consuming the gate.
pub fn fire_projectiles(
    mut commands: Commands,
    mut controls: MessageReader<ControlInput>,
    tunables: Res<Tunables>,
    mut gate: ResMut<CooldownGate>,
    q_player: Query<&MovingBody, With<Player>>,
) {
    let triggers = controls
        .read()
        .filter(|c| c.key == ControlKey::Fire && c.action == KeyAction::Down)
        .count();
    if triggers == 0 {
        return;
    }
    let Ok(player) = q_player.single() else {
        return;
    };

    let plasma = &tunables.plasma;
    for _ in 0..triggers {
        if !gate.try_fire(plasma.cooldown()) {
            continue;
        }
        let velocity = Vec2::from_angle(player.facing) * plasma.speed;
        commands.spawn((
            Name::new("Plasma"),
            Projectile,
            BodyRole::Projectile,
            MovingBody::new(player.position, plasma.radius).with_velocity(velocity),
            Appearance::new(hex_color(plasma.color).with_alpha(0.8), plasma.radius * 2.0),
            DespawnOnExit(GameState::GameOver),
        ));
    }
}

pub fn advance_cooldown(time: Res<Time>, mut gate: ResMut<CooldownGate>) {
    gate.advance(time.delta());
}

pub fn move_projectiles(
    mut commands: Commands,
    field: Res<Playfield>,
    mut q: Query<(Entity, &mut MovingBody), With<Projectile>>,
) {
    for (e, mut body) in &mut q {
        body.integrate();
        if !field.contains(body.position) {
            commands.entity(e).despawn();
        }
    }
}
