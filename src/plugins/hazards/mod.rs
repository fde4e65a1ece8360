//! Hazards plugin: adversary-fired bodies that kill the player on contact.
//!
//! Pipeline (FixedUpdate):
//! - SimSet::Timers: optional lifetime runs out -> despawn, award `HazardExpired`
//! - SimSet::Physics: straight-line travel with spin, edge bounce, speed renormalised
//!   to the hazard's assigned speed after every perturbation

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::{AdversaryTunables, Tunables, hex_color};
use crate::plugins::bus::{BodyRole, BusEvent, PublishExt};
use crate::plugins::core::{GameRng, Playfield, SimSet};
use crate::plugins::score::{ScoreBoard, ScoreCause};
use crate::plugins::world::{Appearance, Lifetime, MovingBody, heading_of, reflect_inside};

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    /// Assigned speed; bounces never change the magnitude.
    pub speed: f32,
    /// Radians per tick.
    pub spin: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, expire_hazards.in_set(SimSet::Timers))
        .add_systems(FixedUpdate, move_hazards.in_set(SimSet::Physics));
}

/// Launch a hazard from `origin` toward `target` with a random size, speed and spin.
pub fn spawn_hazard(
    commands: &mut Commands,
    params: &AdversaryTunables,
    rng: &mut GameRng,
    origin: Vec2,
    target: Vec2,
) -> Entity {
    let radius = params.hazard_min_radius + rng.upto(params.hazard_radius_range);
    let speed = params.hazard_min_speed + rng.upto(params.hazard_speed_range);
    let spin = rng.signed(params.hazard_max_spin);
    let fallback = rng.angle();
    let heading = heading_of(target - origin, fallback);

    let body = MovingBody::new(origin, radius).with_velocity(Vec2::from_angle(heading) * speed);
    let mut entity = commands.spawn((
        Name::new("Hazard"),
        Hazard { speed, spin },
        BodyRole::Hazard,
        body,
        Appearance::new(hex_color(params.hazard_tint), radius * 2.0),
        DespawnOnExit(GameState::GameOver),
    ));
    if params.hazard_lifetime_secs > 0.0 {
        entity.insert(Lifetime::from_secs(params.hazard_lifetime_secs));
    }

    debug!("hazard r={radius:.1} v={speed:.1} toward {target}");
    entity.id()
}

fn move_hazards(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Res<Playfield>,
    mut rng: ResMut<GameRng>,
    mut q: Query<(&mut MovingBody, &mut Hazard)>,
) {
    let params = &tunables.adversary;
    for (mut body, mut hazard) in &mut q {
        body.integrate();
        body.facing += hazard.spin;

        let hit = reflect_inside(&mut body, &field);
        if !hit.any() {
            continue;
        }
        if hit.x {
            body.velocity.y += rng.signed(params.hazard_bounce_jitter);
        }
        if hit.y {
            body.velocity.x += rng.signed(params.hazard_bounce_jitter);
        }
        hazard.spin = rng.signed(params.hazard_max_spin);
        body.set_speed(hazard.speed);

        commands.publish(BusEvent::Bounce { role: BodyRole::Hazard, position: body.position });
    }
}

fn expire_hazards(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut score: ResMut<ScoreBoard>,
    mut q: Query<(Entity, &mut Lifetime), With<Hazard>>,
) {
    for (e, mut life) in &mut q {
        life.tick(time.delta());
        if !life.is_finished() {
            continue;
        }
        commands.entity(e).despawn();
        if let Some(ev) = score.award(ScoreCause::HazardExpired, &tunables.score) {
            commands.publish(ev);
        }
    }
}
