//! Trail plugin: a pooled, fading particle trail behind the player while boosting.
//!
//! ```text
//! TrailToggle(enabled, colour?) ──> TrailPool { enabled, colour, size }
//!                                     │   (new colour or disable: release all)
//! FixedUpdate / SimSet::Effects       v
//!   enabled: fade live particles ──> spent ones back to the free list
//!            light one particle at the player (free list first, then allocate)
//! ```
//!
//! Pooled entities persist across sessions; teardown only releases them.

use bevy::prelude::*;

use crate::common::tunables::{Tunables, hex_color};
use crate::plugins::bus::{self, BusEvent, Topic};
use crate::plugins::core::SimSet;
use crate::plugins::player::Player;
use crate::plugins::world::MovingBody;

pub mod pool;

pub use pool::{ParticleState, TrailParticle, TrailPool};

pub fn plugin(app: &mut App) {
    let tunables = app.world().get_resource::<Tunables>().cloned().unwrap_or_default();
    app.insert_resource(TrailPool::new(hex_color(tunables.boost.boost_color), tunables.trail.size))
        .add_systems(Startup, prewarm_trail)
        .add_systems(FixedUpdate, update_trail.in_set(SimSet::Effects));

    bus::subscribe(app.world_mut(), Topic::TrailToggle, on_trail_toggle);
}

fn prewarm_trail(mut commands: Commands, tunables: Res<Tunables>, mut pool: ResMut<TrailPool>) {
    pool::grow(&mut commands, &mut pool, tunables.trail.prewarm);
}

fn update_trail(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut pool: ResMut<TrailPool>,
    q_player: Query<&MovingBody, With<Player>>,
    mut particles: Query<(Entity, &mut TrailParticle)>,
) {
    if !pool.enabled {
        return;
    }
    let t = &tunables.trail;
    pool::fade(&mut pool, particles.iter_mut(), t.fade_per_tick);

    if let Ok(player) = q_player.single() {
        pool::acquire(&mut commands, &mut pool, &mut particles, player.position, t.spawn_alpha);
    }
}

fn on_trail_toggle(
    In(event): In<BusEvent>,
    tunables: Res<Tunables>,
    mut pool: ResMut<TrailPool>,
    mut particles: Query<(Entity, &mut TrailParticle)>,
) {
    let BusEvent::TrailToggle { enabled, color } = event else {
        return;
    };

    pool.enabled = enabled;
    if let Some(color) = color {
        pool.color = color;
        pool.size = if color == hex_color(tunables.boost.super_color) {
            tunables.trail.super_size
        } else {
            tunables.trail.size
        };
    }
    if color.is_some() || !enabled {
        pool::release_all(&mut pool, particles.iter_mut());
    }
}

/// Session teardown: disable and release everything.
pub fn release_trail(mut pool: ResMut<TrailPool>, mut particles: Query<(Entity, &mut TrailParticle)>) {
    pool.enabled = false;
    let n = pool::release_all(&mut pool, particles.iter_mut());
    if n > 0 {
        debug!("released {n} trail particles");
    }
}

#[cfg(test)]
mod tests;
