//! Collision plugin: per-tick circle overlap between bodies.
//!
//! SimSet::Collision, in order:
//! 1. hazard vs player: fatal. The first hit halts the frame driver, clears every
//!    hazard and projectile and publishes `GameOver`. The driver's halt doubles as
//!    the once-only latch, so later hits (same tick or after) do nothing.
//! 2. projectile vs hazard: both destroyed, `HazardShot` awarded. Skipped once the
//!    driver is halted.
//!
//! Despawns are deferred, so the scans work on stable snapshots and alive flags
//! rather than mutating the collections they iterate.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::bus::{BusEvent, PublishExt};
use crate::plugins::core::{FrameDriver, SimSet};
use crate::plugins::hazards::Hazard;
use crate::plugins::player::Player;
use crate::plugins::projectiles::Projectile;
use crate::plugins::score::{ScoreBoard, ScoreCause};
use crate::plugins::world::MovingBody;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (detect_fatal_collision, detect_projectile_hits)
            .chain()
            .in_set(SimSet::Collision),
    );
}

fn detect_fatal_collision(
    mut commands: Commands,
    mut driver: ResMut<FrameDriver>,
    q_player: Query<&MovingBody, With<Player>>,
    q_hazards: Query<(Entity, &MovingBody), With<Hazard>>,
    q_projectiles: Query<Entity, With<Projectile>>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Some((culprit, _)) = q_hazards.iter().find(|(_, h)| h.overlaps(player)) else {
        return;
    };
    if !driver.halt() {
        return;
    }

    info!("fatal collision with {culprit} at {}", player.position);
    for (e, _) in &q_hazards {
        commands.entity(e).try_despawn();
    }
    for e in &q_projectiles {
        commands.entity(e).try_despawn();
    }
    commands.publish(BusEvent::GameOver);
}

fn detect_projectile_hits(
    mut commands: Commands,
    driver: Res<FrameDriver>,
    tunables: Res<Tunables>,
    mut score: ResMut<ScoreBoard>,
    q_projectiles: Query<(Entity, &MovingBody), With<Projectile>>,
    q_hazards: Query<(Entity, &MovingBody), With<Hazard>>,
) {
    if !driver.is_running() {
        return;
    }

    let mut hazards: Vec<(Entity, MovingBody, bool)> =
        q_hazards.iter().map(|(e, b)| (e, *b, true)).collect();

    for (shot, shot_body) in &q_projectiles {
        // Newest hazard first; each projectile takes out at most one.
        let Some(target) = hazards
            .iter_mut()
            .rev()
            .find(|(_, h, alive)| *alive && shot_body.overlaps(h))
        else {
            continue;
        };
        target.2 = false;

        commands.entity(shot).try_despawn();
        commands.entity(target.0).try_despawn();
        if let Some(ev) = score.award(ScoreCause::HazardShot, &tunables.score) {
            commands.publish(ev);
        }
    }
}
