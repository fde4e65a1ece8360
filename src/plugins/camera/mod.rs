//! Camera plugin (render-only).
//!
//! The simulation lives in screen pixels (origin top-left, +y down). Bevy's 2D
//! camera is centred with +y up, so presentation maps every body through
//! [`to_world`]:
//!
//! ```text
//! world.x  =  x - width / 2
//! world.y  =  height / 2 - y
//! rotation = -facing
//! ```
//!
//! Sprites are attached lazily to anything carrying an `Appearance` or a
//! `TrailParticle`; the simulation never touches `Sprite` or `Transform`.
//!
//! B0001: the sync systems query `&mut Transform` on disjoint sets, which is
//! spelled out with `Without<...>` filters.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::window::PrimaryWindow;

use crate::common::state::GameState;
use crate::plugins::assets::Visuals;
use crate::plugins::bus::{self, BodyRole, BusEvent, Topic};
use crate::plugins::core::Playfield;
use crate::plugins::trail::TrailParticle;
use crate::plugins::world::{Appearance, MovingBody};

#[derive(Component)]
pub struct MainCamera;

/// Short-lived marker drawn where something bounced.
#[derive(Component, Debug)]
pub struct BounceFlash(Timer);

const FLASH_SECS: f32 = 0.15;
const FLASH_SIZE: f32 = 6.0;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera)
        .add_systems(PreUpdate, fit_playfield)
        .add_systems(
            PostUpdate,
            (
                (attach_body_sprites, attach_trail_sprites),
                (sync_bodies, sync_trail, fade_flashes),
            )
                .chain()
                .before(TransformSystems::Propagate),
        );

    bus::subscribe(app.world_mut(), Topic::Bounce, flash_on_bounce);
}

/// Screen pixels -> camera space.
#[inline]
pub fn to_world(field: &Playfield, p: Vec2) -> Vec2 {
    Vec2::new(p.x - field.width * 0.5, field.height * 0.5 - p.y)
}

fn depth(role: Option<&BodyRole>) -> f32 {
    match role {
        Some(BodyRole::Hazard) => 1.0,
        Some(BodyRole::Projectile) => 2.0,
        Some(BodyRole::Adversary) => 3.0,
        Some(BodyRole::Player) => 4.0,
        None => 0.5,
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("MainCamera"), Camera2d, MainCamera));
}

fn fit_playfield(
    q_window: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut field: ResMut<Playfield>,
) {
    let Ok(window) = q_window.single() else {
        return;
    };
    let next = Playfield::new(window.width(), window.height());
    if *field != next {
        debug!("playfield resized to {}x{}", next.width, next.height);
        *field = next;
    }
}

fn attach_body_sprites(
    mut commands: Commands,
    visuals: Option<Res<Visuals>>,
    q_new: Query<(Entity, &Appearance, Option<&BodyRole>), Without<Sprite>>,
) {
    for (e, look, role) in &q_new {
        let size = Vec2::splat(look.size);
        // Only players and the adversary use the body image; the rest are flat quads.
        let textured = visuals.as_ref().filter(|v| v.textured).filter(|_| {
            matches!(role, Some(BodyRole::Player) | Some(BodyRole::Adversary))
        });
        let sprite = match textured {
            Some(v) => Sprite {
                image: v.body.clone(),
                color: look.tint,
                custom_size: Some(size),
                ..default()
            },
            None => Sprite::from_color(look.tint, size),
        };
        commands.entity(e).insert(sprite);
    }
}

fn attach_trail_sprites(
    mut commands: Commands,
    q_new: Query<(Entity, &TrailParticle), Without<Sprite>>,
) {
    for (e, p) in &q_new {
        commands
            .entity(e)
            .insert(Sprite::from_color(p.color, Vec2::splat(p.size)));
    }
}

fn sync_bodies(
    field: Res<Playfield>,
    mut q: Query<
        (
            &MovingBody,
            &Appearance,
            Option<&BodyRole>,
            &mut Transform,
            &mut Sprite,
            &mut Visibility,
        ),
        Without<TrailParticle>,
    >,
) {
    for (body, look, role, mut tf, mut sprite, mut vis) in &mut q {
        tf.translation = to_world(&field, body.position).extend(depth(role));
        tf.rotation = Quat::from_rotation_z(-body.facing);
        sprite.color = look.tint;
        sprite.custom_size = Some(Vec2::splat(look.size));
        *vis = if look.visible { Visibility::Inherited } else { Visibility::Hidden };
    }
}

fn sync_trail(
    field: Res<Playfield>,
    mut q: Query<(&TrailParticle, &mut Transform, &mut Sprite, &mut Visibility), Without<MovingBody>>,
) {
    for (p, mut tf, mut sprite, mut vis) in &mut q {
        if !p.is_live() {
            *vis = Visibility::Hidden;
            continue;
        }
        tf.translation = to_world(&field, p.position).extend(0.0);
        sprite.color = p.color.with_alpha(p.alpha);
        sprite.custom_size = Some(Vec2::splat(p.size));
        *vis = Visibility::Inherited;
    }
}

fn flash_on_bounce(In(event): In<BusEvent>, mut commands: Commands, field: Res<Playfield>) {
    let BusEvent::Bounce { position, .. } = event else {
        return;
    };
    commands.spawn((
        Name::new("BounceFlash"),
        BounceFlash(Timer::from_seconds(FLASH_SECS, TimerMode::Once)),
        Sprite::from_color(Color::WHITE.with_alpha(0.5), Vec2::splat(FLASH_SIZE)),
        Transform::from_translation(to_world(&field, position).extend(5.0)),
        DespawnOnExit(GameState::GameOver),
    ));
}

fn fade_flashes(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut BounceFlash, &mut Sprite)>,
) {
    for (e, mut flash, mut sprite) in &mut q {
        flash.0.tick(time.delta());
        if flash.0.is_finished() {
            commands.entity(e).try_despawn();
        } else {
            sprite.color = sprite.color.with_alpha(0.5 * flash.0.fraction_remaining());
        }
    }
}
