use approx::assert_relative_eq;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{run_system_once, sim_world};

fn trail_world(prewarm: usize) -> World {
    let mut world = sim_world();
    world.resource_mut::<Tunables>().trail.prewarm = prewarm;
    world.insert_resource(TrailPool::new(Color::WHITE, 2.0));
    bus::subscribe(&mut world, Topic::TrailToggle, on_trail_toggle);
    run_system_once(&mut world, prewarm_trail);
    world.spawn((Player, MovingBody::new(Vec2::new(50.0, 60.0), 13.0)));
    world
}

fn live(world: &mut World) -> Vec<TrailParticle> {
    world
        .query::<&TrailParticle>()
        .iter(world)
        .filter(|p| p.is_live())
        .copied()
        .collect()
}

fn enable(world: &mut World, color: u32) {
    bus::publish(world, BusEvent::TrailToggle { enabled: true, color: Some(hex_color(color)) });
}

#[test]
fn disabled_trail_emits_nothing() {
    let mut world = trail_world(4);
    run_system_once(&mut world, update_trail);
    assert!(live(&mut world).is_empty());
}

#[test]
fn emits_one_particle_per_tick_at_the_player() {
    let mut world = trail_world(4);
    enable(&mut world, 0xFFFF00);
    for _ in 0..3 {
        run_system_once(&mut world, update_trail);
    }

    let mut particles = live(&mut world);
    assert_eq!(particles.len(), 3);
    particles.sort_by(|a, b| b.alpha.total_cmp(&a.alpha));
    assert_relative_eq!(particles[0].alpha, 0.6, epsilon = 1e-6);
    assert_relative_eq!(particles[2].alpha, 0.56, epsilon = 1e-5);
    assert!(particles.iter().all(|p| p.position == Vec2::new(50.0, 60.0) && p.size == 2.0));
}

#[test]
fn spent_particles_are_recycled_not_destroyed() {
    let mut world = trail_world(0);
    enable(&mut world, 0xFFFF00);
    // 0.6 / 0.02 = 30 ticks of life, so the pool settles around 30-31 particles.
    for _ in 0..200 {
        run_system_once(&mut world, update_trail);
    }
    let allocated = world.resource::<TrailPool>().allocated();
    assert!(allocated <= 32, "allocated {allocated}");
    assert_eq!(world.query::<&TrailParticle>().iter(&world).count(), allocated);
}

#[test]
fn super_colour_uses_large_particles() {
    let mut world = trail_world(2);
    enable(&mut world, 0xFF6800);
    run_system_once(&mut world, update_trail);
    assert_eq!(live(&mut world)[0].size, 4.0);
}

#[test]
fn disabling_releases_every_live_particle() {
    let mut world = trail_world(8);
    enable(&mut world, 0xFFFF00);
    for _ in 0..5 {
        run_system_once(&mut world, update_trail);
    }
    assert_eq!(live(&mut world).len(), 5);

    bus::publish(&mut world, BusEvent::TrailToggle { enabled: false, color: None });
    assert!(live(&mut world).is_empty());
    let pool = world.resource::<TrailPool>();
    assert_eq!(pool.free_count(), pool.allocated());
}

#[test]
fn colour_switch_clears_the_old_trail() {
    let mut world = trail_world(8);
    enable(&mut world, 0xFFFF00);
    run_system_once(&mut world, update_trail);
    run_system_once(&mut world, update_trail);

    enable(&mut world, 0xFF6800);
    assert!(live(&mut world).is_empty());
    run_system_once(&mut world, update_trail);
    assert_eq!(live(&mut world).len(), 1);
}

#[test]
fn teardown_release_disables() {
    let mut world = trail_world(4);
    enable(&mut world, 0xFFFF00);
    run_system_once(&mut world, update_trail);
    run_system_once(&mut world, release_trail);

    assert!(!world.resource::<TrailPool>().enabled);
    assert!(live(&mut world).is_empty());
    assert_eq!(world.resource::<TrailPool>().free_count(), 4);
}
