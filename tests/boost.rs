mod common;

use bevy::prelude::*;
use bevy_dodge::plugins::ability::{AbilityResource, Tier};
use bevy_dodge::plugins::input::ControlKey;
use bevy_dodge::plugins::player::Player;
use bevy_dodge::plugins::projectiles::Projectile;
use bevy_dodge::plugins::trail::{TrailParticle, TrailPool};
use bevy_dodge::plugins::world::MovingBody;

fn player_speed(app: &mut App) -> f32 {
    app.world_mut()
        .query_filtered::<&MovingBody, With<Player>>()
        .single(app.world())
        .unwrap()
        .speed()
}

fn live_particles(app: &mut App) -> usize {
    app.world_mut()
        .query::<&TrailParticle>()
        .iter(app.world())
        .filter(|p| p.is_live())
        .count()
}

fn tier(app: &App) -> Tier {
    app.world().resource::<AbilityResource>().tier()
}

#[test]
fn holding_boost_speeds_up_and_draws_a_trail() {
    let mut app = common::playing(common::seeded());

    common::press(&mut app, ControlKey::Boost);
    app.update();
    assert_eq!(tier(&app), Tier::Boost);
    assert!((player_speed(&mut app) - 10.0).abs() < 1e-3);
    assert!(app.world().resource::<TrailPool>().enabled);

    for _ in 0..10 {
        app.update();
    }
    assert!(live_particles(&mut app) >= 10);

    common::release(&mut app, ControlKey::Boost);
    app.update();
    assert_eq!(tier(&app), Tier::Idle);
    assert!((player_speed(&mut app) - 5.0).abs() < 1e-3);
    assert_eq!(live_particles(&mut app), 0);
}

#[test]
fn double_tap_enters_super_boost() {
    let mut app = common::playing(common::seeded());

    common::press(&mut app, ControlKey::Boost);
    app.update();
    common::release(&mut app, ControlKey::Boost);
    app.update();
    common::press(&mut app, ControlKey::Boost);
    app.update();

    assert_eq!(tier(&app), Tier::SuperBoost);
    assert!((player_speed(&mut app) - 20.0).abs() < 1e-3);
    assert!(!app.world().resource::<AbilityResource>().is_super_available());
}

#[test]
fn fire_is_rate_limited() {
    let mut app = common::playing(common::seeded());

    // Two presses one tick apart: the second lands inside the 200 ms cooldown.
    common::press(&mut app, ControlKey::Fire);
    app.update();
    common::press(&mut app, ControlKey::Fire);
    app.update();
    assert_eq!(common::count::<Projectile>(&mut app), 1);

    for _ in 0..12 {
        app.update();
    }
    common::press(&mut app, ControlKey::Fire);
    app.update();
    assert_eq!(common::count::<Projectile>(&mut app), 2);
}
