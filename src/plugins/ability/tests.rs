use std::time::Duration;

use approx::assert_relative_eq;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{run_system_once, set_tick, sim_world};
use crate::common::timers::Disposable;
use crate::common::tunables::BoostTunables;
use crate::plugins::bus::{self, Topic};

const MS: fn(u64) -> Duration = Duration::from_millis;

fn machine() -> AbilityResource {
    AbilityResource::new(BoostTunables::default())
}

fn speeds(events: &[BusEvent]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|e| match e {
            BusEvent::SpeedChange(s) => Some(*s),
            _ => None,
        })
        .collect()
}

/// Advance in fuel-tick steps so every step is observable.
fn run_for(ability: &mut AbilityResource, total: Duration, out: &mut Vec<BusEvent>) {
    let step = MS(100);
    let mut left = total;
    while left >= step {
        ability.advance(step, out);
        left -= step;
    }
    if !left.is_zero() {
        ability.advance(left, out);
    }
}

#[test]
fn press_enters_boost_and_publishes() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(1000), &mut out);

    assert_eq!(a.tier(), Tier::Boost);
    assert_eq!(speeds(&out), [10.0]);
    assert!(matches!(
        out[1],
        BusEvent::TrailToggle { enabled: true, color: Some(_) }
    ));
    assert_eq!(a.fuel_timer(), Some(FuelTimer::Consumption(Tier::Boost)));
}

#[test]
fn holding_for_three_seconds_burns_fifteen_fuel() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    run_for(&mut a, MS(3000), &mut out);

    assert_relative_eq!(a.fuel(), 85.0, epsilon = 1e-4);
    assert_eq!(a.tier(), Tier::Boost);
}

#[test]
fn one_large_step_matches_many_small_ones() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    a.advance(MS(3000), &mut out);
    assert_relative_eq!(a.fuel(), 85.0, epsilon = 1e-4);
}

#[test]
fn release_ends_and_starts_regular_recharge() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    run_for(&mut a, MS(1000), &mut out);
    out.clear();

    a.release(&mut out);
    assert_eq!(a.tier(), Tier::Idle);
    assert_eq!(speeds(&out), [5.0]);
    assert!(out.contains(&BusEvent::TrailToggle { enabled: false, color: None }));
    assert_eq!(a.fuel_timer(), Some(FuelTimer::Recharge(Recharge::Regular)));

    let before = a.fuel();
    run_for(&mut a, MS(500), &mut out);
    assert_relative_eq!(a.fuel(), before + 5.0 * 0.2, epsilon = 1e-4);
}

#[test]
fn releasing_twice_ends_once() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    out.clear();
    a.release(&mut out);
    a.release(&mut out);
    assert_eq!(speeds(&out), [5.0]);
}

#[test]
fn low_fuel_forces_boost_end() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    // 100 -> below 30 takes 141 ticks at 0.5.
    run_for(&mut a, MS(14_100), &mut out);

    assert_eq!(a.tier(), Tier::Idle);
    assert!(a.fuel() < 30.0);
    assert!(a.is_key_held(), "key still down, ability ended anyway");
    assert_eq!(a.fuel_timer(), Some(FuelTimer::Recharge(Recharge::Regular)));
}

#[test]
fn press_at_or_below_threshold_does_nothing() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    run_for(&mut a, MS(14_100), &mut out);
    a.release(&mut out);
    out.clear();

    a.press(MS(20_000), &mut out);
    assert_eq!(a.tier(), Tier::Idle);
    assert!(out.is_empty());
}

#[test]
fn double_press_enters_super_once() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(1000), &mut out);
    a.release(&mut out);
    a.press(MS(1200), &mut out);
    assert_eq!(a.tier(), Tier::SuperBoost);
    assert_eq!(speeds(&out).last(), Some(&20.0));
    assert!(a.super_remaining().is_some());
    assert!(!a.is_super_available());

    // Further rapid presses do not re-trigger while super is running.
    out.clear();
    a.press(MS(1300), &mut out);
    a.press(MS(1350), &mut out);
    assert_eq!(a.tier(), Tier::SuperBoost);
    assert!(speeds(&out).is_empty());
}

#[test]
fn slow_second_press_is_a_plain_boost() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(1000), &mut out);
    a.release(&mut out);
    a.press(MS(1400), &mut out);
    assert_eq!(a.tier(), Tier::Boost);
}

#[test]
fn boost_is_preempted_by_super() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    assert_eq!(a.tier(), Tier::Boost);
    // Second press while held (no release in between).
    a.press(MS(150), &mut out);
    assert_eq!(a.tier(), Tier::SuperBoost);
    assert_eq!(a.fuel_timer(), Some(FuelTimer::Consumption(Tier::SuperBoost)));
}

#[test]
fn super_ends_at_deadline_even_if_held() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    a.press(MS(100), &mut out);
    out.clear();

    // 5s at 2.0 per 100ms would burn exactly 100; the deadline and the empty
    // tank coincide and must end the super boost once.
    run_for(&mut a, MS(5000), &mut out);
    assert_eq!(a.tier(), Tier::Idle);
    assert_eq!(speeds(&out), [5.0]);
    assert!(a.fuel() >= 0.0);
    assert_eq!(a.fuel_timer(), Some(FuelTimer::Recharge(Recharge::Reduced)));
    assert!(a.super_remaining().is_none());
}

#[test]
fn super_lockout_lifts_on_the_first_recharge_tick() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    a.press(MS(100), &mut out);
    run_for(&mut a, MS(1000), &mut out);
    a.release(&mut out);
    assert_relative_eq!(a.fuel(), 80.0, epsilon = 1e-4);
    assert!(!a.is_super_available());

    // Enough fuel, fast pair, but no recharge tick yet: falls back to boost.
    a.press(MS(2000), &mut out);
    a.press(MS(2100), &mut out);
    assert_eq!(a.tier(), Tier::Boost);
    a.release(&mut out);

    // One regular recharge tick: 80 -> 80.2, lockout lifted.
    a.advance(MS(100), &mut out);
    assert_relative_eq!(a.fuel(), 80.2, epsilon = 1e-4);
    assert!(a.is_super_available());

    a.press(MS(5000), &mut out);
    a.press(MS(5100), &mut out);
    assert_eq!(a.tier(), Tier::SuperBoost);
}

#[test]
fn lockout_holds_while_recharging_below_the_super_minimum() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    a.press(MS(100), &mut out);
    // 3.6 s at 2.0 per 100 ms: 100 -> 28.
    run_for(&mut a, MS(3600), &mut out);
    a.release(&mut out);
    assert_relative_eq!(a.fuel(), 28.0, epsilon = 1e-3);

    // Reduced recharge: 0.1 per tick, 28 -> 29 after ten ticks.
    run_for(&mut a, MS(1000), &mut out);
    assert!(!a.is_super_available());

    // 29 -> 30.5 crosses the minimum.
    run_for(&mut a, MS(1500), &mut out);
    assert!(a.fuel() > 30.0);
    assert!(a.is_super_available());
}

#[test]
fn fuel_never_leaves_bounds_and_never_moves_both_ways() {
    let mut a = machine();
    let mut out = Vec::new();
    let mut now = MS(0);
    let mut prev = a.fuel();
    for round in 0..200u64 {
        match round % 7 {
            0 | 3 => a.press(now, &mut out),
            5 => a.release(&mut out),
            _ => {}
        }
        let timer = a.fuel_timer();
        a.advance(MS(70), &mut out);
        now += MS(70);

        let fuel = a.fuel();
        assert!((0.0..=a.max_fuel()).contains(&fuel));
        match timer {
            Some(FuelTimer::Consumption(_)) => assert!(fuel <= prev),
            Some(FuelTimer::Recharge(_)) => assert!(fuel >= prev),
            None => assert_eq!(fuel, prev),
        }
        prev = fuel;
    }
}

#[test]
fn dispose_cancels_everything() {
    let mut a = machine();
    let mut out = Vec::new();
    a.press(MS(0), &mut out);
    a.press(MS(50), &mut out);
    run_for(&mut a, MS(700), &mut out);

    a.dispose();
    assert_eq!(a.tier(), Tier::Idle);
    assert_eq!(a.fuel(), a.max_fuel());
    assert_eq!(a.fuel_timer(), None);
    assert!(a.super_remaining().is_none());
    assert!(a.is_super_available());

    // A later tick after teardown changes nothing.
    out.clear();
    a.advance(MS(6000), &mut out);
    assert!(out.is_empty());
    assert_eq!(a.fuel(), a.max_fuel());
}

#[derive(Resource, Default)]
struct SeenSpeeds(Vec<f32>);

#[test]
fn systems_publish_transitions_on_the_bus() {
    let mut world = sim_world();
    world.init_resource::<AbilityResource>();
    world.init_resource::<Messages<ControlInput>>();
    world.init_resource::<SeenSpeeds>();
    bus::subscribe(&mut world, Topic::SpeedChange, |In(ev): In<BusEvent>, mut seen: ResMut<SeenSpeeds>| {
        if let BusEvent::SpeedChange(s) = ev {
            seen.0.push(s);
        }
    });

    world.write_message(ControlInput::down(ControlKey::Boost));
    run_system_once(&mut world, drive_ability);
    assert_eq!(world.resource::<AbilityResource>().tier(), Tier::Boost);

    set_tick(&mut world, MS(1000));
    run_system_once(&mut world, advance_ability);
    assert_relative_eq!(world.resource::<AbilityResource>().fuel(), 95.0, epsilon = 1e-4);

    world.resource_mut::<Messages<ControlInput>>().clear();
    world.write_message(ControlInput::up(ControlKey::Boost));
    run_system_once(&mut world, drive_ability);
    assert_eq!(world.resource::<SeenSpeeds>().0, [10.0, 5.0]);
}

#[test]
fn auto_repeat_does_not_count_as_a_second_press() {
    let mut world = sim_world();
    world.init_resource::<AbilityResource>();
    world.init_resource::<Messages<ControlInput>>();

    world.write_message(ControlInput::down(ControlKey::Boost));
    world.write_message(ControlInput { key: ControlKey::Boost, action: KeyAction::Down, repeat: true });
    run_system_once(&mut world, drive_ability);
    assert_eq!(world.resource::<AbilityResource>().tier(), Tier::Boost);
}
