//! Ability plugin: boost/super-boost driven by the activation key.
//!
//! Pipeline (FixedUpdate):
//! - SimSet::Input: activation presses/releases -> [`AbilityResource::press`]/`release`
//! - SimSet::Timers: consumption, recharge and super deadline advance on `Time` deltas
//!
//! Transitions go out on the bus as `SpeedChange` and `TrailToggle`.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::plugins::bus::{BusEvent, PublishExt};
use crate::plugins::core::SimSet;
use crate::plugins::input::{ControlInput, ControlKey, KeyAction};

pub mod machine;

pub use machine::{AbilityResource, FuelTimer, Recharge, Tier};

pub fn plugin(app: &mut App) {
    app.init_resource::<AbilityResource>()
        .add_systems(FixedUpdate, drive_ability.in_set(SimSet::Input))
        .add_systems(FixedUpdate, advance_ability.in_set(SimSet::Timers));
}

fn drive_ability(
    mut commands: Commands,
    mut controls: MessageReader<ControlInput>,
    time: Res<Time>,
    mut ability: ResMut<AbilityResource>,
) {
    let now = time.elapsed();
    let mut out = Vec::new();

    for c in controls.read().filter(|c| c.key == ControlKey::Boost) {
        match c.action {
            KeyAction::Down if !c.repeat => ability.press(now, &mut out),
            KeyAction::Up => ability.release(&mut out),
            KeyAction::Down => {}
        }
    }

    publish_all(&mut commands, out);
}

fn advance_ability(mut commands: Commands, time: Res<Time>, mut ability: ResMut<AbilityResource>) {
    let mut out = Vec::new();
    ability.advance(time.delta(), &mut out);
    publish_all(&mut commands, out);
}

fn publish_all(commands: &mut Commands, events: Vec<BusEvent>) {
    for ev in events {
        commands.publish(ev);
    }
}

#[cfg(test)]
mod tests;
