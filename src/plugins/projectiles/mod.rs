//! Projectiles plugin: the player's cooldown-gated ranged attack.
//!
//! # Data flow
//! ```text
//! FixedUpdate
//! ┌───────────────────────────────────────────────────────────────┐
//! │ SimSet::Input   fire_projectiles                              │
//! │   - reads: ControlInput (Fire, repeats included), Player body │
//! │   - mutates: CooldownGate (ready -> cooling)                  │
//! │   - spawns: Projectile at the player, along its facing        │
//! │                                                               │
//! │ SimSet::Timers  advance_cooldown                              │
//! │   - mutates: CooldownGate (cooling -> ready after the delay)  │
//! │                                                               │
//! │ SimSet::Physics move_projectiles                              │
//! │   - integrates, despawns anything outside the playfield       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Hits against hazards are resolved by the collision plugin.

use bevy::prelude::*;

use crate::plugins::core::SimSet;

pub mod components;
pub mod cooldown;
pub mod systems;

pub use components::Projectile;
pub use cooldown::CooldownGate;

pub fn plugin(app: &mut App) {
    app.init_resource::<CooldownGate>()
        .add_systems(FixedUpdate, systems::fire_projectiles.in_set(SimSet::Input))
        .add_systems(FixedUpdate, systems::advance_cooldown.in_set(SimSet::Timers))
        .add_systems(FixedUpdate, systems::move_projectiles.in_set(SimSet::Physics));
}
