//! Feature plugins.

use bevy::prelude::*;

pub mod ability;
pub mod adversary;
pub mod assets;
pub mod bus;
pub mod collision;
pub mod core;
pub mod hazards;
pub mod input;
pub mod player;
pub mod progression;
pub mod projectiles;
pub mod score;
pub mod trail;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
///
/// The bus goes first: every other plugin may subscribe while it is built.
pub fn register_gameplay(app: &mut App) {
    bus::plugin(app);
    core::plugin(app);
    input::plugin(app);
    assets::plugin(app);
    progression::plugin(app);
    score::plugin(app);
    ability::plugin(app);
    player::plugin(app);
    adversary::plugin(app);
    hazards::plugin(app);
    projectiles::plugin(app);
    collision::plugin(app);
    trail::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}
