//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: includes DefaultPlugins (window/render) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.
//!
//! Tunables must be inserted before either is called; the core plugin falls back
//! to defaults otherwise.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::common::tunables::{Tunables, report_tunables_source};
use crate::plugins;

pub const TUNABLES_PATH: &str = "assets/tunables.ron";

pub fn run() -> AppExit {
    let (tunables, source) = Tunables::load_or_default(TUNABLES_PATH);
    App::new()
        .insert_resource(tunables)
        .insert_resource(source)
        .add_plugins(configure_full)
        .run()
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let (width, height) = app
        .world()
        .get_resource::<Tunables>()
        .map(|t| (t.arena.width, t.arena.height))
        .unwrap_or((1280.0, 720.0));

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Dodge".into(),
                    resolution: WindowResolution::new(width as u32, height as u32),
                    resizable: false,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,bevy_dodge=debug".into(),
                ..default()
            }),
    );

    configure_game(app);
    plugins::register_render(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera/sprites).
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App) {
    app.init_state::<GameState>()
        .add_systems(Startup, report_tunables_source);
    plugins::register_gameplay(app);
}
