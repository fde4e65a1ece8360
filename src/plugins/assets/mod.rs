//! Assets plugin: resolves the visual handle and gates `Loading -> StartScreen`.
//!
//! Nothing can be constructed without a resolved [`Visuals`]. Startup fails hard
//! (logged, `InitFailed` inserted, `AppExit::error()` written) when:
//! - the playfield is below the configured minimum, or
//! - a configured body sprite cannot be loaded.

use bevy::asset::LoadState;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::common::error::InitError;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::Playfield;
use crate::plugins::progression::TransitionExt;

/// Resolved visual handle shared by every body.
#[derive(Resource, Debug, Clone, Default)]
pub struct Visuals {
    pub body: Handle<Image>,
    pub textured: bool,
}

impl Visuals {
    pub fn untextured() -> Self {
        Self { body: Handle::default(), textured: false }
    }
}

/// Startup aborted; no playable state will be presented.
#[derive(Resource, Debug, Clone)]
pub struct InitFailed(pub InitError);

#[derive(Resource, Debug)]
struct PendingVisual {
    path: String,
    handle: Handle<Image>,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Loading), request_visuals)
        .add_systems(Update, poll_initialization.run_if(in_state(GameState::Loading)));
}

fn request_visuals(
    mut commands: Commands,
    tunables: Res<Tunables>,
    asset_server: Option<Res<AssetServer>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(path) = tunables.visuals.body_sprite.clone() else {
        commands.insert_resource(Visuals::untextured());
        return;
    };

    match asset_server {
        Some(server) => {
            debug!("loading body sprite {path}");
            let handle = server.load(path.clone());
            commands.insert_resource(PendingVisual { path, handle });
        }
        None => fail(
            &mut commands,
            &mut exit,
            InitError::AssetFailed { path, reason: "no asset server".into() },
        ),
    }
}

fn poll_initialization(
    mut commands: Commands,
    tunables: Res<Tunables>,
    field: Res<Playfield>,
    visuals: Option<Res<Visuals>>,
    pending: Option<Res<PendingVisual>>,
    asset_server: Option<Res<AssetServer>>,
    failed: Option<Res<InitFailed>>,
    mut exit: MessageWriter<AppExit>,
) {
    if failed.is_some() {
        return;
    }
    if let Err(err) = field.validate(&tunables.arena) {
        fail(&mut commands, &mut exit, err);
        return;
    }

    if let (Some(pending), Some(server)) = (pending, asset_server) {
        match server.get_load_state(pending.handle.id()) {
            Some(LoadState::Loaded) => {
                info!("body sprite {} ready", pending.path);
                commands.insert_resource(Visuals { body: pending.handle.clone(), textured: true });
                commands.remove_resource::<PendingVisual>();
            }
            Some(LoadState::Failed(err)) => {
                let reason = err.to_string();
                fail(&mut commands, &mut exit, InitError::AssetFailed { path: pending.path.clone(), reason });
            }
            _ => {}
        }
        return;
    }

    if visuals.is_some() {
        commands.request_transition(GameState::StartScreen);
    }
}

fn fail(commands: &mut Commands, exit: &mut MessageWriter<AppExit>, err: InitError) {
    error!("initialization failed: {err}");
    commands.insert_resource(InitFailed(err));
    exit.write(AppExit::error());
}
