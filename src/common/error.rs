//! Error types.
//!
//! Only [`InitError`] ever reaches the operator; the rest are handled where they occur.

use thiserror::Error;

use super::state::GameState;

/// Startup cannot produce a playable state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    #[error("playfield {width}x{height} is below the {min_width}x{min_height} minimum")]
    Viewport { width: f32, height: f32, min_width: f32, min_height: f32 },

    #[error("no visual handle was provided before entity construction")]
    MissingVisuals,

    #[error("visual asset `{path}` failed to load: {reason}")]
    AssetFailed { path: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Rejected state-machine edge. First transition wins; later ones land here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition {from:?} -> {to:?}")]
    Invalid { from: GameState, to: GameState },
}
