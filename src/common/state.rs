//! Global state machine.
//!
//! ```text
//! Loading ──assets ready──> StartScreen ──start──> Playing ──fatal hit──> GameOver
//!                                                     ^                      │
//!                                                     └──────restart─────────┘
//! ```

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    StartScreen,
    Playing,
    GameOver,
}

impl GameState {
    /// The only four legal edges. Everything else, self-loops included, is rejected.
    #[inline]
    pub fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (GameState::Loading, GameState::StartScreen)
                | (GameState::StartScreen, GameState::Playing)
                | (GameState::Playing, GameState::GameOver)
                | (GameState::GameOver, GameState::Playing)
        )
    }
}
