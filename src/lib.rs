//! Arcade survival game core on Bevy.
//!
//! `game` builds the app, `plugins` holds one plugin per gameplay concern and
//! `common` the shared state, error, timer and tunables types. Integration tests
//! in `tests/` import everything through this crate.

pub mod common;
pub mod game;
pub mod plugins;
