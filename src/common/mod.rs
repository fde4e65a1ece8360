//! Common, shared types.

pub mod error;
pub mod state;
pub mod timers;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
