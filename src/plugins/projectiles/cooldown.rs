//! Fire-rate gate for the ranged attack.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::timers::{Cadence, Disposable, TimerSlot};

/// `ready` plus at most one pending reset.
#[derive(Resource, Debug, Clone)]
pub struct CooldownGate {
    ready: bool,
    reset: TimerSlot<()>,
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self { ready: true, reset: TimerSlot::default() }
    }
}

impl CooldownGate {
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn reset_pending(&self) -> bool {
        self.reset.is_pending()
    }

    /// Consume the gate if it is ready. A blocked trigger is a no-op.
    pub fn try_fire(&mut self, cooldown: Duration) -> bool {
        if !self.ready {
            return false;
        }
        self.ready = false;
        self.reset.schedule((), Cadence::Once(cooldown));
        true
    }

    pub fn advance(&mut self, delta: Duration) {
        if self.reset.tick(delta).is_some() {
            self.ready = true;
        }
    }
}

impl Disposable for CooldownGate {
    fn dispose(&mut self) {
        self.reset.cancel();
        self.ready = true;
    }
}
