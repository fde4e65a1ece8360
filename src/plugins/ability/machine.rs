//! Fuel-gated boost state machine.
//!
//! ```text
//!          press (fuel > low)                 release / fuel < low
//! Idle ─────────────────────────> Boost ───────────────────────────> Idle (recharge)
//!   │                               │
//!   │ double press (fuel >= min,    │ double press
//!   │ super available)              v
//!   └──────────────────────────> SuperBoost ──release / empty / deadline──> Idle (reduced recharge)
//! ```
//!
//! The machine never publishes directly; transitions push [`BusEvent`]s into the
//! caller's buffer so the owning system decides when they go out.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::timers::{Cadence, Disposable, TimerSlot};
use crate::common::tunables::{BoostTunables, Tunables, hex_color};
use crate::plugins::bus::BusEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    #[default]
    Idle,
    Boost,
    SuperBoost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recharge {
    Regular,
    /// After a super boost.
    Reduced,
}

/// What the fuel slot is doing. Consumption and recharge share the slot, so
/// starting one always cancels the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelTimer {
    Consumption(Tier),
    Recharge(Recharge),
}

#[derive(Resource, Debug, Clone)]
pub struct AbilityResource {
    params: BoostTunables,
    fuel: f32,
    tier: Tier,
    key_held: bool,
    /// Time of the last unpaired press, for double-press detection.
    last_press: Option<Duration>,
    /// Cleared by a super boost, restored when fuel recharges to max.
    super_available: bool,
    fuel_timer: TimerSlot<FuelTimer>,
    super_deadline: TimerSlot<()>,
}

impl FromWorld for AbilityResource {
    fn from_world(world: &mut World) -> Self {
        let params = world.get_resource::<Tunables>().map(|t| t.boost.clone()).unwrap_or_default();
        Self::new(params)
    }
}

impl AbilityResource {
    pub fn new(params: BoostTunables) -> Self {
        Self {
            fuel: params.max_fuel,
            params,
            tier: Tier::Idle,
            key_held: false,
            last_press: None,
            super_available: true,
            fuel_timer: TimerSlot::default(),
            super_deadline: TimerSlot::default(),
        }
    }

    #[inline]
    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    #[inline]
    pub fn max_fuel(&self) -> f32 {
        self.params.max_fuel
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn is_key_held(&self) -> bool {
        self.key_held
    }

    #[inline]
    pub fn is_super_available(&self) -> bool {
        self.super_available
    }

    #[inline]
    pub fn fuel_timer(&self) -> Option<FuelTimer> {
        self.fuel_timer.kind()
    }

    #[inline]
    pub fn super_remaining(&self) -> Option<Duration> {
        self.super_deadline.remaining()
    }

    /// Activation key went down at `now` (monotonic).
    pub fn press(&mut self, now: Duration, out: &mut Vec<BusEvent>) {
        self.key_held = true;

        let paired = self
            .last_press
            .is_some_and(|prev| now.saturating_sub(prev) < self.params.double_tap());
        self.last_press = Some(now);

        if paired
            && self.super_available
            && self.tier != Tier::SuperBoost
            && self.fuel >= self.params.min_super_fuel
        {
            // The pair is spent; a third press starts a new pair.
            self.last_press = None;
            self.super_available = false;
            self.super_deadline.schedule((), Cadence::Once(self.params.super_duration()));
            self.enter(Tier::SuperBoost, out);
            return;
        }

        if self.tier == Tier::Idle && self.fuel > self.params.low_fuel {
            self.enter(Tier::Boost, out);
        }
    }

    pub fn release(&mut self, out: &mut Vec<BusEvent>) {
        self.key_held = false;
        self.end(out);
    }

    /// Advance both timers by `delta` of elapsed time.
    pub fn advance(&mut self, delta: Duration, out: &mut Vec<BusEvent>) {
        if let Some(fired) = self.fuel_timer.tick(delta) {
            for _ in 0..fired.times {
                // A transition inside the loop replaces the task; stop applying the old one.
                if self.fuel_timer.token() != Some(fired.token) {
                    break;
                }
                self.apply_fuel_tick(fired.kind, out);
            }
        }

        if self.super_deadline.tick(delta).is_some() {
            self.end(out);
        }
    }

    fn apply_fuel_tick(&mut self, kind: FuelTimer, out: &mut Vec<BusEvent>) {
        let p = &self.params;
        match kind {
            FuelTimer::Consumption(Tier::Boost) => {
                self.fuel = (self.fuel - p.boost_consumption).clamp(0.0, p.max_fuel);
                if self.fuel < p.low_fuel {
                    self.end(out);
                }
            }
            FuelTimer::Consumption(Tier::SuperBoost) => {
                self.fuel = (self.fuel - p.super_consumption).clamp(0.0, p.max_fuel);
                if self.fuel <= 0.0 {
                    self.end(out);
                }
            }
            FuelTimer::Consumption(Tier::Idle) => {
                self.fuel_timer.cancel();
            }
            FuelTimer::Recharge(rate) => {
                let step = match rate {
                    Recharge::Regular => p.recharge,
                    Recharge::Reduced => p.super_recharge,
                };
                self.fuel = (self.fuel + step).clamp(0.0, p.max_fuel);
                // The first recharge tick with enough fuel lifts the super lockout.
                if self.fuel >= p.min_super_fuel {
                    self.super_available = true;
                }
                if self.fuel >= p.max_fuel {
                    self.fuel_timer.cancel();
                }
            }
        }
    }

    fn enter(&mut self, tier: Tier, out: &mut Vec<BusEvent>) {
        self.tier = tier;
        self.fuel_timer.schedule(FuelTimer::Consumption(tier), Cadence::Every(self.params.fuel_tick()));

        let (speed, color) = match tier {
            Tier::SuperBoost => (self.params.super_speed, self.params.super_color),
            _ => (self.params.boost_speed, self.params.boost_color),
        };
        out.push(BusEvent::SpeedChange(speed));
        out.push(BusEvent::TrailToggle { enabled: true, color: Some(hex_color(color)) });
    }

    /// End whichever tier is active. Safe to call from every trigger (release,
    /// empty tank, deadline); only the first one does anything.
    fn end(&mut self, out: &mut Vec<BusEvent>) {
        let was = std::mem::take(&mut self.tier);
        if was == Tier::Idle {
            return;
        }

        self.super_deadline.cancel();
        let rate = if was == Tier::SuperBoost { Recharge::Reduced } else { Recharge::Regular };
        self.fuel_timer.schedule(FuelTimer::Recharge(rate), Cadence::Every(self.params.fuel_tick()));

        out.push(BusEvent::SpeedChange(self.params.normal_speed));
        out.push(BusEvent::TrailToggle { enabled: false, color: None });
    }
}

impl Disposable for AbilityResource {
    fn dispose(&mut self) {
        self.fuel_timer.cancel();
        self.super_deadline.cancel();
        self.fuel = self.params.max_fuel;
        self.tier = Tier::Idle;
        self.key_held = false;
        self.last_press = None;
        self.super_available = true;
    }
}
