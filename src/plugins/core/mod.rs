//! Core plugin: shared resources, the frame driver and the per-tick ordering.
//!
//! Per-tick contract (FixedUpdate, one pass per simulation tick):
//!
//! ```text
//! SimSet::Input -> Timers -> Physics -> Collision -> Effects
//! ```
//!
//! The whole chain is gated by [`simulation_active`]: `GameState::Playing` AND a
//! running [`FrameDriver`]. The condition is evaluated for each set as it is
//! reached, so a fatal collision that halts the driver in `Collision` also skips
//! `Effects` for that pass. Nothing runs on the next tick.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::error::InitError;
use crate::common::state::GameState;
use crate::common::tunables::{ArenaTunables, Tunables};
use crate::plugins::bus::{self, BusEvent, Topic};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Input,
    Timers,
    Physics,
    Collision,
    Effects,
}

/// Viewport bounds used for boundary reflection, in screen pixels
/// (origin top-left, +y down).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    pub fn validate(&self, arena: &ArenaTunables) -> Result<(), InitError> {
        let finite = self.width.is_finite() && self.height.is_finite();
        if !finite || self.width < arena.min_width || self.height < arena.min_height {
            return Err(InitError::Viewport {
                width: self.width,
                height: self.height,
                min_width: arena.min_width,
                min_height: arena.min_height,
            });
        }
        Ok(())
    }
}

#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_tunables(tunables: &Tunables) -> Self {
        match tunables.seed {
            Some(seed) => Self::seeded(seed),
            None => Self(StdRng::from_entropy()),
        }
    }

    /// Uniform in `[-amp, amp)`; zero when `amp` is not positive.
    #[inline]
    pub fn signed(&mut self, amp: f32) -> f32 {
        if amp > 0.0 { self.0.gen_range(-amp..amp) } else { 0.0 }
    }

    /// Uniform in `[0, range)`; zero when `range` is not positive.
    #[inline]
    pub fn upto(&mut self, range: f32) -> f32 {
        if range > 0.0 { self.0.gen_range(0.0..range) } else { 0.0 }
    }

    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.0.gen_range(0.0..std::f32::consts::TAU)
    }

    #[inline]
    pub fn coin(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }

    pub fn millis_upto(&mut self, range: u64) -> u64 {
        if range > 0 { self.0.gen_range(0..range) } else { 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverPhase {
    #[default]
    Stopped,
    Running,
    /// Suspended by a fatal collision; waits for the progression to stop or restart it.
    Halted,
}

#[derive(Resource, Debug, Default)]
pub struct FrameDriver {
    phase: DriverPhase,
    ticks: u64,
}

impl FrameDriver {
    pub fn running() -> Self {
        Self { phase: DriverPhase::Running, ticks: 0 }
    }

    pub fn start(&mut self) {
        self.phase = DriverPhase::Running;
        self.ticks = 0;
    }

    /// Returns `true` only for the call that actually halted a running driver.
    pub fn halt(&mut self) -> bool {
        if self.phase == DriverPhase::Running {
            self.phase = DriverPhase::Halted;
            true
        } else {
            false
        }
    }

    pub fn stop(&mut self) {
        self.phase = DriverPhase::Stopped;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == DriverPhase::Running
    }

    #[inline]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Ticks completed since the last `start`.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Hand-off point for an audio collaborator.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundSettings {
    pub enabled: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();

    let tunables = app.world().resource::<Tunables>().clone();
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)))
        .insert_resource(Time::<Fixed>::from_duration(tunables.tick()))
        .insert_resource(Playfield::new(tunables.arena.width, tunables.arena.height))
        .insert_resource(GameRng::from_tunables(&tunables))
        .init_resource::<FrameDriver>()
        .init_resource::<SoundSettings>();

    app.configure_sets(
        FixedUpdate,
        (
            SimSet::Input,
            SimSet::Timers,
            SimSet::Physics,
            SimSet::Collision,
            SimSet::Effects,
        )
            .chain()
            .run_if(simulation_active),
    )
    .add_systems(FixedUpdate, count_tick.in_set(SimSet::Input));

    bus::subscribe(app.world_mut(), Topic::SoundToggle, apply_sound_toggle);
}

pub fn simulation_active(
    state: Option<Res<State<GameState>>>,
    driver: Option<Res<FrameDriver>>,
) -> bool {
    let playing = state.is_some_and(|s| *s.get() == GameState::Playing);
    playing && driver.is_some_and(|d| d.is_running())
}

fn count_tick(mut driver: ResMut<FrameDriver>) {
    driver.ticks += 1;
}

fn apply_sound_toggle(In(event): In<BusEvent>, mut sound: ResMut<SoundSettings>) {
    if let BusEvent::SoundToggle(enabled) = event {
        sound.enabled = enabled;
        info!("sound {}", if enabled { "on" } else { "muted" });
    }
}
