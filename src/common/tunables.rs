//! Tunable gameplay constants.
//!
//! Loaded from a RON file when one is present; every section falls back to the
//! defaults below field by field (`#[serde(default)]`).
//!
//! Speeds and distances are pixels per simulation tick. Every timer-like value is
//! wall time in milliseconds (or seconds where noted) so that the fuel economy,
//! the cooldown and the adversary schedule do not depend on the tick rate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::log::Level;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Upper bound on the simulation rate.
pub const MAX_TICK_HZ: f64 = 1000.0;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub tick_hz: f64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub arena: ArenaTunables,
    pub player: PlayerTunables,
    pub boost: BoostTunables,
    pub plasma: PlasmaTunables,
    pub adversary: AdversaryTunables,
    pub trail: TrailTunables,
    pub score: ScoreRules,
    pub visuals: VisualTunables,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: None,
            arena: ArenaTunables::default(),
            player: PlayerTunables::default(),
            boost: BoostTunables::default(),
            plasma: PlasmaTunables::default(),
            adversary: AdversaryTunables::default(),
            trail: TrailTunables::default(),
            score: ScoreRules::default(),
            visuals: VisualTunables::default(),
        }
    }
}

impl Tunables {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    /// Loads `path`, falling back to the defaults on any error.
    ///
    /// Runs before the log subscriber exists, so the outcome is returned as a
    /// [`TunablesSource`] for [`report_tunables_source`] to log at startup.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, TunablesSource) {
        let path = path.as_ref().to_path_buf();
        match Self::load(&path) {
            Ok(t) => (t, TunablesSource::File(path)),
            Err(reason) => (Self::default(), TunablesSource::Defaults { path, reason }),
        }
    }

    /// Fixed timestep. Out-of-range rates clamp to `1..=MAX_TICK_HZ`; NaN reads as 1 Hz.
    #[inline]
    pub fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1.0).min(MAX_TICK_HZ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTunables {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for ArenaTunables {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0, min_width: 640.0, min_height: 360.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTunables {
    /// Visual width; the collision radius is half of it.
    pub size: f32,
    pub rotation_lerp: f32,
    /// Smallest per-axis speed of the initial heading, to avoid near-axis launches.
    pub min_axis_speed: f32,
    /// Max orthogonal velocity nudge applied after a bounce.
    pub bounce_jitter: f32,
    /// Max facing nudge (radians) applied after a bounce.
    pub rotation_jitter: f32,
    pub tint: u32,
    pub dead_tint: u32,
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            size: 26.0,
            rotation_lerp: 0.12,
            min_axis_speed: 2.0,
            bounce_jitter: 0.5,
            rotation_jitter: 0.05,
            tint: 0x33BFE6,
            dead_tint: 0xFF0000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostTunables {
    pub normal_speed: f32,
    pub boost_speed: f32,
    pub super_speed: f32,
    pub max_fuel: f32,
    pub low_fuel: f32,
    pub min_super_fuel: f32,
    pub double_tap_ms: u64,
    pub super_duration_ms: u64,
    pub fuel_tick_ms: u64,
    pub boost_consumption: f32,
    pub super_consumption: f32,
    pub recharge: f32,
    pub super_recharge: f32,
    pub boost_color: u32,
    pub super_color: u32,
}

impl Default for BoostTunables {
    fn default() -> Self {
        Self {
            normal_speed: 5.0,
            boost_speed: 10.0,
            super_speed: 20.0,
            max_fuel: 100.0,
            low_fuel: 30.0,
            min_super_fuel: 30.0,
            double_tap_ms: 300,
            super_duration_ms: 5000,
            fuel_tick_ms: 100,
            boost_consumption: 0.5,
            super_consumption: 2.0,
            recharge: 0.2,
            super_recharge: 0.1,
            boost_color: 0xFFFF00,
            super_color: 0xFF6800,
        }
    }
}

impl BoostTunables {
    #[inline]
    pub fn double_tap(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }
    #[inline]
    pub fn super_duration(&self) -> Duration {
        Duration::from_millis(self.super_duration_ms)
    }
    #[inline]
    pub fn fuel_tick(&self) -> Duration {
        Duration::from_millis(self.fuel_tick_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlasmaTunables {
    pub cooldown_ms: u64,
    pub speed: f32,
    pub radius: f32,
    pub color: u32,
}

impl Default for PlasmaTunables {
    fn default() -> Self {
        Self { cooldown_ms: 200, speed: 15.0, radius: 20.0, color: 0x00FFFF }
    }
}

impl PlasmaTunables {
    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdversaryTunables {
    pub size: f32,
    pub tracking_lerp: f32,
    pub tint: u32,
    pub warning_tint: u32,
    pub warning_ms: u64,
    pub first_shot_ms: u64,
    pub shot_interval_ms: u64,
    pub shot_jitter_ms: u64,
    pub hazard_min_radius: f32,
    pub hazard_radius_range: f32,
    pub hazard_min_speed: f32,
    pub hazard_speed_range: f32,
    pub hazard_max_spin: f32,
    pub hazard_bounce_jitter: f32,
    /// Zero disables expiry.
    pub hazard_lifetime_secs: f32,
    pub hazard_tint: u32,
}

impl Default for AdversaryTunables {
    fn default() -> Self {
        Self {
            size: 39.0,
            tracking_lerp: 0.1,
            tint: 0xFF3300,
            warning_tint: 0xFFFFFF,
            warning_ms: 2000,
            first_shot_ms: 3000,
            shot_interval_ms: 7000,
            shot_jitter_ms: 7000,
            hazard_min_radius: 10.0,
            hazard_radius_range: 20.0,
            hazard_min_speed: 2.0,
            hazard_speed_range: 5.0,
            hazard_max_spin: 0.05,
            hazard_bounce_jitter: 0.25,
            hazard_lifetime_secs: 20.0,
            hazard_tint: 0x808080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailTunables {
    pub spawn_alpha: f32,
    pub fade_per_tick: f32,
    pub size: f32,
    pub super_size: f32,
    pub prewarm: usize,
}

impl Default for TrailTunables {
    fn default() -> Self {
        Self { spawn_alpha: 0.6, fade_per_tick: 0.02, size: 2.0, super_size: 4.0, prewarm: 32 }
    }
}

/// Score delta per destruction cause. The sign is the integrator's call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    pub hazard_shot: i64,
    pub hazard_expired: i64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self { hazard_shot: 1, hazard_expired: -1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualTunables {
    /// Asset path of the body sprite; `None` draws untextured quads.
    pub body_sprite: Option<String>,
}

/// Where the running [`Tunables`] came from.
#[derive(Resource, Debug)]
pub enum TunablesSource {
    File(PathBuf),
    Defaults { path: PathBuf, reason: ConfigError },
}

impl TunablesSource {
    pub fn level(&self) -> Level {
        match self {
            Self::File(_) => Level::INFO,
            Self::Defaults { reason: ConfigError::Io(_), .. } => Level::DEBUG,
            Self::Defaults { .. } => Level::WARN,
        }
    }
}

/// Startup: log where the tunables came from, once.
pub fn report_tunables_source(mut commands: Commands, source: Option<Res<TunablesSource>>) {
    let Some(source) = source else {
        return;
    };
    match &*source {
        TunablesSource::File(path) => info!("loaded tunables from {}", path.display()),
        TunablesSource::Defaults { path, reason: ConfigError::Io(e) } => {
            debug!("no tunables at {} ({e}); using defaults", path.display())
        }
        TunablesSource::Defaults { path, reason } => warn!("ignoring {}: {reason}", path.display()),
    }
    commands.remove_resource::<TunablesSource>();
}

/// `0xRRGGBB` -> opaque sRGB colour.
#[inline]
pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8(((rgb >> 16) & 0xFF) as u8, ((rgb >> 8) & 0xFF) as u8, (rgb & 0xFF) as u8)
}
