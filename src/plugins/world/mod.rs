//! World plugin: the entity model shared by every moving body.
//!
//! All bodies live in screen space (origin top-left, +y down, pixels per tick).
//! `facing` is the heading of travel in radians, `atan2(vy, vx)`; sprite-art
//! offsets are a render concern and never enter the simulation.

use bevy::prelude::*;

use crate::plugins::core::Playfield;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MovingBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: f32,
    /// Collision radius (half the visual width for sprites).
    pub radius: f32,
}

impl MovingBody {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, velocity: Vec2::ZERO, facing: 0.0, radius }
    }

    /// Set velocity and snap facing to it.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self.facing = heading_of(velocity, self.facing);
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    /// Keep direction, replace magnitude. A stationary body stays stationary.
    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.velocity = self.velocity.normalize_or_zero() * speed;
    }

    #[inline]
    pub fn overlaps(&self, other: &MovingBody) -> bool {
        overlaps(self.position, self.radius, other.position, other.radius)
    }
}

/// Per-entity render contract: the collaborator draws `position`/`facing` from
/// [`MovingBody`] with these attributes.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub visible: bool,
    pub tint: Color,
    /// Visual width in pixels.
    pub size: f32,
}

impl Appearance {
    pub fn new(tint: Color, size: f32) -> Self {
        Self { visible: true, tint, size }
    }
}

/// Remaining time before the body expires on its own.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_secs(secs: f32) -> Self {
        Self(Timer::from_seconds(secs, TimerMode::Once))
    }
}

/// Circle overlap: strictly closer than the sum of radii. Symmetric in its arguments.
#[inline]
pub fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

/// Signed angular delta from `from` to `to`, normalised into `[-π, π]`.
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let d = to - from;
    d.sin().atan2(d.cos())
}

/// One exponential-smoothing step toward `target` along the shortest path.
#[inline]
pub fn turn_toward(current: f32, target: f32, lerp: f32) -> f32 {
    current + shortest_arc(current, target) * lerp
}

/// Heading of `v`, or `fallback` for a zero vector.
#[inline]
pub fn heading_of(v: Vec2, fallback: f32) -> f32 {
    if v == Vec2::ZERO { fallback } else { v.y.atan2(v.x) }
}

/// Which axes were reflected this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reflection {
    pub x: bool,
    pub y: bool,
}

impl Reflection {
    #[inline]
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

/// Clamp the body into `[r, extent - r]` on both axes and point the crossed
/// velocity component back inside.
pub fn reflect_inside(body: &mut MovingBody, field: &Playfield) -> Reflection {
    let r = body.radius;
    let (px, vx, hit_x) = reflect_axis(body.position.x, body.velocity.x, r, field.width - r);
    let (py, vy, hit_y) = reflect_axis(body.position.y, body.velocity.y, r, field.height - r);
    body.position = Vec2::new(px, py);
    body.velocity = Vec2::new(vx, vy);
    Reflection { x: hit_x, y: hit_y }
}

#[inline]
fn reflect_axis(p: f32, v: f32, lo: f32, hi: f32) -> (f32, f32, bool) {
    // A field narrower than the body pins it to the low edge.
    let hi = hi.max(lo);
    if p < lo || (p == lo && v < 0.0) {
        (lo, v.abs(), true)
    } else if p > hi || (p == hi && v > 0.0) {
        (hi, -v.abs(), true)
    } else {
        (p, v, false)
    }
}
