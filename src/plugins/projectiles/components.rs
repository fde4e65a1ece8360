use bevy::prelude::*;

/// Player-fired plasma shot. Destroyed on its first hazard hit or on leaving the playfield.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile;
