//! Particle pool: pre-spawned entities recycled through a free list.
//!
//! Invariant: a particle in the free list is `Free` with alpha 0. Live particles
//! are never in the free list. Particles are never despawned; the pool only grows.

use bevy::prelude::*;

/// Newtype so the free list can only hold pooled particle entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailEntity(pub Entity);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleState {
    #[default]
    Free,
    Live,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TrailParticle {
    pub position: Vec2,
    pub alpha: f32,
    pub color: Color,
    pub size: f32,
    pub state: ParticleState,
}

impl TrailParticle {
    pub fn free() -> Self {
        Self {
            position: Vec2::ZERO,
            alpha: 0.0,
            color: Color::NONE,
            size: 0.0,
            state: ParticleState::Free,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.state == ParticleState::Live
    }

    fn release(&mut self) {
        self.state = ParticleState::Free;
        self.alpha = 0.0;
    }
}

#[derive(Resource, Debug)]
pub struct TrailPool {
    free: Vec<TrailEntity>,
    allocated: usize,
    pub enabled: bool,
    pub color: Color,
    pub size: f32,
}

impl TrailPool {
    pub fn new(color: Color, size: f32) -> Self {
        Self { free: Vec::new(), allocated: 0, enabled: false, color, size }
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Every particle ever created, live or free.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<TrailEntity> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, e: TrailEntity) {
        self.free.push(e);
    }
}

/// Create `count` free particles.
pub fn grow(commands: &mut Commands, pool: &mut TrailPool, count: usize) {
    pool.free.reserve(count);
    for _ in 0..count {
        let e = commands.spawn((Name::new("TrailParticle"), TrailParticle::free())).id();
        pool.allocated += 1;
        pool.free.push(TrailEntity(e));
    }
}

/// Light one particle at `position` with the pool's current colour and size.
///
/// Reuses a free particle when there is one; otherwise allocates.
pub fn acquire(
    commands: &mut Commands,
    pool: &mut TrailPool,
    particles: &mut Query<(Entity, &mut TrailParticle)>,
    position: Vec2,
    alpha: f32,
) {
    let lit = TrailParticle {
        position,
        alpha,
        color: pool.color,
        size: pool.size,
        state: ParticleState::Live,
    };

    while let Some(TrailEntity(e)) = pool.pop_free() {
        // A free-list entry whose entity is gone was torn down with the world; skip it.
        if let Ok((_, mut p)) = particles.get_mut(e) {
            *p = lit;
            return;
        }
        pool.allocated = pool.allocated.saturating_sub(1);
    }

    commands.spawn((Name::new("TrailParticle"), lit));
    pool.allocated += 1;
}

/// Return every live particle to the free list.
pub fn release_all<'a>(
    pool: &mut TrailPool,
    particles: impl IntoIterator<Item = (Entity, Mut<'a, TrailParticle>)>,
) -> usize {
    let mut released = 0;
    for (e, mut p) in particles {
        if !p.is_live() {
            continue;
        }
        p.release();
        pool.push_free(TrailEntity(e));
        released += 1;
    }
    released
}

/// Fade every live particle by `step`; return the spent ones to the pool.
pub fn fade<'a>(
    pool: &mut TrailPool,
    particles: impl IntoIterator<Item = (Entity, Mut<'a, TrailParticle>)>,
    step: f32,
) {
    for (e, mut p) in particles {
        if !p.is_live() {
            continue;
        }
        p.alpha -= step;
        if p.alpha <= 0.0 {
            p.release();
            pool.push_free(TrailEntity(e));
        }
    }
}
