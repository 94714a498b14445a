//! Bounded particle-effects pool
//!
//! Short-lived visual instances with their own cheap physics,
//! independent of the entity store. Bursts are capacity-bounded and
//! silently truncated; removal is deferred to a periodic compaction so
//! the O(n) rewrite is amortized instead of paid every frame.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{
    BURST_CEILING, PARTICLE_COMPACT_INTERVAL, PARTICLE_SIZE_DECAY, PARTICLE_SPIN_DEG,
};
use crate::error::SimError;

/// One visual effect instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// rgba; alpha tracks remaining life
    pub color: [f32; 4],
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub rotation: f32,
    pub active: bool,
}

/// Fixed-capacity pool of particles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    ticks_since_compact: u32,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Result<Self, SimError> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(capacity)
            .map_err(|_| SimError::AllocationFailed)?;
        Ok(Self {
            particles,
            capacity,
            ticks_since_compact: 0,
        })
    }

    /// Spawn an explosion burst at `position`.
    ///
    /// `count` is clamped to a per-call ceiling, then truncated to the
    /// remaining pool capacity. Requests beyond capacity are dropped
    /// silently; existing particles are never disturbed.
    pub fn spawn_burst(&mut self, position: Vec3, count: usize, rng: &mut Pcg32) {
        use std::f32::consts::{FRAC_PI_2, TAU};

        let count = count.min(BURST_CEILING);
        for _ in 0..count {
            if self.particles.len() >= self.capacity {
                break;
            }

            // Uniform horizontal angle, raised/lowered by a vertical one
            let angle_xz = rng.random_range(0.0..TAU);
            let angle_y = rng.random_range(-FRAC_PI_2..FRAC_PI_2);
            let speed = rng.random_range(100.0..300.0_f32);
            let velocity = Vec3::new(
                angle_xz.cos() * angle_y.cos() * speed,
                angle_y.sin() * speed,
                angle_xz.sin() * angle_y.cos() * speed,
            );

            let life = rng.random_range(1.0..3.0_f32);
            self.particles.push(Particle {
                position,
                velocity,
                color: [1.0, rng.random_range(0.5..1.0_f32), 0.0, 1.0],
                life,
                max_life: life,
                size: rng.random_range(2.0..6.0_f32),
                rotation: 0.0,
                active: true,
            });
        }
    }

    /// Advance every active particle by `dt` seconds.
    ///
    /// Life is monotonically non-increasing; once it crosses zero the
    /// particle is inactive for all remaining processing this tick.
    pub fn tick(&mut self, gravity: Vec3, dt: f32) {
        for p in &mut self.particles {
            if !p.active {
                continue;
            }

            p.velocity += gravity * dt;
            p.position += p.velocity * dt;
            p.rotation += dt * PARTICLE_SPIN_DEG;

            p.life -= dt;
            if p.life <= 0.0 {
                p.active = false;
                continue;
            }

            // Fade with remaining life, shrink steadily
            p.color[3] = p.life / p.max_life;
            p.size *= PARTICLE_SIZE_DECAY;
        }
    }

    /// Advance the compaction cadence; compacts when the interval
    /// elapses. Called once per tick by the orchestrator.
    pub fn end_tick(&mut self) {
        self.ticks_since_compact += 1;
        if self.ticks_since_compact >= PARTICLE_COMPACT_INTERVAL {
            self.ticks_since_compact = 0;
            self.compact();
        }
    }

    /// Remove inactive particles, preserving order of survivors
    pub fn compact(&mut self) {
        self.particles.retain(|p| p.active);
    }

    /// Stored particle count (active and not-yet-compacted)
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles still alive this tick
    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Drop everything (reset path)
    pub fn clear(&mut self) {
        self.particles.clear();
        self.ticks_since_compact = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_burst_respects_per_call_ceiling() {
        let mut pool = ParticlePool::new(1000).unwrap();
        pool.spawn_burst(Vec3::ZERO, 500, &mut rng());
        assert_eq!(pool.len(), BURST_CEILING);
    }

    #[test]
    fn test_burst_truncates_at_capacity() {
        let mut pool = ParticlePool::new(10).unwrap();
        let mut rng = rng();
        pool.spawn_burst(Vec3::ZERO, 8, &mut rng);
        pool.spawn_burst(Vec3::ZERO, 8, &mut rng);

        assert_eq!(pool.len(), 10);
        assert!(pool.iter().all(|p| p.active));
    }

    #[test]
    fn test_lifecycle_deactivates_at_life_end() {
        let mut pool = ParticlePool::new(8).unwrap();
        pool.spawn_burst(Vec3::ZERO, 4, &mut rng());

        let dt = 1.0 / 60.0;
        let max_life = pool
            .iter()
            .map(|p| p.max_life)
            .fold(0.0_f32, f32::max);

        let ticks_needed = (max_life / dt).ceil() as usize + 1;
        for _ in 0..ticks_needed {
            pool.tick(Vec3::ZERO, dt);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_alpha_monotonically_non_increasing() {
        let mut pool = ParticlePool::new(8).unwrap();
        pool.spawn_burst(Vec3::ZERO, 4, &mut rng());

        let dt = 1.0 / 60.0;
        let mut prev: Vec<f32> = pool.iter().map(|p| p.color[3]).collect();
        for _ in 0..200 {
            pool.tick(Vec3::ZERO, dt);
            for (p, prev_alpha) in pool.iter().zip(prev.iter()) {
                assert!(p.color[3] <= *prev_alpha + 1e-6);
            }
            prev = pool.iter().map(|p| p.color[3]).collect();
        }
    }

    #[test]
    fn test_compaction_cadence() {
        let mut pool = ParticlePool::new(8).unwrap();
        pool.spawn_burst(Vec3::ZERO, 4, &mut rng());

        // Kill everything in one long tick
        pool.tick(Vec3::ZERO, 10.0);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.len(), 4);

        // Dead particles linger until the cadence elapses
        for _ in 0..PARTICLE_COMPACT_INTERVAL - 1 {
            pool.end_tick();
        }
        assert_eq!(pool.len(), 4);
        pool.end_tick();
        assert_eq!(pool.len(), 0);
    }
}
