//! Data-driven simulation parameters
//!
//! One parameterized core instead of per-build tuning forks: every knob
//! that historically differed between engine builds (capacities,
//! sub-step count, gravity, playfield size) lives here. Construct a
//! [`SimConfig`], hand it to `SimState::new`, and the same simulation
//! code serves every variant.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::FRAME_BUDGET_MS;

/// Simulation tuning for one core instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Maximum live entities in the store
    pub entity_capacity: usize,
    /// Maximum live particles in the pool
    pub particle_capacity: usize,
    /// Fixed integration sub-steps per tick
    pub physics_substeps: u32,
    /// World gravity acceleration (units/s²)
    pub gravity: Vec3,
    /// Air density used by quadratic drag
    pub air_density: f32,
    /// Playfield extent covered by the collision grid
    pub playfield_width: f32,
    pub playfield_height: f32,
    /// Collision grid cell edge length
    pub cell_size: f32,
    /// Center distance below which two entities collide
    pub collision_radius: f32,
    /// Frame-time budget the quality governor regulates against (ms)
    pub frame_budget_ms: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 5000,
            particle_capacity: 10_000,
            physics_substeps: 4,
            gravity: Vec3::new(0.0, -980.0, 0.0),
            air_density: 1.225,
            playfield_width: 1920.0,
            playfield_height: 1080.0,
            cell_size: 64.0,
            collision_radius: 32.0,
            frame_budget_ms: FRAME_BUDGET_MS,
        }
    }
}

impl SimConfig {
    /// Grid column count for the configured playfield
    pub fn grid_cols(&self) -> usize {
        (self.playfield_width / self.cell_size).ceil().max(1.0) as usize
    }

    /// Grid row count for the configured playfield
    pub fn grid_rows(&self) -> usize {
        (self.playfield_height / self.cell_size).ceil().max(1.0) as usize
    }

    /// A small configuration suitable for tests and headless tools
    pub fn compact() -> Self {
        Self {
            entity_capacity: 64,
            particle_capacity: 256,
            ..Self::default()
        }
    }
}
