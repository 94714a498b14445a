//! Orrery - deterministic entity simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, collisions, particles)
//! - `config`: Data-driven simulation parameters
//! - `error`: Error taxonomy shared across the crate
//!
//! The core is tick-driven and single-threaded. The host calls
//! [`sim::tick`] once per frame with a monotonic timestamp in
//! milliseconds and reads the resulting state through the read-only
//! accessors on [`sim::SimState`] or a flat [`sim::Snapshot`].
//! Rendering, audio, input-device polling and networking all live
//! outside this crate and only ever see what the snapshot exposes.

pub mod config;
pub mod error;
pub mod sim;

pub use config::SimConfig;
pub use error::SimError;
pub use sim::{SimState, Snapshot, tick};

/// Engine-wide tuning constants
pub mod consts {
    /// Delta-time cap in seconds (spiral-of-death guard)
    pub const MAX_DELTA_TIME: f32 = 0.033;
    /// Frame-time budget in milliseconds (60 FPS target)
    pub const FRAME_BUDGET_MS: f32 = 16.67;
    /// Rolling frame-time window length in samples
    pub const FRAME_WINDOW: usize = 60;
    /// Ticks a quality change is locked in before the next downgrade
    pub const QUALITY_COOLDOWN_TICKS: u32 = 60;
    /// Upgrade cooldown multiplier (slow, conservative recovery)
    pub const QUALITY_RAISE_MULTIPLIER: u32 = 3;

    /// Speed below which drag is not applied
    pub const SPEED_EPSILON: f32 = 0.01;
    /// Distance below which a separation axis is degenerate
    pub const DISTANCE_EPSILON: f32 = 1e-3;
    /// Lower clamp for mass in force-to-acceleration division
    pub const MIN_MASS: f32 = 1e-3;

    /// Impulse scale applied along the separation axis on contact
    pub const BOUNCE_FORCE: f32 = 150.0;
    /// Score awarded when a player entity is part of a collision
    pub const SCORE_REWARD: i64 = 5;
    /// Particles spawned at a contact midpoint
    pub const CONTACT_BURST_COUNT: usize = 3;
    /// Entity references one grid cell can hold before dropping
    pub const CELL_CAPACITY: usize = 16;

    /// Per-call ceiling on requested burst size
    pub const BURST_CEILING: usize = 64;
    /// Multiplicative particle size decay per tick
    pub const PARTICLE_SIZE_DECAY: f32 = 0.995;
    /// Particle spin in degrees per second
    pub const PARTICLE_SPIN_DEG: f32 = 180.0;
    /// Ticks between particle pool compaction passes
    pub const PARTICLE_COMPACT_INTERVAL: u32 = 30;

    /// Seconds between wander-behavior decisions
    pub const AI_DECISION_INTERVAL: f32 = 0.5;
    /// Steering force toward the current wander target
    pub const AI_MOVE_FORCE: f32 = 100.0;
    /// Distance at which a wander target counts as reached
    pub const AI_ARRIVE_DISTANCE: f32 = 5.0;

    /// Camera follow lerp speed (per second)
    pub const CAMERA_LERP_SPEED: f32 = 5.0;
    /// Acceleration applied per movement input axis
    pub const MOVE_ACCEL: f32 = 300.0;
}
