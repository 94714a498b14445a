//! Deterministic simulation module
//!
//! All simulation logic lives here. This module must be pure and
//! deterministic:
//! - One shared, clamped delta-time per tick
//! - Seeded RNG only
//! - Stable iteration order (store order, preserved by compaction)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod input;
pub mod particles;
pub mod physics;
pub mod quality;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, SpatialGrid};
pub use entity::{Entity, EntityId, EntityStore, Tag};
pub use input::{InputIntent, InputState};
pub use particles::{Particle, ParticlePool};
pub use quality::{PerfMonitor, QualityLevel};
pub use snapshot::{RenderEntity, RenderParticle, Snapshot};
pub use state::{Camera, SimState};
pub use tick::tick;
