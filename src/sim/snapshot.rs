//! Read-only state export for the rendering collaborator
//!
//! Built fresh per call into caller-owned buffers sized from the live
//! counts - no shared scratch arrays, no references into simulation
//! internals, and never a slot past the live count or mid-compaction.

use glam::Vec3;
use serde::Serialize;

use crate::sim::quality::QualityLevel;

/// Render-relevant fields of one live entity
#[derive(Debug, Clone, Serialize)]
pub struct RenderEntity {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: [f32; 4],
    pub health_ratio: f32,
    pub is_primary: bool,
}

/// Render-relevant fields of one live particle
#[derive(Debug, Clone, Serialize)]
pub struct RenderParticle {
    pub position: Vec3,
    pub size: f32,
    pub rotation: f32,
    pub color: [f32; 4],
}

/// Flat copy of everything the host may render or display
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub entities: Vec<RenderEntity>,
    pub particles: Vec<RenderParticle>,
    pub camera_position: Vec3,
    pub score: i64,
    pub fps: f32,
    pub frame_time_ms: f32,
    pub quality: QualityLevel,
}
