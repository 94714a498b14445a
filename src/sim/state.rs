//! The simulation context object
//!
//! One explicitly constructed, explicitly owned [`SimState`] per
//! simulation instance; there is no process-wide singleton. Every
//! externally visible mutation (spawning, input intents, pause and
//! quality overrides) goes through methods here and must happen
//! strictly before or after a tick, never during one.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;
use crate::consts::CAMERA_LERP_SPEED;
use crate::error::SimError;
use crate::sim::collision::SpatialGrid;
use crate::sim::entity::{Entity, EntityId, EntityStore, Tag};
use crate::sim::input::{InputIntent, InputState};
use crate::sim::particles::ParticlePool;
use crate::sim::quality::{PerfMonitor, QualityLevel};
use crate::sim::snapshot::{RenderEntity, RenderParticle, Snapshot};

/// Smoothed follow camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
}

impl Camera {
    /// Lerp toward `target` at the follow speed; only x/y track so a
    /// fixed viewing distance on z is left to the host.
    pub fn follow(&mut self, target: Vec3, dt: f32) {
        let t = (CAMERA_LERP_SPEED * dt).min(1.0);
        self.position.x += (target.x - self.position.x) * t;
        self.position.y += (target.y - self.position.y) * t;
    }
}

/// Complete simulation state for one core instance
#[derive(Debug, Clone)]
pub struct SimState {
    pub(crate) config: SimConfig,
    pub(crate) entities: EntityStore,
    pub(crate) particles: ParticlePool,
    pub(crate) grid: SpatialGrid,
    pub(crate) perf: PerfMonitor,
    pub(crate) input: InputState,
    pub(crate) camera: Camera,
    pub(crate) rng: Pcg32,
    seed: u64,
    pub(crate) score: i64,
    pub(crate) time_scale: f32,
    pub(crate) paused: bool,
    pub(crate) debug: bool,
    pub(crate) tick_count: u64,
    /// Cached primary-actor handle; resolved (and liveness-checked)
    /// through the store, never by array position.
    pub(crate) primary: Option<EntityId>,
}

impl SimState {
    /// Allocate a simulation instance up front. On failure nothing is
    /// partially constructed and the host must not tick the result.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, SimError> {
        let entities = EntityStore::new(config.entity_capacity)?;
        let particles = ParticlePool::new(config.particle_capacity)?;
        let grid = SpatialGrid::new(&config)?;
        let perf = PerfMonitor::new(config.frame_budget_ms);
        let camera = Camera {
            position: Vec3::new(
                config.playfield_width / 2.0,
                config.playfield_height / 2.0,
                -500.0,
            ),
        };

        log::info!(
            "simulation core ready (entities {}, particles {}, seed {})",
            config.entity_capacity,
            config.particle_capacity,
            seed
        );

        Ok(Self {
            config,
            entities,
            particles,
            grid,
            perf,
            input: InputState::default(),
            camera,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            score: 0,
            time_scale: 1.0,
            paused: false,
            debug: false,
            tick_count: 0,
            primary: None,
        })
    }

    /// Spawn an entity with documented defaults
    pub fn spawn_entity(
        &mut self,
        position: Vec3,
        name: &str,
        tag: Tag,
    ) -> Result<EntityId, SimError> {
        self.entities.spawn(position, name, tag)
    }

    /// Spawn the primary actor: player-tagged, gravity-free (top-down
    /// control), camera-follow and input target. Replaces any previous
    /// primary actor's role, not the entity itself.
    pub fn spawn_primary(&mut self, position: Vec3, name: &str) -> Result<EntityId, SimError> {
        let id = self.entities.spawn(position, name, Tag::Player)?;
        if let Some(old) = self.primary
            && let Some(entity) = self.entities.get_mut(old)
        {
            entity.is_primary = false;
        }
        if let Some(entity) = self.entities.get_mut(id) {
            entity.is_primary = true;
            entity.has_gravity = false;
            entity.color = [0.2, 0.8, 1.0, 1.0];
        }
        self.primary = Some(id);
        Ok(id)
    }

    /// Resolve a handle for inspection. Present until compaction even
    /// when marked inactive; check `active` before acting on it.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Resolve a handle for configuration (mass, gravity, color and so
    /// on after spawning). Must not be called during a tick.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// First active entity carrying `tag`
    pub fn find_by_tag(&self, tag: Tag) -> Option<EntityId> {
        self.entities.find_by_tag(tag)
    }

    /// The primary actor, if it is still alive
    pub fn primary(&self) -> Option<&Entity> {
        self.primary
            .and_then(|id| self.entities.get(id))
            .filter(|e| e.active)
    }

    /// Mark an entity for removal at the next compaction pass. Stale
    /// handles are reported and ignored.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), SimError> {
        self.entities.mark_inactive(id)
    }

    /// Mark an entity as owned by an external authority (`None` hands
    /// it back to the local simulation). The core stores the marker so
    /// a host can route replication; it never acts on it itself. A
    /// stale handle changes nothing.
    pub fn set_entity_owner(&mut self, id: EntityId, owner: Option<u32>) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.owner = owner;
        }
    }

    /// Buffer an input intent for the next tick
    pub fn apply_input(&mut self, intent: InputIntent, pressed: bool) {
        self.input.apply(intent, pressed);
    }

    /// Request a particle burst (consumed immediately; bounded by the
    /// pool exactly like collision-spawned bursts)
    pub fn trigger_effect(&mut self, position: Vec3, count: usize) {
        self.particles.spawn_burst(position, count, &mut self.rng);
    }

    /// Pin the quality level and disable adaptation
    pub fn set_quality_level(&mut self, level: QualityLevel) {
        self.perf.set_quality(level);
    }

    /// Re-enable (or disable) the adaptive governor
    pub fn enable_adaptive_quality(&mut self, enabled: bool) {
        self.perf.enable_adaptive(enabled);
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Wipe entities, particles, score and RNG back to the initial
    /// state, keeping the configuration. The entity and particle pools
    /// keep their backing allocations, so resetting cannot fail.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.particles.clear();
        self.perf = PerfMonitor::new(self.config.frame_budget_ms);
        self.input = InputState::default();
        self.camera.position = Vec3::new(
            self.config.playfield_width / 2.0,
            self.config.playfield_height / 2.0,
            -500.0,
        );
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.score = 0;
        self.time_scale = 1.0;
        self.paused = false;
        self.debug = false;
        self.tick_count = 0;
        self.primary = None;
        log::info!("simulation reset");
    }

    // --- Read-only accessors ---

    pub fn entity_count(&self) -> usize {
        self.entities.active_count()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.active_count()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn fps(&self) -> f32 {
        self.perf.fps()
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.perf.average_frame_time_ms()
    }

    pub fn quality_level(&self) -> QualityLevel {
        self.perf.quality()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Flat export of live state for the rendering collaborator.
    /// Inactive and not-yet-compacted slots never appear here.
    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .entities
            .iter()
            .filter(|e| e.active)
            .map(|e| RenderEntity {
                position: e.position,
                rotation: e.rotation,
                scale: e.scale,
                color: e.color,
                health_ratio: e.health_ratio(),
                is_primary: e.is_primary,
            })
            .collect();

        let particles = self
            .particles
            .iter()
            .filter(|p| p.active)
            .map(|p| RenderParticle {
                position: p.position,
                size: p.size,
                rotation: p.rotation,
                color: p.color,
            })
            .collect();

        Snapshot {
            entities,
            particles,
            camera_position: self.camera.position,
            score: self.score,
            fps: self.perf.fps(),
            frame_time_ms: self.perf.average_frame_time_ms(),
            quality: self.perf.quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> SimState {
        SimState::new(SimConfig::compact(), 42).unwrap()
    }

    #[test]
    fn test_primary_role_survives_compaction() {
        let mut state = sim();
        let scenery = state
            .spawn_entity(Vec3::ZERO, "scenery", Tag::Environment)
            .unwrap();
        let player = state.spawn_primary(Vec3::new(10.0, 0.0, 0.0), "hero").unwrap();

        // Removing an earlier entity shifts array positions but must
        // not move the primary role.
        state.despawn(scenery).unwrap();
        state.entities.compact();

        let primary = state.primary().unwrap();
        assert_eq!(primary.id, player);
        assert!(primary.is_primary);
    }

    #[test]
    fn test_primary_gone_after_despawn() {
        let mut state = sim();
        let player = state.spawn_primary(Vec3::ZERO, "hero").unwrap();
        state.despawn(player).unwrap();
        assert!(state.primary().is_none());
    }

    #[test]
    fn test_replacing_primary_clears_old_flag() {
        let mut state = sim();
        let first = state.spawn_primary(Vec3::ZERO, "one").unwrap();
        let second = state.spawn_primary(Vec3::ZERO, "two").unwrap();

        assert!(!state.entities.get(first).unwrap().is_primary);
        assert_eq!(state.primary().unwrap().id, second);
    }

    #[test]
    fn test_snapshot_excludes_inactive() {
        let mut state = sim();
        let a = state.spawn_entity(Vec3::ZERO, "a", Tag::Obstacle).unwrap();
        state.spawn_entity(Vec3::ZERO, "b", Tag::Obstacle).unwrap();
        state.despawn(a).unwrap();

        // Mid-frame: a is marked but not compacted
        let snapshot = state.snapshot();
        assert_eq!(snapshot.entities.len(), 1);
        assert_eq!(state.entity_count(), 1);
        assert_eq!(state.entities.len(), 2);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = sim();
        state.spawn_entity(Vec3::ZERO, "junk", Tag::Obstacle).unwrap();
        state.trigger_effect(Vec3::ZERO, 8);
        state.score = 99;
        state.set_time_scale(0.5);
        state.set_paused(true);

        state.reset();
        assert_eq!(state.entity_count(), 0);
        assert_eq!(state.particle_count(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.time_scale, 1.0);
        assert!(!state.is_paused());

        // Id sequence and RNG restart exactly as in a fresh instance
        let fresh = sim();
        let a = state.spawn_entity(Vec3::ZERO, "a", Tag::Obstacle).unwrap();
        let mut other = fresh;
        let b = other.spawn_entity(Vec3::ZERO, "a", Tag::Obstacle).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_entity_owner_marker() {
        let mut state = sim();
        let id = state.spawn_entity(Vec3::ZERO, "drone", Tag::Obstacle).unwrap();
        assert_eq!(state.entity(id).unwrap().owner, None);

        state.set_entity_owner(id, Some(7));
        assert_eq!(state.entity(id).unwrap().owner, Some(7));

        state.set_entity_owner(id, None);
        assert_eq!(state.entity(id).unwrap().owner, None);
    }

    #[test]
    fn test_set_owner_on_stale_handle_is_no_op() {
        let mut state = sim();
        let id = state.spawn_entity(Vec3::ZERO, "drone", Tag::Obstacle).unwrap();
        state.despawn(id).unwrap();
        state.entities.compact();

        state.set_entity_owner(id, Some(3));
        assert!(state.entity(id).is_none());
        assert_eq!(state.entity_count(), 0);
    }
}
