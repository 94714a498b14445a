//! Entity storage and lifecycle
//!
//! Entities live in one order-preserving array. Gameplay marks them
//! inactive; only the compaction pass physically removes them, so a
//! handle obtained earlier in the same tick stays valid memory until
//! then. Every system checks `active` before touching an entity.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Closed category discriminator, resolved once at spawn time.
///
/// The hot per-pair collision loop branches on this instead of
/// comparing tag strings, so a typo cannot silently create an
/// unmatched category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tag {
    /// The scoring actor; collisions involving it award score
    Player,
    /// Wandering scenery driven by the behavior system
    Environment,
    /// Static-ish collider with no behavior
    Obstacle,
    #[default]
    Untagged,
}

impl Tag {
    /// Whether collisions involving this entity award score
    pub fn scores_on_contact(self) -> bool {
        matches!(self, Tag::Player)
    }
}

/// Stable entity handle.
///
/// Ids are monotonic and never reused, so a handle held across a
/// compaction either still resolves or is a detected no-op - it can
/// never silently alias a different entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// One simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Display label, not unique
    pub name: String,
    pub tag: Tag,

    // Spatial
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,

    // Physical
    pub mass: f32,
    pub friction: f32,
    pub bounciness: f32,
    pub drag: f32,
    /// Excluded from integration and gravity; moved only by external logic
    pub is_kinematic: bool,
    pub has_gravity: bool,
    /// Physics participation switch (independent of liveness)
    pub enabled: bool,

    // Logic
    /// Liveness flag; false marks the entity for removal at compaction
    pub active: bool,
    pub health: i32,
    pub max_health: i32,
    pub energy: f32,
    pub max_energy: f32,
    /// Camera-follow / input target, decoupled from array position
    pub is_primary: bool,
    /// Base render color (rgba)
    pub color: [f32; 4],

    // Behavior
    pub ai_timer: f32,
    pub ai_target: Vec3,

    /// Authority marker for entities mirrored from elsewhere. `None`
    /// means locally simulated; the core carries the marker but never
    /// acts on it.
    pub owner: Option<u32>,
}

impl Entity {
    /// Documented spawn defaults: unit scale, full health, zero
    /// velocity, gravity-affected. No field is left uninitialized.
    fn new(id: EntityId, position: Vec3, name: &str, tag: Tag) -> Self {
        Self {
            id,
            name: name.to_owned(),
            tag,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            mass: 1.0,
            friction: 0.1,
            bounciness: 0.5,
            drag: 0.01,
            is_kinematic: false,
            has_gravity: true,
            enabled: true,
            active: true,
            health: 100,
            max_health: 100,
            energy: 100.0,
            max_energy: 100.0,
            is_primary: false,
            color: [1.0, 1.0, 1.0, 1.0],
            ai_timer: 0.0,
            ai_target: position,
            owner: None,
        }
    }

    /// Health ratio for render tinting, clamped to [0, 1]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0 {
            0.0
        } else {
            (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
        }
    }
}

/// Capacity-bounded, order-preserving entity store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    capacity: usize,
    next_id: u32,
}

impl EntityStore {
    /// Pre-allocate the store. Fails without corrupting anything if the
    /// allocation cannot be made.
    pub fn new(capacity: usize) -> Result<Self, SimError> {
        let mut entities = Vec::new();
        entities
            .try_reserve_exact(capacity)
            .map_err(|_| SimError::AllocationFailed)?;
        Ok(Self {
            entities,
            capacity,
            next_id: 1,
        })
    }

    /// Create an entity with documented defaults.
    ///
    /// Fails gracefully at capacity: no entity is created and existing
    /// state is untouched.
    pub fn spawn(&mut self, position: Vec3, name: &str, tag: Tag) -> Result<EntityId, SimError> {
        if self.entities.len() >= self.capacity {
            return Err(SimError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity::new(id, position, name, tag));
        Ok(id)
    }

    /// Resolve a handle. Returns the entity even when marked inactive;
    /// callers check `active` themselves.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// First active entity carrying the tag
    pub fn find_by_tag(&self, tag: Tag) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.active && e.tag == tag)
            .map(|e| e.id)
    }

    /// Mark an entity for removal at the next compaction. A stale or
    /// unknown handle is reported and nothing changes.
    pub fn mark_inactive(&mut self, id: EntityId) -> Result<(), SimError> {
        match self.get_mut(id) {
            Some(entity) => {
                entity.active = false;
                Ok(())
            }
            None => Err(SimError::InvalidHandle { id: id.0 }),
        }
    }

    /// Remove inactive entities in place, preserving the relative order
    /// of survivors. The sole owner of slot reuse.
    pub fn compact(&mut self) {
        self.entities.retain(|e| e.active);
    }

    /// Drop every entity and restart the id sequence, keeping the
    /// backing allocation (reset path)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
    }

    /// Stored entity count (active and not-yet-compacted)
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities still alive this tick
    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| e.active).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Mutable access to two distinct entities by store index, for
    /// pairwise collision response within one tick.
    ///
    /// Panics if `i == j` or either index is out of range; the collision
    /// pass only enumerates `i < j` pairs from the current grid build.
    pub(crate) fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Entity, &mut Entity) {
        debug_assert!(i < j);
        let (head, tail) = self.entities.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    }

    /// Entity at a store index, valid only within the tick that built it
    pub(crate) fn at(&self, index: usize) -> &Entity {
        &self.entities[index]
    }
}
