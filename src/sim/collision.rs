//! Spatial broad phase and collision resolution
//!
//! Broad phase: a uniform grid over the playfield, rebuilt from scratch
//! every tick. Narrow phase: unordered `i < j` pairs within the same
//! cell only. Cross-cell pairs near a boundary are intentionally not
//! tested; that is an accepted fidelity limit, not a bug. Each entity
//! lands in exactly one cell, so no pair can be resolved twice in one
//! pass.
//!
//! Resolution is a cheap approximation, not a constraint solver:
//! symmetric positional separation plus an equal-and-opposite,
//! mass-agnostic bounce impulse along the separation axis.

use glam::Vec3;

use crate::config::SimConfig;
use crate::consts::{BOUNCE_FORCE, CELL_CAPACITY, DISTANCE_EPSILON, SCORE_REWARD};
use crate::error::SimError;
use crate::sim::entity::EntityStore;

/// One grid cell: a bounded bucket of store indices.
///
/// Overflow entries are dropped silently - a documented fidelity limit.
#[derive(Debug, Clone, Copy)]
struct Cell {
    entries: [u32; CELL_CAPACITY],
    len: u8,
}

impl Cell {
    const EMPTY: Cell = Cell {
        entries: [0; CELL_CAPACITY],
        len: 0,
    };

    fn push(&mut self, index: u32) {
        if (self.len as usize) < CELL_CAPACITY {
            self.entries[self.len as usize] = index;
            self.len += 1;
        }
    }
}

/// What one collision pass produced, applied by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct CollisionOutcome {
    /// Score earned from player contacts this pass
    pub score: i64,
    /// Contact midpoints that want a particle burst
    pub bursts: Vec<Vec3>,
    /// Pairs resolved (diagnostics)
    pub resolved_pairs: u32,
}

/// Uniform broad-phase grid, allocated once and reused as per-tick
/// scratch. Bucket counts are reset each rebuild; nothing in here
/// survives a tick boundary.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cols: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl SpatialGrid {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let cols = config.grid_cols();
        let rows = config.grid_rows();
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(cols * rows)
            .map_err(|_| SimError::AllocationFailed)?;
        cells.resize(cols * rows, Cell::EMPTY);
        Ok(Self {
            cols,
            rows,
            cell_size: config.cell_size,
            cells,
        })
    }

    /// Cell index for a position, clamped into grid bounds so entities
    /// outside the playfield still land in an edge cell.
    fn cell_index(&self, position: Vec3) -> usize {
        let col = ((position.x / self.cell_size).floor() as i64).clamp(0, self.cols as i64 - 1);
        let row = ((position.y / self.cell_size).floor() as i64).clamp(0, self.rows as i64 - 1);
        row as usize * self.cols + col as usize
    }

    /// Rebuild the grid from current entity positions
    pub fn rebuild(&mut self, store: &EntityStore) {
        for cell in &mut self.cells {
            cell.len = 0;
        }
        for (index, entity) in store.iter().enumerate() {
            if !entity.active || !entity.enabled {
                continue;
            }
            let cell = self.cell_index(entity.position);
            self.cells[cell].push(index as u32);
        }
    }

    /// Occupancy of the cell covering `position` (diagnostics and tests)
    pub fn occupancy_at(&self, position: Vec3) -> usize {
        self.cells[self.cell_index(position)].len as usize
    }
}

/// Run one broad-phase + narrow-phase pass and resolve every
/// overlapping pair found.
pub fn resolve_collisions(
    store: &mut EntityStore,
    grid: &mut SpatialGrid,
    config: &SimConfig,
) -> CollisionOutcome {
    grid.rebuild(store);

    let mut outcome = CollisionOutcome::default();
    let radius = config.collision_radius;

    // Candidate pairs gathered first: the grid borrows the store
    // immutably, resolution needs it mutably.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for cell in &grid.cells {
        let len = cell.len as usize;
        for i in 0..len {
            for j in (i + 1)..len {
                let a = cell.entries[i] as usize;
                let b = cell.entries[j] as usize;
                pairs.push((a.min(b), a.max(b)));
            }
        }
    }

    for (ia, ib) in pairs {
        // Liveness can change mid-pass (never in this resolution scheme,
        // but the contract is: inactive entities are invisible here)
        if !store.at(ia).active || !store.at(ib).active {
            continue;
        }

        let delta = store.at(ia).position - store.at(ib).position;
        let distance = delta.length();
        if distance >= radius {
            continue;
        }

        // Degenerate fallback: coincident centers get a zero axis
        // rather than a NaN direction.
        let axis = if distance > DISTANCE_EPSILON {
            delta / distance
        } else {
            Vec3::ZERO
        };
        let overlap = radius - distance;

        let (a, b) = store.pair_mut(ia, ib);

        // Symmetric positional separation, half the overlap each
        a.position += axis * (overlap * 0.5);
        b.position -= axis * (overlap * 0.5);

        // Equal-and-opposite bounce impulse, mass-agnostic
        let bounce = BOUNCE_FORCE * (a.bounciness + b.bounciness) * 0.5;
        a.velocity += axis * bounce;
        b.velocity -= axis * bounce;

        if a.tag.scores_on_contact() || b.tag.scores_on_contact() {
            outcome.score += SCORE_REWARD;
        }

        outcome
            .bursts
            .push((a.position + b.position) * 0.5);
        outcome.resolved_pairs += 1;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Tag;

    fn setup(capacity: usize) -> (EntityStore, SpatialGrid, SimConfig) {
        let config = SimConfig::default();
        let store = EntityStore::new(capacity).unwrap();
        let grid = SpatialGrid::new(&config).unwrap();
        (store, grid, config)
    }

    #[test]
    fn test_overlapping_pair_separates_symmetrically() {
        let (mut store, mut grid, config) = setup(4);
        let a = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "a", Tag::Obstacle)
            .unwrap();
        let b = store
            .spawn(Vec3::new(110.0, 100.0, 0.0), "b", Tag::Obstacle)
            .unwrap();

        let midpoint_before = (store.get(a).unwrap().position + store.get(b).unwrap().position) * 0.5;
        let outcome = resolve_collisions(&mut store, &mut grid, &config);
        assert_eq!(outcome.resolved_pairs, 1);

        let pa = store.get(a).unwrap().position;
        let pb = store.get(b).unwrap().position;
        // Pushed fully apart
        assert!((pa - pb).length() >= config.collision_radius - 1e-3);
        // Midpoint preserved by the symmetric push
        let midpoint_after = (pa + pb) * 0.5;
        assert!((midpoint_after - midpoint_before).length() < 1e-3);
    }

    #[test]
    fn test_bounce_is_equal_and_opposite() {
        let (mut store, mut grid, config) = setup(4);
        let a = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "a", Tag::Obstacle)
            .unwrap();
        let b = store
            .spawn(Vec3::new(120.0, 100.0, 0.0), "b", Tag::Obstacle)
            .unwrap();

        resolve_collisions(&mut store, &mut grid, &config);

        let va = store.get(a).unwrap().velocity;
        let vb = store.get(b).unwrap().velocity;
        assert!((va + vb).length() < 1e-3);
        assert!(va.x < 0.0 && vb.x > 0.0);
    }

    #[test]
    fn test_coincident_centers_do_not_produce_nan() {
        let (mut store, mut grid, config) = setup(4);
        let a = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "a", Tag::Obstacle)
            .unwrap();
        let b = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "b", Tag::Obstacle)
            .unwrap();

        resolve_collisions(&mut store, &mut grid, &config);

        for id in [a, b] {
            let e = store.get(id).unwrap();
            assert!(e.position.is_finite());
            assert!(e.velocity.is_finite());
        }
    }

    #[test]
    fn test_inactive_entities_are_invisible() {
        let (mut store, mut grid, config) = setup(4);
        let a = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "a", Tag::Obstacle)
            .unwrap();
        let b = store
            .spawn(Vec3::new(110.0, 100.0, 0.0), "b", Tag::Obstacle)
            .unwrap();
        store.mark_inactive(b).unwrap();

        let outcome = resolve_collisions(&mut store, &mut grid, &config);
        assert_eq!(outcome.resolved_pairs, 0);
        assert_eq!(store.get(a).unwrap().velocity, Vec3::ZERO);
    }

    #[test]
    fn test_player_contact_awards_score() {
        let (mut store, mut grid, config) = setup(4);
        store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "player", Tag::Player)
            .unwrap();
        store
            .spawn(Vec3::new(110.0, 100.0, 0.0), "rock", Tag::Obstacle)
            .unwrap();

        let outcome = resolve_collisions(&mut store, &mut grid, &config);
        assert_eq!(outcome.score, SCORE_REWARD);
        assert_eq!(outcome.bursts.len(), 1);
    }

    #[test]
    fn test_cross_cell_pairs_are_not_tested() {
        let (mut store, mut grid, config) = setup(4);
        // Straddling a cell boundary at x = 64: centers 30 units apart
        // (inside the collision radius) but in different cells.
        store
            .spawn(Vec3::new(50.0, 32.0, 0.0), "a", Tag::Obstacle)
            .unwrap();
        store
            .spawn(Vec3::new(80.0, 32.0, 0.0), "b", Tag::Obstacle)
            .unwrap();

        let outcome = resolve_collisions(&mut store, &mut grid, &config);
        assert_eq!(outcome.resolved_pairs, 0);
    }

    #[test]
    fn test_bucket_overflow_drops_silently() {
        let (mut store, mut grid, config) = setup(CELL_CAPACITY + 8);
        let pos = Vec3::new(100.0, 100.0, 0.0);
        for i in 0..CELL_CAPACITY + 8 {
            store.spawn(pos, &format!("e{i}"), Tag::Obstacle).unwrap();
        }

        grid.rebuild(&store);
        assert_eq!(grid.occupancy_at(pos), CELL_CAPACITY);

        // Full pass still behaves
        let outcome = resolve_collisions(&mut store, &mut grid, &config);
        assert!(outcome.resolved_pairs > 0);
    }

    #[test]
    fn test_out_of_bounds_positions_clamp_to_edge_cells() {
        let (mut store, mut grid, _config) = setup(4);
        store
            .spawn(Vec3::new(-500.0, -500.0, 0.0), "low", Tag::Obstacle)
            .unwrap();
        store
            .spawn(Vec3::new(1e6, 1e6, 0.0), "high", Tag::Obstacle)
            .unwrap();

        // Must not panic on indexing
        grid.rebuild(&store);
        assert_eq!(grid.occupancy_at(Vec3::new(-500.0, -500.0, 0.0)), 1);
    }
}
