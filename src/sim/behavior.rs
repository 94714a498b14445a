//! Wander behavior for environment entities
//!
//! Environment-tagged entities re-pick a random target inside the
//! playfield on a fixed decision interval and steer toward it by
//! accumulating acceleration; the integrator consumes it next. The
//! shared simulation RNG keeps this deterministic.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;
use crate::consts::{AI_ARRIVE_DISTANCE, AI_DECISION_INTERVAL, AI_MOVE_FORCE, MIN_MASS};
use crate::sim::entity::{EntityStore, Tag};

/// Advance wander decisions and steering for all active entities
pub fn update(store: &mut EntityStore, config: &SimConfig, rng: &mut Pcg32, dt: f32) {
    for entity in store.iter_mut() {
        if !entity.active || entity.tag != Tag::Environment {
            continue;
        }

        entity.ai_timer -= dt;
        if entity.ai_timer <= 0.0 {
            entity.ai_timer = AI_DECISION_INTERVAL;
            entity.ai_target = Vec3::new(
                rng.random_range(0.0..config.playfield_width),
                rng.random_range(0.0..config.playfield_height),
                entity.position.z,
            );
        }

        let direction = entity.ai_target - entity.position;
        let distance = direction.length();
        if distance > AI_ARRIVE_DISTANCE {
            let force = direction / distance * AI_MOVE_FORCE;
            entity.acceleration += force / entity.mass.max(MIN_MASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_wander_steers_toward_target() {
        let config = SimConfig::default();
        let mut store = EntityStore::new(4).unwrap();
        let id = store
            .spawn(Vec3::new(100.0, 100.0, 0.0), "tumbleweed", Tag::Environment)
            .unwrap();
        let mut rng = Pcg32::seed_from_u64(3);

        update(&mut store, &config, &mut rng, 1.0);

        let e = store.get(id).unwrap();
        // A fresh target was picked and steering force applied
        assert_ne!(e.ai_target, e.position);
        assert!(e.acceleration.length() > 0.0);
        let toward = (e.ai_target - e.position).normalize();
        assert!(e.acceleration.normalize().dot(toward) > 0.99);
    }

    #[test]
    fn test_only_environment_entities_wander() {
        let config = SimConfig::default();
        let mut store = EntityStore::new(4).unwrap();
        let player = store.spawn(Vec3::ZERO, "player", Tag::Player).unwrap();
        let rock = store.spawn(Vec3::ZERO, "rock", Tag::Obstacle).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);

        update(&mut store, &config, &mut rng, 1.0);

        assert_eq!(store.get(player).unwrap().acceleration, Vec3::ZERO);
        assert_eq!(store.get(rock).unwrap().acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_inactive_entities_do_not_decide() {
        let config = SimConfig::default();
        let mut store = EntityStore::new(4).unwrap();
        let id = store.spawn(Vec3::ZERO, "dead", Tag::Environment).unwrap();
        store.mark_inactive(id).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);

        update(&mut store, &config, &mut rng, 1.0);
        assert_eq!(store.get(id).unwrap().acceleration, Vec3::ZERO);
    }
}
